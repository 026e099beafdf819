//! Canary checks: a fixed table of domain -> expected industry run through the
//! full resolver to catch regressions in the heuristic/classifier balance.

use crate::core::resolver::{IndustryResolver, ResolveContext};
use crate::domain::model::{IndustryKey, LockSource};
use crate::domain::ports::{IndustryClassifier, KvStore};
use crate::utils::domain::root_url_for;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CANARY_CASES: &[(&str, &str)] = &[
    ("toyota.com", "automotive.oem"),
    ("subaru.com", "automotive.oem"),
    ("clevelandclinic.org", "healthcare.hospital"),
    ("firstnationalbank.com", "finance.banking"),
    ("progressive.com", "finance.insurance"),
    ("hilton.com", "travel.hospitality"),
    ("princeton.edu", "education.higher_ed"),
    ("joespizza.com", "food.restaurant"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanaryCase {
    pub domain: String,
    pub expected_industry: IndustryKey,
}

impl CanaryCase {
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CANARY_CASES
            .iter()
            .map(|(domain, expected)| Self {
                domain: domain.to_string(),
                expected_industry: expected.to_string(),
            })
            .collect()
    }

    /// 從 CSV 載入案例，欄位：`domain,expected_industry`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut cases = Vec::new();
        for record in reader.deserialize() {
            cases.push(record?);
        }
        Ok(cases)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanaryResult {
    pub domain: String,
    pub expected_industry: IndustryKey,
    pub actual_industry: IndustryKey,
    pub source: LockSource,
    pub confidence: Option<f64>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanaryReport {
    pub ran_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub avg_confidence: f64,
    pub no_generic_fallback: bool,
    pub results: Vec<CanaryResult>,
}

impl CanaryReport {
    pub fn from_results(results: Vec<CanaryResult>, default_industry: &str) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let (pass_rate, avg_confidence) = if total == 0 {
            (0.0, 0.0)
        } else {
            let confidence_sum: f64 = results.iter().map(|r| r.confidence.unwrap_or(0.0)).sum();
            (passed as f64 / total as f64, confidence_sum / total as f64)
        };
        let no_generic_fallback = results
            .iter()
            .all(|r| r.source != LockSource::Default && r.actual_industry != default_industry);

        Self {
            ran_at: Utc::now(),
            total,
            passed,
            pass_rate,
            avg_confidence,
            no_generic_fallback,
            results,
        }
    }
}

/// 逐一執行案例；每個案例都走完整的 resolver 流程
pub async fn run_canary<K: KvStore, C: IndustryClassifier>(
    resolver: &IndustryResolver<K, C>,
    cases: &[CanaryCase],
) -> CanaryReport {
    let mut results = Vec::with_capacity(cases.len());
    let taxonomy = resolver.rules().taxonomy();

    for case in cases {
        let ctx = ResolveContext::for_domain(case.domain.clone()).with_root_url(root_url_for(&case.domain));
        let lock = resolver.resolve(&ctx).await;
        let expected = taxonomy.normalize_key(&case.expected_industry);
        let passed = lock.value == expected;

        if passed {
            tracing::info!("✅ {} -> {} ({})", case.domain, lock.value, lock.source);
        } else {
            tracing::warn!(
                "❌ {} -> {} ({}), expected {}",
                case.domain,
                lock.value,
                lock.source,
                expected
            );
        }

        results.push(CanaryResult {
            domain: case.domain.clone(),
            expected_industry: expected,
            actual_industry: lock.value,
            source: lock.source,
            confidence: lock.confidence,
            passed,
        });
    }

    let report = CanaryReport::from_results(results, &resolver.rules().default_industry());
    tracing::info!(
        "📊 Canary: {}/{} passed ({:.0}%), avg confidence {:.2}, no generic fallback: {}",
        report.passed,
        report.total,
        report.pass_rate * 100.0,
        report.avg_confidence,
        report.no_generic_fallback
    );
    report
}
