//! Runtime settings consumed by the resolver and classifier.
//!
//! Defaults are the tuned constants the canary suite is calibrated against.
//! Override them through the TOML config rather than editing these values.

use crate::core::catalog::DEFAULT_INDUSTRY;
use std::time::Duration;

pub const MIN_CONFIDENCE: f64 = 0.35;
pub const HIGH_CONFIDENCE: f64 = 0.70;
pub const SCHEMA_BOOST: f64 = 0.10;
pub const AGREEMENT_BOOST: f64 = 0.15;
pub const HEURISTIC_FALLBACK: f64 = 0.5;

pub const PATTERN_WEIGHT: f64 = 0.4;
pub const DOMAIN_WEIGHT: f64 = 0.5;
/// Slot for an embedding/LLM score; that score is always 0 today.
pub const RESERVED_WEIGHT: f64 = 0.1;

/// Score of the synthesized vote when no industry scored above zero.
pub const FALLBACK_SCORE: f64 = 0.5;

pub const AI_TIMEOUT_SECONDS: u64 = 8;
pub const FETCH_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; IndustryLock/0.1; +https://example.com/bot)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_confidence: f64,
    pub high_confidence: f64,
    pub schema_boost: f64,
    pub agreement_boost: f64,
    pub heuristic_fallback: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            high_confidence: HIGH_CONFIDENCE,
            schema_boost: SCHEMA_BOOST,
            agreement_boost: AGREEMENT_BOOST,
            heuristic_fallback: HEURISTIC_FALLBACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub pattern: f64,
    pub domain: f64,
    pub reserved: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            pattern: PATTERN_WEIGHT,
            domain: DOMAIN_WEIGHT,
            reserved: RESERVED_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub fetch_homepage: bool,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub fallback_industry: String,
    pub fallback_score: f64,
    pub weights: FusionWeights,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            fetch_homepage: true,
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECONDS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_industry: DEFAULT_INDUSTRY.to_string(),
            fallback_score: FALLBACK_SCORE,
            weights: FusionWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    pub ai_enabled: bool,
    pub ai_timeout: Duration,
    pub thresholds: Thresholds,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            ai_timeout: Duration::from_secs(AI_TIMEOUT_SECONDS),
            thresholds: Thresholds::default(),
        }
    }
}
