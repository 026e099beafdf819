//! Pattern and domain-token scorers.
//!
//! Both are pure functions over the taxonomy and their input; they keep no
//! state and can be called from any number of tasks at once.

use crate::core::taxonomy::Taxonomy;
use crate::domain::model::{sort_votes, HeuristicVote};
use crate::utils::domain::domain_tokens;

/// Score for a single distinct domain keyword match.
pub const DOMAIN_BASE_SCORE: f64 = 0.70;
/// Added per additional distinct keyword.
pub const DOMAIN_STEP_SCORE: f64 = 0.25;

/// 以 regex 清單比對文字，score = 命中數 / pattern 數
///
/// `text` 需已轉小寫。anti-keyword 命中時該產業整個不投票。
pub fn score_patterns(taxonomy: &Taxonomy, text: &str) -> Vec<HeuristicVote> {
    let mut votes = Vec::new();

    for profile in taxonomy.profiles() {
        if profile.patterns.is_empty() {
            continue;
        }

        if let Some(veto) = profile
            .anti_keywords
            .iter()
            .find(|anti| text.contains(anti.as_str()))
        {
            tracing::debug!("🚫 {} vetoed by anti-keyword '{}'", profile.key, veto);
            continue;
        }

        let matched: Vec<String> = profile
            .patterns
            .iter()
            .filter_map(|re| re.find(text).map(|m| m.as_str().to_string()))
            .collect();

        if matched.is_empty() {
            continue;
        }

        votes.push(HeuristicVote {
            key: profile.key.clone(),
            score: matched.len() as f64 / profile.patterns.len() as f64,
            signals: matched,
        });
    }

    sort_votes(&mut votes);
    votes
}

/// Score for `matches` distinct keyword hits: 0.70, +0.25 each, capped at 1.0.
pub fn domain_score(matches: usize) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    (DOMAIN_BASE_SCORE + DOMAIN_STEP_SCORE * (matches - 1) as f64).min(1.0)
}

/// 以網域 token 比對各產業關鍵字
///
/// 計算的是「不同」關鍵字的數量：同一個關鍵字出現在多個 token 只算一次。
pub fn score_domain_tokens(taxonomy: &Taxonomy, domain: &str) -> Vec<HeuristicVote> {
    let tokens = domain_tokens(domain);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut votes = Vec::new();
    for profile in taxonomy.profiles() {
        let matched: Vec<String> = profile
            .domain_keywords
            .iter()
            .filter(|keyword| tokens.iter().any(|token| token.contains(keyword.as_str())))
            .cloned()
            .collect();

        if matched.is_empty() {
            continue;
        }

        votes.push(HeuristicVote {
            key: profile.key.clone(),
            score: domain_score(matched.len()),
            signals: matched,
        });
    }

    sort_votes(&mut votes);
    votes
}
