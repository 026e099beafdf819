use crate::core::rule_store::{FlattenedPack, RuleStore};
use crate::domain::model::QueryIntent;
use crate::domain::ports::KvStore;
use crate::utils::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Tags that also match free-form phrasings of the same need.
const SEMANTIC_SYNONYMS: &[(&str, &[&str])] = &[
    ("pricing", &["cost", "how much", "price", "msrp"]),
    ("msrp", &["cost", "how much", "price", "sticker"]),
    ("dealers", &["dealership", "near me"]),
    ("dealer_locator", &["dealership", "near me", "find a dealer"]),
    ("safety_ratings", &["crash test", "iihs", "nhtsa"]),
    ("fuel_economy", &["mpg", "gas mileage"]),
    ("reviews", &["review", "rating", "worth it"]),
    ("comparisons", &["compare", " vs ", "versus", "better than"]),
    ("financing", &["lease", "loan", "monthly payment"]),
    ("locations", &["near me", "address", "directions"]),
    ("hours", &["open", "closing time"]),
    ("tuition", &["cost", "how much", "fees"]),
    ("quotes", &["how much", "cost", "price"]),
];

/// Tokens shorter than this are ignored by the keyword-splitting tier.
const MIN_TOKEN_LEN: usize = 3;

fn synonyms_for(tag: &str) -> &'static [&'static str] {
    SEMANTIC_SYNONYMS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, synonyms)| *synonyms)
        .unwrap_or(&[])
}

/// 判斷 intent 是否符合某個 allow tag
///
/// 依序：完整片語、拆字、語意同義字、intent 自己的 tag。
fn matches_tag(text: &str, intent_tags: &[String], tag: &str) -> bool {
    let phrase = tag.replace('_', " ");
    if text.contains(&phrase) {
        return true;
    }

    if phrase.contains(' ')
        && phrase
            .split_whitespace()
            .filter(|token| token.len() >= MIN_TOKEN_LEN)
            .any(|token| text.contains(token))
    {
        return true;
    }

    if synonyms_for(tag).iter().any(|synonym| text.contains(synonym)) {
        return true;
    }

    intent_tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag))
}

/// Filter intents against an already flattened pack. Surviving intents keep input order.
pub fn filter_with_pack(intents: &[QueryIntent], pack: &FlattenedPack) -> Vec<QueryIntent> {
    intents
        .iter()
        .filter(|intent| {
            let text = intent.text.to_lowercase();

            if let Some(phrase) = pack.deny.iter().find(|p| text.contains(p.as_str())) {
                tracing::debug!("🚫 Dropping intent '{}' (deny phrase '{}')", intent.text, phrase);
                return false;
            }

            if pack.allow.is_empty() {
                return true;
            }

            let keep = pack
                .allow
                .iter()
                .any(|tag| matches_tag(&text, &intent.tags, tag));
            if !keep {
                tracing::debug!("Dropping intent '{}' (no allow tag matched)", intent.text);
            }
            keep
        })
        .cloned()
        .collect()
}

/// 依產業的 intent pack（含繼承）過濾查詢意圖
pub fn filter_intents<K: KvStore>(
    rules: &RuleStore<K>,
    intents: &[QueryIntent],
    industry: &str,
) -> Vec<QueryIntent> {
    let pack = rules.flattened_pack(industry);
    let kept = filter_with_pack(intents, &pack);
    tracing::info!(
        "🎯 Intent filter for {}: kept {}/{} intents",
        industry,
        kept.len(),
        intents.len()
    );
    kept
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntentEntry {
    Text(String),
    Tagged(QueryIntent),
}

/// 讀取 intents 檔：`.json` 為字串或 `{text, tags}` 陣列，其他格式每行一個
pub fn load_intents<P: AsRef<Path>>(path: P) -> Result<Vec<QueryIntent>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        let entries: Vec<IntentEntry> = serde_json::from_str(&content)?;
        return Ok(entries
            .into_iter()
            .map(|entry| match entry {
                IntentEntry::Text(text) => QueryIntent::new(text),
                IntentEntry::Tagged(intent) => intent,
            })
            .collect());
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(QueryIntent::new)
        .collect())
}
