//! Homepage signal extraction.
//!
//! Turns raw homepage markup into a [`HomepageSignals`] bundle. Every field is
//! optional: a page without a `<title>` or with broken JSON-LD still yields
//! whatever else could be read.

use crate::domain::model::IndustrySignals;
use scraper::{Html, Node, Selector};
use serde_json::Value;
use std::collections::BTreeSet;

/// Body text is truncated to this many characters.
pub const MAX_BODY_CHARS: usize = 2000;
/// Upper bound on distinct navigation terms kept.
pub const MAX_NAV_TERMS: usize = 40;

const NAV_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "[role='navigation']",
    ".nav",
    ".navbar",
    ".menu",
    "#menu",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomepageSignals {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub site_name: Option<String>,
    pub h1: Option<String>,
    pub nav_terms: Vec<String>,
    pub schema_types: Vec<String>,
    pub body_text: String,
    pub site_description: Option<String>,
    pub keywords: Vec<String>,
}

impl HomepageSignals {
    /// Signals built without a homepage: domain plus caller-supplied hints only.
    pub fn minimal(site_description: Option<String>, keywords: Vec<String>) -> Self {
        Self {
            site_description,
            keywords,
            ..Default::default()
        }
    }

    pub fn with_caller_hints(mut self, site_description: Option<String>, keywords: Vec<String>) -> Self {
        self.site_description = site_description;
        self.keywords = keywords;
        self
    }

    /// 串接所有文字訊號並轉小寫
    pub fn text_corpus(&self, domain: &str) -> String {
        let mut parts: Vec<&str> = vec![domain];
        parts.extend(self.title.as_deref());
        parts.extend(self.meta_description.as_deref());
        parts.extend(self.site_name.as_deref());
        parts.extend(self.h1.as_deref());
        parts.extend(self.site_description.as_deref());
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.extend(self.nav_terms.iter().map(String::as_str));
        parts.extend(self.schema_types.iter().map(String::as_str));
        if !self.body_text.is_empty() {
            parts.push(&self.body_text);
        }
        parts.join(" ").to_lowercase()
    }

    pub fn to_industry_signals(&self, domain: &str) -> IndustrySignals {
        IndustrySignals {
            domain: domain.to_string(),
            homepage_title: self.title.clone(),
            homepage_h1: self.h1.clone(),
            schema_types: self.schema_types.clone(),
            keywords: self.keywords.clone(),
            nav_terms: self.nav_terms.clone(),
            site_description: self
                .site_description
                .clone()
                .or_else(|| self.meta_description.clone()),
        }
    }
}

/// 解析首頁 HTML，取出產業判斷用的訊號
pub fn extract_signals(html: &str) -> HomepageSignals {
    let document = Html::parse_document(html);

    HomepageSignals {
        title: first_text(&document, "title"),
        meta_description: meta_content(&document, "meta[name='description']"),
        site_name: meta_content(&document, "meta[property='og:site_name']"),
        h1: first_text(&document, "h1"),
        nav_terms: extract_nav_terms(&document),
        schema_types: extract_schema_types(&document),
        body_text: extract_body_text(&document),
        site_description: None,
        keywords: Vec::new(),
    }
}

fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| compact_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(compact_ws)
        .find(|c| !c.is_empty())
}

/// Words of length 4..=19 inside nav-like regions, lower-cased and de-duplicated.
fn extract_nav_terms(document: &Html) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut terms = Vec::new();

    for selector_str in NAV_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for region in document.select(&selector) {
            let text = region.text().collect::<Vec<_>>().join(" ");
            for word in text.split(|c: char| !c.is_alphanumeric()) {
                let len = word.chars().count();
                if !(4..=19).contains(&len) {
                    continue;
                }
                let word = word.to_lowercase();
                if seen.insert(word.clone()) {
                    terms.push(word);
                    if terms.len() >= MAX_NAV_TERMS {
                        return terms;
                    }
                }
            }
        }
    }

    terms
}

/// 收集所有 JSON-LD 區塊中的 `@type`；無效 JSON 的區塊略過
fn extract_schema_types(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return Vec::new();
    };

    let mut types = BTreeSet::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::debug!("Skipping invalid JSON-LD block: {}", e),
        }
    }
    types.into_iter().collect()
}

fn collect_types(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => {
                    out.insert(t.clone());
                }
                Some(Value::Array(items)) => {
                    out.extend(items.iter().filter_map(|i| i.as_str().map(str::to_string)));
                }
                _ => {}
            }
            for (key, child) in map {
                if key != "@type" {
                    collect_types(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_types(item, out);
            }
        }
        _ => {}
    }
}

/// Visible body text, whitespace collapsed, capped at [`MAX_BODY_CHARS`].
fn extract_body_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut chunks: Vec<&str> = Vec::new();
    for node in body.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.value(),
                    Node::Element(el)
                        if matches!(el.name(), "script" | "style" | "noscript" | "template")
                )
            });
            if hidden {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed);
            }
        }
    }

    compact_ws(&chunks.join(" "))
        .chars()
        .take(MAX_BODY_CHARS)
        .collect()
}
