//! Citation extraction from generated answers

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::passage::Passage;

static ARTICLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\barticles?\s+(\d+[a-z]?(?:[\s-]+(?:bis|ter|quater))?)\b").unwrap()
});

fn normalize(article: &str) -> String {
    article
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Article identifiers cited in `answer`, normalized and deduplicated, in order of first appearance
pub fn extract_citations(answer: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();

    ARTICLE_PATTERN
        .captures_iter(answer)
        .filter_map(|caps| caps.get(1))
        .map(|m| normalize(m.as_str()))
        .filter(|article| seen.insert(article.clone()))
        .collect()
}

/// Cited articles that match none of the supplied passages
pub fn unsupported_citations(answer: &str, passages: &[Passage]) -> Vec<String> {
    let known: BTreeSet<String> = passages
        .iter()
        .filter_map(|p| p.article_id.as_deref())
        .map(normalize)
        .collect();

    extract_citations(answer)
        .into_iter()
        .filter(|article| !known.contains(article))
        .collect()
}
