//! Occasion keyword extraction.
//!
//! Maps free text onto the fixed occasion vocabulary used by the catalog's
//! `occasion` column. Matching is literal substring search: case-sensitive,
//! no normalization.

use std::collections::BTreeSet;

/// Canonical occasion tags and the substrings that trigger them.
pub const OCCASION_SYNONYMS: &[(&str, &[&str])] = &[
    ("約會", &["約會", "date", "浪漫", "晚餐"]),
    ("運動", &["運動", "sport", "健身", "跑步", "瑜珈"]),
    ("上班", &["上班", "辦公", "正式", "商務", "office"]),
    ("休閒", &["休閒", "逛街", "週末", "casual", "放鬆"]),
    ("派對", &["派對", "party", "聚會", "夜店"]),
    ("旅遊", &["旅遊", "旅行", "出遊", "travel"]),
];

/// Returns every occasion tag with at least one synonym occurring in `text`.
pub fn extract_keywords(text: &str) -> BTreeSet<&'static str> {
    OCCASION_SYNONYMS
        .iter()
        .filter(|(_, synonyms)| synonyms.iter().any(|s| text.contains(s)))
        .map(|(tag, _)| *tag)
        .collect()
}

/// The full tag vocabulary.
pub fn occasion_tags() -> impl Iterator<Item = &'static str> {
    OCCASION_SYNONYMS.iter().map(|(tag, _)| *tag)
}
