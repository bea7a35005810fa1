//! Keyword-based content classification
//!
//! Rules are evaluated in table order and the first match wins, so a query
//! that hits both the code and creative keywords is classified as code.
//! Matching is plain substring containment on the lower-cased query.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category assigned to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Code,
    Creative,
    Analytical,
    Text,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language names that mark a query as code when they appear as whole words.
/// Boundaries are ASCII-only: CJK characters around a name still count as
/// a boundary.
static CODE_LANGUAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)(?:js|python|java|c\+\+|ruby|go)(?-u:\b)")
        .expect("code language pattern is valid")
});

/// A single classification rule
pub struct ClassificationRule {
    pub category: ContentCategory,
    pub keywords: &'static [&'static str],
    pub pattern: Option<&'static Lazy<Regex>>,
}

impl ClassificationRule {
    /// `folded` must already be lower-cased
    pub fn matches(&self, folded: &str) -> bool {
        self.keywords.iter().any(|keyword| folded.contains(keyword))
            || self.pattern.map_or(false, |pattern| pattern.is_match(folded))
    }
}

/// Ordered rule table. `Text` has no rule; it is the fallback.
pub static CLASSIFICATION_RULES: [ClassificationRule; 3] = [
    ClassificationRule {
        category: ContentCategory::Code,
        keywords: &["代码", "编程", "函数", "code", "function", "programming"],
        pattern: Some(&CODE_LANGUAGE_PATTERN),
    },
    ClassificationRule {
        category: ContentCategory::Creative,
        keywords: &["创意", "故事", "写作", "创作", "creative", "story", "imagin"],
        pattern: None,
    },
    ClassificationRule {
        category: ContentCategory::Analytical,
        keywords: &["分析", "比较", "评估", "report", "分析结果", "analyze", "analysis"],
        pattern: None,
    },
];

/// Classify a query; every query maps to exactly one category
pub fn classify(query: &str) -> ContentCategory {
    let folded = query.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matches(&folded))
        .map(|rule| rule.category)
        .unwrap_or(ContentCategory::Text)
}

/// Every category whose rule matches, in rule order
pub fn matching_categories(query: &str) -> Vec<ContentCategory> {
    let folded = query.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .filter(|rule| rule.matches(&folded))
        .map(|rule| rule.category)
        .collect()
}
