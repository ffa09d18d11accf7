//! Keyword-based category rules
//!
//! Used only for candidates whose statement carried no category.

use crate::config::KeywordRule;

#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    keywords: Vec<String>,
}

/// Case-insensitive substring matcher over configured keyword rules
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    rules: Vec<CompiledRule>,
}

impl KeywordClassifier {
    pub fn new(rules: &[KeywordRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                category: rule.category.clone(),
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Category of the first rule (in config order) with a keyword in `description`
    pub fn classify(&self, description: &str) -> Option<&str> {
        let description = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| description.contains(k.as_str())))
            .map(|rule| rule.category.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
