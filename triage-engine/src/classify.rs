// triage-engine/src/classify.rs
// Category classification: keyword fallback and zero-shot model variants

use crate::error::EngineResult;
use crate::model::InferenceModel;
use crate::ticket::Category;
use std::sync::Arc;
use triage_config::taxonomy::{BILLING_KEYWORDS, LEGAL_KEYWORDS, TECHNICAL_KEYWORDS};

/// Keyword classifier: counts case-insensitive substring hits per category
/// set and returns the unique argmax
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Category {
        let lower = text.to_lowercase();
        let hits = |keywords: &[&str]| keywords.iter().filter(|kw| lower.contains(*kw)).count();

        let scored = [
            (Category::Billing, hits(BILLING_KEYWORDS)),
            (Category::Technical, hits(TECHNICAL_KEYWORDS)),
            (Category::Legal, hits(LEGAL_KEYWORDS)),
        ];

        let top = scored.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if top == 0 {
            return Category::General;
        }
        // A tie for the top count is ambiguous; hand it to General
        let mut leaders = scored
            .iter()
            .filter(|(_, n)| *n == top)
            .map(|(category, _)| *category);
        let category = leaders.next().unwrap_or(Category::General);
        if leaders.next().is_some() {
            Category::General
        } else {
            category
        }
    }
}

/// Zero-shot model classifier over the three real labels
pub struct ModelClassifier {
    model: Arc<dyn InferenceModel>,
    confidence_floor: f64,
}

impl ModelClassifier {
    pub fn new(model: Arc<dyn InferenceModel>, confidence_floor: f64) -> Self {
        Self {
            model,
            confidence_floor,
        }
    }

    pub async fn classify(&self, text: &str) -> EngineResult<Category> {
        let ranked = self.model.zero_shot(text, &Category::REAL_LABELS).await?;
        let top = match ranked.first() {
            Some(top) => top,
            None => return Ok(Category::General),
        };
        if top.score < self.confidence_floor {
            return Ok(Category::General);
        }
        Ok(Category::from_name(&top.label).unwrap_or(Category::General))
    }
}
