// triage-engine/src/urgency.rs
// Urgency scoring: keyword fallback and sentiment model variants

use crate::error::EngineResult;
use crate::model::{InferenceModel, Polarity};
use std::sync::Arc;
use triage_config::taxonomy::URGENCY_FLAGS;

/// Base score every ticket starts from on the keyword path
const BASE_SCORE: f64 = 0.1;
/// Increment per matched urgency phrase
const FLAG_WEIGHT: f64 = 0.2;
/// Neutral sentiment contributes 0.45x its confidence
const NEUTRAL_COEFFICIENT: f64 = 0.45;

/// `urgency > threshold` marks a ticket high-urgency
pub fn is_high_urgency(urgency: f64, threshold: f64) -> bool {
    urgency > threshold
}

/// Keyword urgency scorer: base 0.1 plus 0.2 per matched phrase, clamped to 1.0
#[derive(Debug, Clone, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let matched = URGENCY_FLAGS
            .iter()
            .filter(|flag| lower.contains(*flag))
            .count();
        (BASE_SCORE + FLAG_WEIGHT * matched as f64).min(1.0)
    }
}

/// Sentiment urgency scorer: negative sentiment reads as urgent, positive as
/// calm, neutral lands mid-range
pub struct SentimentScorer {
    model: Arc<dyn InferenceModel>,
}

impl SentimentScorer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    pub async fn score(&self, text: &str) -> EngineResult<f64> {
        let sentiment = self.model.sentiment(text).await?;
        let urgency = match sentiment.polarity {
            Polarity::Positive => 1.0 - sentiment.score,
            Polarity::Negative => sentiment.score,
            Polarity::Neutral => NEUTRAL_COEFFICIENT * sentiment.score,
        };
        Ok(urgency.clamp(0.0, 1.0))
    }
}
