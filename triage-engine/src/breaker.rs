// triage-engine/src/breaker.rs
// Latency breaker: runs the primary model path under a hard deadline and
// fails over to the keyword path on timeout or error

use crate::classify::{KeywordClassifier, ModelClassifier};
use crate::error::{EngineError, EngineResult};
use crate::model::InferenceModel;
use crate::ticket::{Category, ModelUsed};
use crate::urgency::{KeywordScorer, SentimentScorer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;
use triage_config::ClassifierSection;

/// Result of one triage invocation
#[derive(Debug, Clone, Copy)]
pub struct TriageOutcome {
    pub category: Category,
    pub urgency: f64,
    pub model_used: ModelUsed,
}

struct PrimaryPath {
    classifier: ModelClassifier,
    scorer: SentimentScorer,
}

/// Classify-and-score pipeline with bounded latency.
///
/// The primary path (zero-shot classifier + sentiment scorer) runs under a
/// permit from a bounded pool and a hard deadline; the keyword path takes
/// over whenever the primary misses the deadline or errors. State is per
/// invocation only.
pub struct TriagePipeline {
    primary: Option<PrimaryPath>,
    fallback_classifier: KeywordClassifier,
    fallback_scorer: KeywordScorer,
    deadline: Duration,
    pool: Arc<Semaphore>,
}

impl TriagePipeline {
    /// Build a pipeline; `model = None` runs the keyword path unconditionally
    pub fn new(model: Option<Arc<dyn InferenceModel>>, config: &ClassifierSection) -> Self {
        let primary = model.map(|model| PrimaryPath {
            classifier: ModelClassifier::new(Arc::clone(&model), config.confidence_floor),
            scorer: SentimentScorer::new(model),
        });
        Self {
            primary,
            fallback_classifier: KeywordClassifier::new(),
            fallback_scorer: KeywordScorer::new(),
            deadline: Duration::from_millis(config.timeout_ms),
            pool: Arc::new(Semaphore::new(config.model_pool_size.max(1))),
        }
    }

    /// Classify and score `text` within the configured deadline
    pub async fn triage(&self, text: &str) -> TriageOutcome {
        if let Some(primary) = &self.primary {
            match timeout(self.deadline, self.run_primary(primary, text)).await {
                Ok(Ok((category, urgency))) => {
                    return TriageOutcome {
                        category,
                        urgency,
                        model_used: ModelUsed::Primary,
                    };
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "Primary model failed, failing over to keyword path");
                }
                Err(_) => {
                    warn!(
                        deadline_ms = self.deadline.as_millis() as u64,
                        "Primary model missed the deadline, failing over to keyword path"
                    );
                }
            }
        }

        TriageOutcome {
            category: self.fallback_classifier.classify(text),
            urgency: self.fallback_scorer.score(text),
            model_used: ModelUsed::Fallback,
        }
    }

    async fn run_primary(
        &self,
        primary: &PrimaryPath,
        text: &str,
    ) -> EngineResult<(Category, f64)> {
        // The permit wait counts against the deadline; a saturated pool
        // degrades to the fallback instead of queueing without bound
        let _permit = self
            .pool
            .acquire()
            .await
            .map_err(|_| EngineError::Inference("model pool closed".to_string()))?;
        tokio::try_join!(primary.classifier.classify(text), primary.scorer.score(text))
    }
}
