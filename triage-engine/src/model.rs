// triage-engine/src/model.rs
// Opaque inference model contract and the remote HTTP implementation

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentiment polarity as reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// One zero-shot label with its confidence
#[derive(Debug, Clone)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Sentiment verdict with model confidence
#[derive(Debug, Clone, Copy)]
pub struct SentimentScore {
    pub polarity: Polarity,
    pub score: f64,
}

/// Opaque model seam: zero-shot classification and sentiment analysis.
/// Implementations may call out to an inference service or run in-process.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Score `text` against `labels`; results come back sorted by descending
    /// confidence
    async fn zero_shot(&self, text: &str, labels: &[&str]) -> EngineResult<Vec<LabelScore>>;

    /// Sentiment polarity and confidence for `text`
    async fn sentiment(&self, text: &str) -> EngineResult<SentimentScore>;
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    text: &'a str,
    labels: &'a [&'a str],
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Serialize)]
struct SentimentRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SentimentResponse {
    label: Polarity,
    score: f64,
}

/// JSON client for a remote inference service exposing `/classify` and
/// `/sentiment`
pub struct RemoteModel {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteModel {
    pub fn new(endpoint: String) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl InferenceModel for RemoteModel {
    async fn zero_shot(&self, text: &str, labels: &[&str]) -> EngineResult<Vec<LabelScore>> {
        let response: ZeroShotResponse = self
            .client
            .post(format!("{}/classify", self.endpoint))
            .json(&ZeroShotRequest { text, labels })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.labels.len() != response.scores.len() {
            return Err(EngineError::Inference(format!(
                "label/score length mismatch: {} vs {}",
                response.labels.len(),
                response.scores.len()
            )));
        }

        let mut ranked: Vec<LabelScore> = response
            .labels
            .into_iter()
            .zip(response.scores)
            .map(|(label, score)| LabelScore { label, score })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }

    async fn sentiment(&self, text: &str) -> EngineResult<SentimentScore> {
        let response: SentimentResponse = self
            .client
            .post(format!("{}/sentiment", self.endpoint))
            .json(&SentimentRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(SentimentScore {
            polarity: response.label,
            score: response.score,
        })
    }
}
