// triage-engine: Ticket triage domain logic
// Classification, urgency scoring, latency-bounded triage, priority queue with
// crash-safe snapshots, semantic storm detection, and skill-based assignment

pub mod agents;
pub mod assign;
pub mod breaker;
pub mod classify;
pub mod dedup;
pub mod embed;
pub mod error;
pub mod model;
pub mod queue;
pub mod ticket;
pub mod urgency;

pub use agents::{Agent, AgentRegistry, AgentStatus};
pub use assign::{route_tickets, Assignment};
pub use breaker::{TriageOutcome, TriagePipeline};
pub use classify::{KeywordClassifier, ModelClassifier};
pub use dedup::{StormConfig, StormDetector, StormVerdict};
pub use embed::{cosine, Embedder, HashEmbedder};
pub use error::{EngineError, EngineResult};
pub use model::{InferenceModel, LabelScore, Polarity, RemoteModel, SentimentScore};
pub use queue::{QueueEntry, TicketQueue};
pub use ticket::{Category, ModelUsed, Ticket};
pub use urgency::{is_high_urgency, KeywordScorer, SentimentScorer};
