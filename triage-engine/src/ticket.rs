// triage-engine/src/ticket.rs
// Ticket record and the enums that travel with it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Technical,
    Legal,
    General,
}

impl Category {
    /// The three labels the zero-shot classifier scores against
    pub const REAL_LABELS: [&'static str; 3] = ["Billing", "Technical", "Legal"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Technical => "Technical",
            Category::Legal => "Legal",
            Category::General => "General",
        }
    }

    /// Case-insensitive lookup; unknown names map to None
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "billing" => Some(Category::Billing),
            "technical" => Some(Category::Technical),
            "legal" => Some(Category::Legal),
            "general" => Some(Category::General),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced the classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelUsed {
    Primary,
    Fallback,
}

/// A triaged support ticket; immutable after creation except the worker's
/// `processed` transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub text: String,
    pub category: Category,
    pub urgency: f64,
    pub is_high_urgency: bool,
    pub timestamp: DateTime<Utc>,
    pub model_used: ModelUsed,
    pub processed: bool,
}
