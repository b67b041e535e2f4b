// triage-server/src/alert.rs
// Webhook alert dispatch, gated by storm verdict and urgency

use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use triage_config::AlertingSection;
use triage_engine::{StormVerdict, Ticket};

/// Best-effort webhook alerter. Delivery failures are logged and never
/// retried; a missing webhook URL disables delivery entirely.
pub struct Alerter {
    client: reqwest::Client,
    webhook_url: Option<String>,
    webhook_threshold: f64,
}

impl Alerter {
    pub fn new(config: &AlertingSection) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_s))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            webhook_threshold: config.webhook_threshold,
        }
    }

    /// Route one processed ticket to the right alert, if any
    pub async fn dispatch(&self, ticket: &Ticket, verdict: StormVerdict) {
        match verdict {
            StormVerdict::Master => {
                error!(
                    ticket_id = %ticket.id,
                    "Master incident: ticket storm crossed the threshold"
                );
                self.post(master_message(ticket), "master incident").await;
            }
            StormVerdict::Suppress => {
                info!(
                    ticket_id = %ticket.id,
                    "Alert suppressed: ticket belongs to an active storm cluster"
                );
            }
            StormVerdict::Normal if ticket.urgency > self.webhook_threshold => {
                warn!(
                    ticket_id = %ticket.id,
                    urgency = ticket.urgency,
                    "High-urgency ticket, dispatching webhook"
                );
                self.post(individual_message(ticket), "high-urgency").await;
            }
            StormVerdict::Normal => {
                debug!(
                    ticket_id = %ticket.id,
                    urgency = ticket.urgency,
                    "Ticket below alert threshold"
                );
            }
        }
    }

    async fn post(&self, text: String, kind: &str) {
        let Some(url) = &self.webhook_url else {
            warn!(kind, "Webhook URL not configured, skipping alert");
            return;
        };

        let result = self
            .client
            .post(url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(response) => {
                info!(kind, status = %response.status(), "Webhook delivered");
            }
            Err(err) => {
                error!(kind, error = %err, "Webhook delivery failed");
            }
        }
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn individual_message(ticket: &Ticket) -> String {
    format!(
        "*HIGH-URGENCY TICKET* [ID: {}]\n\
         - Category : {}\n\
         - Urgency  : {:.2}\n\
         - Text     : {}",
        ticket.id,
        ticket.category,
        ticket.urgency,
        truncated(&ticket.text, 300)
    )
}

fn master_message(ticket: &Ticket) -> String {
    format!(
        "*MASTER INCIDENT: TICKET STORM DETECTED*\n\
         - Status : cluster of highly similar tickets crossed the storm threshold\n\
         - Cluster leader : {}\n\
         - Action : individual alerts are now suppressed for this storm",
        truncated(&ticket.text, 200)
    )
}
