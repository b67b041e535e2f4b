// triage-server/src/worker.rs
// Drain worker: moves tickets from the broker FIFO into the priority queue,
// consulting the storm detector and dispatching alerts along the way

use crate::alert::Alerter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use triage_broker::{Broker, BrokerError};
use triage_config::BrokerSection;
use triage_engine::{StormDetector, StormVerdict, Ticket, TicketQueue};

/// Single process-wide drain loop. Semantics are at-least-once: a crash
/// between pop and enqueue loses that record.
pub struct DrainWorker {
    broker: Arc<dyn Broker>,
    queue: Arc<TicketQueue>,
    storm: Arc<StormDetector>,
    alerter: Arc<Alerter>,
    queue_key: String,
    pop_timeout: Duration,
    retry_backoff: Duration,
}

impl DrainWorker {
    pub fn new(
        broker: Arc<dyn Broker>,
        queue: Arc<TicketQueue>,
        storm: Arc<StormDetector>,
        alerter: Arc<Alerter>,
        config: &BrokerSection,
    ) -> Self {
        Self {
            broker,
            queue,
            storm,
            alerter,
            queue_key: config.queue_key.clone(),
            pop_timeout: Duration::from_secs(config.pop_timeout_s),
            retry_backoff: Duration::from_secs(config.retry_backoff_s),
        }
    }

    /// Run forever. A bad record never wedges the loop: parse failures are
    /// skipped and broker errors retried after a short backoff.
    pub async fn run(self) {
        info!(queue_key = %self.queue_key, "Drain worker started");
        loop {
            match self
                .broker
                .blocking_pop_right(&self.queue_key, self.pop_timeout)
                .await
            {
                Ok(Some(raw)) => match serde_json::from_str::<Ticket>(&raw) {
                    Ok(ticket) => {
                        self.process(ticket).await;
                    }
                    Err(err) => {
                        error!(error = %err, "Malformed ticket record, skipping");
                    }
                },
                Ok(None) => {
                    // pop timed out with nothing queued
                    continue;
                }
                Err(err) => {
                    self.log_broker_error(&err);
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }
    }

    /// Hand one popped ticket through storm detection, the priority queue,
    /// and alerting. Enqueueing is unconditional: the queue tracks work to
    /// do, not alerts to send.
    pub async fn process(&self, mut ticket: Ticket) -> StormVerdict {
        ticket.processed = true;

        let verdict = self.storm.check(&ticket.text);
        self.queue.enqueue(ticket.clone());

        info!(
            ticket_id = %ticket.id,
            category = %ticket.category,
            urgency = ticket.urgency,
            verdict = ?verdict,
            "Ticket enqueued"
        );

        self.alerter.dispatch(&ticket, verdict).await;
        verdict
    }

    fn log_broker_error(&self, err: &BrokerError) {
        error!(
            error = %err,
            backoff_s = self.retry_backoff.as_secs(),
            "Broker error in drain worker, retrying after backoff"
        );
    }
}
