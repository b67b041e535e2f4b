// triage-server/src/rest_api.rs
// Ingress REST API for the triage pipeline

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use triage_broker::Broker;
use triage_config::TriageConfig;
use triage_engine::{
    is_high_urgency, route_tickets, AgentRegistry, AgentStatus, Assignment, Category, Ticket,
    TicketQueue, TriagePipeline,
};

/// Broker depth sentinel reported when the broker is unreachable
const BROKER_DOWN_DEPTH: i64 = -1;

/// Default number of tickets returned by queue views
const DEFAULT_VIEW_LIMIT: usize = 10;

/// Services the handler layer operates on, constructed once at startup
pub struct AppState {
    pub config: TriageConfig,
    pub pipeline: TriagePipeline,
    pub broker: Arc<dyn Broker>,
    pub queue: Arc<TicketQueue>,
    pub registry: Arc<AgentRegistry>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub broker_depth: i64,
    pub pq_depth: usize,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    pub ticket_id: String,
    pub category: Category,
    pub is_high_urgency: bool,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub pq_depth: usize,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub status: String,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// REST API server
pub struct RestApi {
    state: Arc<AppState>,
}

impl RestApi {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Create the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(Self::index))
            .route("/health", get(Self::health))
            .route("/ticket", post(Self::submit_ticket))
            .route("/queue", get(Self::view_queue))
            .route("/ticket/next", get(Self::next_ticket))
            .route("/route", post(Self::route_queue))
            .route("/agents", get(Self::agents))
            .with_state(Arc::clone(&self.state))
    }

    /// Service info and endpoint listing
    async fn index() -> Json<Value> {
        Json(json!({
            "message": "Support ticket triage API",
            "endpoints": {
                "health": "GET /health",
                "submit_ticket": "POST /ticket",
                "view_queue": "GET /queue",
                "next_ticket": "GET /ticket/next",
                "route_assignments": "POST /route",
                "agent_status": "GET /agents",
            },
        }))
    }

    /// Broker-side and priority-queue depths
    async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
        let broker_depth = match state.broker.depth(&state.config.broker.queue_key).await {
            Ok(depth) => depth,
            Err(err) => {
                error!(error = %err, "Broker depth check failed");
                BROKER_DOWN_DEPTH
            }
        };
        Json(HealthResponse {
            status: "ok".to_string(),
            broker_depth,
            pq_depth: state.queue.depth(),
        })
    }

    /// Validate, triage under the latency breaker, and stage to the broker.
    /// Never blocks on the priority queue.
    async fn submit_ticket(
        State(state): State<Arc<AppState>>,
        Json(body): Json<Value>,
    ) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
        let (id, text) = match (
            body.get("id").and_then(Value::as_str),
            body.get("text").and_then(Value::as_str),
        ) {
            (Some(id), Some(text)) => (id.to_string(), text.to_string()),
            _ => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Both 'id' and 'text' fields are required",
                ));
            }
        };
        if text.trim().is_empty() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "'text' must not be empty",
            ));
        }

        let outcome = state.pipeline.triage(&text).await;
        let ticket = Ticket {
            id,
            text,
            category: outcome.category,
            urgency: outcome.urgency,
            is_high_urgency: is_high_urgency(
                outcome.urgency,
                state.config.queue.high_urgency_threshold,
            ),
            timestamp: Utc::now(),
            model_used: outcome.model_used,
            processed: false,
        };

        let record = serde_json::to_string(&ticket).map_err(|err| {
            error!(error = %err, "Ticket serialization failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error")
        })?;

        state
            .broker
            .push_left(&state.config.broker.queue_key, &record)
            .await
            .map_err(|err| {
                error!(error = %err, ticket_id = %ticket.id, "Broker push failed");
                api_error(StatusCode::SERVICE_UNAVAILABLE, "Broker unavailable")
            })?;

        Ok((
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                status: "accepted".to_string(),
                ticket_id: ticket.id,
                category: ticket.category,
                is_high_urgency: ticket.is_high_urgency,
            }),
        ))
    }

    /// Urgency-sorted snapshot of the priority queue, without mutation
    async fn view_queue(
        State(state): State<Arc<AppState>>,
        Query(params): Query<LimitParams>,
    ) -> Json<QueueResponse> {
        let limit = clamp_limit(params.limit, state.config.queue.peek_max);
        Json(QueueResponse {
            pq_depth: state.queue.depth(),
            tickets: state.queue.peek(limit),
        })
    }

    /// Pop the single most urgent ticket
    async fn next_ticket(
        State(state): State<Arc<AppState>>,
    ) -> Result<Json<Ticket>, ApiError> {
        state
            .queue
            .dequeue()
            .map(Json)
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Queue is empty"))
    }

    /// Solve the assignment plan over the top of the queue. Visualization
    /// only: tickets stay queued.
    async fn route_queue(
        State(state): State<Arc<AppState>>,
        Query(params): Query<LimitParams>,
    ) -> Json<RouteResponse> {
        let limit = clamp_limit(params.limit, state.config.queue.peek_max);
        let tickets = state.queue.peek(limit);
        let assignments = route_tickets(&state.registry, &tickets);
        Json(RouteResponse {
            status: "resolved".to_string(),
            assignments,
        })
    }

    /// Roster with live capacity and load
    async fn agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentStatus>> {
        Json(state.registry.status())
    }
}

fn clamp_limit(requested: Option<usize>, peek_max: usize) -> usize {
    requested.unwrap_or(DEFAULT_VIEW_LIMIT).clamp(1, peek_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamps_into_range() {
        assert_eq!(clamp_limit(None, 50), 10);
        assert_eq!(clamp_limit(Some(0), 50), 1);
        assert_eq!(clamp_limit(Some(25), 50), 25);
        assert_eq!(clamp_limit(Some(500), 50), 50);
    }
}
