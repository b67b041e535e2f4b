// triage-server: Triage pipeline service
// Wires the ingress REST API, the broker drain worker, and webhook alerting
// around the engine's queue, storm detector, and agent registry

pub mod alert;
pub mod rest_api;
pub mod worker;

pub use alert::Alerter;
pub use rest_api::{AppState, RestApi};
pub use worker::DrainWorker;

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use triage_broker::{Broker, RedisBroker};
use triage_config::TriageConfig;
use triage_engine::{
    AgentRegistry, Embedder, HashEmbedder, InferenceModel, RemoteModel, StormConfig,
    StormDetector, TicketQueue, TriagePipeline,
};

/// Build every service from `config`, start the drain worker, and serve the
/// REST API. Blocks until the server stops.
pub async fn run(config: TriageConfig) -> Result<(), Box<dyn std::error::Error>> {
    let queue = Arc::new(TicketQueue::open(&config.queue.snapshot_path));

    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(config.storm.embed_dimension));
    let storm = Arc::new(StormDetector::new(
        embedder,
        StormConfig {
            similarity: config.storm.similarity as f32,
            window: Duration::from_secs(config.storm.window_s),
            threshold: config.storm.threshold,
        },
    ));

    let registry = Arc::new(AgentRegistry::from_specs(config.roster()));

    let model: Option<Arc<dyn InferenceModel>> = match &config.classifier.model_endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "Primary model: remote inference");
            Some(Arc::new(RemoteModel::new(endpoint.clone())?))
        }
        None => {
            info!("No model endpoint configured; running the keyword path only");
            None
        }
    };
    let pipeline = TriagePipeline::new(model, &config.classifier);

    let broker: Arc<dyn Broker> = Arc::new(
        RedisBroker::connect(&config.broker.host, config.broker.port).await?,
    );
    info!(
        host = %config.broker.host,
        port = config.broker.port,
        "Connected to broker"
    );

    let alerter = Arc::new(Alerter::new(&config.alerting));
    let worker = DrainWorker::new(
        Arc::clone(&broker),
        Arc::clone(&queue),
        Arc::clone(&storm),
        alerter,
        &config.broker,
    );
    tokio::spawn(worker.run());

    let bind_address = config.server.bind_address.clone();
    let state = Arc::new(AppState {
        config,
        pipeline,
        broker,
        queue,
        registry,
    });
    let app = RestApi::new(state).router();

    let listener = TcpListener::bind(&bind_address).await?;
    info!("REST API listening on http://{}", bind_address);
    axum::serve(listener, app).await?;
    Ok(())
}
