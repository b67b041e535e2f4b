// triage-server: shared test harness
// Spins up the REST API on an ephemeral port over an in-memory broker
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use triage_broker::{Broker, MemoryBroker};
use triage_config::TriageConfig;
use triage_engine::{
    AgentRegistry, Embedder, HashEmbedder, InferenceModel, StormConfig, StormDetector,
    TicketQueue, TriagePipeline,
};
use triage_server::{Alerter, AppState, DrainWorker, RestApi};

pub struct TestApp {
    pub base_url: String,
    pub broker: Arc<MemoryBroker>,
    pub state: Arc<AppState>,
    pub storm: Arc<StormDetector>,
    pub alerter: Arc<Alerter>,
    _snapshot_dir: tempfile::TempDir,
}

impl TestApp {
    /// Start the drain worker, mirroring the production wiring
    pub fn start_worker(&self) {
        let worker = DrainWorker::new(
            Arc::clone(&self.state.broker),
            Arc::clone(&self.state.queue),
            Arc::clone(&self.storm),
            Arc::clone(&self.alerter),
            &self.state.config.broker,
        );
        tokio::spawn(worker.run());
    }

    /// Poll until the priority queue reaches `depth` or the deadline passes
    pub async fn wait_for_queue_depth(&self, depth: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.queue.depth() < depth {
            assert!(
                tokio::time::Instant::now() < deadline,
                "queue never reached depth {depth}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_model(None).await
}

pub async fn spawn_app_with_model(model: Option<Arc<dyn InferenceModel>>) -> TestApp {
    let snapshot_dir = tempfile::tempdir().expect("tempdir");
    let mut config = TriageConfig::default();
    config.queue.snapshot_path = snapshot_dir
        .path()
        .join("queue_store.json")
        .to_string_lossy()
        .into_owned();

    let broker = Arc::new(MemoryBroker::new());
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(config.storm.embed_dimension));
    let storm = Arc::new(StormDetector::new(
        embedder,
        StormConfig {
            similarity: config.storm.similarity as f32,
            window: Duration::from_secs(config.storm.window_s),
            threshold: config.storm.threshold,
        },
    ));
    let alerter = Arc::new(Alerter::new(&config.alerting));

    let pipeline = TriagePipeline::new(model, &config.classifier);
    let queue = Arc::new(TicketQueue::open(&config.queue.snapshot_path));
    let registry = Arc::new(AgentRegistry::from_specs(config.roster()));

    let state = Arc::new(AppState {
        config,
        pipeline,
        broker: Arc::clone(&broker) as Arc<dyn Broker>,
        queue,
        registry,
    });

    let app = RestApi::new(Arc::clone(&state)).router();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        broker,
        state,
        storm,
        alerter,
        _snapshot_dir: snapshot_dir,
    }
}
