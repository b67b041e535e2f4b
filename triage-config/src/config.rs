// triage-config/src/config.rs
// Typed configuration record for the triage pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use thiserror::Error;

/// Config result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Triage pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub broker: BrokerSection,
    pub classifier: ClassifierSection,
    pub queue: QueueSection,
    pub storm: StormSection,
    pub alerting: AlertingSection,
    pub server: ServerSection,
    /// Agent roster; the built-in roster is used when empty
    pub agents: Vec<AgentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSection {
    pub host: String,
    pub port: u16,
    pub queue_key: String,
    /// Blocking pop timeout in the drain worker
    pub pop_timeout_s: u64,
    /// Backoff after a transient broker error in the drain worker
    pub retry_backoff_s: u64,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            queue_key: "ticket_queue".to_string(),
            pop_timeout_s: 2,
            retry_backoff_s: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Hard deadline on the primary classify+score step
    pub timeout_ms: u64,
    /// Bounded concurrency for primary model calls
    pub model_pool_size: usize,
    /// Below this zero-shot confidence the category falls back to General
    pub confidence_floor: f64,
    /// Remote inference endpoint; the keyword path runs alone when unset
    pub model_endpoint: Option<String>,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            model_pool_size: 4,
            confidence_floor: 0.25,
            model_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSection {
    pub snapshot_path: String,
    /// Upper clamp for peek/route limits
    pub peek_max: usize,
    pub high_urgency_threshold: f64,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            snapshot_path: "queue_store.json".to_string(),
            peek_max: 50,
            high_urgency_threshold: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StormSection {
    /// Cosine similarity above which two tickets count as near-duplicates
    pub similarity: f64,
    /// Sliding window length in seconds
    pub window_s: u64,
    /// Similar-ticket count at which a master incident fires
    pub threshold: usize,
    pub embed_dimension: usize,
}

impl Default for StormSection {
    fn default() -> Self {
        Self {
            similarity: 0.9,
            window_s: 300,
            threshold: 10,
            embed_dimension: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingSection {
    /// Absent URL disables delivery without failing the pipeline
    pub webhook_url: Option<String>,
    /// Individual alerts fire above this urgency
    pub webhook_threshold: f64,
    pub request_timeout_s: u64,
}

impl Default for AlertingSection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_threshold: 0.8,
            request_timeout_s: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Declarative agent entry, convertible into the live registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    pub name: String,
    /// Category name -> skill score in [0, 1]
    pub skills: BTreeMap<String, f64>,
    pub capacity: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            broker: BrokerSection::default(),
            classifier: ClassifierSection::default(),
            queue: QueueSection::default(),
            storm: StormSection::default(),
            alerting: AlertingSection::default(),
            server: ServerSection::default(),
            agents: Vec::new(),
        }
    }
}

impl TriageConfig {
    /// Load config from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Defaults layered with `TRIAGE_`-prefixed environment overrides
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `TRIAGE_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(host) = env::var("TRIAGE_BROKER_HOST") {
            self.broker.host = host;
        }
        if let Ok(port) = env::var("TRIAGE_BROKER_PORT") {
            self.broker.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TRIAGE_BROKER_PORT".to_string(),
                value: port,
            })?;
        }
        if let Ok(key) = env::var("TRIAGE_QUEUE_KEY") {
            self.broker.queue_key = key;
        }
        if let Ok(path) = env::var("TRIAGE_SNAPSHOT_PATH") {
            self.queue.snapshot_path = path;
        }
        if let Ok(addr) = env::var("TRIAGE_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Ok(url) = env::var("TRIAGE_WEBHOOK_URL") {
            self.alerting.webhook_url = Some(url);
        }
        if let Ok(endpoint) = env::var("TRIAGE_MODEL_ENDPOINT") {
            self.classifier.model_endpoint = Some(endpoint);
        }
        if let Ok(timeout) = env::var("TRIAGE_CLASSIFIER_TIMEOUT_MS") {
            self.classifier.timeout_ms =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TRIAGE_CLASSIFIER_TIMEOUT_MS".to_string(),
                    value: timeout,
                })?;
        }
        Ok(())
    }

    /// Configured roster, or the built-in one when the config lists no agents
    pub fn roster(&self) -> Vec<AgentSpec> {
        if self.agents.is_empty() {
            default_roster()
        } else {
            self.agents.clone()
        }
    }
}

/// Built-in agent roster
pub fn default_roster() -> Vec<AgentSpec> {
    fn skills(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    vec![
        AgentSpec {
            id: "A1".to_string(),
            name: "Agent X (Tech Lead)".to_string(),
            skills: skills(&[("Technical", 0.9), ("Billing", 0.1), ("Legal", 0.0)]),
            capacity: 2,
        },
        AgentSpec {
            id: "A2".to_string(),
            name: "Agent Y (Billing Pro)".to_string(),
            skills: skills(&[("Technical", 0.1), ("Billing", 0.9), ("Legal", 0.0)]),
            capacity: 3,
        },
        AgentSpec {
            id: "A3".to_string(),
            name: "Agent Z (Legal Eval)".to_string(),
            skills: skills(&[("Technical", 0.0), ("Billing", 0.2), ("Legal", 0.8)]),
            capacity: 2,
        },
        AgentSpec {
            id: "A4".to_string(),
            name: "Agent W (Generalist)".to_string(),
            skills: skills(&[("Technical", 0.4), ("Billing", 0.4), ("Legal", 0.4)]),
            capacity: 4,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn documented_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.broker.port, 6379);
        assert_eq!(config.broker.queue_key, "ticket_queue");
        assert_eq!(config.classifier.timeout_ms, 500);
        assert_eq!(config.classifier.model_pool_size, 4);
        assert_eq!(config.queue.peek_max, 50);
        assert!((config.queue.high_urgency_threshold - 0.75).abs() < f64::EPSILON);
        assert!((config.storm.similarity - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.storm.window_s, 300);
        assert_eq!(config.storm.threshold, 10);
        assert!((config.alerting.webhook_threshold - 0.8).abs() < f64::EPSILON);
        assert!(config.alerting.webhook_url.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[broker]\nhost = \"redis.internal\"\n\n[storm]\nthreshold = 5"
        )
        .unwrap();

        let config = TriageConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.broker.host, "redis.internal");
        assert_eq!(config.broker.port, 6379);
        assert_eq!(config.storm.threshold, 5);
        assert_eq!(config.storm.window_s, 300);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[broker\nhost =").unwrap();
        assert!(TriageConfig::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn roster_falls_back_to_builtin() {
        let config = TriageConfig::default();
        let roster = config.roster();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].id, "A1");
        assert_eq!(roster[3].capacity, 4);
    }

    #[test]
    fn configured_agents_win_over_builtin() {
        let mut config = TriageConfig::default();
        config.agents.push(AgentSpec {
            id: "Z9".to_string(),
            name: "Solo".to_string(),
            skills: BTreeMap::new(),
            capacity: 1,
        });
        let roster = config.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, "Z9");
    }
}
