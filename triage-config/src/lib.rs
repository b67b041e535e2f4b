// triage-config: Configuration management
// TOML-based configuration with environment variable overrides

pub mod config;
pub mod taxonomy;

pub use config::{
    AgentSpec, AlertingSection, BrokerSection, ClassifierSection, ConfigError, ConfigResult,
    QueueSection, ServerSection, StormSection, TriageConfig,
};
