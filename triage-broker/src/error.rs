// triage-broker: Error types

use thiserror::Error;

/// Broker result type
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Broker error types
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Broker connection error: {0}")]
    Connection(String),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),
}

impl From<::redis::RedisError> for BrokerError {
    fn from(err: ::redis::RedisError) -> Self {
        BrokerError::Connection(err.to_string())
    }
}
