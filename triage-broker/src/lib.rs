// triage-broker: Durable FIFO broker contract
// The rendezvous between the ingress API and the drain worker: values are
// opaque JSON-encoded ticket records, pushed at the head and popped from the
// tail.

pub mod error;
pub mod memory;
pub mod redis;

pub use error::{BrokerError, BrokerResult};
pub use memory::MemoryBroker;
pub use self::redis::RedisBroker;

use async_trait::async_trait;
use std::time::Duration;

/// Blocking FIFO contract the pipeline requires from its broker
#[async_trait]
pub trait Broker: Send + Sync {
    /// Push a value onto the head of the list at `key`
    async fn push_left(&self, key: &str, value: &str) -> BrokerResult<()>;

    /// Pop from the tail of the list at `key`, waiting up to `timeout`.
    /// `None` means the timeout elapsed with nothing to pop.
    async fn blocking_pop_right(&self, key: &str, timeout: Duration)
        -> BrokerResult<Option<String>>;

    /// Number of values currently queued at `key`
    async fn depth(&self, key: &str) -> BrokerResult<i64>;
}
