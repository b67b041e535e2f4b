// triage-broker/src/redis.rs
// Redis-backed broker: LPUSH / BRPOP / LLEN over a reconnecting manager

use crate::error::BrokerResult;
use crate::Broker;
use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use async_trait::async_trait;
use std::time::Duration;

/// Redis list broker. The connection manager re-establishes dropped
/// connections; individual command failures surface as `BrokerError`.
#[derive(Clone)]
pub struct RedisBroker {
    manager: ConnectionManager,
}

impl RedisBroker {
    pub async fn connect(host: &str, port: u16) -> BrokerResult<Self> {
        let client = ::redis::Client::open(format!("redis://{host}:{port}/"))?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn push_left(&self, key: &str, value: &str) -> BrokerResult<()> {
        let mut conn = self.manager.clone();
        let _: i64 = conn.lpush(key, value).await?;
        Ok(())
    }

    async fn blocking_pop_right(
        &self,
        key: &str,
        timeout: Duration,
    ) -> BrokerResult<Option<String>> {
        let mut conn = self.manager.clone();
        // BRPOP returns (key, value) or nil on timeout
        let popped: Option<(String, String)> = conn.brpop(key, timeout.as_secs_f64()).await?;
        Ok(popped.map(|(_, value)| value))
    }

    async fn depth(&self, key: &str) -> BrokerResult<i64> {
        let mut conn = self.manager.clone();
        Ok(conn.llen(key).await?)
    }
}
