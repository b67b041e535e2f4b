// triage-broker/src/memory.rs
// In-process broker used by tests and single-node development runs

use crate::error::{BrokerError, BrokerResult};
use crate::Broker;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// FIFO broker backed by process memory. Honors the same head-push /
/// tail-pop contract as the Redis broker and can simulate an outage via
/// [`MemoryBroker::set_available`].
pub struct MemoryBroker {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
    notify: Notify,
    available: AtomicBool,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            notify: Notify::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated broker availability
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> BrokerResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BrokerError::Unavailable("simulated outage".to_string()))
        }
    }

    fn try_pop(&self, key: &str) -> Option<String> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues.get_mut(key).and_then(VecDeque::pop_back)
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn push_left(&self, key: &str, value: &str) -> BrokerResult<()> {
        self.ensure_available()?;
        {
            let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
            queues
                .entry(key.to_string())
                .or_default()
                .push_front(value.to_string());
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn blocking_pop_right(
        &self,
        key: &str,
        timeout: Duration,
    ) -> BrokerResult<Option<String>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            self.ensure_available()?;
            if let Some(value) = self.try_pop(key) {
                return Ok(Some(value));
            }

            let notified = self.notify.notified();
            // re-check after registering the waiter so a push between the
            // pop attempt and `notified()` is not missed
            if let Some(value) = self.try_pop(key) {
                return Ok(Some(value));
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            if tokio::time::timeout(deadline - now, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn depth(&self, key: &str) -> BrokerResult<i64> {
        self.ensure_available()?;
        let queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        Ok(queues.get(key).map(VecDeque::len).unwrap_or(0) as i64)
    }
}
