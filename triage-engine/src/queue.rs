// triage-engine/src/queue.rs
// Urgency priority queue with crash-safe disk snapshots
//
// Min-heap keyed on (neg_urgency, seq): the most urgent ticket surfaces
// first, and equal-urgency tickets leave in enqueue order. Every mutation
// rewrites the snapshot file via write-then-rename.

use crate::error::{EngineError, EngineResult};
use crate::ticket::Ticket;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One heap entry; total order on (neg_urgency, seq)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub neg_urgency: f64,
    pub seq: u64,
    pub ticket: Ticket,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.neg_urgency
            .total_cmp(&other.neg_urgency)
            .then(self.seq.cmp(&other.seq))
    }
}

/// On-disk snapshot schema
#[derive(Debug, Serialize, Deserialize)]
struct QueueSnapshot {
    ticket_counter: u64,
    tickets: Vec<QueueEntry>,
}

struct QueueState {
    heap: BinaryHeap<Reverse<QueueEntry>>,
    counter: u64,
}

/// Shared in-process priority queue. One mutex guards the heap and the seq
/// counter; every operation takes it.
pub struct TicketQueue {
    snapshot_path: PathBuf,
    state: Mutex<QueueState>,
}

impl TicketQueue {
    /// Open the queue, restoring the snapshot at `path` when one parses.
    /// A missing or corrupt snapshot starts the queue empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let snapshot_path = path.into();
        let state = match Self::load(&snapshot_path) {
            Some(snapshot) => {
                info!(
                    tickets = snapshot.tickets.len(),
                    path = %snapshot_path.display(),
                    "Restored queue snapshot"
                );
                QueueState {
                    // collect() re-heapifies the stored array
                    heap: snapshot.tickets.into_iter().map(Reverse).collect(),
                    counter: snapshot.ticket_counter,
                }
            }
            None => QueueState {
                heap: BinaryHeap::new(),
                counter: 0,
            },
        };
        Self {
            snapshot_path,
            state: Mutex::new(state),
        }
    }

    /// Push a ticket; assigns the next seq and snapshots. Returns the seq.
    pub fn enqueue(&self, ticket: Ticket) -> u64 {
        let mut state = self.state.lock();
        state.counter += 1;
        let seq = state.counter;
        state.heap.push(Reverse(QueueEntry {
            neg_urgency: -ticket.urgency,
            seq,
            ticket,
        }));
        self.persist(&state);
        seq
    }

    /// Pop the most urgent ticket and snapshot
    pub fn dequeue(&self) -> Option<Ticket> {
        let mut state = self.state.lock();
        let entry = state.heap.pop()?;
        self.persist(&state);
        Some(entry.0.ticket)
    }

    /// Key-sorted snapshot of up to `limit` tickets; the heap's physical
    /// order is left untouched
    pub fn peek(&self, limit: usize) -> Vec<Ticket> {
        let state = self.state.lock();
        let mut entries: Vec<&QueueEntry> = state.heap.iter().map(|r| &r.0).collect();
        entries.sort_by(|a, b| a.cmp(b));
        entries
            .into_iter()
            .take(limit)
            .map(|entry| entry.ticket.clone())
            .collect()
    }

    /// Current ticket count
    pub fn depth(&self) -> usize {
        self.state.lock().heap.len()
    }

    /// Rewrite the snapshot file; must run while holding the state lock.
    /// Failure is logged and the in-memory state stays authoritative.
    fn persist(&self, state: &QueueState) {
        let snapshot = QueueSnapshot {
            ticket_counter: state.counter,
            tickets: state.heap.iter().map(|r| r.0.clone()).collect(),
        };
        if let Err(err) = Self::write_snapshot(&self.snapshot_path, &snapshot) {
            warn!(
                error = %err,
                path = %self.snapshot_path.display(),
                "Queue snapshot write failed; continuing with in-memory state"
            );
        }
    }

    fn write_snapshot(path: &Path, snapshot: &QueueSnapshot) -> EngineResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| EngineError::Snapshot(err.to_string()))?;
        // Write-then-rename keeps the transition atomic on the filesystem
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn load(path: &Path) -> Option<QueueSnapshot> {
        let bytes = std::fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(
                    error = %err,
                    path = %path.display(),
                    "Corrupt queue snapshot; starting empty"
                );
                None
            }
        }
    }
}
