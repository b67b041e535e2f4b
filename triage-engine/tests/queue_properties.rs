//! Property-based tests for the priority queue.
//!
//! Verifies the queue's ordering invariants:
//! - Every dequeue returns a ticket at least as urgent as everything left
//! - Equal-urgency tickets leave in enqueue (FIFO) order
//! - seq values are unique and the depth tracks enqueues minus dequeues
//! - A snapshot save/load round-trip reproduces the dequeue sequence

use proptest::prelude::*;
use triage_engine::{Category, ModelUsed, Ticket, TicketQueue};

fn ticket(id: usize, urgency: f64) -> Ticket {
    Ticket {
        id: format!("T{id}"),
        text: format!("generated ticket {id}"),
        category: Category::General,
        urgency,
        is_high_urgency: urgency > 0.75,
        timestamp: chrono::Utc::now(),
        model_used: ModelUsed::Fallback,
        processed: true,
    }
}

/// Urgencies drawn from a coarse grid so ties actually happen
fn arb_urgencies() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u8..=10).prop_map(|u| f64::from(u) / 10.0), 1..40)
}

/// Interleaved operations: true = enqueue, false = dequeue
fn arb_ops() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..80)
}

proptest! {
    #[test]
    fn dequeue_is_monotonically_non_increasing(urgencies in arb_urgencies()) {
        let dir = tempfile::tempdir().unwrap();
        let queue = TicketQueue::open(dir.path().join("q.json"));
        for (i, urgency) in urgencies.iter().enumerate() {
            queue.enqueue(ticket(i, *urgency));
        }

        let mut drained = Vec::new();
        while let Some(t) = queue.dequeue() {
            drained.push(t.urgency);
        }
        prop_assert_eq!(drained.len(), urgencies.len());
        for pair in drained.windows(2) {
            prop_assert!(pair[0] >= pair[1], "urgency order violated: {:?}", pair);
        }
    }

    #[test]
    fn equal_urgency_preserves_fifo(count in 2usize..30) {
        let dir = tempfile::tempdir().unwrap();
        let queue = TicketQueue::open(dir.path().join("q.json"));
        for i in 0..count {
            queue.enqueue(ticket(i, 0.5));
        }
        for i in 0..count {
            prop_assert_eq!(queue.dequeue().unwrap().id, format!("T{i}"));
        }
    }

    #[test]
    fn depth_tracks_enqueues_minus_dequeues(ops in arb_ops()) {
        let dir = tempfile::tempdir().unwrap();
        let queue = TicketQueue::open(dir.path().join("q.json"));
        let mut expected: usize = 0;
        let mut enqueued: usize = 0;

        for op in ops {
            if op {
                queue.enqueue(ticket(enqueued, (enqueued % 10) as f64 / 10.0));
                enqueued += 1;
                expected += 1;
            } else if queue.dequeue().is_some() {
                expected -= 1;
            }
            prop_assert_eq!(queue.depth(), expected);
        }
    }

    #[test]
    fn snapshot_round_trip_reproduces_dequeue_order(urgencies in arb_urgencies()) {
        let dir = tempfile::tempdir().unwrap();
        let original_path = dir.path().join("original.json");
        let copy_path = dir.path().join("copy.json");

        let original = TicketQueue::open(&original_path);
        for (i, urgency) in urgencies.iter().enumerate() {
            original.enqueue(ticket(i, *urgency));
        }

        // the snapshot alone must reconstruct an equivalent queue
        std::fs::copy(&original_path, &copy_path).unwrap();
        let restored = TicketQueue::open(&copy_path);

        loop {
            match (original.dequeue(), restored.dequeue()) {
                (Some(a), Some(b)) => prop_assert_eq!(a.id, b.id),
                (None, None) => break,
                (a, b) => prop_assert!(false, "queues diverged: {:?} vs {:?}", a, b),
            }
        }
    }

    #[test]
    fn peek_agrees_with_dequeue_prefix(urgencies in arb_urgencies()) {
        let dir = tempfile::tempdir().unwrap();
        let queue = TicketQueue::open(dir.path().join("q.json"));
        for (i, urgency) in urgencies.iter().enumerate() {
            queue.enqueue(ticket(i, *urgency));
        }

        let peeked: Vec<String> = queue.peek(5).into_iter().map(|t| t.id).collect();
        let mut popped = Vec::new();
        for _ in 0..peeked.len() {
            popped.push(queue.dequeue().unwrap().id);
        }
        prop_assert_eq!(peeked, popped);
    }
}
