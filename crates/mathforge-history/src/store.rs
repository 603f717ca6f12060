use std::collections::VecDeque;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use mathforge_core::{
    HistoryEntry, HistoryStore, MathResult, OperationRequest, OperationResult, DEFAULT_CAPACITY,
};

struct Inner {
    entries: VecDeque<HistoryEntry>,
    next_seq: u64,
}

/// Fixed-capacity FIFO log of queries.
///
/// A single mutex guards both the entries and the sequence counter, so
/// concurrent `record`/`clear` calls are serialized: `seq` order always
/// matches storage order and the length never exceeds `capacity`.
pub struct RingHistory {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl RingHistory {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity),
                next_seq: 0,
            }),
            capacity,
        }
    }
}

impl Default for RingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore for RingHistory {
    fn record(&self, request: &OperationRequest, result: &OperationResult) -> MathResult<u64> {
        // Serialize outside the lock; only sequencing happens under it.
        let mut entry = HistoryEntry::new(0, request, result)?;

        let mut inner = self.inner.lock();
        inner.next_seq += 1;
        entry.seq = inner.next_seq;
        entry.timestamp = Utc::now();

        if inner.entries.len() >= self.capacity {
            if let Some(evicted) = inner.entries.pop_front() {
                debug!(seq = evicted.seq, "history full, evicted oldest entry");
            }
        }
        inner.entries.push_back(entry);
        Ok(inner.next_seq)
    }

    fn list(&self, limit: Option<usize>) -> MathResult<Vec<HistoryEntry>> {
        let inner = self.inner.lock();
        let len = inner.entries.len();
        let take = limit.unwrap_or(len).min(len);
        Ok(inner.entries.iter().skip(len - take).cloned().collect())
    }

    fn clear(&self) -> MathResult<usize> {
        let mut inner = self.inner.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        info!(removed, "history cleared");
        Ok(removed)
    }

    fn count(&self) -> MathResult<usize> {
        Ok(self.inner.lock().entries.len())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathforge_core::OperationKind;
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn make_request(a: i64) -> OperationRequest {
        OperationRequest::from_json(OperationKind::Add, json!({"operation": "add", "a": a, "b": 1}))
            .unwrap()
    }

    fn make_result(a: i64) -> OperationResult {
        OperationResult::new(OperationKind::Add, Map::new(), json!(a + 1), None)
    }

    fn record_n(store: &RingHistory, range: std::ops::Range<i64>) {
        for i in range {
            store.record(&make_request(i), &make_result(i)).unwrap();
        }
    }

    fn inputs(entries: &[HistoryEntry]) -> Vec<i64> {
        entries
            .iter()
            .map(|e| e.input["a"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_record_and_list() {
        let store = RingHistory::new(10);
        let seq = store.record(&make_request(15), &make_result(15)).unwrap();
        assert_eq!(seq, 1);

        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].endpoint, "/api/arithmetic");
        assert_eq!(entries[0].operation, OperationKind::Add);
        assert_eq!(entries[0].output["result"], json!(16));
    }

    #[test]
    fn test_eviction_is_fifo() {
        let store = RingHistory::new(5);
        record_n(&store, 0..8);

        assert_eq!(store.count().unwrap(), 5);
        let entries = store.list(None).unwrap();
        assert_eq!(inputs(&entries), vec![3, 4, 5, 6, 7]);
        let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_list_limit_returns_most_recent_chronologically() {
        let store = RingHistory::new(100);
        record_n(&store, 0..10);

        assert_eq!(inputs(&store.list(Some(3)).unwrap()), vec![7, 8, 9]);
        assert!(store.list(Some(0)).unwrap().is_empty());
        assert_eq!(store.list(Some(50)).unwrap().len(), 10);
        // listing does not consume anything
        assert_eq!(store.count().unwrap(), 10);
    }

    #[test]
    fn test_clear() {
        let store = RingHistory::new(100);
        record_n(&store, 0..4);
        assert_eq!(store.clear().unwrap(), 4);
        assert!(store.list(None).unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);

        // sequence keeps counting after a clear
        let seq = store.record(&make_request(1), &make_result(1)).unwrap();
        assert_eq!(seq, 5);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let store = RingHistory::new(0);
        assert_eq!(store.capacity(), 1);
        record_n(&store, 0..3);
        assert_eq!(inputs(&store.list(None).unwrap()), vec![2]);
    }

    #[test]
    fn test_default_capacity() {
        let store = RingHistory::default();
        assert_eq!(store.capacity(), DEFAULT_CAPACITY);
        record_n(&store, 0..(DEFAULT_CAPACITY as i64 + 7));
        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), DEFAULT_CAPACITY);
        assert_eq!(entries[0].input["a"], json!(7));
    }

    #[test]
    fn test_concurrent_records_keep_order_and_bound() {
        let store = Arc::new(RingHistory::new(100));
        std::thread::scope(|s| {
            for t in 0..8 {
                let store = Arc::clone(&store);
                s.spawn(move || record_n(&store, (t * 50)..(t * 50 + 50)));
            }
        });

        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 100);
        assert!(entries.windows(2).all(|w| w[0].seq + 1 == w[1].seq));
        assert_eq!(entries.last().unwrap().seq, 400);
    }

    #[test]
    fn test_clear_racing_records_leaves_consistent_state() {
        let store = Arc::new(RingHistory::new(50));
        std::thread::scope(|s| {
            let writer = Arc::clone(&store);
            s.spawn(move || record_n(&writer, 0..200));
            let clearer = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..20 {
                    clearer.clear().unwrap();
                }
            });
        });

        let entries = store.list(None).unwrap();
        assert!(entries.len() <= 50);
        assert!(entries.windows(2).all(|w| w[0].seq < w[1].seq));
    }
}
