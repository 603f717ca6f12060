use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MathResult;
use crate::operation::{OperationKind, OperationRequest, OperationResult};

pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded query. `seq` grows with every insertion and is never reused,
/// even across `clear()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub operation: OperationKind,
    pub input: Value,
    pub output: Value,
}

impl HistoryEntry {
    pub fn new(seq: u64, request: &OperationRequest, result: &OperationResult) -> MathResult<Self> {
        Ok(Self {
            seq,
            timestamp: Utc::now(),
            endpoint: request.kind().endpoint().to_string(),
            operation: request.kind(),
            input: Value::Object(request.fields().clone()),
            output: serde_json::to_value(result)?,
        })
    }
}

/// Bounded, ordered log of successful queries.
pub trait HistoryStore: Send + Sync {
    /// Append an entry, evicting the oldest one when full. Returns its `seq`.
    fn record(&self, request: &OperationRequest, result: &OperationResult) -> MathResult<u64>;

    /// Up to `limit` most recent entries, oldest first. `None` means all.
    fn list(&self, limit: Option<usize>) -> MathResult<Vec<HistoryEntry>>;

    /// Remove every entry and return how many were removed.
    fn clear(&self) -> MathResult<usize>;

    fn count(&self) -> MathResult<usize>;
    fn capacity(&self) -> usize;
}
