//! Per-block dwell counters

use crate::types::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monotonic dwell counters keyed by block
///
/// Entries are created lazily on first observation and never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DwellCounters {
    counts: BTreeMap<BlockId, u64>,
}

impl DwellCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for `id` by one and return the new count
    pub fn record(&mut self, id: &BlockId) -> u64 {
        let count = self.counts.entry(id.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count for `id` (zero if never observed)
    pub fn get(&self, id: &BlockId) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of blocks observed at least once
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, u64)> {
        self.counts.iter().map(|(id, c)| (id, *c))
    }
}
