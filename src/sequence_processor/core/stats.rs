use serde::Serialize;

/// Per-worker record counters, summed once the pool has drained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub chunks: u64,
    pub processed: u64,
    pub passed: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub plugin_failures: u64,
}

impl ProcessingStats {
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.chunks += other.chunks;
        self.processed += other.processed;
        self.passed += other.passed;
        self.rejected += other.rejected;
        self.malformed += other.malformed;
        self.plugin_failures += other.plugin_failures;
    }
}
