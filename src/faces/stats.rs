//! Coherence statistics for the status bar.

use std::time::Duration;

/// Counters accumulated by the face image cache over one session.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoherenceStats {
    /// Keys whose version was bumped (one per key per invalidation).
    pub invalidated_keys: u64,

    /// Listener invocations across all fan-outs.
    pub notifications: u64,

    /// `invalidate_by_prefix` calls that matched nothing.
    pub empty_prefix_invalidations: u64,

    /// URLs handed to the runtime image loader.
    pub prefetch_requests: u64,

    /// Wall time of the most recent fan-out.
    pub last_fanout: Option<Duration>,
}

impl CoherenceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count keys whose version was just bumped.
    pub fn record_invalidated(&mut self, keys: usize) {
        self.invalidated_keys += keys as u64;
    }

    pub fn record_fanout(&mut self, listeners: usize, elapsed: Duration) {
        self.notifications += listeners as u64;
        self.last_fanout = Some(elapsed);
    }

    pub fn record_empty_prefix(&mut self) {
        self.empty_prefix_invalidations += 1;
    }

    pub fn record_prefetch(&mut self, issued: usize) {
        self.prefetch_requests += issued as u64;
    }

    /// Format the last fan-out time for display (e.g., "0.12 ms").
    pub fn format_last_fanout(&self) -> String {
        match self.last_fanout {
            Some(elapsed) => format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0),
            None => "-".to_string(),
        }
    }
}
