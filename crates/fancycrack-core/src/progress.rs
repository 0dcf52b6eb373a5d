//! Live search progress

use std::collections::VecDeque;
use std::time::Instant;

use fancycrack_keyspace::{format_count, KeyspaceSize};
use serde::{Deserialize, Serialize};

/// Default number of recent candidates kept for progress snapshots
pub const RECENT_CAPACITY: usize = 50;

/// Fixed-capacity buffer of the most recent candidates, oldest first
#[derive(Debug, Clone)]
pub struct RecentRing {
    items: VecDeque<String>,
    capacity: usize,
}

impl RecentRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, candidate: &str) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(candidate.to_string());
    }

    /// Owned copy of the current contents
    pub fn snapshot(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Progress emitted at every batch boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Candidates tried so far in this run
    pub tried: u64,
    /// Throughput since the previous sample; 0 when the interval was empty
    pub per_second: f64,
    /// Most recent candidates, oldest first
    pub recent: Vec<String>,
}

impl ProgressSample {
    /// Throughput, or `None` when consumers should keep their last value
    pub fn rate(&self) -> Option<f64> {
        (self.per_second.is_finite() && self.per_second > 0.0).then_some(self.per_second)
    }

    /// Get formatted progress string
    pub fn format(&self, total: KeyspaceSize) -> String {
        let pct = total
            .percent(self.tried)
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "?%".to_string());
        let rate = self
            .rate()
            .map(|r| format!("{} c/s", format_count(r as u128)))
            .unwrap_or_else(|| "- c/s".to_string());
        let eta = self
            .rate()
            .map(|r| total.eta(self.tried, r))
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "[{}][Tried {}][{}][ETA {}]",
            pct,
            format_count(self.tried as u128),
            rate,
            eta
        )
    }
}

/// Per-run mutable state, owned by a single search
#[derive(Debug)]
pub(crate) struct SearchState {
    pub tried: u64,
    pub recent: RecentRing,
    last_report: Instant,
    last_report_tried: u64,
}

impl SearchState {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            tried: 0,
            recent: RecentRing::new(recent_capacity),
            last_report: Instant::now(),
            last_report_tried: 0,
        }
    }

    /// Record one attempted candidate
    pub fn record(&mut self, candidate: &str) {
        self.tried += 1;
        self.recent.push(candidate);
    }

    /// Build a sample and reset the throughput window
    pub fn sample(&mut self) -> ProgressSample {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_report).as_secs_f64();
        let per_second = if elapsed > 0.0 {
            (self.tried - self.last_report_tried) as f64 / elapsed
        } else {
            0.0
        };
        self.last_report = now;
        self.last_report_tried = self.tried;

        ProgressSample {
            tried: self.tried,
            per_second,
            recent: self.recent.snapshot(),
        }
    }
}
