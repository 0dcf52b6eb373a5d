//! Keyspace size estimation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of candidates in a keyspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyspaceSize {
    Exact(u128),
    /// The count does not fit in 128 bits
    Saturated,
}

impl KeyspaceSize {
    pub fn exact(&self) -> Option<u128> {
        match self {
            KeyspaceSize::Exact(n) => Some(*n),
            KeyspaceSize::Saturated => None,
        }
    }

    /// Share of the keyspace covered after `tried` candidates, in percent
    pub fn percent(&self, tried: u64) -> Option<f64> {
        match self {
            KeyspaceSize::Exact(0) => Some(100.0),
            KeyspaceSize::Exact(n) => Some(((tried as f64 / *n as f64) * 100.0).min(100.0)),
            KeyspaceSize::Saturated => None,
        }
    }

    /// Seconds left at `per_second`, if both are known
    pub fn remaining_secs(&self, tried: u64, per_second: f64) -> Option<f64> {
        let total = self.exact()?;
        if !per_second.is_finite() || per_second <= 0.0 {
            return None;
        }
        let left = total.saturating_sub(tried as u128);
        Some(left as f64 / per_second)
    }

    /// Time left at `per_second` rendered for display, `"unknown"` if it cannot be estimated
    pub fn eta(&self, tried: u64, per_second: f64) -> String {
        self.remaining_secs(tried, per_second)
            .map(format_duration)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl fmt::Display for KeyspaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyspaceSize::Exact(n) => f.write_str(&format_count(*n)),
            KeyspaceSize::Saturated => f.write_str("saturated"),
        }
    }
}

/// Total brute-force candidates: sum of `alphabet^len` for len in `min..=max`
pub fn brute_force_size(alphabet: usize, min_len: usize, max_len: usize) -> KeyspaceSize {
    let base = alphabet as u128;
    let mut total: u128 = 0;

    for len in min_len..=max_len {
        let Ok(exp) = u32::try_from(len) else {
            return KeyspaceSize::Saturated;
        };
        let Some(count) = base.checked_pow(exp) else {
            return KeyspaceSize::Saturated;
        };
        let Some(sum) = total.checked_add(count) else {
            return KeyspaceSize::Saturated;
        };
        total = sum;
    }

    KeyspaceSize::Exact(total)
}

/// Format a count as human-readable string
pub fn format_count(count: u128) -> String {
    let n = count as f64;
    if count >= 1_000_000_000_000_000 {
        format!("{:.2}P", n / 1e15)
    } else if count >= 1_000_000_000_000 {
        format!("{:.2}T", n / 1e12)
    } else if count >= 1_000_000_000 {
        format!("{:.2}G", n / 1e9)
    } else if count >= 1_000_000 {
        format!("{:.2}M", n / 1e6)
    } else if count >= 1000 {
        format!("{:.2}K", n / 1e3)
    } else {
        format!("{}", count)
    }
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;
/// Spans at or past this many years print as a lower bound
const MAX_YEARS: u64 = 10_000;

/// Render a span of seconds as its two largest units, e.g. `"1h 02m"`
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_nan() {
        return "unknown".to_string();
    }
    if seconds < 1.0 {
        return "<1s".to_string();
    }
    if seconds >= (MAX_YEARS * YEAR) as f64 {
        return format!(">{}y", MAX_YEARS);
    }

    match seconds.round() as u64 {
        s if s < MINUTE => format!("{}s", s),
        s if s < HOUR => format!("{}m {:02}s", s / MINUTE, s % MINUTE),
        s if s < DAY => format!("{}h {:02}m", s / HOUR, s % HOUR / MINUTE),
        s if s < YEAR => format!("{}d {:02}h", s / DAY, s % DAY / HOUR),
        s => format!("{}y {}d", s / YEAR, s % YEAR / DAY),
    }
}
