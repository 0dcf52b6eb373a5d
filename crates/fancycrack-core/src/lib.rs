//! FancyCrack Core Engine
//!
//! Single-worker candidate search: enumerate, digest, compare, report.

mod control;
mod error;
mod job;
mod progress;
mod search;

pub use control::{CancellationToken, Throttle, MAX_DELAY_MS};
pub use error::CrackError;
pub use job::{CrackEvent, CrackHandle, EVENT_CAPACITY};
pub use progress::{ProgressSample, RecentRing, RECENT_CAPACITY};
pub use search::{CrackConfig, CrackEngine, CrackRequest, Outcome, SearchEvent, TargetDigest};

// Re-exports for convenience
pub use fancycrack_crypto::{digest_hex, Algorithm, DigestError, Digester, StandardDigester};
pub use fancycrack_keyspace::{
    format_count, format_duration, BruteForceSpec, Charset, Keyspace, KeyspaceError,
    KeyspaceSize, SourceKind, DEFAULT_CHARSET, MAX_LENGTH,
};
