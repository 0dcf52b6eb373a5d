//! FancyCrack Keyspace
//!
//! Candidate sources: literal dictionaries and odometer-ordered brute force.

mod charset;
mod estimate;
mod source;

pub use charset::{Charset, DEFAULT_CHARSET};
pub use estimate::{brute_force_size, format_count, format_duration, KeyspaceSize};
pub use source::{
    BruteForceSource, BruteForceSpec, CandidateSource, DictionarySource, Keyspace, SourceKind,
    MAX_LENGTH,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyspaceError {
    #[error("Charset is empty")]
    EmptyCharset,
    #[error("Resume offset {skip} is past the end of a keyspace of {size} candidates")]
    SkipOutOfRange { skip: u64, size: u128 },
}
