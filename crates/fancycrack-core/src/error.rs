//! Failure taxonomy for a search run

use fancycrack_crypto::DigestError;
use fancycrack_keyspace::KeyspaceError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrackError {
    #[error("{0}")]
    UnsupportedAlgorithm(#[from] DigestError),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Digest computation failed: {0}")]
    RuntimeFailure(String),
    #[error("A search is already running on this engine")]
    Busy,
}

impl From<KeyspaceError> for CrackError {
    fn from(err: KeyspaceError) -> Self {
        CrackError::MalformedInput(err.to_string())
    }
}
