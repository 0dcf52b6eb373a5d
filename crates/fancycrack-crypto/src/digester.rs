//! The digest seam used by the search engine

use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::hash;

const KNOWN_NAMES: &str = "SHA-1, SHA-256, SHA-384, SHA-512, SHA3-256, SHA3-512, MD5";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Unknown algorithm '{0}' (expected one of {names})", names = KNOWN_NAMES)]
    UnknownAlgorithm(String),
}

/// Computes lowercase hex digests of candidate bytes
pub trait Digester: Send + Sync {
    /// Hex digest of `data` under `algorithm`, lowercase and zero-padded per byte
    fn digest_hex(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, DigestError>;
}

/// Digester backed by the RustCrypto hash crates
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDigester;

impl Digester for StandardDigester {
    fn digest_hex(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, DigestError> {
        let hex = match algorithm {
            Algorithm::Sha1 => hex::encode(hash::sha1(data)),
            Algorithm::Sha256 => hex::encode(hash::sha256(data)),
            Algorithm::Sha384 => hex::encode(hash::sha384(data)),
            Algorithm::Sha512 => hex::encode(hash::sha512(data)),
            Algorithm::Sha3_256 => hex::encode(hash::sha3_256(data)),
            Algorithm::Sha3_512 => hex::encode(hash::sha3_512(data)),
            Algorithm::Md5 => {
                return Err(DigestError::UnsupportedAlgorithm(algorithm.name().to_string()))
            }
        };
        Ok(hex)
    }
}

/// Hex digest with the standard digester
pub fn digest_hex(algorithm: Algorithm, data: &[u8]) -> Result<String, DigestError> {
    StandardDigester.digest_hex(algorithm, data)
}
