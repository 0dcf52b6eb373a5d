//! FancyCrack Digest Adapter
//!
//! Hashing primitives behind a single `Digester` seam, so the search engine
//! never depends on a specific hashing library.

pub mod algorithm;
pub mod digester;
pub mod hash;

pub use self::algorithm::Algorithm;
pub use self::digester::{digest_hex, DigestError, Digester, StandardDigester};

// Re-export dependencies for use by other crates
pub use hex;
