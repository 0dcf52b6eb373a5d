//! Digest algorithm identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digester::DigestError;

/// Hash algorithm a target digest was produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_512,
    /// Recognised, but the standard digester has no backing implementation
    Md5,
}

impl Algorithm {
    /// Every identifier, supported or not
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Sha1,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha3_256,
        Algorithm::Sha3_512,
        Algorithm::Md5,
    ];

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha1 => "SHA-1",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha384 => "SHA-384",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Sha3_256 => "SHA3-256",
            Algorithm::Sha3_512 => "SHA3-512",
            Algorithm::Md5 => "MD5",
        }
    }

    /// Digest size in bytes
    pub fn output_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 | Algorithm::Sha3_256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 | Algorithm::Sha3_512 => 64,
        }
    }

    /// Digest size as a hex string length
    pub fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    /// Algorithms the standard digester can compute
    pub fn supported() -> Vec<Algorithm> {
        Self::ALL
            .iter()
            .copied()
            .filter(|a| *a != Algorithm::Md5)
            .collect()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DigestError;

    /// Accepts `SHA-256`, `sha256`, `Sha-256` and so on
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            "sha384" => Ok(Algorithm::Sha384),
            "sha512" => Ok(Algorithm::Sha512),
            "sha3256" => Ok(Algorithm::Sha3_256),
            "sha3512" => Ok(Algorithm::Sha3_512),
            "md5" => Ok(Algorithm::Md5),
            _ => Err(DigestError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA-256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("Sha-1".parse::<Algorithm>().unwrap(), Algorithm::Sha1);
        assert_eq!("sha3-512".parse::<Algorithm>().unwrap(), Algorithm::Sha3_512);
        assert_eq!("SHA3_256".parse::<Algorithm>().unwrap(), Algorithm::Sha3_256);
        assert_eq!(" md5 ".parse::<Algorithm>().unwrap(), Algorithm::Md5);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "whirlpool".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, DigestError::UnknownAlgorithm(ref s) if s == "whirlpool"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.to_string().parse::<Algorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn test_md5_not_supported() {
        let supported = Algorithm::supported();
        assert!(!supported.contains(&Algorithm::Md5));
        assert_eq!(supported.len(), Algorithm::ALL.len() - 1);
    }

    #[test]
    fn test_hex_len() {
        assert_eq!(Algorithm::Sha1.hex_len(), 40);
        assert_eq!(Algorithm::Sha512.hex_len(), 128);
    }
}
