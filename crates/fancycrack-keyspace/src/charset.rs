//! Brute-force alphabets

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::KeyspaceError;

/// Alphabet used when none is given
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Deduplicated alphabet, first-seen order preserved.
///
/// Position 0 is the odometer's zero digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Charset {
    chars: Vec<char>,
}

impl Charset {
    /// Build from a raw alphabet, dropping repeated characters
    pub fn new(raw: &str) -> Result<Self, KeyspaceError> {
        let mut chars: Vec<char> = Vec::with_capacity(raw.len());
        for c in raw.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }

        if chars.is_empty() {
            return Err(KeyspaceError::EmptyCharset);
        }

        Ok(Self { chars })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of distinct characters (the odometer base)
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            chars: DEFAULT_CHARSET.chars().collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Charset {
    type Error = KeyspaceError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<Charset> for String {
    fn from(charset: Charset) -> Self {
        charset.to_string()
    }
}
