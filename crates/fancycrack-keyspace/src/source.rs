//! Candidate sources

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::estimate::{brute_force_size, KeyspaceSize};
use crate::KeyspaceError;

/// Hard ceiling on brute-force candidate length
pub const MAX_LENGTH: usize = 7;

/// Which enumeration strategy a source uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Dictionary,
    BruteForce,
}

/// Brute-force parameters, lengths clamped to `1..=MAX_LENGTH`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BruteForceParams", into = "BruteForceParams")]
pub struct BruteForceSpec {
    charset: Charset,
    min_length: usize,
    max_length: usize,
    skip: u64,
}

/// Unclamped wire form of [`BruteForceSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceParams {
    charset: Charset,
    #[serde(default = "default_min_length")]
    min_length: usize,
    max_length: usize,
    #[serde(default)]
    skip: u64,
}

fn default_min_length() -> usize {
    1
}

impl From<BruteForceParams> for BruteForceSpec {
    fn from(p: BruteForceParams) -> Self {
        BruteForceSpec::new(p.charset, p.min_length, p.max_length).with_skip(p.skip)
    }
}

impl From<BruteForceSpec> for BruteForceParams {
    fn from(s: BruteForceSpec) -> Self {
        Self {
            charset: s.charset,
            min_length: s.min_length,
            max_length: s.max_length,
            skip: s.skip,
        }
    }
}

impl BruteForceSpec {
    /// Clamp both lengths into `1..=MAX_LENGTH`, swapping them if reversed
    pub fn new(charset: Charset, min_length: usize, max_length: usize) -> Self {
        let mut min_length = min_length.clamp(1, MAX_LENGTH);
        let mut max_length = max_length.clamp(1, MAX_LENGTH);
        if min_length > max_length {
            std::mem::swap(&mut min_length, &mut max_length);
        }

        Self {
            charset,
            min_length,
            max_length,
            skip: 0,
        }
    }

    /// Start enumeration at zero-based offset `skip`
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Size of the whole space, ignoring `skip`
    pub fn size(&self) -> KeyspaceSize {
        brute_force_size(self.charset.len(), self.min_length, self.max_length)
    }
}

/// Owned description of what to enumerate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Keyspace {
    /// Pre-trimmed, non-empty words in the order they are tried
    Dictionary { words: Vec<String> },
    BruteForce(BruteForceSpec),
}

impl Keyspace {
    pub fn dictionary(words: Vec<String>) -> Self {
        Keyspace::Dictionary { words }
    }

    /// Brute force over a raw alphabet; duplicates are dropped
    pub fn brute_force(
        alphabet: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self, KeyspaceError> {
        let charset = Charset::new(alphabet)?;
        Ok(Keyspace::BruteForce(BruteForceSpec::new(
            charset, min_length, max_length,
        )))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Keyspace::Dictionary { .. } => SourceKind::Dictionary,
            Keyspace::BruteForce(_) => SourceKind::BruteForce,
        }
    }

    /// Total candidates, before any resume offset
    pub fn size(&self) -> KeyspaceSize {
        match self {
            Keyspace::Dictionary { words } => KeyspaceSize::Exact(words.len() as u128),
            Keyspace::BruteForce(spec) => spec.size(),
        }
    }

    /// Candidates this keyspace will actually yield
    pub fn remaining(&self) -> KeyspaceSize {
        match (self, self.size()) {
            (Keyspace::BruteForce(spec), KeyspaceSize::Exact(n)) => {
                KeyspaceSize::Exact(n.saturating_sub(spec.skip as u128))
            }
            (_, size) => size,
        }
    }

    /// Reject a resume offset that lands past the end
    pub fn validate(&self) -> Result<(), KeyspaceError> {
        if let Keyspace::BruteForce(spec) = self {
            if let KeyspaceSize::Exact(size) = spec.size() {
                if spec.skip > 0 && spec.skip as u128 >= size {
                    return Err(KeyspaceError::SkipOutOfRange {
                        skip: spec.skip,
                        size,
                    });
                }
            }
        }
        Ok(())
    }

    /// A fresh source borrowing this keyspace's data
    pub fn candidates(&self) -> CandidateSource<'_> {
        match self {
            Keyspace::Dictionary { words } => {
                CandidateSource::Dictionary(DictionarySource::new(words))
            }
            Keyspace::BruteForce(spec) => {
                let mut source = BruteForceSource::new(spec);
                source.seek(spec.skip as u128);
                CandidateSource::BruteForce(source)
            }
        }
    }
}

/// Replays a word list in order
#[derive(Debug, Clone)]
pub struct DictionarySource<'a> {
    words: std::slice::Iter<'a, String>,
    total: usize,
}

impl<'a> DictionarySource<'a> {
    pub fn new(words: &'a [String]) -> Self {
        Self {
            words: words.iter(),
            total: words.len(),
        }
    }

    /// Number of words, known up front
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<'a> Iterator for DictionarySource<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.words.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.words.size_hint()
    }
}

/// Odometer enumeration over a charset.
///
/// For each length from min to max, the candidate is a base-K numeral with
/// the leftmost character most significant. The rightmost digit is
/// incremented first; a carry past the leftmost digit moves on to the next
/// length, starting again at all zeros.
#[derive(Debug, Clone)]
pub struct BruteForceSource<'a> {
    chars: &'a [char],
    min_length: usize,
    max_length: usize,
    digits: Vec<usize>,
    position: u128,
    done: bool,
}

impl<'a> BruteForceSource<'a> {
    pub fn new(spec: &'a BruteForceSpec) -> Self {
        Self {
            chars: spec.charset.chars(),
            min_length: spec.min_length,
            max_length: spec.max_length,
            digits: vec![0; spec.min_length],
            position: 0,
            done: spec.charset.is_empty(),
        }
    }

    /// Zero-based index of the next candidate in the full sequence
    pub fn position(&self) -> u128 {
        self.position
    }

    /// Jump to zero-based `offset`. Returns false (and drains the source)
    /// when the offset is past the end.
    pub fn seek(&mut self, offset: u128) -> bool {
        let base = self.chars.len() as u128;
        let mut rest = offset;

        for len in self.min_length..=self.max_length {
            // A length whose count overflows u128 always contains `rest`
            let count = base.checked_pow(len as u32);
            if count.map_or(true, |count| rest < count) {
                let mut digits = vec![0; len];
                for slot in digits.iter_mut().rev() {
                    *slot = (rest % base) as usize;
                    rest /= base;
                }
                self.digits = digits;
                self.position = offset;
                self.done = false;
                return true;
            }
            if let Some(count) = count {
                rest -= count;
            }
        }

        self.position = offset;
        self.done = true;
        false
    }

    fn current(&self) -> String {
        self.digits.iter().map(|&d| self.chars[d]).collect()
    }

    fn advance(&mut self) {
        let base = self.chars.len();
        for slot in self.digits.iter_mut().rev() {
            *slot += 1;
            if *slot < base {
                return;
            }
            *slot = 0;
        }

        // Carry ran past the most significant digit; digits are all zero now
        if self.digits.len() < self.max_length {
            self.digits.push(0);
        } else {
            self.done = true;
        }
    }
}

impl Iterator for BruteForceSource<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let candidate = self.current();
        self.advance();
        self.position += 1;
        Some(candidate)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.seek(self.position + n as u128) {
            return None;
        }
        self.next()
    }
}

/// A lazy, ordered, finite stream of candidates
#[derive(Debug, Clone)]
pub enum CandidateSource<'a> {
    Dictionary(DictionarySource<'a>),
    BruteForce(BruteForceSource<'a>),
}

impl CandidateSource<'_> {
    pub fn kind(&self) -> SourceKind {
        match self {
            CandidateSource::Dictionary(_) => SourceKind::Dictionary,
            CandidateSource::BruteForce(_) => SourceKind::BruteForce,
        }
    }
}

impl<'a> Iterator for CandidateSource<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CandidateSource::Dictionary(source) => source.next().map(Cow::Borrowed),
            CandidateSource::BruteForce(source) => source.next().map(Cow::Owned),
        }
    }
}
