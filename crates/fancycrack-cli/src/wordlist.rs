//! Wordlist loading

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read a wordlist file: one candidate per line, trimmed, blank lines dropped
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read wordlist {}", path.display()))?;
    let words = parse_wordlist(&String::from_utf8_lossy(&bytes));

    if words.is_empty() {
        bail!("wordlist {} contains no candidates", path.display());
    }
    Ok(words)
}

pub fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
