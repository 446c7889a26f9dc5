//! Character-window document splitter with a fixed overlap between neighbors.

use serde::{Deserialize, Serialize};

/// Raw uploaded text plus its source identifier (the filename).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Bounded-length substring of a document, carrying the parent's source
/// identifier. Write-once: chunks are appended to the index and never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: String,
    pub seq: usize,
    pub text: String,
}

/// Splitting parameters, in characters.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPolicy {
    pub max_len: usize,
    pub overlap: usize,
}

impl ChunkPolicy {
    pub const DEFAULT_MAX_LEN: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 100;
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            max_len: Self::DEFAULT_MAX_LEN,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// Splits `doc` into overlapping character windows. Consecutive full-length
/// chunks of the same document share exactly `policy.overlap` characters,
/// preserving context that spans a chunk boundary. Empty text yields no
/// chunks; `overlap` is clamped below `max_len`.
pub fn split_document(doc: &Document, policy: &ChunkPolicy) -> Vec<Chunk> {
    let chars: Vec<char> = doc.text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let max_len = policy.max_len.max(1);
    let overlap = policy.overlap.min(max_len - 1);
    let step = max_len - overlap;

    let mut out = Vec::new();
    let mut start = 0usize;
    let mut seq = 0usize;
    loop {
        let end = (start + max_len).min(chars.len());
        out.push(Chunk {
            source: doc.source.clone(),
            seq,
            text: chars[start..end].iter().collect(),
        });
        if end == chars.len() {
            break;
        }
        start += step;
        seq += 1;
    }
    out
}
