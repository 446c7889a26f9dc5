//! Sled-backed chunk index with a pluggable embedding function.

use crate::error::CoreError;
use crate::knowledge::chunker::Chunk;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use uuid::Uuid;

const CHUNK_TREE: &str = "chunks";
const EMBED_DIMS: usize = 256;

/// Embedding function owned by the index. Callers never compute embeddings
/// themselves; they hand the index raw chunk text.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic hashed bag-of-words embedder. Tokens are lowercased,
/// hashed into a fixed number of dimensions, and the vector is L2-normalized
/// so cosine similarity reduces to a dot product.
pub struct TermHashEmbedder {
    dims: usize,
}

impl TermHashEmbedder {
    pub fn new() -> Self {
        Self { dims: EMBED_DIMS }
    }
}

impl Default for TermHashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for TermHashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vector = vec![0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dims] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

/// Stored record: one chunk plus its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkRecord {
    id: Uuid,
    source: String,
    seq: usize,
    text: String,
    embedding: Vec<f32>,
}

/// A search hit: similarity score plus the stored chunk.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub chunk: Chunk,
}

/// Append-only index of document chunks. One sled tree holds all records;
/// the key layout `source/seq/id` keeps a document's chunks adjacent.
pub struct ChunkIndex {
    db: Db,
    embedder: Box<dyn Embedder>,
}

impl ChunkIndex {
    /// Opens or creates the index at the given path with the default embedder.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        Self::open_path_with_embedder(path, Box::new(TermHashEmbedder::new()))
    }

    /// Opens or creates the index with a caller-supplied embedding function.
    pub fn open_path_with_embedder<P: AsRef<Path>>(
        path: P,
        embedder: Box<dyn Embedder>,
    ) -> Result<Self, CoreError> {
        let db = sled::open(path)?;
        Ok(Self { db, embedder })
    }

    /// Appends chunks to the index, embedding each one. Write-once: there is
    /// no update or delete path.
    pub fn add_chunks(&self, chunks: &[Chunk]) -> Result<usize, CoreError> {
        let tree = self.db.open_tree(CHUNK_TREE)?;
        for chunk in chunks {
            let record = ChunkRecord {
                id: Uuid::new_v4(),
                source: chunk.source.clone(),
                seq: chunk.seq,
                text: chunk.text.clone(),
                embedding: self.embedder.embed(&chunk.text),
            };
            let key = format!("{}/{:06}/{}", record.source, record.seq, record.id);
            tree.insert(key.as_bytes(), serde_json::to_vec(&record)?)?;
        }
        tracing::info!(
            target: "harborqa::knowledge",
            chunks = chunks.len(),
            "indexed {} chunks",
            chunks.len()
        );
        Ok(chunks.len())
    }

    /// Number of chunks currently stored.
    pub fn count(&self) -> Result<usize, CoreError> {
        Ok(self.db.open_tree(CHUNK_TREE)?.len())
    }

    /// Cosine top-k over stored embeddings. Records that fail to deserialize
    /// are skipped rather than failing the search.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>, CoreError> {
        let query_vec = self.embedder.embed(query);
        let tree = self.db.open_tree(CHUNK_TREE)?;
        let mut hits = Vec::new();
        for item in tree.iter() {
            let (_key, value) = item?;
            let record: ChunkRecord = match serde_json::from_slice(&value) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let score = dot(&query_vec, &record.embedding);
            hits.push(ScoredChunk {
                score,
                chunk: Chunk {
                    source: record.source,
                    seq: record.seq,
                    text: record.text,
                },
            });
        }
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
