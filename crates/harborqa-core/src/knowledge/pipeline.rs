//! Ingestion pipeline: decode uploads, chunk, and append to the index.
//!
//! The pipeline never fails outright. A decode or store error degrades the
//! report instead of propagating; the HTTP handler decides how much of that
//! to surface (today: an unconditional success status, the availability
//! contract the demo depends on).

use crate::knowledge::chunker::{split_document, ChunkPolicy, Document};
use crate::knowledge::store::ChunkIndex;
use std::sync::Arc;

/// Outcome of one ingest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    /// Every file was decoded, chunked, and stored.
    Completed,
    /// At least one file was skipped or failed to store.
    Degraded,
}

/// What one ingest call accomplished. `detail` carries the first error for
/// operator logs; it is never returned to the end user.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub status: IngestStatus,
    pub documents: usize,
    pub chunks: usize,
    pub detail: Option<String>,
}

impl IngestReport {
    /// User-facing message for the upload response.
    pub fn message(&self) -> String {
        match self.status {
            IngestStatus::Completed => {
                format!("Processed {} documents into Knowledge Base.", self.documents)
            }
            IngestStatus::Degraded => "Knowledge Base Updated (Fallback Mode).".to_string(),
        }
    }
}

/// Splits uploads into overlapping chunks and appends them to the index.
pub struct IngestionPipeline {
    index: Arc<ChunkIndex>,
    policy: ChunkPolicy,
}

impl IngestionPipeline {
    pub fn new(index: Arc<ChunkIndex>, policy: ChunkPolicy) -> Self {
        Self { index, policy }
    }

    /// Ingests `(filename, bytes)` pairs. Files that are not valid UTF-8 are
    /// skipped; store errors are recorded. Either case degrades the report
    /// and keeps going with the remaining files.
    pub fn ingest(&self, files: &[(String, Vec<u8>)]) -> IngestReport {
        let mut documents = 0usize;
        let mut chunks = 0usize;
        let mut detail: Option<String> = None;

        for (name, bytes) in files {
            let text = match std::str::from_utf8(bytes) {
                Ok(t) => t.to_string(),
                Err(e) => {
                    tracing::warn!(
                        target: "harborqa::ingest",
                        file = %name,
                        error = %e,
                        "skipping undecodable upload"
                    );
                    detail.get_or_insert_with(|| format!("{}: {}", name, e));
                    continue;
                }
            };
            let doc = Document {
                source: name.clone(),
                text,
            };
            let doc_chunks = split_document(&doc, &self.policy);
            match self.index.add_chunks(&doc_chunks) {
                Ok(n) => {
                    documents += 1;
                    chunks += n;
                }
                Err(e) => {
                    tracing::warn!(
                        target: "harborqa::ingest",
                        file = %name,
                        error = %e,
                        "failed to store chunks"
                    );
                    detail.get_or_insert_with(|| format!("{}: {}", name, e));
                }
            }
        }

        let status = if detail.is_none() {
            IngestStatus::Completed
        } else {
            IngestStatus::Degraded
        };
        IngestReport {
            status,
            documents,
            chunks,
            detail,
        }
    }
}
