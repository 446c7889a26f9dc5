//! harborqa-core: shared types, configuration, the fallback catalog, and the
//! sled-backed document chunk index that supplies retrieval context.

mod error;
mod fallback;
mod knowledge;
mod shared;

pub use error::CoreError;
pub use fallback::FallbackCatalog;
pub use knowledge::{
    split_document, Chunk, ChunkIndex, ChunkPolicy, Document, Embedder, IngestReport,
    IngestStatus, IngestionPipeline, ScoredChunk, TermHashEmbedder,
};
pub use shared::{AppConfig, Provenance, TestCase, FALLBACK_MARKER, LIVE_MARKER};
