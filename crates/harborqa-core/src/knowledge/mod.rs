//! Document ingestion: chunking, embedding, and the sled-backed chunk index.

mod chunker;
mod pipeline;
mod store;

pub use chunker::{split_document, Chunk, ChunkPolicy, Document};
pub use pipeline::{IngestReport, IngestStatus, IngestionPipeline};
pub use store::{ChunkIndex, Embedder, ScoredChunk, TermHashEmbedder};
