mod chunker;
mod extractor;
mod pipeline;

pub use chunker::{TextChunk, TextChunker};
pub use extractor::{ContentExtractor, DocumentFormat};
pub use pipeline::{IngestionPipeline, StoredDocument};
