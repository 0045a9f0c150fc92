mod chunks;
mod documents;

pub use chunks::ChunkRepository;
pub use documents::DocumentRepository;
