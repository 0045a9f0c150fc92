mod query;
mod retrieval;
mod synthesis;

pub use query::QueryService;
pub use retrieval::Retriever;
pub use synthesis::SynthesisEngine;
