mod chunk;
mod document;
mod query;

pub use chunk::*;
pub use document::*;
pub use query::*;
