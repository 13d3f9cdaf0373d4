pub mod chunk;
pub mod filter;
pub mod vocabulary;

mod error;

pub use chunk::{ArticleNumber, Chunk, ChunkMetadata};
pub use error::{Error, Result};
pub use filter::{MetadataFilter, NO_FILTER_EXPLANATION, matches};
pub use vocabulary::{Category, Topic};

/// A value rejected while reading loosely typed metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedValue {
	pub field: &'static str,
	pub value: String,
}

/// A parse result that keeps going past values it cannot use.
#[derive(Debug, Clone)]
pub struct Lenient<T> {
	pub value: T,
	pub dropped: Vec<DroppedValue>,
}
