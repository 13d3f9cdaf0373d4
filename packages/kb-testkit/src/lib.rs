//! Deterministic fakes and fixtures shared by integration tests.

pub mod fixtures;
pub mod providers;

mod error;

pub use error::{Error, Result};
pub use fixtures::{TEST_DIMENSIONS, TempCorpus, constitution_records, search_result, test_config};
pub use providers::{
	CallCounter, FailingEmbedding, HashEmbedding, KeywordRerank, ScriptedChat, ScriptedRerank,
	ScriptedSearch, SearchCall, TableEmbedding, hash_vector,
};
