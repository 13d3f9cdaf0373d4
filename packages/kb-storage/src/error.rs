use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read corpus at {path:?}: {source}")]
	ReadCorpus { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse corpus at {path:?}: {source}")]
	ParseCorpus { path: PathBuf, source: serde_json::Error },
	#[error("Corpus record {position} is invalid: {source}")]
	InvalidRecord { position: usize, source: kb_domain::Error },
	#[error("Vector has dimension {actual}; index expects {expected}.")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
