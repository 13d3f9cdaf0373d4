pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Generation error: {message}")]
	Generation { message: String },
	#[error("Invalid corpus: {message}")]
	InvalidCorpus { message: String },
}
impl From<kb_providers::Error> for Error {
	fn from(err: kb_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
impl From<kb_storage::Error> for Error {
	fn from(err: kb_storage::Error) -> Self {
		match err {
			kb_storage::Error::DimensionMismatch { .. } | kb_storage::Error::InvalidRecord { .. } =>
				Self::InvalidCorpus { message: err.to_string() },
			kb_storage::Error::ReadCorpus { .. }
			| kb_storage::Error::ParseCorpus { .. }
			| kb_storage::Error::InvalidArgument(_) => Self::Storage { message: err.to_string() },
		}
	}
}
