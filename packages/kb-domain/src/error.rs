pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Chunk text must be non-empty.")]
	EmptyText,
	#[error("{field} must be a JSON object.")]
	NotAnObject { field: &'static str },
}
