use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;

use kb_domain::{Chunk, ChunkMetadata, DroppedValue};

use crate::{Error, Result};

/// Chunks in file order plus every metadata value that was dropped while reading them.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
	pub chunks: Vec<Chunk>,
	pub dropped: Vec<DroppedMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedMetadata {
	pub position: usize,
	pub value: DroppedValue,
}

#[derive(Deserialize)]
struct ChunkRecord {
	text: String,
	#[serde(default)]
	metadata: Option<Value>,
}

pub fn load_chunks(path: &Path) -> Result<LoadedCorpus> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;

	parse_chunks(&raw, path)
}

/// Parses a JSON array of `{ "text": ..., "metadata": { ... } }` records.
///
/// A record position becomes the chunk's identity. Unknown metadata values are dropped and
/// reported; a record with blank text or non-object metadata fails the whole load.
pub fn parse_chunks(raw: &str, origin: &Path) -> Result<LoadedCorpus> {
	let records: Vec<ChunkRecord> = serde_json::from_str(raw)
		.map_err(|err| Error::ParseCorpus { path: origin.to_path_buf(), source: err })?;
	let mut chunks = Vec::with_capacity(records.len());
	let mut dropped = Vec::new();

	for (position, record) in records.into_iter().enumerate() {
		let metadata = match record.metadata {
			None | Some(Value::Null) => None,
			Some(raw) => {
				let parsed = ChunkMetadata::from_value(&raw)
					.map_err(|err| Error::InvalidRecord { position, source: err })?;

				dropped.extend(
					parsed.dropped.into_iter().map(|value| DroppedMetadata { position, value }),
				);

				Some(parsed.value)
			},
		};
		let chunk = Chunk::new(record.text, metadata)
			.map_err(|err| Error::InvalidRecord { position, source: err })?;

		chunks.push(chunk);
	}

	Ok(LoadedCorpus { chunks, dropped })
}
