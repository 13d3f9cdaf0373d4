use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub corpus: Corpus,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
	/// JSON array of `{ "text": ..., "metadata": { ... } }` records produced by ingestion.
	/// Relative paths are resolved against the directory holding the config file.
	pub chunks_path: PathBuf,
	#[serde(default = "default_embed_batch_size")]
	pub embed_batch_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Optional. Without it the reranker keeps the retrieval order.
	pub rerank: Option<ProviderConfig>,
	pub filter_generator: LlmProviderConfig,
	pub answer: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Neighbors requested from the corpus index on each search pass.
	pub candidate_k: u32,
	/// Results kept after re-ranking.
	pub top_k: u32,
	/// Multiplier on `candidate_k` for the filtered pass; bounds how far the filter may scan.
	pub oversample_factor: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { candidate_k: 10, top_k: 3, oversample_factor: 5 }
	}
}

fn default_embed_batch_size() -> u32 {
	64
}

fn default_max_tokens() -> u32 {
	500
}
