use std::{io::Write, path::Path, sync::Arc};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use kb_config::{
	Config, Corpus, EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig, Providers,
	Retrieval, Service,
};
use kb_domain::Chunk;
use kb_service::SearchResult;

use crate::Result;

pub const TEST_DIMENSIONS: u32 = 8;

/// A corpus file in the temp directory, removed on drop.
#[derive(Debug)]
pub struct TempCorpus {
	file: NamedTempFile,
}
impl TempCorpus {
	pub fn write(records: &Value) -> Result<Self> {
		let mut file = tempfile::Builder::new().prefix("kb_corpus_").suffix(".json").tempfile()?;

		file.write_all(&serde_json::to_vec_pretty(records)?)?;
		file.flush()?;

		Ok(Self { file })
	}

	pub fn path(&self) -> &Path {
		self.file.path()
	}
}

/// A small slice of constitutional articles in the shape produced by ingestion.
pub fn constitution_records() -> Value {
	serde_json::json!([
		{
			"text": "Article 1. Ukraine is a sovereign and independent, democratic, social, law-based state.",
			"metadata": {
				"type": "article",
				"category": "Governance",
				"topics": ["Sovereignty", "Democracy", "Rule of Law"],
				"article_number": "1"
			}
		},
		{
			"text": "Article 24. Citizens have equal constitutional rights and freedoms and are equal before the law.",
			"metadata": {
				"type": "article",
				"category": "Rights",
				"topics": ["Human Rights", "Citizenship"],
				"article_number": "24"
			}
		},
		{
			"text": "Article 34. Everyone is guaranteed the right to freedom of thought and speech.",
			"metadata": {
				"type": "article",
				"category": "Rights",
				"topics": ["Freedom of Speech"],
				"article_number": "34"
			}
		},
		{
			"text": "Article 67. Everyone is obliged to pay taxes and levies in accordance with the procedure established by law.",
			"metadata": {
				"type": "article",
				"category": "Economy",
				"topics": ["Taxation"],
				"article_number": 67
			}
		},
		{
			"text": "Article 75. The Verkhovna Rada of Ukraine is the sole body of legislative power.",
			"metadata": {
				"type": "article",
				"category": "Governance",
				"topics": ["Parliament"],
				"article_number": "75"
			}
		},
		{
			"text": "Article 124. Justice in Ukraine is administered exclusively by the courts.",
			"metadata": {
				"type": "article",
				"category": "Judiciary",
				"topics": ["Justice", "Judiciary"],
				"article_number": "124"
			}
		},
		{
			"text": "The Verkhovna Rada, on behalf of the Ukrainian people, adopts this Constitution."
		}
	])
}

/// Config pointing at `chunks_path`, with small batches and every provider present.
pub fn test_config(chunks_path: &Path) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		corpus: Corpus { chunks_path: chunks_path.to_path_buf(), embed_batch_size: 3 },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			rerank: Some(ProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/rerank".to_string(),
				model: "test-rerank".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			}),
			filter_generator: llm_config("test-filter", 0.1),
			answer: llm_config("test-answer", 0.3),
		},
		retrieval: Retrieval::default(),
	}
}

pub fn search_result(text: &str, index_position: usize, score: f32) -> SearchResult {
	let chunk = Chunk::new(text, None).unwrap_or_else(|err| panic!("Invalid fixture chunk: {err}"));

	SearchResult { chunk: Arc::new(chunk), index_position, score, cross_score: None }
}

fn llm_config(model: &str, temperature: f32) -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/chat/completions".to_string(),
		model: model.to_string(),
		temperature,
		max_tokens: 200,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}
