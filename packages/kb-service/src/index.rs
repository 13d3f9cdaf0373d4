use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use kb_config::{Config, EmbeddingProviderConfig};
use kb_domain::{Chunk, ChunkMetadata, MetadataFilter};
use kb_storage::flat::{FlatIndex, Neighbor};

use crate::{BoxFuture, EmbeddingProvider, Error, Result};

/// Query-time search over the corpus.
pub trait CorpusSearch
where
	Self: Send + Sync,
{
	/// Returns at most `top_k` results in ascending distance. With a filter, only matching
	/// chunks are returned and the scan is bounded by the oversampling window.
	fn search<'a>(
		&'a self,
		query: &'a str,
		top_k: usize,
		filter: Option<&'a MetadataFilter>,
	) -> BoxFuture<'a, Result<Vec<SearchResult>>>;
}

#[derive(Debug, Clone)]
pub struct SearchResult {
	pub chunk: Arc<Chunk>,
	pub index_position: usize,
	/// Raw vector distance. Lower is closer.
	pub score: f32,
	/// Relevance assigned by the reranker. Higher is more relevant.
	pub cross_score: Option<f32>,
}
impl SearchResult {
	pub fn to_item(&self) -> SearchItem {
		SearchItem {
			index_position: self.index_position,
			text: self.chunk.text().to_string(),
			metadata: self.chunk.metadata().cloned(),
			score: self.score,
			cross_score: self.cross_score,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchItem {
	pub index_position: usize,
	pub text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<ChunkMetadata>,
	pub score: f32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cross_score: Option<f32>,
}

/// Chunks and their embeddings, aligned by position. Built once, never mutated.
pub struct CorpusIndex {
	chunks: Vec<Arc<Chunk>>,
	vectors: FlatIndex,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
	oversample_factor: usize,
}
impl CorpusIndex {
	pub async fn build(
		chunks: Vec<Chunk>,
		embedding: Arc<dyn EmbeddingProvider>,
		cfg: &Config,
	) -> Result<Self> {
		let embedding_cfg = cfg.providers.embedding.clone();
		let dim = embedding_cfg.dimensions as usize;
		let batch_size = (cfg.corpus.embed_batch_size as usize).max(1);
		let mut vectors = FlatIndex::new(dim)?;

		for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
			let texts = batch.iter().map(|chunk| chunk.text().to_string()).collect::<Vec<_>>();
			let embedded = embedding.embed(&embedding_cfg, &texts).await?;

			if embedded.len() != texts.len() {
				return Err(Error::InvalidCorpus {
					message: format!(
						"Embedding batch {batch_index} returned {} vectors for {} chunks.",
						embedded.len(),
						texts.len()
					),
				});
			}

			for vector in &embedded {
				vectors.push(vector)?;
			}

			debug!(batch_index, embedded = vectors.len(), "Embedded corpus batch.");
		}

		info!(chunks = chunks.len(), dimensions = dim, "Corpus index built.");

		Ok(Self {
			chunks: chunks.into_iter().map(Arc::new).collect(),
			vectors,
			embedding,
			embedding_cfg,
			oversample_factor: (cfg.retrieval.oversample_factor as usize).max(1),
		})
	}

	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub fn chunk(&self, position: usize) -> Option<&Arc<Chunk>> {
		self.chunks.get(position)
	}

	/// Nearest-neighbor search for an already embedded query.
	pub fn search_vector(
		&self,
		query: &[f32],
		top_k: usize,
		filter: Option<&MetadataFilter>,
	) -> Result<Vec<SearchResult>> {
		if top_k == 0 {
			return Ok(Vec::new());
		}

		let Some(filter) = filter else {
			let neighbors = self.vectors.search(query, top_k)?;

			return Ok(neighbors.iter().filter_map(|neighbor| self.to_result(neighbor)).collect());
		};
		let window = top_k.saturating_mul(self.oversample_factor);
		let neighbors = self.vectors.search(query, window)?;
		let mut results = Vec::with_capacity(top_k);

		for neighbor in &neighbors {
			let Some(result) = self.to_result(neighbor) else {
				continue;
			};

			if !filter.matches(&result.chunk) {
				continue;
			}

			results.push(result);

			if results.len() >= top_k {
				break;
			}
		}

		debug!(
			window = neighbors.len(),
			survivors = results.len(),
			filter = %filter.explain(),
			"Filtered corpus scan finished."
		);

		Ok(results)
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let texts = [query.to_string()];
		let mut vectors = self.embedding.embed(&self.embedding_cfg, &texts).await?;
		let Some(vector) = vectors.pop().filter(|_| vectors.is_empty()) else {
			return Err(Error::Provider {
				message: "Embedding provider must return exactly one vector for a query."
					.to_string(),
			});
		};

		if vector.len() != self.vectors.dim() {
			return Err(Error::Provider {
				message: format!(
					"Query embedding has dimension {}; corpus index expects {}.",
					vector.len(),
					self.vectors.dim()
				),
			});
		}
		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::Provider {
				message: "Query embedding contains non-finite values.".to_string(),
			});
		}

		Ok(vector)
	}

	fn to_result(&self, neighbor: &Neighbor) -> Option<SearchResult> {
		self.chunks.get(neighbor.position).map(|chunk| SearchResult {
			chunk: chunk.clone(),
			index_position: neighbor.position,
			score: neighbor.distance,
			cross_score: None,
		})
	}
}
impl CorpusSearch for CorpusIndex {
	fn search<'a>(
		&'a self,
		query: &'a str,
		top_k: usize,
		filter: Option<&'a MetadataFilter>,
	) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
		Box::pin(async move {
			let vector = self.embed_query(query).await?;

			self.search_vector(&vector, top_k, filter)
		})
	}
}
