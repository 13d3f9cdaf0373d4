pub mod answer;
pub mod ask;
pub mod filter_generator;
pub mod index;
pub mod rerank;
pub mod retrieval;
pub mod search;

mod error;

pub use answer::{Answer, AnswerSynthesizer, NO_INFORMATION_ANSWER};
pub use ask::{AskRequest, AskResponse};
pub use error::{Error, Result};
pub use filter_generator::FilterGenerator;
pub use index::{CorpusIndex, CorpusSearch, SearchItem, SearchResult};
pub use rerank::{Reranked, Reranker};
pub use retrieval::{RetrievalOrchestrator, RetrievalOutcome, RetrievalTrace};
pub use search::{SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use tracing::warn;

use kb_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig};
use kb_providers::{chat, embedding, rerank as rerank_api};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
	pub chat: Arc<dyn ChatProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		rerank: Arc<dyn RerankProvider>,
		chat: Arc<dyn ChatProvider>,
	) -> Self {
		Self { embedding, rerank, chat }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), rerank: provider.clone(), chat: provider }
	}
}

/// Read-only question answering over one corpus. Safe to share across concurrent requests.
pub struct KbService {
	pub cfg: Config,
	orchestrator: RetrievalOrchestrator,
	answer: AnswerSynthesizer,
}
impl KbService {
	/// Loads the corpus, embeds it once, and wires every stage from `cfg`.
	pub async fn bootstrap(cfg: Config, providers: Providers) -> Result<Self> {
		let loaded = kb_storage::corpus::load_chunks(&cfg.corpus.chunks_path)?;

		for dropped in &loaded.dropped {
			warn!(
				position = dropped.position,
				field = dropped.value.field,
				value = %dropped.value.value,
				"Dropped chunk metadata value outside the vocabulary."
			);
		}

		let index = CorpusIndex::build(loaded.chunks, providers.embedding.clone(), &cfg).await?;

		Ok(Self::with_search(cfg, Arc::new(index), providers))
	}

	/// Wires the service around an already built search backend.
	pub fn with_search(cfg: Config, search: Arc<dyn CorpusSearch>, providers: Providers) -> Self {
		let filter_generator =
			FilterGenerator::new(providers.chat.clone(), cfg.providers.filter_generator.clone());
		let reranker = Reranker::new(providers.rerank.clone(), cfg.providers.rerank.clone());

		if !reranker.is_available() {
			warn!("No rerank provider configured; results keep retrieval order.");
		}

		let orchestrator =
			RetrievalOrchestrator::new(search, filter_generator, reranker, &cfg.retrieval);
		let answer = AnswerSynthesizer::new(providers.chat, cfg.providers.answer.clone());

		Self { cfg, orchestrator, answer }
	}

	pub fn orchestrator(&self) -> &RetrievalOrchestrator {
		&self.orchestrator
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(rerank_api::rerank(cfg, query, docs).await?) })
	}
}
impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(chat::complete(cfg, messages).await?) })
	}
}
