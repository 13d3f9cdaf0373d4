//! Per-query retrieval cascade: dense search, then one filtered retry when nothing came back,
//! then re-ranking.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use kb_config::Retrieval;
use kb_domain::MetadataFilter;

use crate::{CorpusSearch, Error, FilterGenerator, Reranker, Result, SearchResult, filter_generator};

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalTrace {
	pub trace_id: Uuid,
	pub initial_count: usize,
	pub fallback_triggered: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filtered_count: Option<usize>,
	pub reranked: bool,
}

#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
	pub results: Vec<SearchResult>,
	/// The filter used by the retry, when one ran.
	pub filter: Option<MetadataFilter>,
	pub filter_explanation: String,
	pub trace: RetrievalTrace,
}

pub struct RetrievalOrchestrator {
	search: Arc<dyn CorpusSearch>,
	filter_generator: FilterGenerator,
	reranker: Reranker,
	candidate_k: usize,
	top_k: usize,
}
impl RetrievalOrchestrator {
	pub fn new(
		search: Arc<dyn CorpusSearch>,
		filter_generator: FilterGenerator,
		reranker: Reranker,
		cfg: &Retrieval,
	) -> Self {
		Self {
			search,
			filter_generator,
			reranker,
			candidate_k: cfg.candidate_k as usize,
			top_k: cfg.top_k as usize,
		}
	}

	/// Runs the stages strictly in order. Only a failed corpus search is an error.
	pub async fn retrieve(&self, query: &str) -> Result<RetrievalOutcome> {
		if query.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let trace_id = Uuid::new_v4();
		let initial = self.search.search(query, self.candidate_k, None).await?;
		let initial_count = initial.len();

		info!(%trace_id, initial_count, "Initial dense search finished.");

		let mut candidates = initial;
		let mut filter = None;
		let mut filtered_count = None;
		let fallback_triggered = candidates.is_empty();

		if fallback_triggered {
			match self.filter_generator.generate(query).await {
				Some(generated) => {
					info!(%trace_id, filter = %generated.explain(), "Retrying search with a metadata filter.");

					candidates = self.search.search(query, self.candidate_k, Some(&generated)).await?;
					filtered_count = Some(candidates.len());
					filter = Some(generated);

					info!(%trace_id, filtered_count = candidates.len(), "Filtered search finished.");
				},
				None => info!(%trace_id, "No applicable metadata filter; continuing with no candidates."),
			}
		}

		let reranked = self.reranker.rerank(query, &candidates, self.top_k).await;

		info!(
			%trace_id,
			candidates = candidates.len(),
			selected = reranked.results.len(),
			reranked = reranked.applied,
			"Re-ranking finished."
		);

		Ok(RetrievalOutcome {
			results: reranked.results,
			filter_explanation: filter_generator::explain(filter.as_ref()),
			filter,
			trace: RetrievalTrace {
				trace_id,
				initial_count,
				fallback_triggered,
				filtered_count,
				reranked: reranked.applied,
			},
		})
	}
}
