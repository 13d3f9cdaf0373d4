use std::sync::Arc;

use tracing::warn;

use kb_config::ProviderConfig;

use crate::{RerankProvider, SearchResult};

#[derive(Debug, Clone)]
pub struct Reranked {
	pub results: Vec<SearchResult>,
	/// False when the input order was kept because no scoring model was usable.
	pub applied: bool,
}

/// Orders candidates by cross-encoder relevance, or keeps their order when the model is not
/// available.
pub struct Reranker {
	provider: Arc<dyn RerankProvider>,
	cfg: Option<ProviderConfig>,
}
impl Reranker {
	pub fn new(provider: Arc<dyn RerankProvider>, cfg: Option<ProviderConfig>) -> Self {
		Self { provider, cfg }
	}

	pub fn is_available(&self) -> bool {
		self.cfg.is_some()
	}

	/// Returns `min(top_k, candidates.len())` results. Never fails.
	pub async fn rerank(&self, query: &str, candidates: &[SearchResult], top_k: usize) -> Reranked {
		let Some(cfg) = self.cfg.as_ref().filter(|_| !candidates.is_empty()) else {
			return keep_order(candidates, top_k);
		};

		let docs =
			candidates.iter().map(|candidate| candidate.chunk.text().to_string()).collect::<Vec<_>>();
		let scores = match self.provider.rerank(cfg, query, &docs).await {
			Ok(scores) if scores.len() == docs.len() => scores,
			Ok(scores) => {
				warn!(
					expected = docs.len(),
					actual = scores.len(),
					"Rerank provider returned a mismatched score count; keeping retrieval order."
				);

				return keep_order(candidates, top_k);
			},
			Err(err) => {
				warn!(error = %err, "Rerank provider failed; keeping retrieval order.");

				return keep_order(candidates, top_k);
			},
		};

		Reranked { results: sort_by_cross_score(candidates, &scores, top_k), applied: true }
	}
}

fn keep_order(candidates: &[SearchResult], top_k: usize) -> Reranked {
	Reranked { results: candidates.iter().take(top_k).cloned().collect(), applied: false }
}

fn sort_by_cross_score(candidates: &[SearchResult], scores: &[f32], top_k: usize) -> Vec<SearchResult> {
	let mut scored = candidates
		.iter()
		.zip(scores)
		.map(|(candidate, score)| SearchResult { cross_score: Some(*score), ..candidate.clone() })
		.collect::<Vec<_>>();

	// Stable, so equal scores keep retrieval order.
	scored.sort_by(|a, b| {
		let a = a.cross_score.unwrap_or(f32::NEG_INFINITY);
		let b = b.cross_score.unwrap_or(f32::NEG_INFINITY);

		b.total_cmp(&a)
	});
	scored.truncate(top_k);

	scored
}

#[cfg(test)]
mod tests {
	use kb_domain::Chunk;

	use super::*;

	fn candidate(position: usize) -> SearchResult {
		SearchResult {
			chunk: Arc::new(Chunk::new(format!("chunk {position}"), None).expect("valid chunk")),
			index_position: position,
			score: position as f32,
			cross_score: None,
		}
	}

	#[test]
	fn sorts_descending_and_keeps_ties_in_input_order() {
		let candidates = (0..4).map(candidate).collect::<Vec<_>>();
		let ranked = sort_by_cross_score(&candidates, &[0.1, 0.9, 0.5, 0.9], 3);
		let positions = ranked.iter().map(|result| result.index_position).collect::<Vec<_>>();

		assert_eq!(positions, vec![1, 3, 2]);
		assert_eq!(ranked[0].cross_score, Some(0.9));
		assert_eq!(candidates[1].cross_score, None);
	}
}
