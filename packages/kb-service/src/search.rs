use serde::{Deserialize, Serialize};

use kb_domain::MetadataFilter;

use crate::{KbService, Result, RetrievalTrace, SearchItem};

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
	pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter: Option<MetadataFilter>,
	pub filter_explanation: String,
	pub trace: RetrievalTrace,
}

impl KbService {
	/// Retrieval only: ranked chunks plus the filter that was applied, if any.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let outcome = self.orchestrator().retrieve(&req.query).await?;

		Ok(SearchResponse {
			items: outcome.results.iter().map(|result| result.to_item()).collect(),
			filter: outcome.filter,
			filter_explanation: outcome.filter_explanation,
			trace: outcome.trace,
		})
	}
}
