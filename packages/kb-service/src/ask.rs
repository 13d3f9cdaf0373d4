use serde::{Deserialize, Serialize};

use kb_domain::MetadataFilter;

use crate::{KbService, Result, RetrievalTrace};

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
	pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
	pub answer: String,
	pub sources: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter: Option<MetadataFilter>,
	pub filter_explanation: String,
	pub trace: RetrievalTrace,
}

impl KbService {
	/// Retrieval followed by answer synthesis over the ranked chunk texts.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let outcome = self.orchestrator().retrieve(&req.query).await?;
		let sources = outcome.results.iter().map(|result| result.chunk.text().to_string()).collect();
		let answer = self.answer.synthesize(&req.query, sources).await;

		Ok(AskResponse {
			answer: answer.answer,
			sources: answer.sources,
			filter: outcome.filter,
			filter_explanation: outcome.filter_explanation,
			trace: outcome.trace,
		})
	}
}
