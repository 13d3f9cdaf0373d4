//! Turns a free-text question into a closed-vocabulary metadata filter via a chat model.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use kb_config::LlmProviderConfig;
use kb_domain::{MetadataFilter, NO_FILTER_EXPLANATION, vocabulary};

use crate::{ChatProvider, Error, Result};

const SYSTEM_PROMPT: &str = "You are a metadata filter generator for document retrieval. Read the user question and reply with a metadata filter as a JSON object.";

pub struct FilterGenerator {
	chat: Arc<dyn ChatProvider>,
	cfg: LlmProviderConfig,
}
impl FilterGenerator {
	pub fn new(chat: Arc<dyn ChatProvider>, cfg: LlmProviderConfig) -> Self {
		Self { chat, cfg }
	}

	/// Returns `None` when the model finds no constraint or when generation fails.
	pub async fn generate(&self, query: &str) -> Option<MetadataFilter> {
		match self.try_generate(query).await {
			Ok(filter) if filter.is_empty() => None,
			Ok(filter) => Some(filter),
			Err(err) => {
				warn!(error = %err, "Filter generation failed; continuing without a filter.");

				None
			},
		}
	}

	pub async fn try_generate(&self, query: &str) -> Result<MetadataFilter> {
		let messages = build_filter_messages(query);
		let reply = self
			.chat
			.complete(&self.cfg, &messages)
			.await
			.map_err(|err| Error::Generation { message: err.to_string() })?;

		parse_filter_response(&reply)
	}
}

pub fn explain(filter: Option<&MetadataFilter>) -> String {
	filter.map(MetadataFilter::explain).unwrap_or_else(|| NO_FILTER_EXPLANATION.to_string())
}

pub fn build_filter_messages(query: &str) -> Vec<Value> {
	let categories = vocabulary::category_labels().join(", ");
	let topics = vocabulary::topic_labels().join(", ");
	let user_prompt = format!(
		"\
Build a metadata filter for the question below.

Question: \"{query}\"

Filter fields:
1. category: one of {categories}
2. topics: a list drawn from {topics}
3. article_number: the article number as a string, for example \"1\", \"24\" or \"42\"

Rules:
- Include a category or topics only when the question clearly refers to them.
- Include article_number only when the question names an article.
- Use only the values listed above.
- When nothing applies, reply with {{}}.
- Reply with the JSON object only.

Examples:
Question: \"What are human rights in Ukraine?\"
Filter: {{\"category\": \"Rights\", \"topics\": [\"Human Rights\"]}}

Question: \"Tell me about Article 24\"
Filter: {{\"article_number\": \"24\"}}

Question: \"Constitution governance powers\"
Filter: {{\"category\": \"Governance\", \"topics\": [\"Constitution\", \"Executive Power\"]}}

Question: \"What is the capital of Ukraine?\"
Filter: {{}}

Filter for the question above:"
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Parses a model reply into a validated filter.
///
/// Only a body that is not a JSON object is an error. Out-of-vocabulary values are dropped.
pub fn parse_filter_response(raw: &str) -> Result<MetadataFilter> {
	let body = strip_code_fence(raw);
	let value: Value = serde_json::from_str(body).map_err(|err| Error::Generation {
		message: format!("Filter response is not valid JSON: {err}."),
	})?;
	let parsed = MetadataFilter::from_json(&value)
		.map_err(|err| Error::Generation { message: err.to_string() })?;

	for dropped in &parsed.dropped {
		debug!(field = dropped.field, value = %dropped.value, "Dropped filter value outside the vocabulary.");
	}

	Ok(parsed.value)
}

fn strip_code_fence(raw: &str) -> &str {
	let trimmed = raw.trim();

	if !trimmed.starts_with("```") {
		return trimmed;
	}

	let mut body = trimmed;

	if let Some((first, rest)) = body.split_once('\n') {
		if first.starts_with("```") {
			body = rest;
		}
	} else {
		return "";
	}
	if let Some((rest, last)) = body.rsplit_once('\n') {
		if last.trim_start().starts_with("```") {
			body = rest;
		}
	} else if body.trim_start().starts_with("```") {
		body = "";
	}

	body.trim()
}
