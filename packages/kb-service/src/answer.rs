use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use kb_config::LlmProviderConfig;

use crate::ChatProvider;

pub const NO_INFORMATION_ANSWER: &str =
	"I couldn't find any specific information answering that question.";

const SYSTEM_PROMPT: &str = "You answer questions using only the provided context. Cite the sources you use as [1], [2], and so on.";
const ARTICLE_HEADING: &str = r"^Article \d+\.\s*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
	pub answer: String,
	pub sources: Vec<String>,
}

pub struct AnswerSynthesizer {
	chat: Arc<dyn ChatProvider>,
	cfg: LlmProviderConfig,
}
impl AnswerSynthesizer {
	pub fn new(chat: Arc<dyn ChatProvider>, cfg: LlmProviderConfig) -> Self {
		Self { chat, cfg }
	}

	/// Answers from the ranked source texts. Falls back to an extractive answer when the model
	/// call fails, and never calls the model without sources.
	pub async fn synthesize(&self, query: &str, sources: Vec<String>) -> Answer {
		if sources.is_empty() {
			return Answer { answer: NO_INFORMATION_ANSWER.to_string(), sources };
		}

		let messages = build_answer_messages(query, &sources);

		match self.chat.complete(&self.cfg, &messages).await {
			Ok(answer) => Answer { answer: answer.trim().to_string(), sources },
			Err(err) => {
				warn!(error = %err, "Answer generation failed; falling back to the top source.");

				Answer { answer: extractive_answer(&sources), sources }
			},
		}
	}
}

pub fn build_answer_messages(query: &str, sources: &[String]) -> Vec<Value> {
	let context = sources
		.iter()
		.enumerate()
		.map(|(i, text)| format!("[Source {}]\n{text}", i + 1))
		.collect::<Vec<_>>()
		.join("\n\n");
	let user_prompt = format!(
		"\
Answer the question using the context below.

Context:
{context}

Question: {query}

Guidelines:
- Use only information found in the context.
- Cite sources with the matching [n] markers.
- Say so when the context is not enough to answer.
- Keep the answer short and on topic.

Answer:"
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// The first source without its leading `Article N.` heading, cited as `[1]`.
pub fn extractive_answer(sources: &[String]) -> String {
	let Some(top) = sources.first() else {
		return NO_INFORMATION_ANSWER.to_string();
	};
	let cleaned = Regex::new(ARTICLE_HEADING)
		.map(|re| re.replace(top, "").into_owned())
		.unwrap_or_else(|_| top.clone());

	format!("{cleaned} [1]")
}
