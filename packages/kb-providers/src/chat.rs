use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Result, invalid_response};

/// Sends one chat-completion request and returns the first choice's text. No retries.
pub async fn complete(cfg: &kb_config::LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_content(&json)
}

fn parse_chat_content(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| invalid_response("Chat response is missing choice content."))?;

	if content.trim().is_empty() {
		return Err(invalid_response("Chat response content is empty."));
	}

	Ok(content.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"category\": \"Rights\"}" } },
				{ "message": { "content": "ignored" } }
			]
		});

		assert_eq!(parse_chat_content(&json).expect("parse failed"), "{\"category\": \"Rights\"}");
	}

	#[test]
	fn rejects_blank_or_missing_content() {
		let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });

		assert!(parse_chat_content(&blank).is_err());
		assert!(parse_chat_content(&serde_json::json!({ "choices": [] })).is_err());
	}
}
