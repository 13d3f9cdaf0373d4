use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use crate::{Category, DroppedValue, Error, Lenient, Result, Topic};

/// Article identifier compared as a normalized decimal string, so `24` and `"24"` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleNumber(String);
impl ArticleNumber {
	/// Trims the input and drops leading zeros from all-digit values. Blank input yields `None`.
	pub fn new(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();

		if trimmed.is_empty() {
			return None;
		}
		if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
			let stripped = trimmed.trim_start_matches('0');
			let digits = if stripped.is_empty() { "0" } else { stripped };

			return Some(Self(digits.to_string()));
		}

		Some(Self(trimmed.to_string()))
	}

	/// Accepts a string, an integer, or an integral float.
	pub fn from_value(raw: &Value) -> Option<Self> {
		match raw {
			Value::String(text) => Self::new(text),
			Value::Number(number) => {
				if let Some(value) = number.as_u64() {
					return Self::new(&value.to_string());
				}
				if let Some(value) = number.as_i64() {
					return Self::new(&value.to_string());
				}

				number
					.as_f64()
					.filter(|value| value.is_finite() && value.fract() == 0.0)
					.and_then(|value| Self::new(&format!("{value:.0}")))
			},
			_ => None,
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for ArticleNumber {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
impl From<u32> for ArticleNumber {
	fn from(value: u32) -> Self {
		Self(value.to_string())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<Category>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub topics: Vec<Topic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub article_number: Option<ArticleNumber>,
}
impl ChunkMetadata {
	/// Reads `category`, `topics`, and `article_number` from a JSON object.
	///
	/// Out-of-vocabulary values are reported in `dropped` instead of failing; other keys are
	/// ignored.
	pub fn from_value(raw: &Value) -> Result<Lenient<Self>> {
		let obj = raw.as_object().ok_or(Error::NotAnObject { field: "metadata" })?;
		let mut dropped = Vec::new();
		let category = obj.get("category").and_then(|value| read_category(value, &mut dropped));
		let topics = obj.get("topics").map(|value| read_topics(value, &mut dropped)).unwrap_or_default();
		let article_number =
			obj.get("article_number").and_then(|value| read_article_number(value, &mut dropped));

		Ok(Lenient { value: Self { category, topics, article_number }, dropped })
	}

	pub fn has_topic(&self, topic: Topic) -> bool {
		self.topics.contains(&topic)
	}
}

/// The atomic retrievable unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
	text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	metadata: Option<ChunkMetadata>,
}
impl Chunk {
	pub fn new(text: impl Into<String>, metadata: Option<ChunkMetadata>) -> Result<Self> {
		let text = text.into();

		if text.trim().is_empty() {
			return Err(Error::EmptyText);
		}

		Ok(Self { text, metadata })
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn metadata(&self) -> Option<&ChunkMetadata> {
		self.metadata.as_ref()
	}
}

pub(crate) fn read_category(raw: &Value, dropped: &mut Vec<DroppedValue>) -> Option<Category> {
	match raw {
		Value::Null => None,
		Value::String(label) => {
			let category = Category::parse(label);

			if category.is_none() {
				dropped.push(DroppedValue { field: "category", value: label.clone() });
			}

			category
		},
		other => {
			dropped.push(DroppedValue { field: "category", value: other.to_string() });

			None
		},
	}
}

/// Keeps in-vocabulary topics in input order without duplicates. A bare string counts as a
/// one-element list.
pub(crate) fn read_topics(raw: &Value, dropped: &mut Vec<DroppedValue>) -> Vec<Topic> {
	let mut topics = Vec::new();
	let mut push = |value: &Value| match value.as_str().and_then(Topic::parse) {
		Some(topic) =>
			if !topics.contains(&topic) {
				topics.push(topic);
			},
		None => dropped.push(DroppedValue {
			field: "topics",
			value: value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
		}),
	};

	match raw {
		Value::Null => {},
		Value::Array(items) => items.iter().for_each(&mut push),
		other => push(other),
	}

	topics
}

pub(crate) fn read_article_number(
	raw: &Value,
	dropped: &mut Vec<DroppedValue>,
) -> Option<ArticleNumber> {
	if raw.is_null() {
		return None;
	}

	let article_number = ArticleNumber::from_value(raw);

	if article_number.is_none() {
		dropped.push(DroppedValue { field: "article_number", value: raw.to_string() });
	}

	article_number
}
