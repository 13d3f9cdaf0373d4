use serde::Serialize;
use serde_json::Value;

use crate::{
	ArticleNumber, Category, Chunk, Error, Lenient, Result, Topic,
	chunk::{read_article_number, read_category, read_topics},
};

pub const NO_FILTER_EXPLANATION: &str = "No metadata filters applied";

/// Conjunction of up to three independent clauses. An absent clause places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataFilter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<Category>,
	/// Empty means no topic clause.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub topics: Vec<Topic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub article_number: Option<ArticleNumber>,
}
impl MetadataFilter {
	/// Builds a filter from loosely typed JSON, dropping every value outside the vocabularies.
	pub fn from_json(raw: &Value) -> Result<Lenient<Self>> {
		let obj = raw.as_object().ok_or(Error::NotAnObject { field: "filter" })?;
		let mut dropped = Vec::new();
		let category = obj.get("category").and_then(|value| read_category(value, &mut dropped));
		let topics = obj.get("topics").map(|value| read_topics(value, &mut dropped)).unwrap_or_default();
		let article_number =
			obj.get("article_number").and_then(|value| read_article_number(value, &mut dropped));

		Ok(Lenient { value: Self { category, topics, article_number }, dropped })
	}

	pub fn is_empty(&self) -> bool {
		self.category.is_none() && self.topics.is_empty() && self.article_number.is_none()
	}

	pub fn matches(&self, chunk: &Chunk) -> bool {
		if self.is_empty() {
			return true;
		}

		let Some(metadata) = chunk.metadata() else {
			return false;
		};

		let category_ok = self.category.is_none_or(|category| metadata.category == Some(category));
		let article_ok = self
			.article_number
			.as_ref()
			.is_none_or(|article_number| metadata.article_number.as_ref() == Some(article_number));
		let topics_ok =
			self.topics.is_empty() || self.topics.iter().any(|topic| metadata.has_topic(*topic));

		category_ok && article_ok && topics_ok
	}

	/// Renders the present clauses in a fixed order. Never fails.
	pub fn explain(&self) -> String {
		if self.is_empty() {
			return NO_FILTER_EXPLANATION.to_string();
		}

		let mut clauses = Vec::with_capacity(3);

		if let Some(category) = self.category {
			clauses.push(format!("Category: {category}"));
		}
		if !self.topics.is_empty() {
			let topics = self.topics.iter().map(|topic| topic.as_str()).collect::<Vec<_>>();

			clauses.push(format!("Topics: {}", topics.join(", ")));
		}
		if let Some(article_number) = &self.article_number {
			clauses.push(format!("Article Number: {article_number}"));
		}

		format!("Filters: {}", clauses.join(" | "))
	}
}

pub fn matches(chunk: &Chunk, filter: &MetadataFilter) -> bool {
	filter.matches(chunk)
}
