use std::{
	collections::{HashMap, VecDeque},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Value;

use kb_config::{EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig};
use kb_domain::MetadataFilter;
use kb_service::{
	BoxFuture, ChatProvider, CorpusSearch, EmbeddingProvider, Error, RerankProvider, Result,
	SearchResult,
};

#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);
impl CallCounter {
	pub fn hit(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}

	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

/// Maps text to a unit-free vector in `[-1, 1]` derived from its blake3 digest.
pub fn hash_vector(text: &str, dimensions: usize) -> Vec<f32> {
	let mut reader = blake3::Hasher::new().update(text.as_bytes()).finalize_xof();
	let mut bytes = vec![0_u8; dimensions * 2];

	reader.fill(&mut bytes);

	bytes
		.chunks_exact(2)
		.map(|pair| {
			let raw = u16::from_le_bytes([pair[0], pair[1]]) as f32;

			raw / u16::MAX as f32 * 2.0 - 1.0
		})
		.collect()
}

#[derive(Debug, Default)]
pub struct HashEmbedding {
	pub calls: CallCounter,
}
impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		self.calls.hit();

		let dim = cfg.dimensions as usize;
		let vectors = texts.iter().map(|text| hash_vector(text, dim)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Returns fixed vectors for known texts and hashed vectors for anything else.
#[derive(Debug, Default)]
pub struct TableEmbedding {
	table: HashMap<String, Vec<f32>>,
	pub calls: CallCounter,
}
impl TableEmbedding {
	pub fn new<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (S, Vec<f32>)>,
		S: Into<String>,
	{
		Self {
			table: entries.into_iter().map(|(text, vector)| (text.into(), vector)).collect(),
			calls: CallCounter::default(),
		}
	}
}
impl EmbeddingProvider for TableEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		self.calls.hit();

		let dim = cfg.dimensions as usize;
		let vectors = texts
			.iter()
			.map(|text| self.table.get(text).cloned().unwrap_or_else(|| hash_vector(text, dim)))
			.collect();

		Box::pin(async move { Ok(vectors) })
	}
}

#[derive(Debug, Default)]
pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(Error::Provider { message: "Embedding service unavailable.".to_string() })
		})
	}
}

/// Scores a document by how many distinct query words it contains.
#[derive(Debug, Default)]
pub struct KeywordRerank {
	pub calls: CallCounter,
}
impl RerankProvider for KeywordRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.hit();

		let mut words = query
			.split(|ch: char| !ch.is_alphanumeric())
			.filter(|word| !word.is_empty())
			.map(str::to_lowercase)
			.collect::<Vec<_>>();

		words.sort_unstable();
		words.dedup();

		let scores = docs
			.iter()
			.map(|doc| {
				let doc = doc.to_lowercase();

				words.iter().filter(|word| doc.contains(word.as_str())).count() as f32
			})
			.collect();

		Box::pin(async move { Ok(scores) })
	}
}

/// Returns a fixed score list, or fails when built with [`ScriptedRerank::failing`].
#[derive(Debug, Default)]
pub struct ScriptedRerank {
	scores: Option<Vec<f32>>,
	pub calls: CallCounter,
}
impl ScriptedRerank {
	pub fn new(scores: Vec<f32>) -> Self {
		Self { scores: Some(scores), calls: CallCounter::default() }
	}

	pub fn failing() -> Self {
		Self::default()
	}
}
impl RerankProvider for ScriptedRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a ProviderConfig,
		_query: &'a str,
		_docs: &'a [String],
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.hit();

		let scores = self.scores.clone();

		Box::pin(async move {
			scores.ok_or_else(|| Error::Provider { message: "Rerank service unavailable.".to_string() })
		})
	}
}

/// Replies from a queue in call order. An exhausted queue or an `Err` entry fails the call.
#[derive(Debug, Default)]
pub struct ScriptedChat {
	replies: Mutex<VecDeque<Result<String, String>>>,
	requests: Mutex<Vec<Vec<Value>>>,
	pub calls: CallCounter,
}
impl ScriptedChat {
	pub fn new<I>(replies: I) -> Self
	where
		I: IntoIterator<Item = Result<String, String>>,
	{
		Self {
			replies: Mutex::new(replies.into_iter().collect()),
			requests: Mutex::new(Vec::new()),
			calls: CallCounter::default(),
		}
	}

	pub fn replying(reply: impl Into<String>) -> Self {
		Self::new([Ok(reply.into())])
	}

	pub fn failing() -> Self {
		Self::default()
	}

	/// Messages of every call so far, in order.
	pub fn requests(&self) -> Vec<Vec<Value>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl ChatProvider for ScriptedChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		self.calls.hit();
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let reply = self.replies.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		Box::pin(async move {
			match reply {
				Some(Ok(text)) => Ok(text),
				Some(Err(message)) => Err(Error::Provider { message }),
				None => Err(Error::Provider { message: "Chat service unavailable.".to_string() }),
			}
		})
	}
}

#[derive(Debug, Clone)]
pub struct SearchCall {
	pub query: String,
	pub top_k: usize,
	pub filter: Option<MetadataFilter>,
}

/// Corpus search that replays queued result sets and records each call.
#[derive(Debug, Default)]
pub struct ScriptedSearch {
	responses: Mutex<VecDeque<Vec<SearchResult>>>,
	calls: Mutex<Vec<SearchCall>>,
}
impl ScriptedSearch {
	/// Each call consumes one response; an exhausted queue yields no results.
	pub fn new<I>(responses: I) -> Self
	where
		I: IntoIterator<Item = Vec<SearchResult>>,
	{
		Self { responses: Mutex::new(responses.into_iter().collect()), calls: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> Vec<SearchCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl CorpusSearch for ScriptedSearch {
	fn search<'a>(
		&'a self,
		query: &'a str,
		top_k: usize,
		filter: Option<&'a MetadataFilter>,
	) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(SearchCall {
			query: query.to_string(),
			top_k,
			filter: filter.cloned(),
		});

		let mut results = self
			.responses
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.pop_front()
			.unwrap_or_default();

		results.truncate(top_k);

		Box::pin(async move { Ok(results) })
	}
}
