use std::{path::Path, sync::Arc};

use kb_config::Config;
use kb_domain::{Category, MetadataFilter, NO_FILTER_EXPLANATION, Topic};
use kb_service::{
	AskRequest, Error, KbService, NO_INFORMATION_ANSWER, Providers, SearchRequest,
};
use kb_testkit::{
	HashEmbedding, KeywordRerank, ScriptedChat, ScriptedRerank, ScriptedSearch, TempCorpus,
	constitution_records, search_result, test_config,
};

fn config() -> Config {
	test_config(Path::new("unused_chunks.json"))
}

fn candidates() -> Vec<kb_service::SearchResult> {
	vec![
		search_result("Article 75. The Verkhovna Rada is the sole legislative body.", 4, 0.4),
		search_result("Article 24. Citizens have equal constitutional rights.", 1, 0.6),
		search_result("Article 34. Everyone has freedom of speech.", 2, 0.9),
		search_result("Article 67. Everyone pays taxes.", 3, 1.2),
	]
}

fn service(
	cfg: Config,
	search: &Arc<ScriptedSearch>,
	chat: &Arc<ScriptedChat>,
	rerank: &Arc<KeywordRerank>,
) -> KbService {
	let providers =
		Providers::new(Arc::new(HashEmbedding::default()), rerank.clone(), chat.clone());

	KbService::with_search(cfg, search.clone(), providers)
}

fn positions(items: &[kb_service::SearchItem]) -> Vec<usize> {
	items.iter().map(|item| item.index_position).collect()
}

#[tokio::test]
async fn non_empty_initial_search_skips_filter_generation() {
	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "What does Article 24 guarantee to citizens?".to_string() })
		.await
		.expect("Search failed.");
	let calls = search.calls();

	assert_eq!(chat.calls.count(), 0);
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].top_k, 10);
	assert!(calls[0].filter.is_none());
	assert!(response.filter.is_none());
	assert_eq!(response.filter_explanation, NO_FILTER_EXPLANATION);
	assert!(!response.trace.fallback_triggered);
	assert_eq!(response.trace.initial_count, 4);
	assert_eq!(response.items.len(), 3);
	assert_eq!(response.items[0].index_position, 1);
	assert!(response.items.iter().all(|item| item.cross_score.is_some()));
}

#[tokio::test]
async fn empty_initial_search_retries_once_with_generated_filter() {
	let retry = vec![search_result("Article 24. Citizens have equal rights.", 1, 2.5)];
	let search = Arc::new(ScriptedSearch::new([Vec::new(), retry]));
	let chat = Arc::new(ScriptedChat::replying(r#"{"category": "Rights"}"#));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "Which freedoms are protected?".to_string() })
		.await
		.expect("Search failed.");
	let calls = search.calls();
	let expected = MetadataFilter { category: Some(Category::Rights), ..Default::default() };

	assert_eq!(chat.calls.count(), 1);
	assert_eq!(calls.len(), 2);
	assert_eq!(calls[1].top_k, 10);
	assert_eq!(calls[1].filter.as_ref(), Some(&expected));
	assert_eq!(response.filter.as_ref(), Some(&expected));
	assert_eq!(response.filter_explanation, "Filters: Category: Rights");
	assert!(response.trace.fallback_triggered);
	assert_eq!(response.trace.initial_count, 0);
	assert_eq!(response.trace.filtered_count, Some(1));
	assert_eq!(positions(&response.items), vec![1]);
}

#[tokio::test]
async fn no_filter_after_empty_search_yields_empty_results() {
	let search = Arc::new(ScriptedSearch::new([Vec::new()]));
	let chat = Arc::new(ScriptedChat::replying("{}"));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "What is the capital?".to_string() })
		.await
		.expect("Search failed.");

	assert_eq!(search.calls().len(), 1);
	assert!(response.items.is_empty());
	assert!(response.filter.is_none());
	assert!(response.trace.fallback_triggered);
	assert_eq!(response.trace.filtered_count, None);
	assert_eq!(rerank.calls.count(), 0);
}

#[tokio::test]
async fn failed_filter_generation_is_treated_as_no_filter() {
	let search = Arc::new(ScriptedSearch::new([Vec::new()]));
	let chat = Arc::new(ScriptedChat::new([Err("timeout".to_string())]));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "Anything?".to_string() })
		.await
		.expect("Search failed.");

	assert_eq!(chat.calls.count(), 1);
	assert_eq!(search.calls().len(), 1);
	assert!(response.items.is_empty());
	assert!(response.filter.is_none());
}

#[tokio::test]
async fn unparseable_filter_reply_is_treated_as_no_filter() {
	let search = Arc::new(ScriptedSearch::new([Vec::new()]));
	let chat = Arc::new(ScriptedChat::replying("Category is Rights."));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "Rights?".to_string() })
		.await
		.expect("Search failed.");

	assert_eq!(search.calls().len(), 1);
	assert!(response.filter.is_none());
}

#[tokio::test]
async fn filtered_retry_runs_at_most_once() {
	let search = Arc::new(ScriptedSearch::new([Vec::new(), Vec::new()]));
	let chat = Arc::new(ScriptedChat::replying(
		"```json\n{\"topics\": [\"Taxation\", \"Weather\"]}\n```",
	));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "How are taxes set?".to_string() })
		.await
		.expect("Search failed.");
	let calls = search.calls();

	assert_eq!(calls.len(), 2);
	assert_eq!(
		calls[1].filter.as_ref().map(|filter| filter.topics.clone()),
		Some(vec![Topic::Taxation])
	);
	assert!(response.items.is_empty());
	assert_eq!(response.trace.filtered_count, Some(0));
	assert_eq!(response.filter_explanation, "Filters: Topics: Taxation");
}

#[tokio::test]
async fn missing_rerank_config_keeps_retrieval_order() {
	let mut cfg = config();

	cfg.providers.rerank = None;

	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(cfg, &search, &chat, &rerank);
	let response = service
		.search(SearchRequest { query: "Article 24 rights".to_string() })
		.await
		.expect("Search failed.");

	assert_eq!(rerank.calls.count(), 0);
	assert!(!response.trace.reranked);
	assert_eq!(positions(&response.items), vec![4, 1, 2]);
	assert!(response.items.iter().all(|item| item.cross_score.is_none()));
}

#[tokio::test]
async fn failing_reranker_degrades_to_input_order() {
	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(ScriptedRerank::failing());
	let providers =
		Providers::new(Arc::new(HashEmbedding::default()), rerank.clone(), chat.clone());
	let service = KbService::with_search(config(), search.clone(), providers);
	let response = service
		.search(SearchRequest { query: "Article 24 rights".to_string() })
		.await
		.expect("Search failed.");

	assert_eq!(rerank.calls.count(), 1);
	assert!(!response.trace.reranked);
	assert_eq!(positions(&response.items), vec![4, 1, 2]);
}

#[tokio::test]
async fn cross_scores_reorder_and_ties_keep_input_order() {
	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(ScriptedRerank::new(vec![0.2, 0.7, 0.2, 0.9]));
	let providers =
		Providers::new(Arc::new(HashEmbedding::default()), rerank.clone(), chat.clone());
	let service = KbService::with_search(config(), search.clone(), providers);
	let response = service
		.search(SearchRequest { query: "taxes".to_string() })
		.await
		.expect("Search failed.");

	assert!(response.trace.reranked);
	assert_eq!(positions(&response.items), vec![3, 1, 4]);
	assert_eq!(response.items[0].cross_score, Some(0.9));
	assert_eq!(response.items[0].score, 1.2);
}

#[tokio::test]
async fn ask_uses_generated_answer_with_ranked_sources() {
	let search = Arc::new(ScriptedSearch::new([Vec::new(), candidates()]));
	let chat = Arc::new(ScriptedChat::new([
		Ok(r#"{"category": "Rights", "article_number": 24}"#.to_string()),
		Ok("  Citizens are equal before the law [1].  ".to_string()),
	]));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.ask(AskRequest { query: "Article 24 equal rights".to_string() })
		.await
		.expect("Ask failed.");
	let requests = chat.requests();
	let answer_prompt =
		requests[1][1]["content"].as_str().expect("Answer prompt must be a string.");

	assert_eq!(response.answer, "Citizens are equal before the law [1].");
	assert_eq!(response.sources.len(), 3);
	assert!(response.sources[0].starts_with("Article 24."));
	assert_eq!(
		response.filter_explanation,
		"Filters: Category: Rights | Article Number: 24"
	);
	assert!(answer_prompt.contains(&format!("[Source 1]\n{}", response.sources[0])));
}

#[tokio::test]
async fn ask_falls_back_to_extractive_answer() {
	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(ScriptedRerank::new(vec![0.1, 0.9, 0.3, 0.2]));
	let providers =
		Providers::new(Arc::new(HashEmbedding::default()), rerank.clone(), chat.clone());
	let service = KbService::with_search(config(), search.clone(), providers);
	let response = service
		.ask(AskRequest { query: "equal rights".to_string() })
		.await
		.expect("Ask failed.");

	assert_eq!(response.answer, "Citizens have equal constitutional rights. [1]");
	assert_eq!(chat.calls.count(), 1);
}

#[tokio::test]
async fn ask_without_sources_reports_no_information() {
	let search = Arc::new(ScriptedSearch::new([Vec::new()]));
	let chat = Arc::new(ScriptedChat::replying("{}"));
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let response = service
		.ask(AskRequest { query: "What is the capital?".to_string() })
		.await
		.expect("Ask failed.");

	assert_eq!(response.answer, NO_INFORMATION_ANSWER);
	assert!(response.sources.is_empty());
	assert_eq!(chat.calls.count(), 1);
}

#[tokio::test]
async fn blank_query_is_rejected() {
	let search = Arc::new(ScriptedSearch::new([candidates()]));
	let chat = Arc::new(ScriptedChat::failing());
	let rerank = Arc::new(KeywordRerank::default());
	let service = service(config(), &search, &chat, &rerank);
	let err = service
		.search(SearchRequest { query: "   ".to_string() })
		.await
		.expect_err("Expected blank query to be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(search.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_searches_share_one_index() {
	let corpus = TempCorpus::write(&constitution_records()).expect("Failed to write corpus.");
	let chat = Arc::new(ScriptedChat::failing());
	let providers = Providers::new(
		Arc::new(HashEmbedding::default()),
		Arc::new(KeywordRerank::default()),
		chat.clone(),
	);
	let service = Arc::new(
		KbService::bootstrap(test_config(corpus.path()), providers)
			.await
			.expect("Failed to bootstrap service."),
	);
	let query = || SearchRequest { query: "taxes and levies".to_string() };
	let left = tokio::spawn({
		let service = service.clone();

		async move { service.search(query()).await }
	});
	let right = tokio::spawn({
		let service = service.clone();

		async move { service.search(query()).await }
	});
	let (left, right) = tokio::join!(left, right);
	let left = left.expect("Search task panicked.").expect("Search failed.");
	let right = right.expect("Search task panicked.").expect("Search failed.");
	let sequential = service.search(query()).await.expect("Search failed.");

	assert_eq!(positions(&left.items), positions(&right.items));
	assert_eq!(positions(&left.items), positions(&sequential.items));
	assert_eq!(left.items.len(), 3);
	assert_ne!(left.trace.trace_id, right.trace.trace_id);
	assert_eq!(chat.calls.count(), 0);
}
