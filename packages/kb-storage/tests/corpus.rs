use std::{io::Write, path::Path};

use tempfile::NamedTempFile;

use kb_domain::{ArticleNumber, Category, Topic};
use kb_storage::{Error, corpus};

fn write_temp_corpus(payload: &str) -> NamedTempFile {
	let mut file = tempfile::Builder::new()
		.prefix("kb_storage_test_")
		.suffix(".json")
		.tempfile()
		.expect("Failed to create test corpus.");

	file.write_all(payload.as_bytes()).expect("Failed to write test corpus.");

	file
}

#[test]
fn loads_chunks_in_file_order() {
	let file = write_temp_corpus(
		r#"[
			{ "text": "Article 1. Ukraine is a sovereign state.", "metadata": {
				"type": "article", "category": "Governance", "topics": ["Sovereignty"], "article_number": "1"
			} },
			{ "text": "Preamble." },
			{ "text": "Article 24. Equal rights.", "metadata": null }
		]"#,
	);
	let loaded = corpus::load_chunks(file.path()).expect("Failed to load corpus.");


	assert_eq!(loaded.chunks.len(), 3);
	assert!(loaded.dropped.is_empty());

	let metadata = loaded.chunks[0].metadata().expect("First chunk must carry metadata.");

	assert_eq!(metadata.category, Some(Category::Governance));
	assert_eq!(metadata.topics, vec![Topic::Sovereignty]);
	assert_eq!(metadata.article_number, Some(ArticleNumber::from(1)));
	assert!(loaded.chunks[1].metadata().is_none());
	assert!(loaded.chunks[2].metadata().is_none());
}

#[test]
fn reports_dropped_metadata_with_position() {
	let loaded = corpus::parse_chunks(
		r#"[
			{ "text": "a", "metadata": {} },
			{ "text": "b", "metadata": { "category": "Sports", "topics": ["Elections"] } }
		]"#,
		Path::new("inline.json"),
	)
	.expect("Failed to parse corpus.");

	assert_eq!(loaded.dropped.len(), 1);
	assert_eq!(loaded.dropped[0].position, 1);
	assert_eq!(loaded.dropped[0].value.value, "Sports");
	assert_eq!(
		loaded.chunks[1].metadata().map(|metadata| metadata.topics.clone()),
		Some(vec![Topic::Elections])
	);
}

#[test]
fn rejects_blank_text() {
	let err = corpus::parse_chunks(r#"[{ "text": "ok" }, { "text": "   " }]"#, Path::new("x.json"))
		.expect_err("Expected blank text to be rejected.");

	assert!(matches!(err, Error::InvalidRecord { position: 1, .. }));
}

#[test]
fn rejects_non_array_payload() {
	let err = corpus::parse_chunks(r#"{ "text": "a" }"#, Path::new("x.json"))
		.expect_err("Expected an object payload to be rejected.");

	assert!(matches!(err, Error::ParseCorpus { .. }));
}

#[test]
fn missing_file_is_a_read_error() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir.");
	let path = dir.path().join("missing_corpus.json");
	let err = corpus::load_chunks(&path).expect_err("Expected missing file to fail.");

	assert!(matches!(err, Error::ReadCorpus { .. }));
}
