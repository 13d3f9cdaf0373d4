use std::{io, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kb_config::Config;
use kb_service::{AskRequest, KbService, Providers, SearchRequest};

/// Answers one question against the configured corpus and prints the result as JSON.
#[derive(Debug, Parser)]
#[command(
	version = kb_cli::VERSION,
	rename_all = "kebab",
	styles = kb_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Print ranked chunks instead of a synthesized answer.
	#[arg(long)]
	pub retrieve_only: bool,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long, value_name = "N")]
	pub candidate_k: Option<u32>,
	#[arg(value_name = "QUESTION")]
	pub question: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut config = kb_config::load(&args.config)?;

	apply_overrides(&mut config, &args)?;

	let filter = EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let service = KbService::bootstrap(config, Providers::default()).await?;
	let json = if args.retrieve_only {
		let response = service.search(SearchRequest { query: args.question }).await?;

		serde_json::to_string_pretty(&response)?
	} else {
		let response = service.ask(AskRequest { query: args.question }).await?;

		serde_json::to_string_pretty(&response)?
	};

	println!("{json}");

	Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) -> kb_config::Result<()> {
	if let Some(top_k) = args.top_k {
		config.retrieval.top_k = top_k;
	}
	if let Some(candidate_k) = args.candidate_k {
		config.retrieval.candidate_k = candidate_k;
	}

	kb_config::validate(config)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_question_and_flags() {
		let args = Args::try_parse_from([
			"kb-ask",
			"--config",
			"kb.toml",
			"--retrieve-only",
			"--top-k",
			"5",
			"What does Article 24 say?",
		])
		.expect("Arguments must parse.");

		assert_eq!(args.config, PathBuf::from("kb.toml"));
		assert!(args.retrieve_only);
		assert_eq!(args.top_k, Some(5));
		assert_eq!(args.candidate_k, None);
		assert_eq!(args.question, "What does Article 24 say?");
	}

	#[test]
	fn overrides_are_validated() {
		let mut config = kb_testkit::test_config(std::path::Path::new("chunks.json"));
		let args = Args::try_parse_from(["kb-ask", "-c", "kb.toml", "--candidate-k", "25", "q"])
			.expect("Arguments must parse.");

		apply_overrides(&mut config, &args).expect("Override must validate.");

		assert_eq!(config.retrieval.candidate_k, 25);

		let zero = Args::try_parse_from(["kb-ask", "-c", "kb.toml", "--top-k", "0", "q"])
			.expect("Arguments must parse.");

		assert!(apply_overrides(&mut config, &zero).is_err());
	}

	#[test]
	fn question_is_required() {
		assert!(Args::try_parse_from(["kb-ask", "-c", "kb.toml"]).is_err());
	}
}
