mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Corpus, EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig, Providers,
	Retrieval, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, path.parent());

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.corpus.chunks_path.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "corpus.chunks_path must be non-empty.".to_string(),
		});
	}
	if cfg.corpus.embed_batch_size == 0 {
		return Err(Error::Validation {
			message: "corpus.embed_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.candidate_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.candidate_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.oversample_factor == 0 {
		return Err(Error::Validation {
			message: "retrieval.oversample_factor must be greater than zero.".to_string(),
		});
	}

	for (label, llm) in
		[("filter_generator", &cfg.providers.filter_generator), ("answer", &cfg.providers.answer)]
	{
		if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be in the range 0.0-2.0."),
			});
		}
		if llm.max_tokens == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.max_tokens must be greater than zero."),
			});
		}
	}

	let mut keys = vec![
		("embedding", &cfg.providers.embedding.api_key),
		("filter_generator", &cfg.providers.filter_generator.api_key),
		("answer", &cfg.providers.answer.api_key),
	];

	if let Some(rerank) = cfg.providers.rerank.as_ref() {
		keys.push(("rerank", &rerank.api_key));
	}

	for (label, key) in keys {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config, base_dir: Option<&Path>) {
	if let Some(base) = base_dir
		&& cfg.corpus.chunks_path.is_relative()
		&& !cfg.corpus.chunks_path.as_os_str().is_empty()
	{
		cfg.corpus.chunks_path = base.join(&cfg.corpus.chunks_path);
	}
}
