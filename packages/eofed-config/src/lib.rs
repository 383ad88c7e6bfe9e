mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatNoir, Config, EmbeddingProviderConfig, Export, Graph, Providers, Search, Service, Stac,
	StacCatalog, Web, WebIndex,
};

use std::{collections::HashSet, fs, path::Path};

pub const WEB_BACKENDS: [&str; 3] = ["chatnoir", "prototype_webindex", "mosaic"];
pub const STAC_SIGNERS: [&str; 2] = ["none", "planetary_computer"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.graph.url.trim().is_empty() {
		return Err(Error::Validation { message: "graph.url must be non-empty.".to_string() });
	}
	if cfg.graph.database.trim().is_empty() {
		return Err(Error::Validation {
			message: "graph.database must be non-empty.".to_string(),
		});
	}
	if cfg.graph.graph_name.trim().is_empty() {
		return Err(Error::Validation {
			message: "graph.graph_name must be non-empty.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("graph.timeout_ms", cfg.graph.timeout_ms),
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("web.timeout_ms", cfg.web.timeout_ms),
		("stac.timeout_ms", cfg.stac.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.graph.batch_size == 0 {
		return Err(Error::Validation {
			message: "graph.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	validate_web(&cfg.web)?;
	validate_stac(&cfg.stac)?;

	let search = &cfg.search;

	for (label, value) in [
		("search.publication_sim_score", search.publication_sim_score),
		("search.collection_sim_threshold", search.collection_sim_threshold),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if search.listing_batch_size == 0 {
		return Err(Error::Validation {
			message: "search.listing_batch_size must be greater than zero.".to_string(),
		});
	}
	if search.default_item_limit == 0 || search.max_item_limit == 0 {
		return Err(Error::Validation {
			message: "search item limits must be greater than zero.".to_string(),
		});
	}
	if search.default_item_limit > search.max_item_limit {
		return Err(Error::Validation {
			message: "search.default_item_limit must not exceed search.max_item_limit."
				.to_string(),
		});
	}

	Ok(())
}

fn validate_web(web: &Web) -> Result<()> {
	if !WEB_BACKENDS.contains(&web.backend.as_str()) {
		return Err(Error::Validation {
			message: "web.backend must be one of chatnoir, prototype_webindex, or mosaic."
				.to_string(),
		});
	}

	match web.backend.as_str() {
		"chatnoir" => {
			let Some(chatnoir) = web.chatnoir.as_ref() else {
				return Err(Error::Validation {
					message: "web.chatnoir is required when web.backend is chatnoir.".to_string(),
				});
			};

			if chatnoir.api_key.trim().is_empty() {
				return Err(Error::Validation {
					message: "web.chatnoir.api_key must be non-empty.".to_string(),
				});
			}
			if chatnoir.indices.is_empty() {
				return Err(Error::Validation {
					message: "web.chatnoir.indices must be non-empty.".to_string(),
				});
			}
		},
		"prototype_webindex" =>
			if web.prototype_webindex.is_none() {
				return Err(Error::Validation {
					message: "web.prototype_webindex is required when web.backend is prototype_webindex."
						.to_string(),
				});
			},
		_ =>
			if web.mosaic.is_none() {
				return Err(Error::Validation {
					message: "web.mosaic is required when web.backend is mosaic.".to_string(),
				});
			},
	}

	Ok(())
}

fn validate_stac(stac: &Stac) -> Result<()> {
	if stac.page_size == 0 {
		return Err(Error::Validation {
			message: "stac.page_size must be greater than zero.".to_string(),
		});
	}
	if stac.catalogs.is_empty() {
		return Err(Error::Validation {
			message: "stac.catalogs must list at least one catalog.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for catalog in &stac.catalogs {
		if catalog.source_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "stac.catalogs.source_key must be non-empty.".to_string(),
			});
		}
		if !seen.insert(catalog.source_key.as_str()) {
			return Err(Error::Validation {
				message: format!("stac.catalogs.source_key {} is duplicated.", catalog.source_key),
			});
		}
		if catalog.api_url.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"stac.catalogs.api_url must be non-empty for {}.",
					catalog.source_key
				),
			});
		}
		if !STAC_SIGNERS.contains(&catalog.signer.as_str()) {
			return Err(Error::Validation {
				message: "stac.catalogs.signer must be one of none or planetary_computer."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.graph.password.as_deref().map(|password| password.is_empty()).unwrap_or(false) {
		cfg.graph.password = None;
	}

	cfg.graph.url = cfg.graph.url.trim_end_matches('/').to_string();

	for catalog in &mut cfg.stac.catalogs {
		catalog.api_url = catalog.api_url.trim_end_matches('/').to_string();

		if catalog.preview_asset.as_deref().map(|asset| asset.trim().is_empty()).unwrap_or(false)
		{
			catalog.preview_asset = None;
		}
		if catalog.token_url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
			catalog.token_url = None;
		}
	}

	if cfg
		.export
		.notebook_template
		.as_deref()
		.map(|path| path.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.export.notebook_template = None;
	}
}
