//! Open-web search backends. Exactly one backend is active per process.

pub mod chatnoir;
pub mod mosaic;
pub mod webindex;

use color_eyre::{Result, eyre};
use reqwest::Client;

use eofed_config::{ChatNoir, Web, WebIndex};
use eofed_domain::Bbox;

/// One document as returned by a web backend, before score normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHit {
	pub title: String,
	pub url: String,
	pub text: String,
	pub is_html: bool,
	/// Backend-local relevance. `None` when the backend does not rank numerically.
	pub raw_score: Option<f32>,
	pub bbox: Option<Bbox>,
}

#[derive(Debug, Clone)]
enum Backend {
	ChatNoir(ChatNoir),
	PrototypeWebIndex(WebIndex),
	Mosaic(WebIndex),
}

#[derive(Debug, Clone)]
pub struct WebBackend {
	client: Client,
	backend: Backend,
}
impl WebBackend {
	pub fn from_config(cfg: &Web) -> Result<Self> {
		let backend = match cfg.backend.as_str() {
			"chatnoir" => cfg.chatnoir.clone().map(Backend::ChatNoir),
			"prototype_webindex" => cfg.prototype_webindex.clone().map(Backend::PrototypeWebIndex),
			"mosaic" => cfg.mosaic.clone().map(Backend::Mosaic),
			other => return Err(eyre::eyre!("Unknown web backend {other}.")),
		}
		.ok_or_else(|| eyre::eyre!("Web backend {} is not configured.", cfg.backend))?;

		Ok(Self { client: crate::http_client(cfg.timeout_ms)?, backend })
	}

	pub fn name(&self) -> &'static str {
		match self.backend {
			Backend::ChatNoir(_) => "chatnoir",
			Backend::PrototypeWebIndex(_) => "prototype_webindex",
			Backend::Mosaic(_) => "mosaic",
		}
	}

	pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<WebHit>> {
		match &self.backend {
			Backend::ChatNoir(cfg) => chatnoir::search(&self.client, cfg, query, limit).await,
			Backend::PrototypeWebIndex(cfg) =>
				webindex::search(&self.client, cfg, query, limit).await,
			Backend::Mosaic(cfg) => mosaic::search(&self.client, cfg, query, limit).await,
		}
	}
}
