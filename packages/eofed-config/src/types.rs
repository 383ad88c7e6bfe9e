use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub graph: Graph,
	pub providers: Providers,
	pub web: Web,
	pub stac: Stac,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub export: Export,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Graph {
	pub url: String,
	pub database: String,
	pub graph_name: String,
	pub username: String,
	pub password: Option<String>,
	pub timeout_ms: u64,
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Sent as a bearer token when non-blank. Local servers usually need none.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Web {
	/// One of "chatnoir", "prototype_webindex", or "mosaic".
	pub backend: String,
	pub timeout_ms: u64,
	pub chatnoir: Option<ChatNoir>,
	pub prototype_webindex: Option<WebIndex>,
	pub mosaic: Option<WebIndex>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatNoir {
	pub endpoint: String,
	pub api_key: String,
	#[serde(default = "default_chatnoir_indices")]
	pub indices: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebIndex {
	pub endpoint: String,
	pub index: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stac {
	pub timeout_ms: u64,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	pub catalogs: Vec<StacCatalog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StacCatalog {
	/// Key of the `STACSource` node that owns the catalog's collections.
	pub source_key: String,
	/// Used when the source node carries no `api_link` of its own.
	pub api_url: String,
	#[serde(default = "default_signer")]
	pub signer: String,
	pub preview_asset: Option<String>,
	pub token_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub publication_sim_score: f32,
	pub collection_sim_threshold: f32,
	pub listing_batch_size: u32,
	pub default_item_limit: u32,
	pub max_item_limit: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			publication_sim_score: 0.9,
			collection_sim_threshold: 0.1,
			listing_batch_size: 1_000,
			default_item_limit: 100,
			max_item_limit: 1_000,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct Export {
	pub notebook_template: Option<PathBuf>,
}

fn default_batch_size() -> u32 {
	1_000
}

fn default_page_size() -> u32 {
	100
}

fn default_signer() -> String {
	"none".to_string()
}

fn default_chatnoir_indices() -> Vec<String> {
	vec!["cw12".to_string()]
}
