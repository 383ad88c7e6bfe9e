pub mod collections;
pub mod enrich;
pub mod graph_filter;
pub mod items;
pub mod listing;
pub mod notebook;
pub mod posts;
pub mod publications;
pub mod registry;
pub mod results;
pub mod web;

mod error;

pub use eofed_graph::BoxFuture;
pub use error::{Error, Result};
pub use registry::{StacSourceRecord, StacSourceRegistry};
pub use results::{
	EntityRef, EoReference, GeoTaggedPost, GraphFilterRequest, GraphFilterResults, GraphLinks,
	Provenance, Publication, ResultBase, SearchResult, StacCollection, StacItem, WebDocument,
};

use std::sync::Arc;

use serde_json::Value;

use eofed_config::{Config, EmbeddingProviderConfig};
use eofed_domain::{LocationFilter, TimeInterval};
use eofed_graph::{ArangoExecutor, GraphQuery, GraphQueryExecutor};
use eofed_providers::{
	embedding,
	web::{WebBackend, WebHit},
};

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

/// The open-web search strategy, fixed for the lifetime of a [`DataRetriever`].
pub trait WebSearchProvider
where
	Self: Send + Sync,
{
	fn name(&self) -> &str;

	fn search<'a>(
		&'a self,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<WebHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub web: Arc<dyn WebSearchProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, web: Arc<dyn WebSearchProvider>) -> Self {
		Self { embedding, web }
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		let web = WebBackend::from_config(&cfg.web)?;

		Ok(Self { embedding: Arc::new(DefaultEmbedding), web: Arc::new(web) })
	}
}

struct DefaultEmbedding;

impl EmbeddingProvider for DefaultEmbedding {
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed_query(cfg, text))
	}
}

impl WebSearchProvider for WebBackend {
	fn name(&self) -> &str {
		WebBackend::name(self)
	}

	fn search<'a>(
		&'a self,
		query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<WebHit>>> {
		Box::pin(WebBackend::search(self, query, limit))
	}
}

/// Dispatches queries across the graph store, the STAC catalogs, and the web backend, and fuses
/// the answers into ranked [`SearchResult`] lists.
///
/// Holds no mutable state after construction and can be shared across tasks behind an `Arc`.
pub struct DataRetriever {
	pub cfg: Config,
	pub graph: Arc<dyn GraphQueryExecutor>,
	pub providers: Providers,
	registry: StacSourceRegistry,
}
impl DataRetriever {
	pub async fn new(
		cfg: Config,
		graph: Arc<dyn GraphQueryExecutor>,
		providers: Providers,
	) -> Result<Self> {
		let registry =
			StacSourceRegistry::load(graph.clone(), &cfg.graph.graph_name, &cfg.stac).await?;

		for record in registry.records() {
			let signed =
				registry.catalog_for(&record.key).is_some_and(|catalog| catalog.is_signed());

			tracing::debug!(
				source_key = %record.key,
				api_url = %record.api_url,
				signed,
				"STAC source registered."
			);
		}

		tracing::info!(
			stac_sources = registry.len(),
			web_backend = providers.web.name(),
			"Data retriever ready."
		);

		Ok(Self { cfg, graph, providers, registry })
	}

	/// Connects to the configured graph store and providers.
	pub async fn connect(cfg: Config) -> Result<Self> {
		let graph: Arc<dyn GraphQueryExecutor> = Arc::new(ArangoExecutor::new(&cfg.graph)?);
		let providers = Providers::from_config(&cfg)?;

		Self::new(cfg, graph, providers).await
	}

	pub fn registry(&self) -> &StacSourceRegistry {
		&self.registry
	}

	/// Runs a graph query, degrading a failure to no rows.
	pub(crate) async fn query_rows(&self, query: GraphQuery, operation: &str) -> Vec<Value> {
		match self.graph.execute(query).await {
			Ok(rows) => rows,
			Err(err) => {
				tracing::warn!(error = %err, operation, "Graph query failed.");

				Vec::new()
			},
		}
	}
}

/// Parses loosely shaped location filters. Malformed entries are dropped with a warning.
pub fn parse_location_filters(value: &Value) -> Vec<LocationFilter> {
	let (filters, rejected) = LocationFilter::parse_list(value);

	if rejected > 0 {
		tracing::warn!(rejected, "Ignoring malformed location filters.");
	}

	filters
}

/// Parses a `[start, end]` pair. Any other shape means no time filter.
pub fn parse_time_interval(value: &Value) -> Option<TimeInterval> {
	let interval = TimeInterval::from_value(value);

	if interval.is_none() && !value.is_null() {
		tracing::warn!(value = %value, "Ignoring malformed time interval.");
	}

	interval
}

/// The keywords joined by single spaces. The free-text query is only used when no keyword is
/// given, since the keywords are the query already stripped of places, dates, and stopwords.
pub(crate) fn search_text(query: &str, keywords: &[String]) -> String {
	let keywords = keywords
		.iter()
		.map(|keyword| keyword.trim())
		.filter(|keyword| !keyword.is_empty())
		.collect::<Vec<_>>();

	if keywords.is_empty() { query.trim().to_string() } else { keywords.join(" ") }
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn search_text_prefers_keywords_over_query() {
		let keywords = vec!["soil".to_string(), " ".to_string(), "moisture ".to_string()];

		assert_eq!(search_text("soil moisture in Bavaria 2020", &keywords), "soil moisture");
		assert_eq!(search_text(" flood ", &[" ".to_string()]), "flood");
		assert_eq!(search_text("", &[]), "");
	}

	#[test]
	fn malformed_time_intervals_mean_no_filter() {
		assert!(parse_time_interval(&json!(["2021-01-01T00:00:00Z"])).is_none());
		assert!(parse_time_interval(&json!(["2021-01-01T00:00:00Z", null])).is_none());
		assert!(parse_time_interval(&Value::Null).is_none());
		assert!(
			parse_time_interval(&json!(["2021-01-01T00:00:00.000Z", "2021-02-01T00:00:00.000Z"]))
				.is_some()
		);
	}
}
