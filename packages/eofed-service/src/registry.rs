//! STAC source records and their catalog clients.
//!
//! Records are built once, from the `STACSource` nodes of the graph joined with the configured
//! catalogs, and never change afterwards.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use eofed_config::{Stac, StacCatalog};
use eofed_domain::node_id;
use eofed_graph::{
	GraphQuery, GraphQueryExecutor,
	models::{self, SourceRow},
	queries,
};
use eofed_providers::stac::StacClient;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StacSourceRecord {
	pub key: String,
	pub name: Option<String>,
	/// Base URL of the STAC API.
	pub api_url: String,
	/// Home page of the source.
	pub href: Option<String>,
}

pub struct StacSourceRegistry {
	graph: Arc<dyn GraphQueryExecutor>,
	graph_name: String,
	records: HashMap<String, StacSourceRecord>,
	catalogs: HashMap<String, Arc<StacClient>>,
}
impl StacSourceRegistry {
	/// Loads the source records. A graph failure leaves only the configured catalogs; sources
	/// without any API URL are skipped.
	pub async fn load(
		graph: Arc<dyn GraphQueryExecutor>,
		graph_name: &str,
		stac: &Stac,
	) -> Result<Self> {
		let rows = match graph.execute(GraphQuery::new(queries::ALL_STAC_SOURCES)).await {
			Ok(rows) => rows,
			Err(err) => {
				tracing::warn!(error = %err, "Failed to load STAC sources from the graph.");

				Vec::new()
			},
		};
		let (sources, skipped) = models::decode_rows::<SourceRow>(rows);

		if skipped > 0 {
			tracing::warn!(skipped, "Skipped malformed STAC source rows.");
		}

		let mut sources = sources
			.into_iter()
			.map(|source| (source.key.clone(), source))
			.collect::<HashMap<_, _>>();
		let mut records = HashMap::new();
		let mut catalogs = HashMap::new();

		for catalog in &stac.catalogs {
			let source = sources.remove(&catalog.source_key);
			let api_url = source
				.as_ref()
				.and_then(|source| source.api_link.as_deref())
				.filter(|url| !url.trim().is_empty())
				.unwrap_or(catalog.api_url.as_str());

			if api_url.trim().is_empty() {
				tracing::warn!(source_key = %catalog.source_key, "STAC source has no API URL.");

				continue;
			}

			let client = StacClient::new(api_url, catalog, stac)?;
			let record = StacSourceRecord {
				key: catalog.source_key.clone(),
				name: source.as_ref().and_then(|source| source.name.clone()),
				api_url: client.api_url().to_string(),
				href: source.and_then(|source| source.href),
			};

			catalogs.insert(record.key.clone(), Arc::new(client));
			records.insert(record.key.clone(), record);
		}

		// Sources the configuration does not mention are served unsigned, without previews.
		for (key, source) in sources {
			let Some(api_url) = source.api_link.filter(|url| !url.trim().is_empty()) else {
				tracing::warn!(source_key = %key, "STAC source has no API URL.");

				continue;
			};
			let catalog = StacCatalog {
				source_key: key.clone(),
				api_url: api_url.clone(),
				signer: "none".to_string(),
				preview_asset: None,
				token_url: None,
			};
			let client = StacClient::new(&api_url, &catalog, stac)?;
			let record = StacSourceRecord {
				key: key.clone(),
				name: source.name,
				api_url: client.api_url().to_string(),
				href: source.href,
			};

			catalogs.insert(key.clone(), Arc::new(client));
			records.insert(key, record);
		}

		Ok(Self { graph, graph_name: graph_name.to_string(), records, catalogs })
	}

	/// Finds the source owning a collection. Accepts bare keys and `STACCollection/<key>` ids.
	pub async fn resolve(&self, collection_id: &str) -> Option<String> {
		let collection_key = node_id::key_of(collection_id);

		if collection_key.is_empty() {
			return None;
		}

		let query = GraphQuery::new(queries::STAC_SOURCE_OF_COLLECTION)
			.bind("collection_key", collection_key)
			.bind("graph_name", self.graph_name.as_str());
		let rows = match self.graph.execute(query).await {
			Ok(rows) => rows,
			Err(err) => {
				tracing::warn!(error = %err, collection_id, "Failed to resolve STAC source.");

				return None;
			},
		};
		let (sources, _) = models::decode_rows::<SourceRow>(rows);

		if sources.len() > 1 {
			tracing::warn!(
				collection_id,
				owners = sources.len(),
				"Collection has several STAC sources. Using the first."
			);
		}

		sources.into_iter().next().map(|source| source.key)
	}

	pub fn record(&self, source_key: &str) -> Option<&StacSourceRecord> {
		self.records.get(source_key)
	}

	pub fn catalog_for(&self, source_key: &str) -> Option<Arc<StacClient>> {
		self.catalogs.get(source_key).cloned()
	}

	/// Resolves a collection straight to its catalog, or `NotFound`.
	pub async fn catalog_of(&self, collection_id: &str) -> Result<(String, Arc<StacClient>)> {
		let Some(source_key) = self.resolve(collection_id).await else {
			return Err(Error::NotFound {
				message: format!("No STAC source owns collection {collection_id}."),
			});
		};
		let Some(catalog) = self.catalog_for(&source_key) else {
			return Err(Error::NotFound {
				message: format!("STAC source {source_key} has no catalog."),
			});
		};

		Ok((source_key, catalog))
	}

	pub fn records(&self) -> impl Iterator<Item = &StacSourceRecord> {
		self.records.values()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
