use serde_json::Value;

use eofed_domain::node_id;
use eofed_graph::{GraphQuery, models::Document, queries};

use crate::{DataRetriever, EntityRef, EoReference, enrich};

impl DataRetriever {
	pub async fn list_keywords(&self) -> Vec<EntityRef> {
		let docs = self.list_documents(queries::ALL_KEYWORDS, "list_keywords").await;

		docs.iter().filter_map(enrich::keyword).collect()
	}

	pub async fn list_authors(&self) -> Vec<EntityRef> {
		let docs = self.list_documents(queries::ALL_AUTHORS, "list_authors").await;

		docs.iter().filter_map(enrich::author).collect()
	}

	/// Missions and instruments in one list.
	pub async fn list_eo_nodes(&self) -> Vec<EoReference> {
		let docs = self.list_documents(queries::ALL_EO_NODES, "list_eo_nodes").await;

		docs.iter().filter_map(enrich::eo_reference).collect()
	}

	/// Ids of every document tagged with `keyword`, given as free text or as a `Keyword/` id.
	pub async fn nodes_for_keyword(&self, keyword: &str) -> Vec<String> {
		let keyword = keyword.trim();
		let keyword_id = match node_id::collection_of(keyword) {
			Some(node_id::KEYWORD_COLLECTION) => keyword.to_string(),
			_ => node_id::keyword_id(keyword),
		};

		if node_id::key_of(&keyword_id).is_empty() {
			return Vec::new();
		}

		let query = GraphQuery::new(queries::NODES_FROM_KEYWORD).bind("keyword", keyword_id);

		ids(self.query_rows(query, "nodes_for_keyword").await)
	}

	/// Ids of the EO missions and instruments a document mentions.
	pub async fn related_eo_nodes(&self, document_id: &str) -> Vec<String> {
		let document_id = document_id.trim();

		if node_id::collection_of(document_id).is_none() {
			tracing::warn!(document_id, "Related EO lookup needs a full node id.");

			return Vec::new();
		}

		let query = GraphQuery::new(queries::EO_FROM_NODE).bind("node_id", document_id);

		ids(self.query_rows(query, "related_eo_nodes").await)
	}

	async fn list_documents(&self, template: &'static str, operation: &str) -> Vec<Document> {
		let query = GraphQuery::new(template).with_batch_size(self.cfg.search.listing_batch_size);

		self.query_rows(query, operation)
			.await
			.into_iter()
			.filter_map(|row| match row {
				Value::Object(doc) => Some(doc),
				_ => None,
			})
			.collect()
	}
}

fn ids(rows: Vec<Value>) -> Vec<String> {
	rows.into_iter()
		.filter_map(|row| match row {
			Value::String(id) => Some(id),
			_ => None,
		})
		.collect()
}
