use serde_json::Value;

use eofed_graph::{
	GraphQuery,
	models::{self, AdjacencyRow},
	queries,
};

use crate::{
	DataRetriever, GraphFilterRequest, GraphFilterResults, collections::stac_collection,
	publications::publication,
};

impl DataRetriever {
	/// Documents adjacent to any listed keyword, author, or EO node.
	///
	/// Publications match through all three relations, collections through keywords and EO
	/// nodes only. Each list is scored as its own batch.
	pub async fn graph_filtered_search(&self, req: &GraphFilterRequest) -> GraphFilterResults {
		let keyword_ids = clean_ids(&req.keyword_ids);
		let author_ids = clean_ids(&req.author_ids);
		let eo_node_ids = clean_ids(&req.eo_node_ids);
		let mut results = GraphFilterResults::default();

		if keyword_ids.is_empty() && author_ids.is_empty() && eo_node_ids.is_empty() {
			return results;
		}

		let query = GraphQuery::new(queries::GRAPH_FILTER_PUBLICATIONS)
			.bind("keyword_list", keyword_ids.clone())
			.bind("author_list", author_ids)
			.bind("eo_list", eo_node_ids.clone());
		let rows = self.adjacency_rows(query, "graph_filter_publications").await;

		results.publications = rows.iter().filter_map(publication).collect();

		if !keyword_ids.is_empty() || !eo_node_ids.is_empty() {
			let query = GraphQuery::new(queries::GRAPH_FILTER_COLLECTIONS)
				.bind("keyword_list", keyword_ids)
				.bind("eo_list", eo_node_ids);
			let rows = self.adjacency_rows(query, "graph_filter_collections").await;

			results.stac_collections = rows.iter().filter_map(stac_collection).collect();
		}

		eofed_domain::score::normalize(&mut results.publications);
		eofed_domain::score::normalize(&mut results.stac_collections);

		results
	}

	async fn adjacency_rows(&self, query: GraphQuery, operation: &str) -> Vec<AdjacencyRow> {
		let rows = self.query_rows(query, operation).await;
		let (rows, skipped) = models::decode_rows::<AdjacencyRow>(rows);

		if skipped > 0 {
			tracing::warn!(skipped, operation, "Skipped malformed graph filter rows.");
		}

		rows
	}
}

/// Trimmed, non-empty, first occurrence only.
fn clean_ids(ids: &[String]) -> Vec<Value> {
	let mut cleaned: Vec<&str> = Vec::with_capacity(ids.len());

	for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
		if !cleaned.contains(&id) {
			cleaned.push(id);
		}
	}

	cleaned.into_iter().map(Value::from).collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn ids_are_trimmed_and_deduplicated() {
		let ids = ["Keyword/flood", " Keyword/flood ", "", "Keyword/fire"].map(str::to_string);

		assert_eq!(clean_ids(&ids), vec![json!("Keyword/flood"), json!("Keyword/fire")]);
	}
}
