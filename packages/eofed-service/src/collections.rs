use serde_json::Value;

use eofed_domain::{Bbox, LocationFilter, geometry};
use eofed_graph::{
	GraphQuery,
	models::{self, AdjacencyRow, str_field},
	queries,
};

use crate::{DataRetriever, ResultBase, StacCollection, enrich};

impl DataRetriever {
	/// Semantic collection search: the search text is embedded and compared against the stored
	/// collection embeddings, keeping matches above the similarity threshold.
	///
	/// Collections whose declared extent does not touch any location filter are dropped; those
	/// without a usable extent are kept.
	pub async fn search_stac_collections(
		&self,
		query: &str,
		keywords: &[String],
		location_filters: &[LocationFilter],
	) -> Vec<StacCollection> {
		let text = crate::search_text(query, keywords);

		if text.is_empty() {
			return Vec::new();
		}

		let embedding =
			match self.providers.embedding.embed_query(&self.cfg.providers.embedding, &text).await {
				Ok(embedding) => embedding,
				Err(err) => {
					tracing::warn!(error = %err, "Failed to embed collection query.");

					return Vec::new();
				},
			};
		let query = GraphQuery::new(queries::COLLECTION_SIMILARITY)
			.bind("query_embedding", embedding)
			.bind("sim_threshold", self.cfg.search.collection_sim_threshold);
		let rows = self.query_rows(query, "search_stac_collections").await;
		let (rows, skipped) = models::decode_rows::<AdjacencyRow>(rows);

		if skipped > 0 {
			tracing::warn!(skipped, "Skipped malformed collection rows.");
		}

		let mut collections = rows
			.iter()
			.filter_map(stac_collection)
			.filter(|collection| {
				collection.bbox.is_none_or(|bbox| geometry::matches_any(&bbox, location_filters))
			})
			.collect::<Vec<_>>();

		eofed_domain::score::normalize(&mut collections);

		collections
	}
}

pub(crate) fn stac_collection(row: &AdjacencyRow) -> Option<StacCollection> {
	let id = str_field(&row.doc, "_id")?;
	let title = str_field(&row.doc, "title")
		.or_else(|| str_field(&row.doc, "id"))
		.unwrap_or_else(|| eofed_domain::node_id::key_of(id));
	let mut base = ResultBase::new(id, title, row.score.unwrap_or_default() as f32);
	let extent = row.doc.get("extent").filter(|extent| !extent.is_null()).cloned();

	base.graph_links = enrich::graph_links(row);

	Some(StacCollection {
		base,
		description: str_field(&row.doc, "description").map(str::to_string),
		license: str_field(&row.doc, "license").map(str::to_string),
		bbox: extent.as_ref().and_then(extent_bbox),
		extent,
	})
}

/// First box of `extent.spatial.bbox`, in STAC `[west, south, east, north]` order.
fn extent_bbox(extent: &Value) -> Option<Bbox> {
	let first = extent.get("spatial")?.get("bbox")?.as_array()?.first()?.as_array()?;
	let coords = first.iter().map(Value::as_f64).collect::<Option<Vec<_>>>()?;

	Bbox::from_wsen(&coords)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn extent_bbox_reads_first_spatial_box() {
		let extent = json!({
			"spatial": { "bbox": [[-180.0, -90.0, 180.0, 90.0], [5.0, 45.0, 15.0, 55.0]] },
			"temporal": { "interval": [["2015-06-27T10:25:31Z", null]] }
		});

		assert_eq!(extent_bbox(&extent), Some(Bbox::new(-90.0, -180.0, 90.0, 180.0)));
		assert_eq!(extent_bbox(&json!({ "spatial": { "bbox": [] } })), None);
		assert_eq!(extent_bbox(&json!({ "spatial": { "bbox": [["a", 1, 2, 3]] } })), None);
	}

	#[test]
	fn collection_title_falls_back_to_stac_id() {
		let row: AdjacencyRow = serde_json::from_value(json!({
			"doc": { "_id": "STACCollection/gnatsgotables", "id": "gnatsgo-tables" },
			"score": 0.4
		}))
		.expect("Failed to decode row.");
		let collection = stac_collection(&row).expect("Collection should project.");

		assert_eq!(collection.base.title, "gnatsgo-tables");
		assert_eq!(collection.bbox, None);
		assert_eq!(collection.extent, None);
	}
}
