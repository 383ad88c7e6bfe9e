use serde_json::Value;

use eofed_domain::{Bbox, LocationFilter, TimeInterval, geometry};
use eofed_providers::stac::ItemSearch;

use crate::{DataRetriever, Provenance, ResultBase, Result, StacItem};

impl DataRetriever {
	/// Searches the catalog owning `collection_id` for items intersecting the location filters
	/// inside the time interval.
	///
	/// Fails with `NotFound` only when no catalog owns the collection. Catalog failures yield an
	/// empty list. Items are ranked in catalog order.
	pub async fn search_stac_items(
		&self,
		collection_id: &str,
		location_filters: &[LocationFilter],
		time_interval: Option<TimeInterval>,
		limit: Option<u32>,
	) -> Result<Vec<StacItem>> {
		let (source_key, catalog) = self.registry.catalog_of(collection_id).await?;
		let collection_key = eofed_domain::node_id::key_of(collection_id);
		let limit = limit
			.unwrap_or(self.cfg.search.default_item_limit)
			.min(self.cfg.search.max_item_limit);
		let geometry = geometry::to_geometry(location_filters);
		let search = ItemSearch {
			collection_id: collection_key,
			intersects: geometry.as_ref(),
			datetime: time_interval.map(|interval| interval.to_stac_datetime()),
			limit,
		};
		let features = match catalog.search_items(&search).await {
			Ok(features) => features,
			Err(err) => {
				tracing::warn!(
					error = %err,
					collection_id,
					source_key = %source_key,
					"STAC item search failed."
				);

				return Ok(Vec::new());
			},
		};
		let provenance = self.registry.record(&source_key).map(|record| Provenance {
			key: record.key.clone(),
			name: record.name.clone(),
			href: record.href.clone(),
		});
		let total = features.len();
		let mut items = features
			.into_iter()
			.enumerate()
			.map(|(rank, feature)| {
				let mut item = stac_item(collection_key, feature, (total - rank) as f32);

				item.base.graph_links.source = provenance.clone();

				item
			})
			.collect::<Vec<_>>();

		eofed_domain::score::normalize(&mut items);

		Ok(items)
	}
}

fn stac_item(collection_key: &str, feature: Value, raw_score: f32) -> StacItem {
	let id = feature.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
	let properties = feature.get("properties");
	let title = properties
		.and_then(|properties| properties.get("title"))
		.and_then(Value::as_str)
		.unwrap_or(id.as_str())
		.to_string();
	let datetime = properties
		.and_then(|properties| properties.get("datetime"))
		.and_then(Value::as_str)
		.map(str::to_string);
	let bbox = feature
		.get("bbox")
		.and_then(Value::as_array)
		.and_then(|coords| coords.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
		.and_then(|coords| Bbox::from_wsen(&coords));
	let img_link = feature.get("img_link").and_then(Value::as_str).map(str::to_string);
	let collection_id = feature
		.get("collection")
		.and_then(Value::as_str)
		.unwrap_or(collection_key)
		.to_string();

	StacItem {
		base: ResultBase::new(id, title, raw_score),
		collection_id,
		datetime,
		bbox,
		img_link,
		item: feature,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn item_projection_reads_feature_fields() {
		let item = stac_item(
			"gnatsgo-tables",
			json!({
				"id": "CONUS",
				"bbox": [-100.0, 30.0, -90.0, 40.0],
				"properties": { "datetime": "2021-01-15T00:00:00Z" },
				"img_link": null
			}),
			3.0,
		);

		assert_eq!(item.base.id, "CONUS");
		assert_eq!(item.base.title, "CONUS");
		assert_eq!(item.collection_id, "gnatsgo-tables");
		assert_eq!(item.datetime.as_deref(), Some("2021-01-15T00:00:00Z"));
		assert_eq!(item.bbox, Some(Bbox::new(30.0, -100.0, 40.0, -90.0)));
		assert_eq!(item.img_link, None);
	}
}
