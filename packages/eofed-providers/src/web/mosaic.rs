use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::web::{WebHit, webindex};
use eofed_config::WebIndex;
use eofed_domain::Bbox;

pub async fn search(
	client: &Client,
	cfg: &WebIndex,
	query: &str,
	limit: u32,
) -> Result<Vec<WebHit>> {
	let limit = limit.to_string();
	let json: Value = client
		.get(&cfg.endpoint)
		.query(&[("q", query), ("index", cfg.index.as_str()), ("limit", limit.as_str())])
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?;

	parse_response(&json)
}

/// Entries in `results` are either hits or objects mapping an index name to its hits.
pub fn parse_response(json: &Value) -> Result<Vec<WebHit>> {
	let results = json
		.get("results")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Mosaic response is missing results array."))?;
	let mut hits = Vec::new();

	for entry in results {
		if entry.get("url").is_some() {
			hits.extend(parse_hit(entry));

			continue;
		}

		let Some(per_index) = entry.as_object() else {
			continue;
		};

		for index_hits in per_index.values() {
			let Some(index_hits) = index_hits.as_array() else {
				continue;
			};

			hits.extend(index_hits.iter().filter_map(parse_hit));
		}
	}

	Ok(hits)
}

fn parse_hit(hit: &Value) -> Option<WebHit> {
	let mut parsed = webindex::parse_hit(hit)?;

	parsed.bbox = hit
		.get("bbox")
		.and_then(Value::as_array)
		.and_then(|coords| coords.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
		.and_then(|coords| Bbox::from_wsen(&coords));

	Some(parsed)
}
