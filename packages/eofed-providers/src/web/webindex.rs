use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::{str_at, web::WebHit};
use eofed_config::WebIndex;

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

pub fn parse_response(json: &Value) -> Result<Vec<WebHit>> {
	let results = json
		.get("results")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Web index response is missing results array."))?;

	Ok(results.iter().filter_map(parse_hit).collect())
}

/// Reads one `{title, url, textSnippet}` hit. Shared with the mosaic backend.
pub(crate) fn parse_hit(hit: &Value) -> Option<WebHit> {
	let url = str_at(hit, "url")?;

	Some(WebHit {
		title: str_at(hit, "title").unwrap_or_default().to_string(),
		url: url.to_string(),
		text: str_at(hit, "textSnippet").unwrap_or_default().to_string(),
		is_html: false,
		raw_score: hit.get("score").and_then(Value::as_f64).map(|score| score as f32),
		bbox: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hits_without_url_are_dropped() {
		let json = serde_json::json!({
			"results": [
				{ "title": "DLR EOC", "url": "https://www.dlr.de/eoc", "textSnippet": "Earth Observation Center" },
				{ "title": "Orphan" }
			]
		});
		let hits = parse_response(&json).expect("Failed to parse web index response.");

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].text, "Earth Observation Center");
		assert_eq!(hits[0].raw_score, None);
		assert!(!hits[0].is_html);
	}
}
