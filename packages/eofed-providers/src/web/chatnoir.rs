use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::{str_at, web::WebHit};
use eofed_config::ChatNoir;

pub async fn search(
	client: &Client,
	cfg: &ChatNoir,
	query: &str,
	limit: u32,
) -> Result<Vec<WebHit>> {
	let body = serde_json::json!({
		"apikey": cfg.api_key,
		"query": query,
		"index": cfg.indices,
		"size": limit,
	});
	let json: Value =
		client.post(&cfg.endpoint).json(&body).send().await?.error_for_status()?.json().await?;

	parse_response(&json)
}

/// Snippets and titles carry `<em>` highlighting, so hits are flagged as HTML.
pub fn parse_response(json: &Value) -> Result<Vec<WebHit>> {
	let results = json
		.get("results")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("ChatNoir response is missing results array."))?;

	Ok(results
		.iter()
		.filter_map(|result| {
			let url = str_at(result, "target_uri")?;

			Some(WebHit {
				title: str_at(result, "title").unwrap_or_default().to_string(),
				url: url.to_string(),
				text: str_at(result, "snippet").unwrap_or_default().to_string(),
				is_html: true,
				raw_score: result.get("score").and_then(Value::as_f64).map(|score| score as f32),
				bbox: None,
			})
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_scored_hits() {
		let json = serde_json::json!({
			"meta": { "query_time": 12, "total_results": 2 },
			"results": [
				{
					"score": 1530.2,
					"title": "<em>Flood</em> maps",
					"target_uri": "https://example.org/floods",
					"snippet": "Recent <em>flood</em> extents"
				},
				{ "score": 900.0, "title": "No target" }
			]
		});
		let hits = parse_response(&json).expect("Failed to parse ChatNoir response.");

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].url, "https://example.org/floods");
		assert_eq!(hits[0].raw_score, Some(1530.2));
		assert!(hits[0].is_html);
	}
}
