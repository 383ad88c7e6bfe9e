//! OpenAI-compatible embeddings endpoint used for semantic collection search.

use color_eyre::{Result, eyre};
use serde_json::Value;

use eofed_config::EmbeddingProviderConfig;

pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(&json, cfg.dimensions as usize)?;

	if vectors.len() != texts.len() {
		return Err(eyre::eyre!(
			"Embedding response returned {} vectors for {} inputs.",
			vectors.len(),
			texts.len()
		));
	}

	Ok(vectors)
}

/// Embeds a single query string.
pub async fn embed_query(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	embed(cfg, &[text.to_string()])
		.await?
		.pop()
		.ok_or_else(|| eyre::eyre!("Embedding response is empty."))
}

fn parse_embedding_response(json: &Value, dimensions: usize) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(Value::as_array)
		.ok_or_else(|| eyre::eyre!("Embedding response is missing data array."))?;
	let mut indexed = Vec::with_capacity(data.len());

	for (position, item) in data.iter().enumerate() {
		let index =
			item.get("index").and_then(Value::as_u64).map(|v| v as usize).unwrap_or(position);
		let vector = item
			.get("embedding")
			.and_then(Value::as_array)
			.ok_or_else(|| eyre::eyre!("Embedding item {index} is missing its vector."))?
			.iter()
			.map(|value| value.as_f64().map(|number| number as f32))
			.collect::<Option<Vec<f32>>>()
			.ok_or_else(|| eyre::eyre!("Embedding item {index} holds a non-numeric value."))?;

		if vector.len() != dimensions {
			return Err(eyre::eyre!(
				"Embedding item {index} has {} dimensions, expected {dimensions}.",
				vector.len()
			));
		}

		indexed.push((index, vector));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vectors_follow_response_index() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(&json, 2).expect("Failed to parse embeddings.");

		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn dimension_mismatch_is_rejected() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": [1.0, 2.0, 3.0] }] });
		let err = parse_embedding_response(&json, 768).expect_err("Mismatch must fail.");

		assert!(err.to_string().contains("expected 768"));
	}
}
