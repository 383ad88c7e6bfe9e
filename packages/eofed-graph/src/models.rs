//! Raw rows returned by the templates in [`crate::queries`].

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

/// A primary document with its one-hop adjacency lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjacencyRow {
	pub doc: Document,
	#[serde(default)]
	pub score: Option<f64>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub eo_nodes: Vec<Document>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub authors: Vec<Document>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub keywords: Vec<Document>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub sources: Vec<SourceRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceRow {
	pub key: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub href: Option<String>,
	#[serde(default)]
	pub api_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRow {
	#[serde(rename = "_id")]
	pub id: String,
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub created_at: Option<String>,
	pub lat: f64,
	pub lon: f64,
}

/// Decodes every row that fits `T`; rows that do not are skipped and counted.
pub fn decode_rows<T>(rows: Vec<Value>) -> (Vec<T>, usize)
where
	T: DeserializeOwned,
{
	let mut decoded = Vec::with_capacity(rows.len());
	let mut skipped = 0;

	for row in rows {
		match serde_json::from_value(row) {
			Ok(value) => decoded.push(value),
			Err(err) => {
				skipped += 1;

				tracing::debug!(error = %err, "Skipping malformed graph row.");
			},
		}
	}

	(decoded, skipped)
}

pub fn str_field<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
	doc.get(field).and_then(Value::as_str).filter(|value| !value.trim().is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn null_adjacency_lists_decode_empty() {
		let row: AdjacencyRow = serde_json::from_value(json!({
			"doc": { "_id": "Publication/p1", "title": "Floods" },
			"score": 2.5,
			"eo_nodes": null,
			"keywords": [{ "_id": "Keyword/flood", "keyword_full": "Flood" }]
		}))
		.expect("Failed to decode row.");

		assert!(row.eo_nodes.is_empty());
		assert!(row.authors.is_empty());
		assert_eq!(row.keywords.len(), 1);
		assert_eq!(row.score, Some(2.5));
	}

	#[test]
	fn malformed_rows_are_counted() {
		let (rows, skipped) = decode_rows::<SourceRow>(vec![
			json!({ "key": "terrabyte_collections" }),
			json!("Keyword/flood"),
			json!({ "name": "missing key" }),
		]);

		assert_eq!(rows.len(), 1);
		assert_eq!(skipped, 2);
	}
}
