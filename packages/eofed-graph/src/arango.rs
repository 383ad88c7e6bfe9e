//! ArangoDB HTTP cursor client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::{BoxFuture, Error, GraphQuery, GraphQueryExecutor, Result};

pub struct ArangoExecutor {
	client: Client,
	cursor_url: String,
	username: String,
	password: Option<String>,
	batch_size: u32,
}
impl ArangoExecutor {
	pub fn new(cfg: &eofed_config::Graph) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let cursor_url = format!("{}/_db/{}/_api/cursor", cfg.url, cfg.database);

		Ok(Self {
			client,
			cursor_url,
			username: cfg.username.clone(),
			password: cfg.password.clone(),
			batch_size: cfg.batch_size,
		})
	}

	pub async fn run(&self, query: GraphQuery) -> Result<Vec<Value>> {
		let body = serde_json::json!({
			"query": query.template,
			"bindVars": query.bind_vars,
			"batchSize": query.batch_size.unwrap_or(self.batch_size),
		});
		let mut page = self.send(self.client.post(&self.cursor_url).json(&body)).await?;
		let mut rows = std::mem::take(&mut page.result);

		while page.has_more {
			let Some(cursor_id) = page.id.take() else {
				return Err(Error::Query {
					message: "Cursor reported more results without a cursor id.".to_string(),
					error_num: None,
				});
			};

			page = self.send(self.client.post(format!("{}/{cursor_id}", self.cursor_url))).await?;

			rows.append(&mut page.result);
		}

		Ok(rows)
	}

	async fn send(&self, request: RequestBuilder) -> Result<CursorPage> {
		let res = request.basic_auth(&self.username, self.password.as_deref()).send().await?;
		let status = res.status();
		let bytes = res.bytes().await?;
		let page = match serde_json::from_slice::<CursorPage>(&bytes) {
			Ok(page) => page,
			Err(err) if status.is_success() => return Err(Error::Decode(err)),
			Err(_) =>
				return Err(Error::Query {
					message: format!("Graph store returned HTTP {status}."),
					error_num: None,
				}),
		};

		if page.error || !status.is_success() {
			return Err(Error::Query {
				message: page
					.error_message
					.unwrap_or_else(|| format!("Graph store returned HTTP {status}.")),
				error_num: page.error_num,
			});
		}

		Ok(page)
	}
}

impl GraphQueryExecutor for ArangoExecutor {
	fn execute<'a>(&'a self, query: GraphQuery) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(self.run(query))
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorPage {
	#[serde(default)]
	result: Vec<Value>,
	#[serde(default)]
	has_more: bool,
	#[serde(default)]
	id: Option<String>,
	#[serde(default)]
	error: bool,
	#[serde(default)]
	error_message: Option<String>,
	#[serde(default)]
	error_num: Option<i64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_error_bodies() {
		let page: CursorPage = serde_json::from_str(
			r#"{"error":true,"code":400,"errorNum":1501,"errorMessage":"syntax error"}"#,
		)
		.expect("Failed to decode error body.");

		assert!(page.error);
		assert_eq!(page.error_num, Some(1501));
		assert_eq!(page.error_message.as_deref(), Some("syntax error"));
		assert!(page.result.is_empty());
	}
}
