//! STAC API item search with paging, optional asset signing, and preview links.

use color_eyre::Result;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::signing::PlanetaryComputerSigner;
use eofed_config::{Stac, StacCatalog};
use eofed_domain::Geometry;

/// Upper bound on followed `next` links for a single search.
const MAX_PAGES: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemSearch<'a> {
	pub collection_id: &'a str,
	pub intersects: Option<&'a Geometry>,
	/// `start/end` interval.
	pub datetime: Option<String>,
	pub limit: u32,
}

#[derive(Debug)]
pub struct StacClient {
	client: Client,
	api_url: String,
	page_size: u32,
	preview_asset: Option<String>,
	signer: Option<PlanetaryComputerSigner>,
}
impl StacClient {
	pub fn new(api_url: &str, catalog: &StacCatalog, stac: &Stac) -> Result<Self> {
		let client = crate::http_client(stac.timeout_ms)?;
		let signer = (catalog.signer == "planetary_computer").then(|| {
			PlanetaryComputerSigner::new(client.clone(), catalog.token_url.as_deref())
		});

		Ok(Self {
			client,
			api_url: api_url.trim_end_matches('/').to_string(),
			page_size: stac.page_size.max(1),
			preview_asset: catalog.preview_asset.clone(),
			signer,
		})
	}

	pub fn api_url(&self) -> &str {
		&self.api_url
	}

	pub fn is_signed(&self) -> bool {
		self.signer.is_some()
	}

	/// Collects up to `limit` items in catalog order. Every returned item carries an `img_link`
	/// field, `null` when the catalog has no preview asset for it.
	pub async fn search_items(&self, search: &ItemSearch<'_>) -> Result<Vec<Value>> {
		let limit = search.limit as usize;
		let mut items = Vec::new();

		if limit == 0 {
			return Ok(items);
		}

		let mut body = serde_json::json!({
			"collections": [search.collection_id],
			"limit": self.page_size.min(search.limit),
		});

		if let Some(geometry) = search.intersects {
			body["intersects"] = serde_json::to_value(geometry)?;
		}
		if let Some(datetime) = &search.datetime {
			body["datetime"] = Value::String(datetime.clone());
		}

		let mut next = Some(PageRequest::Post { href: format!("{}/search", self.api_url), body });
		let mut pages = 0;

		while let Some(request) = next.take() {
			let page = self.fetch(&request).await?;
			let features =
				page.get("features").and_then(Value::as_array).cloned().unwrap_or_default();
			let exhausted = features.is_empty();

			pages += 1;

			items.extend(features.into_iter().take(limit - items.len()));

			if items.len() >= limit || exhausted {
				break;
			}
			if pages >= MAX_PAGES {
				tracing::warn!(
					collection_id = search.collection_id,
					pages,
					"Stopped following STAC next links."
				);

				break;
			}

			next = next_page(&page, &request);
		}

		for item in &mut items {
			self.decorate(search.collection_id, item).await;
		}

		Ok(items)
	}

	async fn fetch(&self, request: &PageRequest) -> Result<Value> {
		let builder = match request {
			PageRequest::Get { href } => self.client.get(href),
			PageRequest::Post { href, body } => self.client.post(href).json(body),
		};

		Ok(builder.send().await?.error_for_status()?.json().await?)
	}

	async fn decorate(&self, collection_id: &str, item: &mut Value) {
		if let Some(signer) = &self.signer
			&& let Err(err) = signer.sign_item(collection_id, item).await
		{
			tracing::warn!(error = %err, collection_id, "Failed to sign STAC item assets.");
		}

		let img_link = self.preview_asset.as_deref().and_then(|asset| preview_href(item, asset));

		if let Some(object) = item.as_object_mut() {
			let img_link = img_link.map(Value::String).unwrap_or(Value::Null);

			object.insert("img_link".to_string(), img_link);
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
enum PageRequest {
	Get { href: String },
	Post { href: String, body: Value },
}

pub fn preview_href(item: &Value, asset: &str) -> Option<String> {
	item.get("assets")?.get(asset)?.get("href")?.as_str().map(str::to_string)
}

/// Builds the request for the `rel="next"` link of a page. POST links reuse the previous body,
/// replaced by the link body or merged with it when the link sets `merge`.
fn next_page(page: &Value, previous: &PageRequest) -> Option<PageRequest> {
	let link = page
		.get("links")?
		.as_array()?
		.iter()
		.find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))?;
	let href = link.get("href")?.as_str()?.to_string();
	let method = link.get("method").and_then(Value::as_str).unwrap_or("GET");

	if !method.eq_ignore_ascii_case("POST") {
		return Some(PageRequest::Get { href });
	}

	let previous_body = match previous {
		PageRequest::Post { body, .. } => body.clone(),
		PageRequest::Get { .. } => Value::Object(Map::new()),
	};
	let merge = link.get("merge").and_then(Value::as_bool).unwrap_or(false);
	let body = match link.get("body") {
		Some(Value::Object(link_body)) if merge => {
			let mut merged = previous_body;

			if let Some(merged) = merged.as_object_mut() {
				for (key, value) in link_body {
					merged.insert(key.clone(), value.clone());
				}
			}

			merged
		},
		Some(link_body @ Value::Object(_)) => link_body.clone(),
		_ => previous_body,
	};

	Some(PageRequest::Post { href, body })
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn first_request() -> PageRequest {
		PageRequest::Post {
			href: "https://stac.example/search".to_string(),
			body: json!({ "collections": ["gnatsgo-tables"], "limit": 2 }),
		}
	}

	#[test]
	fn get_next_links_are_followed_verbatim() {
		let page = json!({
			"links": [
				{ "rel": "self", "href": "https://stac.example/search" },
				{ "rel": "next", "href": "https://stac.example/search?token=abc" }
			]
		});

		assert_eq!(
			next_page(&page, &first_request()),
			Some(PageRequest::Get { href: "https://stac.example/search?token=abc".to_string() })
		);
	}

	#[test]
	fn merged_post_links_keep_previous_body() {
		let page = json!({
			"links": [{
				"rel": "next",
				"href": "https://stac.example/search",
				"method": "POST",
				"merge": true,
				"body": { "token": "next:abc" }
			}]
		});
		let Some(PageRequest::Post { body, .. }) = next_page(&page, &first_request()) else {
			panic!("Expected a POST request.");
		};

		assert_eq!(
			body,
			json!({ "collections": ["gnatsgo-tables"], "limit": 2, "token": "next:abc" })
		);
	}

	#[test]
	fn pages_without_next_link_end_the_search() {
		assert_eq!(next_page(&json!({ "links": [] }), &first_request()), None);
		assert_eq!(next_page(&json!({}), &first_request()), None);
	}

	#[test]
	fn preview_href_reads_named_asset() {
		let item = json!({
			"assets": { "rendered_preview": { "href": "https://pc.example/preview.png" } }
		});

		assert_eq!(
			preview_href(&item, "rendered_preview").as_deref(),
			Some("https://pc.example/preview.png")
		);
		assert_eq!(preview_href(&item, "thumbnail"), None);
	}
}
