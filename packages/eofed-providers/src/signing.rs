//! Planetary Computer asset signing.
//!
//! Blob-hosted assets need a short-lived SAS token appended to their href. Tokens are issued per
//! collection and cached until shortly before they expire.

use std::{collections::HashMap, sync::Mutex};

use color_eyre::{Result, eyre};
use reqwest::{Client, Url};
use serde_json::Value;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

pub const DEFAULT_TOKEN_URL: &str = "https://planetarycomputer.microsoft.com/api/sas/v1/token";

const BLOB_HOST_SUFFIX: &str = ".blob.core.windows.net";
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasToken {
	pub token: String,
	pub expiry: OffsetDateTime,
}
impl SasToken {
	fn is_fresh(&self, now: OffsetDateTime) -> bool {
		now + EXPIRY_MARGIN < self.expiry
	}
}

#[derive(Debug)]
pub struct PlanetaryComputerSigner {
	client: Client,
	token_url: String,
	tokens: Mutex<HashMap<String, SasToken>>,
}
impl PlanetaryComputerSigner {
	pub fn new(client: Client, token_url: Option<&str>) -> Self {
		let token_url = token_url.unwrap_or(DEFAULT_TOKEN_URL).trim_end_matches('/').to_string();

		Self { client, token_url, tokens: Mutex::new(HashMap::new()) }
	}

	pub async fn token_for(&self, collection_id: &str) -> Result<String> {
		let now = OffsetDateTime::now_utc();
		let cached = self
			.lock_tokens()
			.get(collection_id)
			.filter(|token| token.is_fresh(now))
			.map(|token| token.token.clone());

		if let Some(token) = cached {
			return Ok(token);
		}

		let json: Value = self
			.client
			.get(format!("{}/{collection_id}", self.token_url))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		let token = parse_token(&json)?;
		let value = token.token.clone();

		self.lock_tokens().insert(collection_id.to_string(), token);

		Ok(value)
	}

	/// Signs every blob-hosted asset href of a STAC item in place. Returns the number of signed
	/// hrefs.
	pub async fn sign_item(&self, collection_id: &str, item: &mut Value) -> Result<usize> {
		let Some(assets) = item.get_mut("assets").and_then(Value::as_object_mut) else {
			return Ok(0);
		};

		if !assets.values().any(|asset| asset_href(asset).is_some_and(needs_signature)) {
			return Ok(0);
		}

		let token = self.token_for(collection_id).await?;
		let mut signed = 0;

		for asset in assets.values_mut() {
			let Some(href) = asset_href(asset).filter(|href| needs_signature(href)) else {
				continue;
			};
			let href = append_token(href, &token);

			asset["href"] = Value::String(href);
			signed += 1;
		}

		Ok(signed)
	}

	fn lock_tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, SasToken>> {
		self.tokens.lock().unwrap_or_else(|err| err.into_inner())
	}
}

pub fn parse_token(json: &Value) -> Result<SasToken> {
	let token = crate::str_at(json, "token")
		.ok_or_else(|| eyre::eyre!("SAS token response is missing token."))?
		.to_string();
	let expiry = crate::str_at(json, "msft:expiry")
		.ok_or_else(|| eyre::eyre!("SAS token response is missing msft:expiry."))?;
	let expiry = OffsetDateTime::parse(expiry, &Rfc3339)?;

	Ok(SasToken { token, expiry })
}

/// Blob-hosted hrefs that do not already carry a signature.
pub fn needs_signature(href: &str) -> bool {
	let Ok(url) = Url::parse(href) else {
		return false;
	};

	url.host_str().is_some_and(|host| host.ends_with(BLOB_HOST_SUFFIX))
		&& !url.query_pairs().any(|(key, _)| key == "sig")
}

fn append_token(href: &str, token: &str) -> String {
	let separator = if href.contains('?') { '&' } else { '?' };

	format!("{href}{separator}{}", token.trim_start_matches('?'))
}

fn asset_href(asset: &Value) -> Option<&str> {
	crate::str_at(asset, "href")
}
