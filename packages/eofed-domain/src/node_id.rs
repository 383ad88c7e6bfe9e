//! Helpers for the `<Collection>/<key>` document ids used by the knowledge graph.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const KEYWORD_COLLECTION: &str = "Keyword";
pub const STAC_COLLECTION_COLLECTION: &str = "STACCollection";
pub const PUBLICATION_COLLECTION: &str = "Publication";
pub const EO_MISSION_COLLECTION: &str = "EOMission";
pub const EO_INSTRUMENT_COLLECTION: &str = "EOInstrument";

static NON_ALPHANUMERIC: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new("[^A-Za-z0-9]+").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EoKind {
	Mission,
	Instrument,
}

pub fn collection_of(id: &str) -> Option<&str> {
	id.split_once('/').map(|(collection, _)| collection)
}

/// Returns the document key for either a bare key or a full `<Collection>/<key>` id.
pub fn key_of(id: &str) -> &str {
	id.split_once('/').map(|(_, key)| key).unwrap_or(id).trim()
}

/// Classifies an EO node id by its collection prefix.
pub fn eo_kind(id: &str) -> Option<EoKind> {
	match collection_of(id)? {
		EO_MISSION_COLLECTION => Some(EoKind::Mission),
		EO_INSTRUMENT_COLLECTION => Some(EoKind::Instrument),
		_ => None,
	}
}

/// Keyword nodes are keyed by the lowercase keyword with every non-alphanumeric run removed.
pub fn key_from_keyword(keyword: &str) -> String {
	let lowered = keyword.to_lowercase();

	match NON_ALPHANUMERIC.as_ref() {
		Some(re) => re.replace_all(&lowered, "").into_owned(),
		None => lowered.chars().filter(char::is_ascii_alphanumeric).collect(),
	}
}

pub fn keyword_id(keyword: &str) -> String {
	format!("{KEYWORD_COLLECTION}/{}", key_from_keyword(keyword))
}
