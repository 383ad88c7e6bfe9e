//! Unified response schema shared by every retrieval operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use eofed_domain::{Bbox, EoKind, score::Scored};

/// A result of any kind, tagged by `kind` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResult {
	Publication(Publication),
	StacCollection(StacCollection),
	WebDocument(WebDocument),
	StacItem(StacItem),
	GeoTaggedPost(GeoTaggedPost),
}
impl SearchResult {
	pub fn base(&self) -> &ResultBase {
		match self {
			Self::Publication(result) => &result.base,
			Self::StacCollection(result) => &result.base,
			Self::WebDocument(result) => &result.base,
			Self::StacItem(result) => &result.base,
			Self::GeoTaggedPost(result) => &result.base,
		}
	}

	fn base_mut(&mut self) -> &mut ResultBase {
		match self {
			Self::Publication(result) => &mut result.base,
			Self::StacCollection(result) => &mut result.base,
			Self::WebDocument(result) => &mut result.base,
			Self::StacItem(result) => &mut result.base,
			Self::GeoTaggedPost(result) => &mut result.base,
		}
	}
}

impl Scored for SearchResult {
	fn score(&self) -> f32 {
		self.base().score
	}

	fn set_score(&mut self, score: f32) {
		self.base_mut().score = score;
	}
}

/// Fields every result carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBase {
	pub id: String,
	pub score: f32,
	pub title: String,
	#[serde(default)]
	pub graph_links: GraphLinks,
}
impl ResultBase {
	pub fn new(id: impl Into<String>, title: impl Into<String>, score: f32) -> Self {
		Self { id: id.into(), score, title: title.into(), graph_links: GraphLinks::default() }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLinks {
	pub keywords: Vec<EntityRef>,
	pub authors: Vec<EntityRef>,
	pub missions: Vec<EoReference>,
	pub instruments: Vec<EoReference>,
	pub source: Option<Provenance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
	pub id: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EoReference {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: EoKind,
	pub short_name: Option<String>,
	pub full_name: Option<String>,
}

/// The STAC source a collection or item was served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
	pub key: String,
	pub name: Option<String>,
	pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
	#[serde(flatten)]
	pub base: ResultBase,
	#[serde(rename = "abstract")]
	pub abstract_text: Option<String>,
	pub date: Option<String>,
	#[serde(rename = "type")]
	pub publication_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacCollection {
	#[serde(flatten)]
	pub base: ResultBase,
	pub description: Option<String>,
	pub license: Option<String>,
	/// First spatial extent box, when the collection declares one.
	pub bbox: Option<Bbox>,
	pub extent: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDocument {
	#[serde(flatten)]
	pub base: ResultBase,
	pub url: String,
	pub text: String,
	pub is_html: bool,
	pub backend: String,
	pub bbox: Option<Bbox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacItem {
	#[serde(flatten)]
	pub base: ResultBase,
	pub collection_id: String,
	pub datetime: Option<String>,
	pub bbox: Option<Bbox>,
	pub img_link: Option<String>,
	/// The feature as served by the catalog, with signed asset hrefs.
	pub item: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTaggedPost {
	#[serde(flatten)]
	pub base: ResultBase,
	pub text: Option<String>,
	pub url: Option<String>,
	pub author: Option<String>,
	pub created_at: Option<String>,
	pub lat: f64,
	pub lon: f64,
}

/// Variant names match the struct names they wrap.
macro_rules! scored_by_base {
	($($name:ident),+) => {
		$(
			impl Scored for $name {
				fn score(&self) -> f32 {
					self.base.score
				}

				fn set_score(&mut self, score: f32) {
					self.base.score = score;
				}
			}

			impl From<$name> for SearchResult {
				fn from(result: $name) -> Self {
					Self::$name(result)
				}
			}
		)+
	};
}

scored_by_base!(Publication, StacCollection, WebDocument, StacItem, GeoTaggedPost);

/// Id lists for [`crate::DataRetriever::graph_filtered_search`]. A document qualifies when it is
/// adjacent to any listed node through the relation that node type applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFilterRequest {
	#[serde(default)]
	pub keyword_ids: Vec<String>,
	#[serde(default)]
	pub author_ids: Vec<String>,
	#[serde(default)]
	pub eo_node_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFilterResults {
	pub publications: Vec<Publication>,
	pub stac_collections: Vec<StacCollection>,
}
