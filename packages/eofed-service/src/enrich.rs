//! Projects raw graph adjacency onto [`GraphLinks`].
//!
//! Enrichment never fails a result: adjacent documents that cannot be projected are dropped and
//! the matching field stays empty.

use eofed_domain::{EoKind, node_id};
use eofed_graph::models::{AdjacencyRow, Document, SourceRow, str_field};

use crate::results::{EntityRef, EoReference, GraphLinks, Provenance};

pub fn graph_links(row: &AdjacencyRow) -> GraphLinks {
	let (missions, instruments) = eo_references(&row.eo_nodes);

	GraphLinks {
		keywords: keywords(&row.keywords),
		authors: authors(&row.authors),
		missions,
		instruments,
		source: provenance(&row.sources),
	}
}

pub fn keywords(docs: &[Document]) -> Vec<EntityRef> {
	docs.iter().filter_map(keyword).collect()
}

pub fn keyword(doc: &Document) -> Option<EntityRef> {
	let id = str_field(doc, "_id")?;
	let name = str_field(doc, "keyword_full").unwrap_or_else(|| node_id::key_of(id));

	Some(EntityRef { id: id.to_string(), name: name.to_string() })
}

pub fn authors(docs: &[Document]) -> Vec<EntityRef> {
	docs.iter().filter_map(author).collect()
}

/// Display name is `first last`, falling back to whichever part exists and finally the key.
pub fn author(doc: &Document) -> Option<EntityRef> {
	let id = str_field(doc, "_id")?;
	let parts = [str_field(doc, "first_name"), str_field(doc, "last_name")];
	let name = parts.into_iter().flatten().map(str::trim).collect::<Vec<_>>().join(" ");
	let name = if name.is_empty() { node_id::key_of(id).to_string() } else { name };

	Some(EntityRef { id: id.to_string(), name })
}

/// Splits EO nodes into `(missions, instruments)` by id prefix. Nodes of any other collection
/// are ignored.
pub fn eo_references(docs: &[Document]) -> (Vec<EoReference>, Vec<EoReference>) {
	let mut missions = Vec::new();
	let mut instruments = Vec::new();

	for reference in docs.iter().filter_map(eo_reference) {
		match reference.kind {
			EoKind::Mission => missions.push(reference),
			EoKind::Instrument => instruments.push(reference),
		}
	}

	(missions, instruments)
}

pub fn eo_reference(doc: &Document) -> Option<EoReference> {
	let id = str_field(doc, "_id")?;
	let kind = node_id::eo_kind(id)?;
	let (short_field, full_field) = match kind {
		EoKind::Mission => ("mission_name_short", "mission_name_full"),
		EoKind::Instrument => ("instrument_name_short", "instrument_name_full"),
	};

	Some(EoReference {
		id: id.to_string(),
		kind,
		short_name: str_field(doc, short_field).map(str::to_string),
		full_name: str_field(doc, full_field).map(str::to_string),
	})
}

/// A single owning source becomes the provenance record. None or several leave it empty.
pub fn provenance(sources: &[SourceRow]) -> Option<Provenance> {
	let [source] = sources else {
		return None;
	};

	Some(Provenance {
		key: source.key.clone(),
		name: source.name.clone(),
		href: source.href.clone(),
	})
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn doc(value: serde_json::Value) -> Document {
		serde_json::from_value(value).expect("Failed to build document.")
	}

	#[test]
	fn eo_nodes_are_partitioned_by_prefix() {
		let (missions, instruments) = eo_references(&[
			doc(json!({
				"_id": "EOMission/sentinel1",
				"mission_name_short": "Sentinel-1",
				"mission_name_full": "Sentinel-1 SAR Mission"
			})),
			doc(json!({ "_id": "EOInstrument/msi", "instrument_name_short": "MSI" })),
			doc(json!({ "_id": "Keyword/flood" })),
			doc(json!({ "mission_name_short": "no id" })),
		]);

		assert_eq!(missions.len(), 1);
		assert_eq!(missions[0].short_name.as_deref(), Some("Sentinel-1"));
		assert_eq!(missions[0].full_name.as_deref(), Some("Sentinel-1 SAR Mission"));
		assert_eq!(instruments.len(), 1);
		assert_eq!(instruments[0].kind, EoKind::Instrument);
		assert_eq!(instruments[0].full_name, None);
	}

	#[test]
	fn author_names_fall_back_to_key() {
		let full = author(&doc(json!({
			"_id": "Author/a1",
			"first_name": "Ada",
			"last_name": "Lovelace"
		})))
		.expect("Author should project.");
		let bare = author(&doc(json!({ "_id": "Author/a2", "first_name": " " })))
			.expect("Author should project.");

		assert_eq!(full.name, "Ada Lovelace");
		assert_eq!(bare.name, "a2");
	}

	#[test]
	fn keyword_name_prefers_full_text() {
		let refs = keywords(&[
			doc(json!({ "_id": "Keyword/landcover", "keyword_full": "Land Cover" })),
			doc(json!({ "_id": "Keyword/flood" })),
		]);

		assert_eq!(refs[0].name, "Land Cover");
		assert_eq!(refs[1].name, "flood");
	}

	#[test]
	fn provenance_needs_exactly_one_source() {
		let source = SourceRow {
			key: "planetary_computer_collections".to_string(),
			name: Some("Microsoft Planetary Computer".to_string()),
			href: Some("https://planetarycomputer.microsoft.com".to_string()),
			api_link: None,
		};

		assert_eq!(provenance(&[]), None);
		assert_eq!(
			provenance(std::slice::from_ref(&source)).map(|record| record.key),
			Some("planetary_computer_collections".to_string())
		);
		assert_eq!(provenance(&[source.clone(), source]), None);
	}
}
