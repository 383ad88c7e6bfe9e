use eofed_graph::{
	GraphQuery,
	models::{self, AdjacencyRow, str_field},
	queries,
};

use crate::{DataRetriever, Publication, ResultBase, enrich};

impl DataRetriever {
	/// Fuzzy title and phrase search over publications. The keywords form the search string, or
	/// the free text when there are none; an empty string searches nothing.
	pub async fn search_publications(&self, query: &str, keywords: &[String]) -> Vec<Publication> {
		let text = crate::search_text(query, keywords);

		if text.is_empty() {
			return Vec::new();
		}

		let query = GraphQuery::new(queries::PUBLICATION_SEARCH)
			.bind("query", text)
			.bind("sim_score", self.cfg.search.publication_sim_score);
		let rows = self.query_rows(query, "search_publications").await;
		let (rows, skipped) = models::decode_rows::<AdjacencyRow>(rows);

		if skipped > 0 {
			tracing::warn!(skipped, "Skipped malformed publication rows.");
		}

		let mut publications = rows.iter().filter_map(publication).collect::<Vec<_>>();

		eofed_domain::score::normalize(&mut publications);

		publications
	}
}

pub(crate) fn publication(row: &AdjacencyRow) -> Option<Publication> {
	let id = str_field(&row.doc, "_id")?;
	let title = str_field(&row.doc, "title").unwrap_or_default();
	let mut base = ResultBase::new(id, title, row.score.unwrap_or_default() as f32);

	base.graph_links = enrich::graph_links(row);

	Some(Publication {
		base,
		abstract_text: str_field(&row.doc, "abstract").map(str::to_string),
		date: str_field(&row.doc, "date").map(str::to_string),
		publication_type: str_field(&row.doc, "type").map(str::to_string),
	})
}
