use eofed_domain::{LocationFilter, geometry};
use eofed_providers::web::WebHit;

use crate::{DataRetriever, ResultBase, WebDocument};

impl DataRetriever {
	/// Queries the configured web backend.
	///
	/// With location filters, documents whose known bbox misses every filter are dropped.
	/// Documents without geo metadata are kept.
	pub async fn search_web(
		&self,
		query: &str,
		limit: u32,
		location_filters: &[LocationFilter],
	) -> Vec<WebDocument> {
		let query = query.trim();

		if query.is_empty() || limit == 0 {
			return Vec::new();
		}

		let backend = self.providers.web.name().to_string();
		let hits = match self.providers.web.search(query, limit).await {
			Ok(hits) => hits,
			Err(err) => {
				tracing::warn!(error = %err, backend = %backend, "Web search failed.");

				return Vec::new();
			},
		};
		let scores = raw_scores(&hits);
		let mut documents = hits
			.into_iter()
			.zip(scores)
			.filter(|(hit, _)| {
				hit.bbox.is_none_or(|bbox| geometry::matches_any(&bbox, location_filters))
			})
			.map(|(hit, raw_score)| web_document(hit, raw_score, &backend))
			.collect::<Vec<_>>();

		eofed_domain::score::normalize(&mut documents);

		documents
	}
}

/// Backend scores when every hit has one, otherwise rank order (first hit highest).
fn raw_scores(hits: &[WebHit]) -> Vec<f32> {
	let scores = hits.iter().map(|hit| hit.raw_score).collect::<Option<Vec<_>>>();

	scores.unwrap_or_else(|| (0..hits.len()).map(|rank| (hits.len() - rank) as f32).collect())
}

fn web_document(hit: WebHit, raw_score: f32, backend: &str) -> WebDocument {
	WebDocument {
		base: ResultBase::new(hit.url.clone(), hit.title, raw_score),
		url: hit.url,
		text: hit.text,
		is_html: hit.is_html,
		backend: backend.to_string(),
		bbox: hit.bbox,
	}
}
