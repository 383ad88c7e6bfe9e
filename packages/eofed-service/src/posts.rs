use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use eofed_domain::{Bbox, LocationFilter, TimeInterval, geometry};
use eofed_graph::{
	GraphQuery,
	models::{self, PostRow},
	queries,
};

use crate::{DataRetriever, GeoTaggedPost, ResultBase};

impl DataRetriever {
	/// Social-media posts whose location falls in any filter and whose creation time falls in the
	/// interval. Posts without a readable `created_at` only pass when no interval is given.
	pub async fn list_geotagged_posts(
		&self,
		location_filters: &[LocationFilter],
		time_interval: Option<TimeInterval>,
	) -> Vec<GeoTaggedPost> {
		let query = GraphQuery::new(queries::GEOTAGGED_POSTS)
			.with_batch_size(self.cfg.search.listing_batch_size);
		let rows = self.query_rows(query, "list_geotagged_posts").await;
		let (rows, skipped) = models::decode_rows::<PostRow>(rows);

		if skipped > 0 {
			tracing::warn!(skipped, "Skipped malformed post rows.");
		}

		let mut posts = rows
			.into_iter()
			.filter(|post| {
				geometry::matches_any(&Bbox::from_point(post.lat, post.lon), location_filters)
			})
			.filter(|post| time_interval.is_none_or(|interval| created_within(post, &interval)))
			.map(geotagged_post)
			.collect::<Vec<_>>();

		eofed_domain::score::normalize(&mut posts);

		posts
	}
}

fn created_within(post: &PostRow, interval: &TimeInterval) -> bool {
	post.created_at
		.as_deref()
		.and_then(|created_at| OffsetDateTime::parse(created_at.trim(), &Rfc3339).ok())
		.is_some_and(|created_at| interval.contains(created_at))
}

fn geotagged_post(post: PostRow) -> GeoTaggedPost {
	let title = post.text.as_deref().and_then(|text| text.lines().next()).unwrap_or_default();

	GeoTaggedPost {
		base: ResultBase::new(post.id.clone(), title, 1.0),
		text: post.text,
		url: post.url,
		author: post.author,
		created_at: post.created_at,
		lat: post.lat,
		lon: post.lon,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn post(created_at: Option<&str>) -> PostRow {
		PostRow {
			id: "SocialMediaPost/1".to_string(),
			text: Some("River overflowing\nnear the bridge".to_string()),
			url: None,
			author: Some("observer".to_string()),
			created_at: created_at.map(str::to_string),
			lat: 48.1,
			lon: 11.6,
		}
	}

	#[test]
	fn creation_time_must_fall_inside_interval() {
		let interval = TimeInterval::from_strs("2021-01-01T00:00:00Z", "2021-02-01T00:00:00Z")
			.expect("Failed to build interval.");

		assert!(created_within(&post(Some("2021-01-15T12:00:00Z")), &interval));
		assert!(!created_within(&post(Some("2021-03-01T00:00:00Z")), &interval));
		assert!(!created_within(&post(Some("yesterday")), &interval));
		assert!(!created_within(&post(None), &interval));
	}

	#[test]
	fn post_title_is_first_text_line() {
		let post = geotagged_post(post(None));

		assert_eq!(post.base.title, "River overflowing");
		assert_eq!(post.author.as_deref(), Some("observer"));
	}
}
