//! AQL templates. Every variable part is a bind parameter.
//!
//! Edge directions in the knowledge graph:
//! `HasKeyword` document -> keyword, `Mentions` document -> EO node,
//! `HasAuthor` author -> publication, `STACSourceContains` source -> collection.

/// Fuzzy title match plus token phrase match on title and abstract, ranked by BM25.
///
/// Binds: `query`, `sim_score`.
pub const PUBLICATION_SEARCH: &str = "\
LET phrase = (
	FOR tok IN TOKENS(@query, 'text_en')
		RETURN { LEVENSHTEIN_MATCH: [tok, 1, false] }
)
FOR v IN publications_view
	SEARCH NGRAM_MATCH(v.title, @query, @sim_score, 'fuzzy_search_bigram')
		OR BOOST(PHRASE(v.title, phrase, 'en_tokenizer'), 10)
		OR BOOST(PHRASE(v.abstract, phrase, 'en_tokenizer'), 10)
	LET score = BM25(v)
	SORT score DESC
	RETURN {
		doc: v,
		score: score,
		eo_nodes: (FOR n IN OUTBOUND v._id Mentions RETURN n),
		authors: (FOR a IN INBOUND v._id HasAuthor RETURN a),
		keywords: (FOR k IN OUTBOUND v._id HasKeyword RETURN k)
	}";

/// Cosine similarity against the stored collection embeddings with a threshold cutoff.
///
/// Binds: `query_embedding`, `sim_threshold`.
pub const COLLECTION_SIMILARITY: &str = "\
FOR v IN STACCollection
	FILTER IS_LIST(v.text_embedding)
		AND LENGTH(v.text_embedding) == LENGTH(@query_embedding)
	LET score = COSINE_SIMILARITY(v.text_embedding, @query_embedding)
	FILTER score >= @sim_threshold
	SORT score DESC
	RETURN {
		doc: UNSET(v, 'text_embedding'),
		score: score,
		eo_nodes: (FOR n IN OUTBOUND v._id Mentions RETURN n),
		keywords: (FOR k IN OUTBOUND v._id HasKeyword RETURN k),
		sources: (
			FOR s IN INBOUND v._id STACSourceContains
				RETURN { key: s._key, name: s.name, href: s.href, api_link: s.api_link }
		)
	}";

/// Ids of the EO nodes one `Mentions` hop away from a document.
///
/// Binds: `node_id`.
pub const EO_FROM_NODE: &str = "\
FOR v IN OUTBOUND @node_id Mentions
	RETURN v._id";

/// Ids of every document tagged with a keyword node.
///
/// Binds: `keyword` (full `Keyword/<key>` id).
pub const NODES_FROM_KEYWORD: &str = "\
FOR v IN INBOUND @keyword HasKeyword
	RETURN v._id";

/// Source nodes owning a collection.
///
/// Binds: `collection_key`, `graph_name`.
pub const STAC_SOURCE_OF_COLLECTION: &str = "\
FOR c IN STACCollection
	FILTER c._key == @collection_key
	FOR v IN 1..1 INBOUND c GRAPH @graph_name
		FILTER IS_SAME_COLLECTION('STACSource', v)
		RETURN { key: v._key, name: v.name, href: v.href, api_link: v.api_link }";

/// Publications reachable from any listed keyword, author, or EO node.
///
/// Binds: `keyword_list`, `author_list`, `eo_list`.
pub const GRAPH_FILTER_PUBLICATIONS: &str = "\
LET by_keyword = (
	FOR id IN @keyword_list
		FOR v IN INBOUND id HasKeyword
			FILTER IS_SAME_COLLECTION('Publication', v)
			RETURN v
)
LET by_author = (
	FOR id IN @author_list
		FOR v IN OUTBOUND id HasAuthor
			FILTER IS_SAME_COLLECTION('Publication', v)
			RETURN v
)
LET by_eo = (
	FOR id IN @eo_list
		FOR v IN INBOUND id Mentions
			FILTER IS_SAME_COLLECTION('Publication', v)
			RETURN v
)
FOR v IN UNION_DISTINCT(by_keyword, by_author, by_eo)
	RETURN {
		doc: v,
		score: 1,
		eo_nodes: (FOR n IN OUTBOUND v._id Mentions RETURN n),
		authors: (FOR a IN INBOUND v._id HasAuthor RETURN a),
		keywords: (FOR k IN OUTBOUND v._id HasKeyword RETURN k)
	}";

/// Collections reachable from any listed keyword or EO node. Authors do not apply.
///
/// Binds: `keyword_list`, `eo_list`.
pub const GRAPH_FILTER_COLLECTIONS: &str = "\
LET by_keyword = (
	FOR id IN @keyword_list
		FOR v IN INBOUND id HasKeyword
			FILTER IS_SAME_COLLECTION('STACCollection', v)
			RETURN v
)
LET by_eo = (
	FOR id IN @eo_list
		FOR v IN INBOUND id Mentions
			FILTER IS_SAME_COLLECTION('STACCollection', v)
			RETURN v
)
FOR v IN UNION_DISTINCT(by_keyword, by_eo)
	RETURN {
		doc: UNSET(v, 'text_embedding'),
		score: 1,
		eo_nodes: (FOR n IN OUTBOUND v._id Mentions RETURN n),
		keywords: (FOR k IN OUTBOUND v._id HasKeyword RETURN k),
		sources: (
			FOR s IN INBOUND v._id STACSourceContains
				RETURN { key: s._key, name: s.name, href: s.href, api_link: s.api_link }
		)
	}";

pub const ALL_KEYWORDS: &str = "\
FOR v IN Keyword
	RETURN v";

pub const ALL_AUTHORS: &str = "\
FOR v IN Author
	RETURN v";

pub const ALL_EO_NODES: &str = "\
FOR v IN UNION(
	(FOR m IN EOMission RETURN m),
	(FOR i IN EOInstrument RETURN i)
)
	RETURN v";

pub const ALL_STAC_SOURCES: &str = "\
FOR v IN STACSource
	RETURN { key: v._key, name: v.name, href: v.href, api_link: v.api_link }";

/// Posts carrying a point location.
pub const GEOTAGGED_POSTS: &str = "\
FOR v IN SocialMediaPost
	FILTER IS_NUMBER(v.lat) AND IS_NUMBER(v.lon)
	RETURN v";

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;

	fn bind_names(template: &str) -> BTreeSet<&str> {
		template
			.split('@')
			.skip(1)
			.filter_map(|rest| {
				let end = rest
					.find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
					.unwrap_or(rest.len());

				(end > 0).then(|| &rest[..end])
			})
			.collect()
	}

	#[test]
	fn templates_declare_expected_bind_parameters() {
		let cases: [(&str, &[&str]); 12] = [
			(PUBLICATION_SEARCH, &["query", "sim_score"]),
			(COLLECTION_SIMILARITY, &["query_embedding", "sim_threshold"]),
			(EO_FROM_NODE, &["node_id"]),
			(NODES_FROM_KEYWORD, &["keyword"]),
			(STAC_SOURCE_OF_COLLECTION, &["collection_key", "graph_name"]),
			(GRAPH_FILTER_PUBLICATIONS, &["author_list", "eo_list", "keyword_list"]),
			(GRAPH_FILTER_COLLECTIONS, &["eo_list", "keyword_list"]),
			(ALL_KEYWORDS, &[]),
			(ALL_AUTHORS, &[]),
			(ALL_EO_NODES, &[]),
			(ALL_STAC_SOURCES, &[]),
			(GEOTAGGED_POSTS, &[]),
		];

		for (template, expected) in cases {
			let expected = expected.iter().copied().collect::<BTreeSet<_>>();

			assert_eq!(bind_names(template), expected, "{template}");
		}
	}
}
