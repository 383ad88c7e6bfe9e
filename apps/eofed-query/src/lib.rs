use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use eofed_domain::{LocationFilter, TimeInterval};
use eofed_service::{DataRetriever, Error, GraphFilterRequest, SearchResult};

#[derive(Debug, Parser)]
#[command(
	version = eofed_cli::VERSION,
	rename_all = "kebab",
	styles = eofed_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

/// Location filters are JSON, either one filter or a list:
/// `{"type":"bbox","coords":[S,W,N,E]}` or `{"type":"polygon","coords":[[lat,lng],...]}`.
/// Time ranges are a JSON `[start, end]` pair of RFC 3339 timestamps.
#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum Command {
	/// Fuzzy publication search.
	Publications {
		query: String,
		#[arg(long = "keyword", short = 'k')]
		keywords: Vec<String>,
	},
	/// Semantic STAC collection search.
	Collections {
		query: String,
		#[arg(long = "keyword", short = 'k')]
		keywords: Vec<String>,
		#[arg(long, value_name = "JSON")]
		location: Option<String>,
	},
	/// STAC items of one collection, served by its owning catalog.
	Items {
		collection_id: String,
		#[arg(long, value_name = "JSON")]
		location: Option<String>,
		#[arg(long, value_name = "JSON")]
		time: Option<String>,
		#[arg(long)]
		limit: Option<u32>,
	},
	/// Open-web search through the configured backend.
	Web {
		query: String,
		#[arg(long, default_value_t = 100)]
		limit: u32,
		#[arg(long, value_name = "JSON")]
		location: Option<String>,
	},
	/// Publications and collections adjacent to the given graph nodes.
	GraphFilter {
		#[arg(long = "keyword")]
		keyword_ids: Vec<String>,
		#[arg(long = "author")]
		author_ids: Vec<String>,
		#[arg(long = "eo-node")]
		eo_node_ids: Vec<String>,
	},
	Keywords,
	Authors,
	EoNodes,
	/// Ids of the documents tagged with a keyword, given as text or as a `Keyword/` id.
	KeywordNodes { keyword: String },
	/// Ids of the EO missions and instruments a document mentions.
	RelatedEo { document_id: String },
	/// Geotagged social-media posts.
	Posts {
		#[arg(long, value_name = "JSON")]
		location: Option<String>,
		#[arg(long, value_name = "JSON")]
		time: Option<String>,
	},
	/// Writes a notebook reproducing an item search and prints its path.
	ExportNotebook {
		collection_id: String,
		#[arg(long, value_name = "JSON")]
		location: Option<String>,
		#[arg(long, value_name = "JSON")]
		time: Option<String>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = eofed_config::load(&args.config)?;

	init_tracing(&config)?;

	let retriever = DataRetriever::connect(config).await?;
	let output = execute(&retriever, args.command).await?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

/// Runs one subcommand and returns its JSON output. Result lists carry their `kind` tag.
pub async fn execute(retriever: &DataRetriever, command: Command) -> eofed_service::Result<Value> {
	match command {
		Command::Publications { query, keywords } => {
			let results = retriever.search_publications(&query, &keywords).await;

			tagged(results)
		},
		Command::Collections { query, keywords, location } => {
			let filters = location_filters(location.as_deref())?;
			let results = retriever.search_stac_collections(&query, &keywords, &filters).await;

			tagged(results)
		},
		Command::Items { collection_id, location, time, limit } => {
			let filters = location_filters(location.as_deref())?;
			let interval = time_interval(time.as_deref())?;
			let results =
				retriever.search_stac_items(&collection_id, &filters, interval, limit).await?;

			tagged(results)
		},
		Command::Web { query, limit, location } => {
			let filters = location_filters(location.as_deref())?;
			let results = retriever.search_web(&query, limit, &filters).await;

			tagged(results)
		},
		Command::GraphFilter { keyword_ids, author_ids, eo_node_ids } => {
			let req = GraphFilterRequest { keyword_ids, author_ids, eo_node_ids };

			to_json(&retriever.graph_filtered_search(&req).await)
		},
		Command::Keywords => to_json(&retriever.list_keywords().await),
		Command::Authors => to_json(&retriever.list_authors().await),
		Command::EoNodes => to_json(&retriever.list_eo_nodes().await),
		Command::KeywordNodes { keyword } => to_json(&retriever.nodes_for_keyword(&keyword).await),
		Command::RelatedEo { document_id } =>
			to_json(&retriever.related_eo_nodes(&document_id).await),
		Command::Posts { location, time } => {
			let filters = location_filters(location.as_deref())?;
			let interval = time_interval(time.as_deref())?;

			tagged(retriever.list_geotagged_posts(&filters, interval).await)
		},
		Command::ExportNotebook { collection_id, location, time } => {
			let filters = location_filters(location.as_deref())?;
			let interval = time_interval(time.as_deref())?;
			let path = retriever.export_notebook(&collection_id, &filters, interval).await?;

			Ok(serde_json::json!({ "path": path.display().to_string() }))
		},
	}
}

fn location_filters(raw: Option<&str>) -> eofed_service::Result<Vec<LocationFilter>> {
	Ok(eofed_service::parse_location_filters(&parse_json_arg(raw, "location")?))
}

fn time_interval(raw: Option<&str>) -> eofed_service::Result<Option<TimeInterval>> {
	Ok(eofed_service::parse_time_interval(&parse_json_arg(raw, "time")?))
}

/// Absent arguments read as `null`. Text that is not JSON at all is a usage error.
fn parse_json_arg(raw: Option<&str>, name: &str) -> eofed_service::Result<Value> {
	let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(Value::Null);
	};

	serde_json::from_str(raw).map_err(|err| Error::InvalidRequest {
		message: format!("--{name} must be JSON: {err}"),
	})
}

fn tagged<T>(results: Vec<T>) -> eofed_service::Result<Value>
where
	T: Into<SearchResult>,
{
	to_json(&results.into_iter().map(Into::into).collect::<Vec<SearchResult>>())
}

fn to_json<T>(value: &T) -> eofed_service::Result<Value>
where
	T: Serialize,
{
	serde_json::to_value(value)
		.map_err(|err| Error::Backend { message: format!("Failed to encode output: {err}") })
}

fn init_tracing(config: &eofed_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	Ok(())
}
