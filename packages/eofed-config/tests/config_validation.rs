use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use eofed_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

static NEXT_FILE: AtomicU64 = AtomicU64::new(0);

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render template config.")
}

fn table_mut<'a>(value: &'a mut Value, path: &[&str]) -> &'a mut toml::Table {
	let mut current = value;

	for key in path {
		current = current
			.as_table_mut()
			.and_then(|table| table.get_mut(*key))
			.unwrap_or_else(|| panic!("Template config must include [{}].", path.join(".")));
	}

	current.as_table_mut().expect("Config section must be a table.")
}

fn validation_message(raw: &str) -> String {
	match eofed_config::parse(raw) {
		Err(Error::Validation { message }) => message,
		Err(err) => panic!("Expected a validation error, got {err:?}."),
		Ok(_) => panic!("Expected config validation to fail."),
	}
}

fn write_temp_config(payload: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be after the Unix epoch.")
		.as_nanos();
	let seq = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("eofed_config_test_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML);
	let cfg = eofed_config::load(&path).expect("Sample config should load.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert_eq!(cfg.web.backend, "chatnoir");
	assert_eq!(cfg.stac.catalogs.len(), 3);
	assert_eq!(cfg.stac.catalogs[0].signer, "planetary_computer");
	assert_eq!(cfg.stac.catalogs[2].signer, "none");
	assert_eq!(cfg.stac.catalogs[2].preview_asset, None);
	assert_eq!(cfg.providers.embedding.dimensions, 768);
}

#[test]
fn empty_optional_strings_normalize_to_none() {
	let cfg =
		eofed_config::parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Sample config should parse.");

	assert!(cfg.export.notebook_template.is_none());
}

#[test]
fn trailing_slashes_are_trimmed_from_urls() {
	let mut value = sample_value();

	table_mut(&mut value, &["graph"])
		.insert("url".to_string(), Value::String("http://127.0.0.1:8529/".to_string()));

	let cfg = eofed_config::parse(&render(&value)).expect("Config should parse.");

	assert_eq!(cfg.graph.url, "http://127.0.0.1:8529");
}

#[test]
fn search_section_defaults_when_missing() {
	let mut value = sample_value();

	value.as_table_mut().expect("Root must be a table.").remove("search");

	let cfg = eofed_config::parse(&render(&value)).expect("Config should parse.");

	assert_eq!(cfg.search.publication_sim_score, 0.9);
	assert_eq!(cfg.search.collection_sim_threshold, 0.1);
	assert_eq!(cfg.search.default_item_limit, 100);
}

#[test]
fn unknown_web_backend_is_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["web"])
		.insert("backend".to_string(), Value::String("bing".to_string()));

	assert_eq!(
		validation_message(&render(&value)),
		"web.backend must be one of chatnoir, prototype_webindex, or mosaic."
	);
}

#[test]
fn selected_web_backend_requires_its_section() {
	let mut value = sample_value();
	let web = table_mut(&mut value, &["web"]);

	web.insert("backend".to_string(), Value::String("mosaic".to_string()));
	web.remove("mosaic");

	assert_eq!(
		validation_message(&render(&value)),
		"web.mosaic is required when web.backend is mosaic."
	);
}

#[test]
fn chatnoir_requires_api_key() {
	let mut value = sample_value();

	table_mut(&mut value, &["web", "chatnoir"])
		.insert("api_key".to_string(), Value::String("  ".to_string()));

	assert_eq!(validation_message(&render(&value)), "web.chatnoir.api_key must be non-empty.");
}

#[test]
fn embedding_api_key_is_optional() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"]).remove("api_key");

	let cfg = eofed_config::parse(&render(&value)).expect("Keyless embedding config should parse.");

	assert_eq!(cfg.providers.embedding.api_key, "");
}

#[test]
fn zero_timeouts_are_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["stac"]).insert("timeout_ms".to_string(), Value::Integer(0));

	assert_eq!(validation_message(&render(&value)), "stac.timeout_ms must be greater than zero.");
}

#[test]
fn duplicate_catalog_source_keys_are_rejected() {
	let mut value = sample_value();
	let catalogs = table_mut(&mut value, &["stac"])
		.get_mut("catalogs")
		.and_then(Value::as_array_mut)
		.expect("Template config must include [[stac.catalogs]].");
	let duplicate = catalogs[1].clone();

	catalogs.push(duplicate);

	assert_eq!(
		validation_message(&render(&value)),
		"stac.catalogs.source_key geoservice_collections is duplicated."
	);
}

#[test]
fn unknown_signer_is_rejected() {
	let mut value = sample_value();
	let catalogs = table_mut(&mut value, &["stac"])
		.get_mut("catalogs")
		.and_then(Value::as_array_mut)
		.expect("Template config must include [[stac.catalogs]].");

	catalogs[2]
		.as_table_mut()
		.expect("Catalog entry must be a table.")
		.insert("signer".to_string(), Value::String("oauth".to_string()));

	assert_eq!(
		validation_message(&render(&value)),
		"stac.catalogs.signer must be one of none or planetary_computer."
	);
}

#[test]
fn similarity_threshold_must_be_in_unit_range() {
	let mut value = sample_value();

	table_mut(&mut value, &["search"])
		.insert("collection_sim_threshold".to_string(), Value::Float(1.5));

	assert_eq!(
		validation_message(&render(&value)),
		"search.collection_sim_threshold must be in the range 0.0-1.0."
	);
}

#[test]
fn default_item_limit_cannot_exceed_max() {
	let mut value = sample_value();
	let search = table_mut(&mut value, &["search"]);

	search.insert("default_item_limit".to_string(), Value::Integer(500));
	search.insert("max_item_limit".to_string(), Value::Integer(50));

	assert_eq!(
		validation_message(&render(&value)),
		"search.default_item_limit must not exceed search.max_item_limit."
	);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("eofed_config_test_missing.toml");
	let err = eofed_config::load(&path).expect_err("Missing config must fail.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
