//! Jupyter notebook export of a STAC item search.
//!
//! Templates are notebook JSON documents with `{{CATALOG_URL}}`, `{{GEOMETRY}}`,
//! `{{COLLECTION_ID}}`, and `{{TIME_RANGE}}` placeholders inside cell source strings.

use std::{fs, io::Write, path::PathBuf};

use eofed_domain::{LocationFilter, TimeInterval, geometry};

use crate::{DataRetriever, Error, Result};

const BUILTIN_TEMPLATE: &str = include_str!("../templates/stac_export.ipynb");

impl DataRetriever {
	/// Writes a notebook reproducing the item search to a fresh temporary file and returns its
	/// path. The caller owns the file and removes it when done.
	pub async fn export_notebook(
		&self,
		collection_id: &str,
		location_filters: &[LocationFilter],
		time_interval: Option<TimeInterval>,
	) -> Result<PathBuf> {
		let (source_key, catalog) = self.registry.catalog_of(collection_id).await?;
		let template = match &self.cfg.export.notebook_template {
			Some(path) => fs::read_to_string(path)?,
			None => BUILTIN_TEMPLATE.to_string(),
		};
		let geometry = match geometry::to_geometry(location_filters) {
			Some(geometry) => serde_json::to_string(&geometry).map_err(|err| Error::Backend {
				message: format!("Failed to encode geometry: {err}"),
			})?,
			None => "None".to_string(),
		};
		let time_range =
			time_interval.map(|interval| interval.to_stac_datetime()).unwrap_or_default();
		let notebook = render(
			&template,
			&[
				("CATALOG_URL", catalog.api_url()),
				("GEOMETRY", geometry.as_str()),
				("COLLECTION_ID", eofed_domain::node_id::key_of(collection_id)),
				("TIME_RANGE", time_range.as_str()),
			],
		);
		let mut file = tempfile::Builder::new()
			.prefix("stac_export_")
			.suffix(".ipynb")
			.tempfile()?;

		file.write_all(notebook.as_bytes())?;

		let (_, path) = file.keep().map_err(|err| err.error)?;

		tracing::info!(
			collection_id,
			source_key = %source_key,
			path = %path.display(),
			"Exported STAC notebook."
		);

		Ok(path)
	}
}

/// Replaces each `{{NAME}}` with its value, escaped for a JSON string literal.
fn render(template: &str, values: &[(&str, &str)]) -> String {
	let mut rendered = template.to_string();

	for (name, value) in values {
		rendered = rendered.replace(&format!("{{{{{name}}}}}"), &json_escape(value));
	}

	rendered
}

fn json_escape(value: &str) -> String {
	let quoted = serde_json::Value::String(value.to_string()).to_string();

	quoted[1..quoted.len() - 1].to_string()
}
