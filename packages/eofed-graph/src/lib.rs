pub mod arango;
pub mod models;
pub mod queries;

mod error;

pub use arango::ArangoExecutor;
pub use error::{Error, Result};

use std::{future::Future, pin::Pin};

use serde_json::{Map, Value};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs parameterized graph queries and hands back the raw result documents.
///
/// Templates never interpolate caller input; every variable part travels in
/// [`GraphQuery::bind_vars`].
pub trait GraphQueryExecutor
where
	Self: Send + Sync,
{
	fn execute<'a>(&'a self, query: GraphQuery) -> BoxFuture<'a, Result<Vec<Value>>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
	pub template: &'static str,
	pub bind_vars: Map<String, Value>,
	/// Overrides the executor's default cursor batch size.
	pub batch_size: Option<u32>,
}
impl GraphQuery {
	pub fn new(template: &'static str) -> Self {
		Self { template, bind_vars: Map::new(), batch_size: None }
	}

	pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.bind_vars.insert(name.to_string(), value.into());

		self
	}

	pub fn with_batch_size(mut self, batch_size: u32) -> Self {
		self.batch_size = Some(batch_size);

		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn binds_accumulate_by_name() {
		let query = GraphQuery::new(queries::NODES_FROM_KEYWORD)
			.bind("keyword", "Keyword/flood")
			.bind("keyword", "Keyword/fire")
			.with_batch_size(50);

		assert_eq!(query.bind_vars.len(), 1);
		assert_eq!(query.bind_vars["keyword"], "Keyword/fire");
		assert_eq!(query.batch_size, Some(50));
	}
}
