pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error(transparent)]
	Decode(#[from] serde_json::Error),
	#[error("Graph query failed: {message}")]
	Query { message: String, error_num: Option<i64> },
}
