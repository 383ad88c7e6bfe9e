pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Config(#[from] eofed_config::Error),
}
impl From<eofed_graph::Error> for Error {
	fn from(err: eofed_graph::Error) -> Self {
		Self::Backend { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Backend { message: err.to_string() }
	}
}
