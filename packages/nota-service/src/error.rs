pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Enrichment error: {message}")]
	Enrichment { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<nota_storage::Error> for Error {
	fn from(err: nota_storage::Error) -> Self {
		match err {
			nota_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			nota_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<nota_providers::Error> for Error {
	fn from(err: nota_providers::Error) -> Self {
		Self::Enrichment { message: err.to_string() }
	}
}
