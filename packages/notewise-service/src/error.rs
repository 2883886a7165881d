pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}

impl From<notewise_storage::Error> for Error {
	fn from(err: notewise_storage::Error) -> Self {
		match err {
			notewise_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			notewise_storage::Error::Conflict(message) => Self::Conflict { message },
			err @ (notewise_storage::Error::Sqlx(_) | notewise_storage::Error::Decode { .. }) =>
				Self::Storage { message: err.to_string() },
		}
	}
}
