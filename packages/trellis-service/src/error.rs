pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Invalid state: {message}")]
	InvalidState { message: String },
	#[error("Window expired: {message}")]
	WindowExpired { message: String },
	#[error("Not ready: {message}")]
	NotReady { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<trellis_storage::Error> for Error {
	fn from(err: trellis_storage::Error) -> Self {
		match err {
			trellis_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			trellis_storage::Error::Conflict(message) => Self::InvalidState { message },
		}
	}
}

impl From<trellis_domain::WindowError> for Error {
	fn from(err: trellis_domain::WindowError) -> Self {
		Self::WindowExpired { message: err.to_string() }
	}
}

impl From<trellis_domain::InvalidTransition> for Error {
	fn from(err: trellis_domain::InvalidTransition) -> Self {
		Self::InvalidState { message: err.to_string() }
	}
}
