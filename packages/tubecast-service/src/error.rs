pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidQuery { message: String },
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("Upstream error: {message}")]
	Upstream { message: String },
	#[error("Delivery error: {message}")]
	Delivery { message: String },
}
impl Error {
	pub fn empty_query() -> Self {
		Self::InvalidQuery { message: "Query cannot be empty.".to_string() }
	}

	pub(crate) fn blank(field: &str) -> Self {
		Self::InvalidRequest { message: format!("{field} cannot be empty.") }
	}
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		match err.downcast_ref::<tubecast_providers::Error>() {
			Some(tubecast_providers::Error::NotFound { message }) =>
				Self::NotFound { message: message.clone() },
			_ => Self::Upstream { message: err.to_string() },
		}
	}
}
