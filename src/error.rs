use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("Start time is not set")]
    MissingStart,
    #[error("End time is not set")]
    MissingEnd,
    #[error("End time lies before start time")]
    EndBeforeStart,
    #[error("Invalid date and time: {0:?}")]
    InvalidDateTime(String),
    #[error("Template problem: {0}")]
    Template(#[from] askama::Error),
}

impl Error {
    /// Whether the error stems from user input rather than from the server.
    pub(crate) fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingStart
                | Error::MissingEnd
                | Error::EndBeforeStart
                | Error::InvalidDateTime(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, format!("Error: {}", self)).into_response()
    }
}
