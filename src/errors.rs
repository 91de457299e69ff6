use axum::http::StatusCode;

/// Failures of the dashboard core and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Malformed clock string or transaction text.
    #[error("format error: {0}")]
    Format(String),

    /// A task edit failed its shape checks.
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote collaborator is unreachable, answered non-200, or sent
    /// something undecodable.
    #[error("source error: {0}")]
    Source(String),

    /// A remote-only operation was requested without a remote endpoint.
    #[error("no remote endpoint configured")]
    NoRemote,

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("unknown subtask: {0}")]
    UnknownSubtask(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::Format(_) | DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::UnknownTask(_) | DashboardError::UnknownSubtask(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::Source(_) => StatusCode::BAD_GATEWAY,
            DashboardError::NoRemote => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DashboardError::Format("x".into()), StatusCode::BAD_REQUEST),
            (DashboardError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DashboardError::UnknownTask("t".into()), StatusCode::NOT_FOUND),
            (DashboardError::Source("down".into()), StatusCode::BAD_GATEWAY),
            (DashboardError::NoRemote, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn message_keeps_the_cause() {
        let err = AppError::from(DashboardError::Source("HTTP 500: boom".into()));
        assert_eq!(err.message, "source error: HTTP 500: boom");
    }
}
