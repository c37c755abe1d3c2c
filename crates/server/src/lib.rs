use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use recognizer::RecognitionError;

use serde::Serialize;
pub use server::{DEFAULT_MAX_UPLOAD_BYTES, ServerState, router, run, run_with_listener, spawn_with_listener};

mod assignments;
mod participants;
mod report;
mod server;
mod sessions;
mod views;

pub mod types {
    pub mod receipt {
        pub use api_types::receipt::{ReceiptNew, ReceiptRowNew};
    }

    pub mod session {
        pub use api_types::session::{
            AssignmentState, ItemStatusView, ItemView, SessionCreated, SessionView,
        };
    }

    pub mod participant {
        pub use api_types::participant::{ParticipantCreated, ParticipantNew, ParticipantView};
    }

    pub mod assignment {
        pub use api_types::assignment::{
            AssignmentCount, AssignmentCreated, AssignmentNew, AssignmentView,
            AssignmentsRemove, AssignmentsResponse,
        };
    }

    pub mod report {
        pub use api_types::report::{ParticipantReportView, ReportLineView, ReportView};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Recognition(RecognitionError),
    /// Receipt recognition was requested but no recognizer is configured.
    NotConfigured,
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn status_for_recognition_error(err: &RecognitionError) -> StatusCode {
    match err {
        RecognitionError::UnsupportedImage => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        RecognitionError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        RecognitionError::Http(_)
        | RecognitionError::Api { .. }
        | RecognitionError::EmptyResponse
        | RecognitionError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), err.to_string()),
            ServerError::Recognition(err) => {
                let status = status_for_recognition_error(&err);
                if status.is_server_error() {
                    tracing::error!("receipt recognition failed: {err}");
                }
                (status, err.to_string())
            }
            ServerError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "receipt recognition is not configured".to_string(),
            ),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<RecognitionError> for ServerError {
    fn from(value: RecognitionError) -> Self {
        Self::Recognition(value)
    }
}
