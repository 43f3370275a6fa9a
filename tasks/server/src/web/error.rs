use std::any::Any;

use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::task::TaskServiceError;
use crate::web::api::ErrorResponse;

/// Error type for JSON handler operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No task matches the requested ID, or the ID is not a valid number.
    #[error("Task not found")]
    TaskNotFound,
    /// The request carried a value the task cannot hold.
    #[error("Invalid task: {0}")]
    InvalidTask(String),
    /// The body was not a JSON object of the expected shape.
    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),
    /// The database failed while performing `action`.
    #[error("{action}: {details}")]
    Store {
        action: &'static str,
        details: String,
    },
}

impl ApiError {
    /// Maps a repository failure, labelling store errors with `action`.
    pub fn from_service(action: &'static str, err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::TaskNotFound(_) => ApiError::TaskNotFound,
            err @ TaskServiceError::MissingTitle => ApiError::InvalidTask(err.to_string()),
            TaskServiceError::Database(db_err) => ApiError::Store {
                action,
                details: db_err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::TaskNotFound => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("Task not found"))
            }
            ApiError::InvalidTask(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("Invalid task", details),
            ),
            ApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("Invalid request body", rejection.body_text()),
            ),
            ApiError::Store { action, details } => {
                tracing::error!("{}: {}", action, details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details(action, details),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Handler for any request that matches no route.
#[tracing::instrument]
pub async fn route_not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found")),
    )
}

/// Converts a panic raised inside a handler into a JSON 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown panic message".to_string()
    };
    tracing::error!("Handler panicked: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_details("Something went wrong!", details)),
    )
        .into_response()
}
