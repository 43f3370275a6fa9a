use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::task::{TaskState, api::v1};

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Human readable outcome of the request
    pub message: String,
    /// Payload, omitted for operations that return nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// JSON response for API errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short description of what failed
    pub error: String,
    /// Underlying cause, when one is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        v1::list_tasks_handler,
        v1::get_task_handler,
        v1::create_task_handler,
        v1::update_task_handler,
        v1::delete_task_handler,
        v1::complete_task_handler,
        v1::reopen_task_handler,
    ),
    tags((name = "Tasks", description = "To-do task management"))
)]
pub struct ApiDoc;

/// Creates the JSON API routes together with their OpenAPI documentation.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    Router::new()
        .merge(v1::create_api_router(task_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
