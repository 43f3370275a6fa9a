use crate::task::{NewTask, Task, TaskChanges, TaskService, TaskState, TaskStatus};
use crate::web::api::{ApiResponse, ErrorResponse};
use crate::web::error::{ApiError, JsonBody};
use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier assigned by the server
    pub id: i32,
    /// Short summary of the task
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Either `pending` or `completed`
    pub status: TaskStatus,
    /// When the task was created
    pub created_at: DateTime<FixedOffset>,
    /// When the task was last modified
    pub updated_at: DateTime<FixedOffset>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            status: task.status(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Request body for creating or updating a task.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TaskRequest {
    /// Task title; required on create, ignored on update when blank
    #[serde(default)]
    pub title: Option<String>,
    /// Task description; an explicit `null` clears it on update
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// `pending` or `completed`; ignored when blank
    #[serde(default)]
    pub status: Option<String>,
}

/// Marks a key as present even when its value is `null`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Parses an optional status, treating a blank value as absent.
fn parse_status(raw: Option<String>) -> Result<Option<TaskStatus>, ApiError> {
    raw.as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map(|status| {
            status
                .parse::<TaskStatus>()
                .map_err(|err| ApiError::InvalidTask(err.to_string()))
        })
        .transpose()
}

impl TaskRequest {
    fn into_new_task(self) -> Result<NewTask, ApiError> {
        Ok(NewTask {
            title: self.title,
            description: self.description.flatten(),
            status: parse_status(self.status)?,
        })
    }

    fn into_changes(self) -> Result<TaskChanges, ApiError> {
        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            status: parse_status(self.status)?,
        })
    }
}

/// Task ID taken from the path. Anything that is not a valid ID resolves to
/// "Task not found", the same as an ID with no matching row.
#[derive(Debug, Clone, Copy)]
pub struct TaskId(pub i32);

impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::TaskNotFound)?;
        raw_id
            .trim()
            .parse::<i32>()
            .map(TaskId)
            .map_err(|_| ApiError::TaskNotFound)
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Handler for GET /tasks - Returns all tasks, newest first.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "Tasks fetched successfully", body = ApiResponse<Vec<TaskJson>>),
        (status = 500, description = "Failed to fetch tasks", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> ApiResult<Vec<TaskJson>> {
    let tasks = TaskService::new(&state.db)
        .list_tasks()
        .await
        .map_err(|err| ApiError::from_service("Failed to fetch tasks", err))?;
    let tasks: Vec<TaskJson> = tasks.into_iter().map(TaskJson::from).collect();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_data("Tasks fetched successfully", tasks)),
    ))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task fetched successfully", body = ApiResponse<TaskJson>),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Failed to fetch task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    TaskId(id): TaskId,
) -> ApiResult<TaskJson> {
    let task = TaskService::new(&state.db)
        .get_task_by_id(id)
        .await
        .map_err(|err| ApiError::from_service("Failed to fetch task", err))?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_data(
            "Task fetched successfully",
            TaskJson::from(task),
        )),
    ))
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = ApiResponse<TaskJson>),
        (status = 400, description = "Invalid task or request body", body = ErrorResponse),
        (status = 500, description = "Failed to create task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    JsonBody(payload): JsonBody<TaskRequest>,
) -> ApiResult<TaskJson> {
    let new_task = payload.into_new_task()?;
    let task = TaskService::new(&state.db)
        .create_task(new_task)
        .await
        .map_err(|err| ApiError::from_service("Failed to create task", err))?;
    tracing::info!("Created task {}", task.id());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data(
            "Task created successfully",
            TaskJson::from(task),
        )),
    ))
}

/// Handler for PUT /tasks/{id} - Updates the supplied fields of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = ApiResponse<TaskJson>),
        (status = 400, description = "Invalid task or request body", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Failed to update task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    TaskId(id): TaskId,
    JsonBody(payload): JsonBody<TaskRequest>,
) -> ApiResult<TaskJson> {
    let changes = payload.into_changes()?;
    let task = TaskService::new(&state.db)
        .update_task_by_id(id, changes)
        .await
        .map_err(|err| ApiError::from_service("Failed to update task", err))?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_data(
            "Task updated successfully",
            TaskJson::from(task),
        )),
    ))
}

/// Handler for DELETE /tasks/{id} - Removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted successfully"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Failed to delete task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    TaskId(id): TaskId,
) -> ApiResult<()> {
    TaskService::new(&state.db)
        .delete_task_by_id(id)
        .await
        .map_err(|err| ApiError::from_service("Failed to delete task", err))?;
    tracing::info!("Deleted task {}", id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::message("Task deleted successfully")),
    ))
}

async fn set_status(state: &TaskState, id: i32, status: TaskStatus) -> ApiResult<()> {
    TaskService::new(&state.db)
        .set_task_status(id, status)
        .await
        .map_err(|err| ApiError::from_service("Failed to update task", err))?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::message(format!("Task marked as {}", status))),
    ))
}

/// Handler for PATCH /tasks/{id}/complete - Marks a task as completed.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/complete",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task marked as completed"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Failed to update task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn complete_task_handler(
    State(state): State<Arc<TaskState>>,
    TaskId(id): TaskId,
) -> ApiResult<()> {
    set_status(&state, id, TaskStatus::Completed).await
}

/// Handler for PATCH /tasks/{id}/pending - Moves a task back to pending.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/pending",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task marked as pending"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Failed to update task", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn reopen_task_handler(
    State(state): State<Arc<TaskState>>,
    TaskId(id): TaskId,
) -> ApiResult<()> {
    set_status(&state, id, TaskStatus::Pending).await
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/{id}/complete", patch(complete_task_handler))
        .route("/tasks/{id}/pending", patch(reopen_task_handler))
        .with_state(state)
}
