use crate::entities::task;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod api;

pub use crate::entities::task::Status as TaskStatus;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns when the task was created.
    pub fn created_at(&self) -> DateTimeWithTimeZone {
        self.created_at
    }

    /// Returns when the task was last modified.
    pub fn updated_at(&self) -> DateTimeWithTimeZone {
        self.updated_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `pending` nor `completed`.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{0}', expected 'pending' or 'completed'")]
pub struct ParseStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Fields accepted when updating a task.
///
/// `description` distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// No row matches the requested ID.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
    /// The title was absent or blank after trimming.
    #[error("Task title is required")]
    MissingTitle,
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Retrieves every task, newest first.
    ///
    /// # Returns
    ///
    /// A `Result` containing the tasks ordered by `created_at` descending,
    /// with the higher ID first when two tasks share a timestamp.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task`, or `TaskNotFound` if no row matches.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let model = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        Ok(Task::from(model))
    }

    /// Creates a new task.
    ///
    /// The title and description are trimmed; a blank description is stored
    /// as null and a missing status defaults to pending. Both timestamps are
    /// set to the same instant.
    ///
    /// # Arguments
    ///
    /// * `new_task` - The fields supplied by the caller.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, or `MissingTitle` if the
    /// title is absent or blank.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let title = new_task
            .title
            .map(trimmed)
            .filter(|title| !title.is_empty())
            .ok_or(TaskServiceError::MissingTitle)?;
        let description = new_task
            .description
            .map(trimmed)
            .filter(|description| !description.is_empty());
        let created_at = now();

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(description),
            status: ActiveValue::Set(new_task.status.unwrap_or_default()),
            created_at: ActiveValue::Set(created_at),
            updated_at: ActiveValue::Set(created_at),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Task::from(created_model))
    }

    /// Updates a task by its ID.
    ///
    /// Reads the current row, then writes the merged values back. A blank
    /// title keeps the stored one; an explicit description, even null or
    /// empty, replaces the stored one.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `changes` - The fields supplied by the caller.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or `TaskNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: i32,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        if let Some(title) = changes.title.map(trimmed).filter(|t| !t.is_empty()) {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = changes.description {
            active_model.description = ActiveValue::Set(description.map(trimmed));
        }
        if let Some(status) = changes.status {
            active_model.status = ActiveValue::Set(status);
        }
        active_model.updated_at = ActiveValue::Set(now());

        let updated_model = active_model.update(self.db).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => TaskServiceError::TaskNotFound(id),
            other => TaskServiceError::Database(other),
        })?;
        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Returns
    ///
    /// `TaskNotFound` if no row was removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<(), TaskServiceError> {
        let result = task::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        Ok(())
    }

    /// Sets the status of a task in a single statement.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task.
    /// * `status` - The new status.
    ///
    /// # Returns
    ///
    /// `TaskNotFound` if no row was updated.
    #[tracing::instrument(skip(self))]
    pub async fn set_task_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<(), TaskServiceError> {
        let result = task::Entity::update_many()
            .col_expr(task::Column::Status, Expr::value(status.as_str()))
            .col_expr(task::Column::UpdatedAt, Expr::value(now()))
            .filter(task::Column::Id.eq(id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        Ok(())
    }
}
