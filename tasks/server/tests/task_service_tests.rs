use sea_orm::DatabaseConnection;
use tasks_server::task::{NewTask, TaskChanges, TaskService, TaskServiceError, TaskStatus};
use testcontainers_modules::{postgres, testcontainers};

mod common;

pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    pub db: DatabaseConnection,
}

async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    let container = common::setup_container().await?;
    let db = common::setup_db(&container).await?;
    Ok(TestContext { db, container })
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn can_create_task_and_read_it_back() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created = task_service
        .create_task(NewTask {
            title: Some("  Buy milk  ".to_string()),
            description: Some(" two litres ".to_string()),
            status: None,
        })
        .await
        .expect("Failed to create task");

    assert_eq!(created.title(), "Buy milk");
    assert_eq!(created.description(), Some("two litres"));
    assert_eq!(created.status(), TaskStatus::Pending);
    assert_eq!(created.created_at(), created.updated_at());

    let fetched = task_service
        .get_task_by_id(created.id())
        .await
        .expect("Failed to get task");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn can_store_blank_description_as_null() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created = task_service
        .create_task(NewTask {
            title: Some("Water plants".to_string()),
            description: Some("   ".to_string()),
            status: Some(TaskStatus::Completed),
        })
        .await
        .expect("Failed to create task");

    assert_eq!(created.description(), None);
    assert_eq!(created.status(), TaskStatus::Completed);
}

#[tokio::test]
async fn can_reject_task_without_title() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.create_task(NewTask::default()).await;

    assert!(matches!(result, Err(TaskServiceError::MissingTitle)));
    assert!(task_service.list_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn can_complete_task_and_refresh_updated_at() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service.create_task(new_task("Pay rent")).await.unwrap();

    task_service
        .set_task_status(created.id(), TaskStatus::Completed)
        .await
        .expect("Failed to complete task");

    let fetched = task_service.get_task_by_id(created.id()).await.unwrap();
    assert_eq!(fetched.status(), TaskStatus::Completed);
    assert!(fetched.updated_at() > created.updated_at());
    assert_eq!(fetched.created_at(), created.created_at());
}

#[tokio::test]
async fn can_move_completed_task_back_to_pending() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service
        .create_task(NewTask {
            title: Some("Call mum".to_string()),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();

    task_service
        .set_task_status(created.id(), TaskStatus::Pending)
        .await
        .unwrap();

    let fetched = task_service.get_task_by_id(created.id()).await.unwrap();
    assert_eq!(fetched.status(), TaskStatus::Pending);
}

#[tokio::test]
async fn can_handle_status_change_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service
        .set_task_status(12345, TaskStatus::Completed)
        .await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(12345))));
}

#[tokio::test]
async fn can_delete_task() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service.create_task(new_task("Old chore")).await.unwrap();

    task_service
        .delete_task_by_id(created.id())
        .await
        .expect("Failed to delete task");

    let result = task_service.get_task_by_id(created.id()).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(_))));

    let second_delete = task_service.delete_task_by_id(created.id()).await;
    assert!(matches!(
        second_delete,
        Err(TaskServiceError::TaskNotFound(_))
    ));
}

#[tokio::test]
async fn can_update_description_only() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service
        .create_task(NewTask {
            title: Some("Book flights".to_string()),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = task_service
        .update_task_by_id(
            created.id(),
            TaskChanges {
                description: Some(Some("Window seat".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task");

    assert_eq!(updated.title(), "Book flights");
    assert_eq!(updated.status(), TaskStatus::Completed);
    assert_eq!(updated.description(), Some("Window seat"));
    assert!(updated.updated_at() > created.updated_at());
    assert_eq!(updated.created_at(), created.created_at());
}

#[tokio::test]
async fn can_keep_title_when_update_supplies_blank_title() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service
        .create_task(NewTask {
            title: Some("Renew passport".to_string()),
            description: Some("Before June".to_string()),
            status: None,
        })
        .await
        .unwrap();

    let updated = task_service
        .update_task_by_id(
            created.id(),
            TaskChanges {
                title: Some("  ".to_string()),
                description: Some(None),
                status: Some(TaskStatus::Completed),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title(), "Renew passport");
    assert_eq!(updated.description(), None);
    assert_eq!(updated.status(), TaskStatus::Completed);
}

#[tokio::test]
async fn can_handle_update_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let created = task_service.create_task(new_task("Existing")).await.unwrap();

    let non_existent_id = created.id() + 1;
    let result = task_service
        .update_task_by_id(
            non_existent_id,
            TaskChanges {
                title: Some("Other".to_string()),
                ..Default::default()
            },
        )
        .await;

    match result {
        Err(e) => assert_eq!(
            e.to_string(),
            format!("Task with ID {} not found", non_existent_id)
        ),
        Ok(_) => panic!("Expected update of a missing task to fail"),
    }
}

#[tokio::test]
async fn can_list_tasks_newest_first() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let first = task_service.create_task(new_task("First")).await.unwrap();
    let second = task_service.create_task(new_task("Second")).await.unwrap();
    let third = task_service.create_task(new_task("Third")).await.unwrap();

    let tasks = task_service.list_tasks().await.expect("Failed to list tasks");

    let ids: Vec<i32> = tasks.iter().map(|task| task.id()).collect();
    assert_eq!(ids, vec![third.id(), second.id(), first.id()]);
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let tasks = task_service.list_tasks().await.expect("Failed to list tasks");

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_initialize_schema_repeatedly() {
    let state = setup().await.expect("Failed to setup test context");

    tasks_server::schema::initialize_schema(&state.db)
        .await
        .expect("Second schema initialization should be a no-op");

    let task_service = TaskService::new(&state.db);
    assert!(task_service.create_task(new_task("Still works")).await.is_ok());
}
