#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sea_orm::{Database, DatabaseConnection};
use tasks_server::config::Config;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use tower::ServiceExt;

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    tasks_server::schema::initialize_schema(&db).await?;
    Ok(db)
}

/// Configuration used by router tests; only the CORS origin matters there.
pub fn test_config() -> Config {
    Config {
        db_host: "localhost".to_string(),
        db_user: "postgres".to_string(),
        db_pass: String::new(),
        db_name: "tasks".to_string(),
        db_port: 5432,
        db_url: None,
        db_max_connections: 1,
        port: 3000,
        cors_origin: "http://localhost:5173".to_string(),
    }
}

/// Builds the full application router on top of `db`.
pub fn test_app(db: DatabaseConnection) -> Router {
    tasks_server::web::create_app(db, &test_config()).expect("Failed to build app")
}

/// Sends a request with an optional JSON body and returns the status and parsed body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    json: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match json {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, value)
}
