use axum::Router;
use axum::http::{HeaderValue, Method, header};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::schema;
use crate::task::TaskState;
use crate::web::error::{handle_panic, route_not_found_handler};

pub mod api;
pub mod error;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = schema::connect(&config).await?;
    match schema::initialize_schema(&db).await {
        Ok(()) => tracing::info!("Tasks table ready"),
        Err(err) => tracing::error!("Error creating tasks table: {}", err),
    }

    let app = create_app(db, &config)?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the complete application router.
///
/// The not-found fallbacks are attached after every route has been merged,
/// so they only see requests nothing else handled.
pub fn create_app(db: DatabaseConnection, config: &Config) -> anyhow::Result<Router> {
    let task_state = Arc::new(TaskState { db: Arc::new(db) });
    let cors = create_cors_layer(&config.cors_origin)?;

    let app = Router::new()
        .route("/", axum::routing::get(welcome_handler))
        .merge(api::create_api_router(task_state))
        .fallback(route_not_found_handler)
        .method_not_allowed_fallback(route_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(handle_panic)),
        );
    Ok(app)
}

/// Allows exactly one browser origin to call the API with credentials.
pub fn create_cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

#[tracing::instrument]
pub async fn welcome_handler() -> &'static str {
    "Hello from the task service!"
}
