mod authentication;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
pub mod identity;
mod models;
pub mod payments;
pub mod stats;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{net::TcpListener, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Shared by every handler through an `Extension` layer.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub http: reqwest::Client,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");
    Ok(pool)
}

pub async fn build_app(config: Config) -> Result<Router> {
    let pool = init_db(&config.database_url).await?;
    let state = Arc::new(AppState {
        pool,
        config,
        http: reqwest::Client::new(),
    });
    Ok(make_router()
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()))
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    info!("Server started on {}", listener.local_addr()?);
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn run_app(config: Config) -> Result<()> {
    let address = config.bind_address;
    let app = build_app(config).await?;
    let listener =
        TcpListener::bind(address).with_context(|| format!("Failed to bind {}", address))?;
    serve(listener, app).await
}

pub fn make_router() -> Router {
    Router::new().nest("/api", api_router()).fallback(not_found)
}

fn api_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // auth
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/auth/me", get(get_current_user))
        .route("/auth/users/:id/toggle-premium", post(admin_toggle_premium))
        // questions
        .route("/questions", post(create_question))
        .route("/questions/daily", get(get_daily_question))
        .route("/questions/daily/answer", post(submit_answer))
        .route("/questions/:id/check-answer", get(check_answer))
        .route("/questions/:id/stats", get(get_question_stats))
        .route(
            "/questions/:id/comments",
            get(get_question_comments).post(add_question_comment),
        )
        // comments
        .route("/comments", post(create_comment))
        .route("/comments/:id/like", post(toggle_comment_like))
        // admin
        .route(
            "/admin/questions",
            get(admin_list_questions).post(admin_create_question),
        )
        .route(
            "/admin/questions/:id",
            put(admin_update_question).delete(admin_delete_question),
        )
        .route("/admin/users", get(admin_list_users))
        .route("/admin/users/:id/toggle-premium", post(admin_toggle_premium))
        // subscriptions
        .route(
            "/subscriptions/create-checkout-session",
            post(create_checkout),
        )
        .route("/subscriptions/webhook", post(payment_webhook))
}
