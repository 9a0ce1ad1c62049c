mod config;
mod db;
mod entities;
mod error;
mod models;
mod mutations;
mod queries;
mod routes;
mod templates;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;

pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
}

fn router(state: Arc<AppState>) -> Router {
    let media_root = state.config.media_root.clone();
    Router::new()
        .route("/", get(routes::index))
        .route("/filter", get(routes::filter))
        .route("/search", get(routes::search))
        .route("/add-rating", post(routes::add_rating))
        .route("/actor/{name}", get(routes::actor_detail))
        .route("/{slug}", get(routes::movie_detail))
        .route("/{slug}/review", post(routes::add_review))
        .nest_service("/media", ServeDir::new(media_root))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,kinoteka=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;

    let state = Arc::new(AppState { config: config.clone(), db });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Route registration panics on conflicting path captures, so building
    // the full router is itself the assertion.
    #[tokio::test]
    async fn router_registers_all_routes() {
        let config = Arc::new(Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            media_root: "media".into(),
            recent_count: 5,
        });
        let db = db::connect_and_migrate(&config.database_url).await.unwrap();
        let _app = router(Arc::new(AppState { config, db }));
    }
}
