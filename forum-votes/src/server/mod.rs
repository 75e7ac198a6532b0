// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{create_cors_layer, Dependencies, Settings};
use crate::errors::ServerError;
use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(
    dependencies: &Dependencies,
    settings: &Settings,
) -> Result<Router, ServerError> {
    let state = AppState::from(dependencies);

    Ok(Router::new()
        .route(
            "/api/posts/:id/vote",
            post(handlers::cast_post_vote)
                .delete(handlers::retract_post_vote)
                .get(handlers::get_post_vote),
        )
        .route(
            "/api/comments/:id/vote",
            post(handlers::cast_comment_vote)
                .delete(handlers::retract_comment_vote)
                .get(handlers::get_comment_vote),
        )
        .route("/api/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/api/posts/:id", get(handlers::get_post))
        .route("/api/posts/:id/comments", post(handlers::create_comment))
        .route("/api/comments/:id/replies", post(handlers::create_reply))
        .route("/api/users/me", put(handlers::update_profile))
        .route("/api/users/:id", get(handlers::get_user))
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer(settings)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the server on the specified address until ctrl-c is received
pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Server listening on {}", addr);
    info!("- Post endpoints: http://{}/api/posts", addr);
    info!("- Vote endpoints: http://{}/api/{{posts,comments}}/:id/vote", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
