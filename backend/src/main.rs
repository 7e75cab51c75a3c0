//! Main entry point for the clinic administration backend.
//!
//! This file initializes the Axum web server, connects the hosted data and
//! email adapters, and registers all API routes and middleware. The auth
//! middleware is layered onto the protected router here, so every route not
//! explicitly public requires an admin session.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod middleware;
mod services;
mod state;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adapters::{Mailer, MemoryMailer, ResendMailer, SupabaseClient};

use crate::auth::AuthService;
use crate::config::Config;
use crate::database::Db;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let supabase = SupabaseClient::new(&config.supabase_url, &config.supabase_service_key)
        .context("building data platform client")?;

    let mailer: Arc<dyn Mailer> = match config.email_api_key.as_deref() {
        Some(key) => Arc::new(ResendMailer::new(key, &config.email_from).context("building mailer")?),
        None => {
            warn!("EMAIL_API_KEY not set; outbound email will only be recorded in memory");
            Arc::new(MemoryMailer::default())
        }
    };

    let state = AppState {
        auth: AuthService::new(supabase.clone(), &config.jwt_secret, config.session_ttl_hours),
        db: Db::new(supabase),
        mailer,
        config: Arc::new(config),
    };

    let bind_addr = state.config.bind_addr;
    let app = router(state);

    let listener = TcpListener::bind(bind_addr).await.context("binding listener")?;
    info!("listening on {bind_addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(api::protected_router())
        .merge(auth::routes::protected_router())
        .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_auth));

    let public = Router::new()
        .merge(api::public_router())
        .merge(auth::routes::public_router());

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(&state.config))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
