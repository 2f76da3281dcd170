//! # Taskboard API Server
//!
//! Multi-user task board backend: accounts with refresh-cookie sessions and
//! password reset, per-user statuses (board columns) and tasks.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect the PostgreSQL pool and apply migrations
//! 3. Choose the password-reset notifier (SMTP or log-only)
//! 4. Serve until Ctrl-C, then drain in-flight requests and close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use anyhow::Context;
use taskboard_api::{app, config::Config, mailer};
use taskboard_shared::db::{migrations, pool};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        max_connections: config.database.max_connections,
        ..pool::DatabaseConfig::from_url(config.database.url.clone())
    })
    .await
    .context("Failed to connect to the database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to apply database migrations")?;

    let notifier = mailer::notifier_from_config(
        &config.mail,
        config.jwt.password_reset_token_expire_minutes,
    );

    let bind_address = config.bind_address();
    let state = app::AppState::new(db.clone(), config, notifier);
    let router = app::build_router(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(db).await;
    tracing::info!("Taskboard API Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
