use anyhow::Context;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;

use approval_backend::api;
use approval_backend::config::Config;
use approval_backend::db::pool::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Config::init();

    tracing_subscriber::fmt().with_target(true).init();

    let config = Config::get();
    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let app = api::app(pool.clone());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server running at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(pool))
        .await
        .context("Server encountered an error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(pool: PgPool) {
    signal::ctrl_c().await.ok();
    tracing::info!("Received Ctrl+C, shutting down...");
    pool.close().await;
    tracing::info!("Database pool closed. Server shutting down.");
}
