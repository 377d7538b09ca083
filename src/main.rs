use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use cyclelog_backend::{app, config::Config, store::PgStore, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let state = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.max_connections)
                .await
                .context("connecting to DATABASE_URL")?;
            sqlx::migrate!("./migrations")
                .run(store.pool())
                .await
                .context("running migrations")?;
            tracing::info!("🗄️ Connected to Postgres, migrations applied");

            AppState::shared(Arc::new(store))
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, using in-memory store (data won't persist)");
            AppState::in_memory()
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("🧠 Server running at {}", config.bind_addr);

    axum::serve(listener, app(state).into_make_service()).await?;

    Ok(())
}
