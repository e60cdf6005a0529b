use guarita_adapters::config::Settings;
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the connection pool from settings and bring the schema up to date.
pub async fn configure_postgresql(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let pool = get_postgres_pool(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn get_postgres_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

/// Compact fmt output, `RUST_LOG`-style filtering, and span-aware error
/// context.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = fmt::layer().compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
