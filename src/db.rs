use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

/// Open a Postgres pool from environment configuration. No retry; a
/// connectivity failure surfaces immediately.
pub async fn connect() -> Result<PgPool> {
    let options = options_from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to Postgres")?;

    Ok(pool)
}

fn options_from_env() -> Result<PgConnectOptions> {
    let host = std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("POSTGRES_PORT")
        .unwrap_or_else(|_| "5432".to_string())
        .parse()
        .context("POSTGRES_PORT must be a port number")?;
    let database =
        std::env::var("POSTGRES_DB").map_err(|_| anyhow::anyhow!("POSTGRES_DB not set"))?;
    let user =
        std::env::var("POSTGRES_USER").map_err(|_| anyhow::anyhow!("POSTGRES_USER not set"))?;
    let password = std::env::var("POSTGRES_PASSWORD")
        .map_err(|_| anyhow::anyhow!("POSTGRES_PASSWORD not set"))?;

    Ok(PgConnectOptions::new()
        .host(&host)
        .port(port)
        .database(&database)
        .username(&user)
        .password(&password))
}

/// Connectivity probe behind `tgwh check`.
pub async fn run_check() -> Result<()> {
    let pool = connect().await?;

    let database: String = sqlx::query_scalar("SELECT current_database()")
        .fetch_one(&pool)
        .await?;

    println!("Connected to database: {}", database);

    pool.close().await;
    Ok(())
}
