use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::config::DbConfig;

pub fn connect_options(cfg: &DbConfig) -> anyhow::Result<PgConnectOptions> {
    let opts = match &cfg.url {
        Some(url) => PgConnectOptions::from_str(url).context("parse DATABASE_URL")?,
        None => PgConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user)
            .password(&cfg.password)
            .database(&cfg.name),
    };
    Ok(opts)
}

/// `host:port/database` as actually dialed, after any `DATABASE_URL` override.
pub fn describe_target(opts: &PgConnectOptions) -> String {
    format!(
        "{}:{}/{}",
        opts.get_host(),
        opts.get_port(),
        opts.get_database().unwrap_or_default()
    )
}

/// Opens the pool and checks out one connection so an unreachable store fails startup.
pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let opts = connect_options(cfg)?;
    let target = describe_target(&opts);
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(opts)
        .await
        .with_context(|| format!("connect to database at {target}"))?;
    tracing::info!(%target, "database connection established");
    Ok(pool)
}

/// Provisions the schema. Applied migrations are recorded by sqlx, so re-running is a no-op.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run database migrations")?;
    tracing::info!("database schema up to date");
    Ok(())
}
