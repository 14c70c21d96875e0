use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// When present, takes precedence over the individual connection parts.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db = DbConfig {
            host: get("DB_HOST", "localhost"),
            port: get("DB_PORT", "5432")
                .parse()
                .context("DB_PORT must be a port number")?,
            user: get("DB_USER", "postgres"),
            password: get("DB_PASSWORD", "postgres"),
            name: get("DB_NAME", "users"),
            max_connections: get("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
        };
        anyhow::ensure!(db.max_connections > 0, "DB_MAX_CONNECTIONS must be greater than 0");

        Ok(Self {
            host: get("APP_HOST", "0.0.0.0"),
            port: get("APP_PORT", "8080")
                .parse()
                .context("APP_PORT must be a port number")?,
            db,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_target_local_postgres() {
        let cfg = config_from(&[]).expect("defaults parse");
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.db.host, "localhost");
        assert_eq!(cfg.db.port, 5432);
        assert_eq!(cfg.db.user, "postgres");
        assert_eq!(cfg.db.password, "postgres");
        assert_eq!(cfg.db.name, "users");
        assert_eq!(cfg.db.max_connections, 10);
        assert!(cfg.db.url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config_from(&[
            ("APP_PORT", "9000"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "people"),
            ("DATABASE_URL", "postgres://u:p@h/d"),
        ])
        .expect("overrides parse");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.db.host, "db.internal");
        assert_eq!(cfg.db.port, 6543);
        assert_eq!(cfg.db.name, "people");
        assert_eq!(cfg.db.url.as_deref(), Some("postgres://u:p@h/d"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config_from(&[("DB_HOST", "  "), ("DATABASE_URL", "")]).expect("parse");
        assert_eq!(cfg.db.host, "localhost");
        assert!(cfg.db.url.is_none());
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[("DB_PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));

        let err = config_from(&[("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }
}
