//! Settings of the `family_money` binary.
//!
//! Values come from an optional `settings.toml` (or the file named by
//! `FAMILY_MONEY_SETTINGS`), then from `FAMILY_MONEY_*` environment variables
//! using `__` between nested keys, e.g. `FAMILY_MONEY_SERVER__PORT=9000`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const SETTINGS_PATH_VAR: &str = "FAMILY_MONEY_SETTINGS";
const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub database: Database,
    pub bind: String,
    pub port: u16,
    /// Frontend origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            database: Database::Sqlite("family_money.db".to_string()),
            bind: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var(SETTINGS_PATH_VAR).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("FAMILY_MONEY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(
            settings.server.database.url(),
            "sqlite:family_money.db?mode=rwc"
        );
        assert_eq!(settings.server.cors_origins.len(), 2);
    }

    #[test]
    fn database_can_be_in_memory_or_a_file() {
        let settings = from_toml(
            r#"
            [server]
            database = "memory"
            port = 9000
            "#,
        );
        assert_eq!(settings.server.database.url(), "sqlite::memory:");
        assert_eq!(settings.server.port, 9000);

        let settings = from_toml(
            r#"
            [server]
            database = { sqlite = "/var/lib/family_money.db" }
            "#,
        );
        assert_eq!(
            settings.server.database.url(),
            "sqlite:/var/lib/family_money.db?mode=rwc"
        );
    }
}
