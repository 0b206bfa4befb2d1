//! Application settings, read from an optional `settings.toml` in the
//! working directory and overridden by `HAULAGE__*` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
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
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
            database: default_database(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Notifications {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub notifications: Notifications,
}

fn default_level() -> String {
    "info".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_database() -> Database {
    Database::Sqlite("haulage.db".to_string())
}

impl Settings {
    /// `settings.toml` (optional) overridden by `HAULAGE__SECTION__KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("HAULAGE")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_config(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn defaults_apply_to_an_empty_file() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.database.url(), "sqlite:haulage.db?mode=rwc");
        assert!(settings.notifications.webhook_url.is_none());
    }

    #[test]
    fn database_accepts_memory_or_sqlite_path() {
        let memory = parse(
            r#"
            [server]
            port = 8080
            database = "memory"
            "#,
        );
        assert_eq!(memory.server.port, 8080);
        assert_eq!(memory.server.database.url(), "sqlite::memory:");

        let file = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            database = { sqlite = "/var/lib/haulage.db" }

            [notifications]
            webhook_url = "https://hooks.example.com/welcome"
            "#,
        );
        assert_eq!(file.app.level, "debug");
        assert_eq!(file.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(
            file.server.database.url(),
            "sqlite:/var/lib/haulage.db?mode=rwc"
        );
        assert!(file.notifications.webhook_url.is_some());
    }
}
