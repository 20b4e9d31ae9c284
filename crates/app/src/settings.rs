//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `TALLY__*` environment variables, the
//! latter taking precedence (e.g. `TALLY__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
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

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    #[serde(default)]
    pub enable_register: bool,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sqlite_server() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "tally.db" }
            enable_register = true
            jwt_secret = "s3cret"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(server.enable_register);
        assert_eq!(server.jwt_secret, "s3cret");
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "tally.db"));
    }

    #[test]
    fn defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            jwt_secret = "s3cret"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        let server = settings.server.unwrap();
        assert!(server.bind.is_none());
        assert!(!server.enable_register);
        assert!(matches!(server.database, Database::Memory));
    }

    #[test]
    fn jwt_secret_is_required() {
        let result = Config::builder()
            .add_source(File::from_str(
                r#"
                [server]
                port = 3000
                database = "memory"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>();
        assert!(result.is_err());
    }
}
