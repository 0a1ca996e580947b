// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    ApiConfig, Config, CorsConfig, HttpConfig, LogFormat, LoggingConfig, PerformanceConfig,
    ServerConfig, StuffSource,
};

/// Port used when neither `PORT` nor the config file names one
pub const FALLBACK_PORT: u16 = 9080;

/// Environment variable selecting the listen port
pub const PORT_ENV: &str = "PORT";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn with_defaults(builder: Builder) -> Result<Builder, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", FALLBACK_PORT)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("performance.keep_alive", true)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_timeout", 10)?
        .set_default("http.server_name", "stuff-server")?
        .set_default("http.max_body_size", 102_400)? // 100KB
        .set_default("cors.allowed_origin", "https://localhost:3000")?
        .set_default("cors.allow_credentials", false)?
        .set_default("api.mount_path", "/api")
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the config file,
    /// `STUFF__SECTION__KEY` variables, `PORT`, then `port_override`.
    pub fn load_from(config_path: &str, port_override: Option<u16>) -> Result<Self, ServerError> {
        let builder = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STUFF")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var(PORT_ENV).ok())?
            .set_override_option("server.port", port_override)?;

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only, ignoring files and the environment
    pub fn defaults() -> Result<Self, ServerError> {
        let settings = with_defaults(config::Config::builder())?.build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ServerError::Address { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.port, FALLBACK_PORT);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.cors.allowed_origin, "https://localhost:3000");
        assert_eq!(cfg.api.mount_path, "/api");
        assert_eq!(cfg.http.max_body_size, 102_400);
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.stuff, StuffSource::default());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3001;
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:3001".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(ServerError::Address { .. })
        ));
    }

    #[test]
    fn test_load_from_file_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 7000

[api]
mount_path = "/stuff"

[stuff]
type = "inline"
value = {{ items = [1, 2, 3] }}
"#
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap(), Some(7100)).unwrap();
        // CLI override wins over both PORT and the file
        assert_eq!(cfg.server.port, 7100);
        assert_eq!(cfg.api.mount_path, "/stuff");
        assert_eq!(
            cfg.stuff,
            StuffSource::Inline {
                value: serde_json::json!({ "items": [1, 2, 3] })
            }
        );
    }

    #[test]
    fn test_port_env() {
        let missing = "definitely/not/a/config/file";

        std::env::set_var(PORT_ENV, "abc");
        let result = Config::load_from(missing, None);
        assert!(matches!(result, Err(ServerError::Config(_))));

        std::env::set_var(PORT_ENV, "9191");
        assert_eq!(Config::load_from(missing, None).unwrap().server.port, 9191);

        std::env::remove_var(PORT_ENV);
        assert_eq!(
            Config::load_from(missing, None).unwrap().server.port,
            FALLBACK_PORT
        );
    }

    #[test]
    fn test_section_env() {
        let missing = "definitely/not/a/config/file";

        std::env::set_var("STUFF__HTTP__SERVER_NAME", "stuff-from-env");
        std::env::set_var("STUFF__CORS__MAX_AGE", "600");
        let cfg = Config::load_from(missing, Some(1)).unwrap();
        std::env::remove_var("STUFF__HTTP__SERVER_NAME");
        std::env::remove_var("STUFF__CORS__MAX_AGE");

        assert_eq!(cfg.http.server_name, "stuff-from-env");
        assert_eq!(cfg.cors.max_age, Some(600));
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_source.toml");
        std::fs::write(&path, "[stuff]\ntype = \"file\"\npath = \"data/stuff.json\"\n").unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap(), Some(1)).unwrap();
        assert_eq!(
            cfg.stuff,
            StuffSource::File {
                path: "data/stuff.json".to_string()
            }
        );
    }
}
