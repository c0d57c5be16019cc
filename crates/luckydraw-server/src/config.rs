// Configuration loading and parsing (config/server.toml).

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "LUCKYDRAW_PORT";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// server.toml structs
// ---------------------------------------------------------------------------

/// The assembled configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub docs: DocsConfig,
    pub draw: DrawConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes priority.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "luckydraw=info,warn".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Serve `/api-docs` and `/api-docs/openapi.json`.
    pub enabled: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        DocsConfig { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Fixed RNG seed. Unset means seed from OS entropy.
    pub seed: Option<u64>,
}

impl Config {
    /// Socket address to bind. Only valid after `validate` has passed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::ValidationError {
                field: "server.host".into(),
                message: format!("not an IP address: {:?}", self.server.host),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Base URL advertised in the OpenAPI document.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/server.toml` relative to `base_dir`.
///
/// A missing file is not an error: every setting has a default. The port
/// override from the environment is not applied here; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("server.toml");

    let config = match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text, &path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };

    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, then applies the `LUCKYDRAW_PORT` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::ReadError {
        path: PathBuf::from("."),
        source,
    })?;
    let mut config = load_config_from(&cwd)?;
    apply_port_override(&mut config, std::env::var(PORT_ENV).ok().as_deref())?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_port_override(config: &mut Config, value: Option<&str>) -> Result<(), ConfigError> {
    let Some(raw) = value else {
        return Ok(());
    };
    config.server.port = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError {
            field: PORT_ENV.into(),
            message: format!("not a valid port: {raw:?}"),
        })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.bind_addr()?;

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.filter".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: fresh `<tmp>/<name>/config` directory with `server.toml`
    /// holding `contents`. Returns the base dir.
    fn write_config(name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        let config_dir = tmp.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("server.toml"), contents).unwrap();
        tmp
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = std::env::temp_dir().join("luckydraw_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.filter, "luckydraw=info,warn");
        assert!(config.docs.enabled);
        assert_eq!(config.draw.seed, None);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parses_full_file() {
        let tmp = write_config(
            "luckydraw_config_full",
            r#"
[server]
host = "0.0.0.0"
port = 8080

[logging]
filter = "debug"

[docs]
enabled = false

[draw]
seed = 42
"#,
        );

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.filter, "debug");
        assert!(!config.docs.enabled);
        assert_eq!(config.draw.seed, Some(42));
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.server_url(), "http://0.0.0.0:8080");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = write_config("luckydraw_config_partial", "[server]\nport = 4000\n");

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.docs.enabled);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_invalid_toml() {
        let tmp = write_config("luckydraw_config_bad_toml", "[server\nport = ");

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got: {err}");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_ip_host() {
        let tmp = write_config("luckydraw_config_bad_host", "[server]\nhost = \"localhost\"\n");

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "server.host"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_log_filter() {
        let tmp = write_config("luckydraw_config_empty_filter", "[logging]\nfilter = \"  \"\n");

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "logging.filter"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn port_override_applies() {
        let mut config = Config::default();
        apply_port_override(&mut config, Some(" 9090 ")).unwrap();
        assert_eq!(config.server.port, 9090);

        apply_port_override(&mut config, None).unwrap();
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn port_override_rejects_garbage() {
        let mut config = Config::default();
        let err = apply_port_override(&mut config, Some("eighty")).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, PORT_ENV),
            other => panic!("expected ValidationError, got: {other}"),
        }
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn shipped_config_file_is_valid() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = load_config_from(&root).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
