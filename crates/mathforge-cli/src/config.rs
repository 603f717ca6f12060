//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$MATHFORGE_CONFIG` environment variable
//! 2. `<platform config dir>/mathforge/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub quiz: QuizConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Query history settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept before the oldest is evicted.
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Signing key for answer ids. When unset a random key is drawn at
    /// start-up and ids do not survive a restart.
    pub secret: Option<String>,
    /// Relative tolerance for non-integer answers.
    pub tolerance: f64,
    pub default_difficulty: String,
}

// --- Defaults ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: mathforge_core::DEFAULT_CAPACITY,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            secret: None,
            tolerance: mathforge_core::quiz::DEFAULT_TOLERANCE,
            default_difficulty: "medium".into(),
        }
    }
}

impl ServerConfig {
    /// Resolve `host:port`, accepting hostnames as well as IP literals.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("resolving {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("no address for {}:{}", self.host, self.port))
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(p) if p.exists() => load_config_from(&p),
        _ => Ok(Config::default()),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MATHFORGE_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::ProjectDirs::from("dev", "mathforge", "mathforge")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Show the active config path (for `mathforge config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.history.capacity, 100);
        assert!(config.quiz.secret.is_none());
        assert_eq!(config.quiz.default_difficulty, "medium");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[server]
port = 8080
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        // Other fields should be defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.history.capacity, 100);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[server]
host = "127.0.0.1"
port = 9000

[history]
capacity = 25

[quiz]
secret = "hunter2"
tolerance = 0.01
default_difficulty = "hard"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.history.capacity, 25);
        assert_eq!(config.quiz.secret.as_deref(), Some("hunter2"));
        assert_eq!(config.quiz.tolerance, 0.01);
        assert_eq!(config.quiz.default_difficulty, "hard");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[history]\ncapacity = 7").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.history.capacity, 7);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a port\"").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("parsing"));
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 5050,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:5050");
    }
}
