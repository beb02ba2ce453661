//! Configuration for booklib.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of this)
//! 2. Environment variables (BOOKLIB_BACKEND, BOOKLIB_API_BASE, BOOKLIB_BIND)
//! 3. Config file (.booklib/config.yaml)
//! 4. Defaults (in-memory catalog seeded with sample books)
//!
//! Config file discovery:
//! - Searches current directory and parents for .booklib/config.yaml
//! - Falls back to ~/.booklib/config.yaml

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::server::DEFAULT_BASE_PATH;
use crate::store::http::DEFAULT_API_BASE;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Which catalog backing to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local in-memory catalog
    #[default]
    Memory,

    /// Remote REST service
    Remote,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Memory => write!(f, "memory"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "local" | "mock" => Ok(Backend::Memory),
            "remote" | "http" | "api" => Ok(Backend::Remote),
            _ => anyhow::bail!("Unknown backend: {}", s),
        }
    }
}

/// Initial contents of a local catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seed {
    /// The three sample books
    #[default]
    Sample,

    /// No books
    Empty,
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub local: Option<LocalConfig>,
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    pub seed: Option<Seed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub base_path: Option<String>,
}

/// Resolved configuration with every value filled in
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Backend,
    /// Base URL of the remote service
    pub api_base: String,
    /// Per-request timeout for the remote backing
    pub request_timeout: Duration,
    /// Seed for the local backing (and for `serve`)
    pub seed: Seed,
    /// Address `serve` binds to
    pub bind: String,
    /// Route prefix for `serve`
    pub base_path: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            seed: Seed::default(),
            bind: DEFAULT_BIND.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".booklib").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let home_config = dirs::home_dir()?.join(".booklib").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge defaults, file values and environment lookups
fn resolve<F>(file: Option<&ConfigFile>, config_file: Option<PathBuf>, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ResolvedConfig::default();

    let backend = match env("BOOKLIB_BACKEND") {
        Some(value) => value
            .parse()
            .context("Invalid BOOKLIB_BACKEND environment variable")?,
        None => file.and_then(|f| f.backend).unwrap_or(defaults.backend),
    };

    let remote = file.and_then(|f| f.remote.as_ref());
    let api_base = env("BOOKLIB_API_BASE")
        .or_else(|| remote.and_then(|r| r.api_base.clone()))
        .unwrap_or(defaults.api_base);
    let request_timeout = remote
        .and_then(|r| r.timeout_seconds)
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

    let seed = file
        .and_then(|f| f.local.as_ref())
        .and_then(|l| l.seed)
        .unwrap_or(defaults.seed);

    let server = file.and_then(|f| f.server.as_ref());
    let bind = env("BOOKLIB_BIND")
        .or_else(|| server.and_then(|s| s.bind.clone()))
        .unwrap_or(defaults.bind);
    let base_path = server
        .and_then(|s| s.base_path.clone())
        .unwrap_or(defaults.base_path);

    Ok(ResolvedConfig {
        backend,
        api_base,
        request_timeout,
        seed,
        bind,
        base_path,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let file = config_file.as_deref().map(load_config_file).transpose()?;

    resolve(file.as_ref(), config_file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = resolve(None, None, no_env).unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.seed, Seed::Sample);
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.base_path, "/api");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let booklib_dir = temp.path().join(".booklib");
        std::fs::create_dir_all(&booklib_dir).unwrap();

        let config_path = booklib_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
backend: remote
remote:
  api_base: https://books.example.com/api
  timeout_seconds: 5
local:
  seed: empty
server:
  bind: 0.0.0.0:9000
  base_path: /v1
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.backend, Some(Backend::Remote));

        let config = resolve(Some(&parsed), Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.backend, Backend::Remote);
        assert_eq!(config.api_base, "https://books.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.seed, Seed::Empty);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.base_path, "/v1");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let parsed: ConfigFile = serde_yaml::from_str(
            r#"
version: "1.0"
backend: memory
remote:
  api_base: http://from-file/api
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("BOOKLIB_BACKEND", "remote"),
            ("BOOKLIB_API_BASE", "http://from-env/api"),
        ]
        .into_iter()
        .collect();

        let config = resolve(Some(&parsed), None, |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.backend, Backend::Remote);
        assert_eq!(config.api_base, "http://from-env/api");
    }

    #[test]
    fn test_invalid_backend_env_is_an_error() {
        let result = resolve(None, None, |key| {
            (key == "BOOKLIB_BACKEND").then(|| "carrier-pigeon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("MEMORY".parse::<Backend>().unwrap(), Backend::Memory);
        assert_eq!("http".parse::<Backend>().unwrap(), Backend::Remote);
        assert!("ftp".parse::<Backend>().is_err());
    }
}
