//! TOML configuration.
//!
//! The configuration is read once at startup into an immutable [`Config`]
//! that is handed to the server constructor. TMDB credentials may also come
//! from the `TMDB_API_KEY` / `TMDB_API_TOKEN` environment variables, which
//! take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the TMDB v3 API key.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";
/// Environment variable holding the TMDB v4 read access (bearer) token.
pub const API_TOKEN_ENV: &str = "TMDB_API_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Key used to sign form CSRF tokens. A random key is generated per
    /// process when absent, so tokens do not survive a restart.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_csrf")]
    pub csrf: bool,
}

fn default_csrf() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            api_token: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    #[cfg(test)]
    fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/movies.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
                secret_key: None,
                csrf: default_csrf(),
            },
            tmdb: TmdbConfig::default(),
        }
    }

    /// Fill TMDB credentials from the environment. Set variables win over
    /// values from the file; empty variables are ignored.
    pub fn with_env_credentials(mut self) -> Self {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(token) = non_empty_env(API_TOKEN_ENV) {
            self.tmdb.api_token = Some(token);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }

        for (name, url) in [
            ("tmdb.base_url", &self.tmdb.base_url),
            ("tmdb.image_base_url", &self.tmdb.image_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }

        if self.tmdb.timeout_secs == 0 {
            anyhow::bail!("tmdb.timeout_secs must be > 0");
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    let config = config.with_env_credentials();
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_tmdb_table() {
        let config: Config = toml::from_str(
            r#"
[db]
path = "/tmp/movies.sqlite"

[server]
bind = "127.0.0.1:5000"
"#,
        )
        .unwrap();

        assert!(config.server.csrf);
        assert!(config.server.secret_key.is_none());
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.image_base_url, "https://image.tmdb.org/t/p/w500");
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.tmdb.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::minimal();
        config.tmdb.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tmdb.base_url"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::minimal();
        config.tmdb.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reel-rank.toml");
        std::fs::write(
            &path,
            r#"
[db]
path = "/tmp/movies.sqlite"

[server]
bind = "127.0.0.1:0"
csrf = false

[tmdb]
language = "de-DE"
api_key = "from-file"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(!config.server.csrf);
        assert_eq!(config.tmdb.language, "de-DE");
        // The env may override the key on a developer machine.
        assert!(config.tmdb.api_key.is_some());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/reel-rank.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
