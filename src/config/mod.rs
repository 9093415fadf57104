//! Configuration management for newswatch.
//!
//! Configuration is read from `~/.config/newswatch/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::fetcher::parallel::DEFAULT_WORKERS;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feeds polled by `watch`.
    pub sources: Vec<String>,
    /// Trigger rules file. Defaults to `triggers.txt` next to the config.
    pub rules: Option<PathBuf>,
    /// Delay between polls, e.g. "2m".
    pub poll_interval: String,
    /// Zone rule timestamps are written in, e.g. "-05:00".
    pub reference_offset: String,
    /// Concurrent fetches.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![
                "http://news.google.com/news?output=rss".to_string(),
                "http://news.yahoo.com/rss/topstories".to_string(),
            ],
            rules: None,
            poll_interval: "2m".to_string(),
            reference_offset: "-05:00".to_string(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Surface bad values at load time rather than on first poll.
        config.interval()?;
        config.reference_zone()?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/newswatch/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newswatch"))
    }

    /// Rules file to compile: the configured one, or
    /// `~/.config/newswatch/triggers.txt`.
    pub fn rules_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.rules {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("triggers.txt")),
        }
    }

    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_interval(&self.poll_interval).map(Duration::from_secs)
    }

    pub fn reference_zone(&self) -> Result<FixedOffset, ConfigError> {
        parse_offset(&self.reference_offset)
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Created default config at {}", path.display());
        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# newswatch configuration

# Feeds polled by `newswatch watch`
sources = [
    "http://news.google.com/news?output=rss",
    "http://news.yahoo.com/rss/topstories",
]

# Trigger rules file (default: triggers.txt next to this file)
# rules = "/path/to/triggers.txt"

# Delay between polls: "30s", "2m", "1h", "1d" or plain seconds
poll_interval = "2m"

# UTC offset that AFTER/BEFORE timestamps in the rules are written in
reference_offset = "-05:00"

# Concurrent feed fetches
workers = 10
"##
    }
}

/// Parse interval string like "30s", "2m", "1h", "1d" or raw seconds.
pub fn parse_interval(s: &str) -> Result<u64, ConfigError> {
    let s = s.trim().to_lowercase();
    let invalid = || ConfigError::InvalidInterval(s.clone());

    let (digits, unit) = match s.char_indices().last() {
        Some((i, 's')) => (&s[..i], 1),
        Some((i, 'm')) => (&s[..i], 60),
        Some((i, 'h')) => (&s[..i], 3600),
        Some((i, 'd')) => (&s[..i], 86400),
        _ => (s.as_str(), 1),
    };

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }
    value.checked_mul(unit).ok_or_else(invalid)
}

/// Parse a UTC offset written as `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
pub fn parse_offset(s: &str) -> Result<FixedOffset, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidOffset(s.to_string());

    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let rest = rest.replace(':', "");
    if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = rest[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = rest[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid interval: {0}. Use format like '30s', '2m', '1h', '1d'")]
    InvalidInterval(String),

    #[error("Invalid UTC offset: {0}. Use format like '-05:00'")]
    InvalidOffset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config = toml::from_str(Config::default_config_content())
            .expect("Default config should be valid TOML");

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.poll_interval, "2m");
        assert_eq!(config.workers, 10);
        assert!(config.rules.is_none());
        assert_eq!(config.interval().unwrap(), Duration::from_secs(120));
        assert_eq!(
            config.reference_zone().unwrap(),
            FixedOffset::west_opt(5 * 3600).unwrap()
        );
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
sources = ["feeds/local.xml"]
rules = "/tmp/rules.txt"
"#;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.sources, vec!["feeds/local.xml"]);
        assert_eq!(config.rules_path().unwrap(), PathBuf::from("/tmp/rules.txt"));
        assert_eq!(config.reference_offset, "-05:00");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.poll_interval, "2m");
    }

    #[test]
    fn test_load_from_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "poll_interval = \"soon\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidInterval(_))
        ));

        fs::write(&path, "reference_offset = \"EST\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidOffset(_))
        ));

        fs::write(&path, "workers = \"many\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("none.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("2m").unwrap(), 120);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("60s").unwrap(), 60);
        assert_eq!(parse_interval("3600").unwrap(), 3600);
        assert_eq!(parse_interval(" 6H ").unwrap(), 21600);
        assert!(parse_interval("invalid").is_err());
        assert!(parse_interval("0m").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-05:00").unwrap(), FixedOffset::west_opt(18000).unwrap());
        assert_eq!(parse_offset("+0530").unwrap(), FixedOffset::east_opt(19800).unwrap());
        assert_eq!(parse_offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert!(parse_offset("05:00").is_err());
        assert!(parse_offset("+5").is_err());
        assert!(parse_offset("+05:75").is_err());
        assert!(parse_offset("+25:00").is_err());
    }
}
