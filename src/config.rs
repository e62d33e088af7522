//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! A [`Config`] is an ordinary value: it is loaded once by the binary and
//! handed to each component's constructor. [`Layout`] derives every on-disk
//! location from it.

use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diary: DiaryConfig,

    #[serde(default)]
    pub products: ProductsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Diary layout and identity
#[derive(Debug, Clone, Deserialize)]
pub struct DiaryConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_url_base")]
    pub url_base: String,

    /// Offset used for date labels, paths and URLs (e.g. "+09:00")
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Explicit export stream; discovered from the data dirs when absent
    pub export_file: Option<String>,
}

fn default_data_dir() -> String {
    dirs::home_dir()
        .map(|p| p.join(".hatedma").to_string_lossy().to_string())
        .unwrap_or_else(|| "./.hatedma".to_string())
}

fn default_username() -> String {
    "hatenausername".to_string()
}

fn default_url_base() -> String {
    "http://d.hatena.ne.jp".to_string()
}

fn default_utc_offset() -> String {
    "+09:00".to_string()
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            username: default_username(),
            url_base: default_url_base(),
            utc_offset: default_utc_offset(),
            export_file: None,
        }
    }
}

/// Product lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsConfig {
    /// Lookup endpoint; lookups are disabled when unset
    pub endpoint: Option<String>,

    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    #[serde(default = "default_flush_every")]
    pub flush_every: usize,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_pause_ms() -> u64 {
    3000
}

fn default_flush_every() -> usize {
    5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            pause_ms: default_pause_ms(),
            flush_every: default_flush_every(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("hatedma").join("config.toml")),
            Some(PathBuf::from("./hatedma.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("HATEDMA_DATA_DIR") {
            self.diary.data_dir = data_dir;
        }
        if let Ok(username) = std::env::var("HATENA_USERNAME") {
            self.diary.username = username;
        }

        if let Ok(endpoint) = std::env::var("HATEDMA_PRODUCT_ENDPOINT") {
            self.products.endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("HATEDMA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HATEDMA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Parsed form of `diary.utc_offset`
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.diary.utc_offset)
    }
}

/// Parse "+HH:MM", "-HH:MM", "+HHMM" or "Z"
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "diary.utc_offset",
        value: s.to_string(),
    };

    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Every on-disk location, derived from a [`Config`]
#[derive(Debug, Clone)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub username: String,
    pub user_dir: PathBuf,
    pub diary_dir: PathBuf,
    pub diary_dir_old: PathBuf,
    pub tag_file: PathBuf,
    pub tag_file_old: PathBuf,
    pub product_file: PathBuf,
    pub list_title: PathBuf,
    pub list_date: PathBuf,
    pub list_wiki: PathBuf,
    pub export_file: PathBuf,
}

impl Layout {
    pub fn new(config: &Config) -> Self {
        let base_dir = expand_home(&config.diary.data_dir);
        let username = config.diary.username.clone();
        let user_dir = base_dir.join(&username);
        let diary_dir = user_dir.join("data");

        let export_file = match &config.diary.export_file {
            Some(path) => PathBuf::from(path),
            None => find_export_file(&[PathBuf::from("."), user_dir.clone(), base_dir.clone()], &username),
        };

        Self {
            diary_dir_old: with_suffix(&diary_dir, ".old"),
            tag_file: user_dir.join("tag.json"),
            tag_file_old: user_dir.join("tag.json.old"),
            product_file: base_dir.join("amazon.json"),
            list_title: user_dir.join(format!("{}_title.txt", username)),
            list_date: user_dir.join(format!("{}_date.txt", username)),
            list_wiki: user_dir.join(format!("{}_wiki.txt", username)),
            export_file,
            diary_dir,
            user_dir,
            username,
            base_dir,
        }
    }

    /// Create the base and user directories
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(&self.user_dir)?;
        Ok(())
    }

    /// (description, path) pairs for the status report
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let show = |p: &Path| p.display().to_string();
        vec![
            ("base directory", show(&self.base_dir)),
            ("user name of hatena", self.username.clone()),
            ("user's directory", show(&self.user_dir)),
            ("directory of diary files", show(&self.diary_dir)),
            ("directory of diary files (backup)", show(&self.diary_dir_old)),
            ("tags and entries", show(&self.tag_file)),
            ("tags and entries (backup)", show(&self.tag_file_old)),
            ("product/book info", show(&self.product_file)),
            ("list of URLs, tags and titles", show(&self.list_title)),
            ("list of URLs, dates and titles", show(&self.list_date)),
            ("list of URLs for Wiki link", show(&self.list_wiki)),
            ("log file to be analyzed", show(&self.export_file)),
        ]
    }
}

/// Resolve a leading `~/` against the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Pick the export stream among the candidate directories.
///
/// The newest candidate wins when several exist; with none, the bare
/// username is returned so the caller reports a sensible missing path.
pub fn find_export_file(dirs: &[PathBuf], username: &str) -> PathBuf {
    let names = [
        username.to_string(),
        format!("{}.xml", username),
        format!("{}.xml.gz", username),
        format!("{}.xml.lz4", username),
    ];

    let mut found: Vec<(PathBuf, SystemTime)> = Vec::new();
    for dir in dirs {
        for name in &names {
            let path = dir.join(name);
            if let Ok(meta) = std::fs::metadata(&path) {
                if meta.is_file() {
                    let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    found.push((path, mtime));
                }
            }
        }
    }

    found
        .into_iter()
        .max_by_key(|(_, mtime)| *mtime)
        .map(|(path, _)| path)
        .unwrap_or_else(|| PathBuf::from(username))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# hatedma Configuration
#
# Environment variables override these settings:
# - HATEDMA_DATA_DIR
# - HATENA_USERNAME
# - HATEDMA_PRODUCT_ENDPOINT
# - HATEDMA_LOG_LEVEL
# - HATEDMA_LOG_FORMAT

[diary]
# Directory holding per-user data and the product cache
data_dir = "~/.hatedma"

# Hatena user name (used in URLs and file names)
username = "hatenausername"

# Base of article URLs
url_base = "http://d.hatena.ne.jp"

# Offset used to compute article dates
utc_offset = "+09:00"

# Explicit export file (otherwise discovered from the data directories)
# export_file = "./hatenausername.xml.gz"

[products]
# Product lookup endpoint; lookups are disabled when unset
# endpoint = "http://localhost:8090/lookup"

# Pause between lookups (ms)
pause_ms = 3000

# Save the product cache after this many successful lookups
flush_every = 5

# Request timeout (ms)
request_timeout_ms = 10000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}
