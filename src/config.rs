use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

pub const LOCAL_DATA_DIR: &str = "data";
pub const LOCAL_CATALOG_FILE: &str = "movies.csv";
pub const CONFIG_FILE: &str = "config.json";
pub const API_KEY_ENV: &str = "OMDB_API_KEY";
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Built once at startup and handed out by reference; nothing re-reads the
/// environment after this.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: local_catalog_path(),
            omdb_api_key: None,
            omdb_base_url: DEFAULT_OMDB_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "csv_path")]
    data_file: Option<String>,
    omdb_api_key: Option<String>,
    omdb_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_config() -> AppConfig {
    let env_key = env::var(API_KEY_ENV).ok();
    load_config_from(Path::new(CONFIG_FILE), env_key)
}

/// Layer defaults, then `cfg_path` (if readable), then the environment key.
pub fn load_config_from(cfg_path: &Path, env_key: Option<String>) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                if let Some(path) = parsed.data_file.filter(|p| !p.trim().is_empty()) {
                    cfg.data_file = PathBuf::from(path);
                    if raw.contains("\"csv_path\"") {
                        warn!("`csv_path` is deprecated; rename it to `data_file` in config.json.");
                    }
                }
                if parsed.omdb_api_key.is_some() {
                    cfg.omdb_api_key = non_blank(parsed.omdb_api_key);
                }
                if let Some(url) = parsed.omdb_base_url.filter(|u| !u.trim().is_empty()) {
                    cfg.omdb_base_url = url;
                }
                match parsed.request_timeout_secs {
                    Some(0) => warn!(
                        "request_timeout_secs must be positive; keeping {DEFAULT_TIMEOUT_SECS}s."
                    ),
                    Some(secs) => cfg.request_timeout = Duration::from_secs(secs),
                    None => {}
                }
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!("Failed to parse {} ({}). Using defaults.", cfg_path.display(), err);
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
        }
    }

    if let Some(key) = non_blank(env_key) {
        cfg.omdb_api_key = Some(key);
    }
    if cfg.omdb_api_key.is_none() {
        warn!("No OMDb API key configured; metadata lookups are disabled until {API_KEY_ENV} is set.");
    }

    cfg
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn local_catalog_path() -> PathBuf {
    PathBuf::from(LOCAL_DATA_DIR).join(LOCAL_CATALOG_FILE)
}

/// Make sure the directory holding the catalog exists and is a directory.
pub fn ensure_data_dir(data_file: &Path) -> std::io::Result<PathBuf> {
    let dir = match data_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let meta = fs::metadata(&dir)?;
    if !meta.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{} is not a directory", dir.display()),
        ));
    }
    Ok(dir)
}
