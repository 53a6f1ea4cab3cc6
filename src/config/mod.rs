use crate::errors::{AppError, AppResult};
use crate::export::ReportFormat;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Default session user when `--user` is not given.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
    #[serde(default)]
    pub report_format: ReportFormat,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}

fn default_watch_interval() -> u64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            user: None,
            watch_interval_secs: default_watch_interval(),
            report_format: ReportFormat::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimeclock")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".rtimeclock")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimeclock.conf")
    }

    /// Return the default path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimeclock.sqlite")
    }

    /// Absolute paths are kept, relative ones live in the config directory.
    pub fn resolve_db_path(name: &str) -> String {
        if name == ":memory:" {
            return name.to_string();
        }
        let p = expand_tilde(name);
        let path = if p.is_absolute() {
            p
        } else {
            Self::config_dir().join(p)
        };
        path.to_string_lossy().to_string()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Write the configuration file (unless `is_test`) and make sure the
    /// database directory exists. Returns the database path to initialize.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();

        let mut config = Self::load()?;
        if let Some(name) = custom_db {
            config.database = Self::resolve_db_path(name);
        }

        if !is_test {
            fs::create_dir_all(&dir)?;
            config.save_to(&Self::config_file())?;
            println!("✅ Config file: {}", Self::config_file().display());
        }

        if let Some(parent) = Path::new(&config.database).parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
