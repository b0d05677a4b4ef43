use contracts::dashboards::d400_monthly_sales::{DashboardOptions, DisplayUnit, ViewMode, DEFAULT_GOAL};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built frontend, served as fallback
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "dist".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    /// Display unit divisor: 1, 1000 or 1000000
    pub default_unit: DisplayUnit,
    /// Annual revenue goal in KRW
    pub default_goal: f64,
    pub default_view: ViewMode,
    pub max_upload_bytes: usize,
    /// CSV used instead of the embedded example when nothing is uploaded
    pub sample_csv: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_unit: DisplayUnit::Million,
            default_goal: DEFAULT_GOAL,
            default_view: ViewMode::All,
            max_upload_bytes: 1024 * 1024,
            sample_csv: None,
        }
    }
}

impl DashboardConfig {
    pub fn default_options(&self) -> DashboardOptions {
        DashboardOptions {
            unit: self.default_unit,
            goal: self.default_goal,
            view: self.default_view,
            ..DashboardOptions::default()
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[dashboard]
default_unit = 1000000
default_goal = 200000000.0
default_view = "all"
max_upload_bytes = 1048576
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Stores the process-wide configuration. Later calls are ignored.
pub fn init(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized, keeping the first one");
    }
}

/// Process-wide configuration; built-in defaults until [`init`] runs.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Resolves a configured path.
/// Relative paths are resolved relative to the executable directory
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    // Fallback: use relative to current directory
    PathBuf::from(path_str)
}
