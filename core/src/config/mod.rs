use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CORRAL_DIR: &str = ".corral";

pub const DEFAULT_MODEL: &str = "gemini/gemini-2.5-flash-lite";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SandboxConfig {
    pub image: String,
    pub memory_limit: String,
    pub cpus: f64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: "python:3.10-slim".to_string(),
            memory_limit: "128m".to_string(),
            cpus: 0.5,
        }
    }
}

/// Defaults for one invocation. CLI flags override these; the optional
/// config file overrides the built-ins. API keys never live here, only in
/// `<PROVIDER>_API_KEY` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub max_callbacks: usize,
    pub reflect: bool,
    pub execute_code: bool,
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: DEFAULT_MODEL.to_string(),
            max_callbacks: 5,
            reflect: false,
            execute_code: true,
            sandbox: SandboxConfig::default(),
        }
    }
}

pub fn get_corral_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(CORRAL_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_corral_dir().join("config.toml")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_from_path(&get_config_path())
}

fn load_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}
