use crate::theme::Theme;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "smelt-prompt";

pub fn config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(APP_NAME)
}

pub fn state_dir() -> PathBuf {
    std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("state"))
        .join(APP_NAME)
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rows of options a select prompt shows at once.
    pub lines_shown: Option<usize>,
    pub log_level: Option<String>,
    pub theme: Theme,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&config_dir().join("config.yaml"))
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_yml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("warning: failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
