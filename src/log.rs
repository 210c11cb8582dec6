use crate::config;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    fn enabled(self) -> bool {
        self as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
    }
}

pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "debug" => Some(Level::Debug),
        "info" => Some(Level::Info),
        "warn" | "warning" => Some(Level::Warn),
        "error" => Some(Level::Error),
        _ => None,
    }
}

/// Start logging to `path`. Until this is called, `entry` does nothing.
/// Only the first call takes effect.
pub fn init(path: impl Into<PathBuf>) {
    let path = path.into();
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let _ = LOG_PATH.set(path);
}

/// `<state dir>/logs/<unix-ts>.jsonl`
pub fn default_path() -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let name = format!("{ts}.jsonl");
    config::state_dir().join("logs").join(name)
}

pub fn entry(level: Level, event: &str, data: &impl Serialize) {
    if !level.enabled() {
        return;
    }
    let Some(path) = LOG_PATH.get() else {
        return;
    };
    let Some(line) = format_entry(level, event, data) else {
        return;
    };

    let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let _ = writeln!(f, "{line}");
}

fn format_entry(level: Level, event: &str, data: &impl Serialize) -> Option<String> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let payload = serde_json::json!({
        "ts": ts,
        "level": format!("{:?}", level).to_lowercase(),
        "event": event,
        "data": data,
    });

    serde_json::to_string(&payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_loosely() {
        assert_eq!(parse_level(" WARNING "), Some(Level::Warn));
        assert_eq!(parse_level("debug"), Some(Level::Debug));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn entries_are_single_json_lines() {
        let data = serde_json::json!({ "width": 80 });
        let line = format_entry(Level::Info, "prompt_show", &data).unwrap();
        assert!(!line.contains('\n'));
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["level"], "info");
        assert_eq!(v["event"], "prompt_show");
        assert_eq!(v["data"]["width"], 80);
    }
}
