// File: src/core/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};

pub const SCRIPT_EXTENSION: &str = "gsh";

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_dir() -> PathBuf {
    home().join(".gridsh")
}

/// Settings read from `~/.gridsh/config.json`; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub history_size: usize,
    pub poll_interval_ms: u64,
    pub worker_threads: usize,
    /// Delay before the in-process backend reaches a requested state.
    pub settle_ms: u64,
    pub rc_file: PathBuf,
    pub history_file: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_size: 500,
            poll_interval_ms: 1000,
            worker_threads: 8,
            settle_ms: 2000,
            rc_file: home().join(".gridshrc"),
            history_file: config_dir().join("history.txt"),
        }
    }
}

impl ShellConfig {
    /// Defaults, then the config file, then environment overrides.
    /// A broken config file is logged and ignored.
    pub fn load() -> Self {
        let path = config_dir().join("config.json");
        let mut config = if path.exists() {
            Self::from_file(&path).unwrap_or_else(|e| {
                log::warn!("{}; using defaults", e);
                Self::default()
            })
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("GRIDSH_POLL_INTERVAL_MS") {
            match value.parse() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(_) => log::warn!("ignoring GRIDSH_POLL_INTERVAL_MS={}", value),
            }
        }
        if let Some(value) = lookup("GRIDSH_WORKERS") {
            match value.parse::<usize>() {
                Ok(n) if n > 0 => self.worker_threads = n,
                _ => log::warn!("ignoring GRIDSH_WORKERS={}", value),
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::debug!("path expansion failed for {}: {}", raw, e);
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}

pub fn has_script_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"worker_threads\": 2}}").unwrap();

        let config = ShellConfig::from_file(file.path()).unwrap();
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.history_size, 500);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ShellConfig::default();
        config.apply_env(|key| match key {
            "GRIDSH_WORKERS" => Some("3".to_string()),
            "GRIDSH_POLL_INTERVAL_MS" => Some("fast".to_string()),
            _ => None,
        });
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_script_extension_any_case() {
        assert!(has_script_extension(Path::new("setup.gsh")));
        assert!(has_script_extension(Path::new("SETUP.GSH")));
        assert!(!has_script_extension(Path::new("setup.sh")));
        assert!(!has_script_extension(Path::new("gsh")));
    }
}
