use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub applications_dir: PathBuf,
    /// How long to wait for an app to exit after asking it to quit, e.g. "3s".
    pub quit_grace: String,
    pub brew: Option<PathBuf>,
    /// Application names never offered for migration.
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            applications_dir: PathBuf::from("/Applications"),
            quit_grace: "3s".into(),
            brew: None,
            ignore: vec![],
        }
    }
}

impl Config {
    pub fn quit_grace(&self) -> Result<Duration> {
        humantime::parse_duration(self.quit_grace.trim())
            .map_err(|e| anyhow!("invalid quit_grace '{}': {e}", self.quit_grace))
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME").map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(format!("{home}/.config"))
    }).join("cask-migrate")
}

pub fn default_config_path() -> PathBuf { config_dir().join("config.toml") }

/// A missing file means defaults; a file that is present but broken is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(s) => toml::from_str(&s).with_context(|| format!("parsing {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.applications_dir, PathBuf::from("/Applications"));
        assert_eq!(cfg.quit_grace().unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quit_grace = \"500ms\"\nignore = [\"Xcode\"]\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.quit_grace().unwrap(), Duration::from_millis(500));
        assert_eq!(cfg.ignore, vec!["Xcode".to_string()]);
        assert!(cfg.brew.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "ignore = 12 = 3").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn bad_duration_is_an_error() {
        let cfg = Config { quit_grace: "soon".into(), ..Default::default() };
        assert!(cfg.quit_grace().is_err());
    }
}
