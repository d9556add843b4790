use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_PROMPT: &str = "Enter timestamp: ";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Text printed before each line is read. No newline is added.
    pub prompt: String,
    /// Allow colored output when stdout is a terminal.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load the file named on the command line, or the per-user file if none was given.
    ///
    /// An explicitly named file must exist and parse. The per-user file is
    /// optional and a broken one only produces a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Ok(Self::load_or_default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_else(|e| {
            warn!("{e:#}; using defaults");
            Self::default()
        })
    }
}

/// `<config dir>/tsprint/config.toml`, e.g. `~/.config/tsprint/config.toml` on Linux.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tsprint").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.prompt, "Enter timestamp: ");
        assert!(cfg.color);
    }

    #[test]
    fn parse_empty_toml() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parse_toml() {
        let toml_str = r#"
prompt = "ts> "
color = false
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.prompt, "ts> ");
        assert!(!cfg.color);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: Config = toml::from_str("color = false").unwrap();
        assert_eq!(cfg.prompt, DEFAULT_PROMPT);
        assert!(!cfg.color);
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prompt = \"> \"").unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.prompt, "> ");
        assert!(cfg.color);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn invalid_explicit_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "color = \"sometimes\"").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn config_path_is_namespaced() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("tsprint/config.toml"));
        }
    }
}
