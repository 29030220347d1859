//! Startup configuration.
//!
//! Settings come from three layers: command-line flags, an optional TOML
//! file, and built-in defaults. They are merged once into an immutable
//! [`Config`] that the rest of the program borrows.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::shell::ShellKind;
use crate::view::View;

/// One layer of optional settings. Field names double as TOML keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub shell: Option<ShellKind>,
    pub history_file: Option<PathBuf>,
    pub favorites_file: Option<PathBuf>,
    pub regex: Option<bool>,
    pub case_sensitive: Option<bool>,
    pub view: Option<View>,
}

impl Settings {
    /// Read a settings file. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            shell: self.shell.or(fallback.shell),
            history_file: self.history_file.or(fallback.history_file),
            favorites_file: self.favorites_file.or(fallback.favorites_file),
            regex: self.regex.or(fallback.regex),
            case_sensitive: self.case_sensitive.or(fallback.case_sensitive),
            view: self.view.or(fallback.view),
        }
    }

    /// Apply built-in defaults for whatever is still unset.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let shell = self.shell.unwrap_or_else(ShellKind::detect);
        let history_file = self
            .history_file
            .or_else(|| shell.default_history_path())
            .ok_or(ConfigError::NoDefaultPath {
                what: "history file",
            })?;
        let favorites_file = self
            .favorites_file
            .or_else(|| shell.default_favorites_path())
            .ok_or(ConfigError::NoDefaultPath {
                what: "favorites file",
            })?;

        Ok(Config {
            shell,
            history_file,
            favorites_file,
            regex_mode: self.regex.unwrap_or(false),
            case_sensitive: self.case_sensitive.unwrap_or(false),
            view: self.view.unwrap_or_default(),
        })
    }
}

/// Where the config file lives unless `--config` says otherwise.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("hstui").join("config.toml"))
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub shell: ShellKind,
    pub history_file: PathBuf,
    pub favorites_file: PathBuf,
    pub regex_mode: bool,
    pub case_sensitive: bool,
    pub view: View,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_is_empty_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "shell = \"zsh\"\nhistory_file = \"/tmp/h\"\nregex = true\nview = \"favorites\"\n",
        )
        .unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.shell, Some(ShellKind::Zsh));
        assert_eq!(settings.history_file, Some(PathBuf::from("/tmp/h")));
        assert_eq!(settings.regex, Some(true));
        assert_eq!(settings.view, Some(View::Favorites));
        assert_eq!(settings.case_sensitive, None);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_cli_layer_wins_over_file_layer() {
        let cli = Settings {
            regex: Some(true),
            history_file: Some(PathBuf::from("/cli/history")),
            ..Default::default()
        };
        let file = Settings {
            regex: Some(false),
            case_sensitive: Some(true),
            history_file: Some(PathBuf::from("/file/history")),
            favorites_file: Some(PathBuf::from("/file/favorites")),
            shell: Some(ShellKind::Bash),
            view: None,
        };
        let config = cli.or(file).resolve().unwrap();
        assert_eq!(
            config,
            Config {
                shell: ShellKind::Bash,
                history_file: PathBuf::from("/cli/history"),
                favorites_file: PathBuf::from("/file/favorites"),
                regex_mode: true,
                case_sensitive: true,
                view: View::Sorted,
            }
        );
    }
}
