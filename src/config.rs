//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};

use crate::link::LinkOptions;

const CONFIG_DIR_NAME: &str = "symlink-creator";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Layered configuration loaded from defaults, the user's file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub script: Script,
}

/// Per-run defaults the command line can override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    use_relative_path: Option<bool>,
    #[serde(default)]
    retain_script_file: Option<bool>,
}

impl Defaults {
    pub fn use_relative_path(&self) -> bool {
        self.use_relative_path.unwrap_or(true)
    }

    pub fn retain_script_file(&self) -> bool {
        self.retain_script_file.unwrap_or(false)
    }
}

/// Where scripts go and how they are run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Script {
    #[serde(default)]
    directory: Option<PathBuf>,
    #[serde(default)]
    retain_on_failure: Option<bool>,
    #[serde(default)]
    elevate: Option<bool>,
    #[serde(default)]
    elevation_command: Option<String>,
}

impl Script {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn retain_on_failure(&self) -> bool {
        self.retain_on_failure.unwrap_or(false)
    }

    pub fn elevate(&self) -> bool {
        self.elevate.unwrap_or(true)
    }

    pub fn elevation_command(&self) -> String {
        self.elevation_command
            .clone()
            .unwrap_or_else(|| "sudo".to_owned())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    use_relative_path: Option<String>,
    retain_script_file: Option<String>,
    script_dir: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            use_relative_path: env::var("SYMLINK_CREATOR_RELATIVE").ok(),
            retain_script_file: env::var("SYMLINK_CREATOR_RETAIN_SCRIPT").ok(),
            script_dir: env::var("SYMLINK_CREATOR_SCRIPT_DIR").ok(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, the user's config file and env overrides.
    ///
    /// `explicit` replaces the per-user file and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => user_config_path().filter(|path| path.exists()),
        };
        Self::load_with_layers(file, EnvOverrides::from_env())
    }

    fn load_with_layers(file: Option<PathBuf>, env_overrides: EnvOverrides) -> Result<Self> {
        let base = Config::default();
        let merged = match file {
            Some(path) => base.merge(Self::from_file(&path)?),
            None => base,
        };
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: Defaults {
                use_relative_path: other
                    .defaults
                    .use_relative_path
                    .or(self.defaults.use_relative_path),
                retain_script_file: other
                    .defaults
                    .retain_script_file
                    .or(self.defaults.retain_script_file),
            },
            script: Script {
                directory: other.script.directory.or(self.script.directory),
                retain_on_failure: other
                    .script
                    .retain_on_failure
                    .or(self.script.retain_on_failure),
                elevate: other.script.elevate.or(self.script.elevate),
                elevation_command: other
                    .script
                    .elevation_command
                    .or(self.script.elevation_command),
            },
        }
    }

    /// Script generation options derived from this configuration.
    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            script_dir: self.script.directory(),
            retain_on_failure: self.script.retain_on_failure(),
            ..LinkOptions::default()
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(value) = env.use_relative_path {
        config.defaults.use_relative_path = Some(parse_flag("SYMLINK_CREATOR_RELATIVE", &value)?);
    }
    if let Some(value) = env.retain_script_file {
        config.defaults.retain_script_file =
            Some(parse_flag("SYMLINK_CREATOR_RETAIN_SCRIPT", &value)?);
    }
    if let Some(dir) = env.script_dir.filter(|dir| !dir.is_empty()) {
        config.script.directory = Some(PathBuf::from(dir));
    }
    Ok(config)
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{name} must be a boolean, got '{other}'"),
    }
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_historical_behaviour() {
        let config = Config::default();
        assert!(config.defaults.use_relative_path());
        assert!(!config.defaults.retain_script_file());
        assert!(!config.script.retain_on_failure());
        assert!(config.script.elevate());
        assert_eq!(config.script.elevation_command(), "sudo");
        assert_eq!(config.script.directory(), env::temp_dir());
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[defaults]
use_relative_path = false

[script]
directory = "/var/tmp/links"
retain_on_failure = true
elevation_command = "doas"
"#,
        )
        .unwrap();

        let config = Config::load_with_layers(Some(path), EnvOverrides::default()).unwrap();
        assert!(!config.defaults.use_relative_path());
        assert!(!config.defaults.retain_script_file());
        assert_eq!(config.script.directory(), PathBuf::from("/var/tmp/links"));
        assert!(config.script.retain_on_failure());
        assert!(config.script.elevate());
        assert_eq!(config.script.elevation_command(), "doas");
    }

    #[test]
    fn env_overrides_win_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults]\nuse_relative_path = false\n").unwrap();

        let env = EnvOverrides {
            use_relative_path: Some("yes".into()),
            retain_script_file: Some("1".into()),
            script_dir: Some("/opt/scripts".into()),
        };
        let config = Config::load_with_layers(Some(path), env).unwrap();
        assert!(config.defaults.use_relative_path());
        assert!(config.defaults.retain_script_file());
        assert_eq!(config.script.directory(), PathBuf::from("/opt/scripts"));
    }

    #[test]
    fn invalid_env_flag_is_rejected() {
        let env = EnvOverrides {
            use_relative_path: Some("maybe".into()),
            ..Default::default()
        };
        let err = Config::load_with_layers(None, env).unwrap_err();
        assert!(err.to_string().contains("SYMLINK_CREATOR_RELATIVE"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[defaults\n").unwrap();
        assert!(Config::load_with_layers(Some(path), EnvOverrides::default()).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn link_options_follow_script_section() {
        let config = Config::from_str("[script]\ndirectory = \"/srv/scripts\"\nretain_on_failure = true\n")
            .unwrap();
        let opts = config.link_options();
        assert_eq!(opts.script_dir, PathBuf::from("/srv/scripts"));
        assert!(opts.retain_on_failure);
    }
}
