use crate::output::OutputFormat;
use crate::router::DEFAULT_CAPTURE_MARKER;
use eyre::{bail, Result, WrapErr};
use lazy_static::lazy_static;
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub capture_marker: char,
    pub format: OutputFormat,
    pub name_prefix: String,
    pub name_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_marker: DEFAULT_CAPTURE_MARKER,
            format: OutputFormat::JsonPretty,
            name_prefix: "l".to_string(),
            name_suffix: "b".to_string(),
        }
    }
}

/// Markers are ASCII punctuation, so route words always stay literal.
pub fn is_capture_marker(marker: char) -> bool {
    marker.is_ascii_punctuation()
}

impl Config {
    // Path to the config file
    pub fn path() -> PathBuf {
        CONFIG_DIR.join("cmdform.toml")
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).wrap_err("Failed to parse config TOML")?;
        if !is_capture_marker(config.capture_marker) {
            bail!("capture_marker must be one ASCII punctuation character, got {:?}", config.capture_marker);
        }
        Ok(config)
    }

    // Load configuration from the TOML file and override with environment variables
    pub fn load() -> Self {
        let config_path = Self::path();

        let config = fs::read_to_string(&config_path)
            .wrap_err_with(|| format!("Failed to read config file at {:?}", config_path))
            .and_then(|config_str| Self::parse(&config_str))
            .unwrap_or_else(|err| {
                warn!("Error loading config: {}. Using defaults.", err);
                Self::default()
            });

        config.with_overrides(|key| env::var(key).ok())
    }

    /// Applies `CMDFORM_CAPTURE_MARKER` and `CMDFORM_FORMAT` from `lookup`.
    /// Values that do not parse leave the setting alone.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CMDFORM_CAPTURE_MARKER") {
            let mut chars = val.chars();
            match (chars.next(), chars.next()) {
                (Some(marker), None) if is_capture_marker(marker) => self.capture_marker = marker,
                _ => warn!("Ignoring CMDFORM_CAPTURE_MARKER={:?}: expected one punctuation character", val),
            }
        }
        if let Some(val) = lookup("CMDFORM_FORMAT") {
            self.format = val.parse().unwrap_or(self.format);
        }
        self
    }

    // Save the current configuration to the TOML file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::path();
        let toml_str = self.to_toml()?;
        fs::create_dir_all(&*CONFIG_DIR)
            .wrap_err_with(|| format!("Failed to create {:?}", *CONFIG_DIR))?;
        fs::write(&config_path, toml_str)
            .wrap_err_with(|| format!("Failed to write config to {:?}", config_path))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).wrap_err("Failed to serialize config to TOML")
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::load();

    pub static ref CONFIG_DIR: PathBuf = {
        if let Ok(env_dir) = env::var("CMDFORM_HOME") {
            PathBuf::from(env_dir)
        } else {
            // Default to $HOME/.cmdform if not set
            match home::home_dir() {
                Some(home_dir) => home_dir.join(".cmdform"),
                None => {
                    warn!("HOME directory could not be determined. Using current directory as fallback.");
                    PathBuf::from(".cmdform")
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::parse("format = \"table\"").unwrap();
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.capture_marker, ':');
        assert_eq!(config.name_prefix, "l");
    }

    #[test]
    fn toml_survives_a_save_cycle() {
        let config = Config {
            capture_marker: '@',
            ..Config::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("format = \"json-pretty\""));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn environment_overrides() {
        let config = Config::default().with_overrides(|key| match key {
            "CMDFORM_CAPTURE_MARKER" => Some("%".into()),
            "CMDFORM_FORMAT" => Some("json".into()),
            _ => None,
        });
        assert_eq!(config.capture_marker, '%');
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let config = Config::default().with_overrides(|key| match key {
            "CMDFORM_CAPTURE_MARKER" => Some("::".into()),
            "CMDFORM_FORMAT" => Some("yaml".into()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn word_characters_are_not_markers() {
        assert!(Config::parse("capture_marker = \"c\"").is_err());
        assert!(Config::parse("capture_marker = \"7\"").is_err());
        assert_eq!(Config::parse("capture_marker = \"%\"").unwrap().capture_marker, '%');

        for marker in ["c", "7", "é", " "] {
            let config = Config::default().with_overrides(|key| match key {
                "CMDFORM_CAPTURE_MARKER" => Some(marker.into()),
                _ => None,
            });
            assert_eq!(config.capture_marker, ':');
        }
    }

    #[test]
    fn garbage_fails_to_parse() {
        assert!(Config::parse("capture_marker = 7").is_err());
    }
}
