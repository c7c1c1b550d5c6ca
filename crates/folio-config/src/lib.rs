//! Configuration for the folio backdrop.
//!
//! Settings are read from `config.toml` in the platform config directory
//! (for example `~/.config/folio/config.toml` on Linux). Every field has a
//! default, so a missing file or a partial file is fine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use directories::ProjectDirs;
use folio_core::{AmbientParams, EffectToggles, NetworkParams, ParticleParams, RainParams};
use serde::{Deserialize, Serialize};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Default CAPTCHA verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://hcaptcha.com/siteverify";

/// Errors raised while loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    /// The file parsed but a value is out of range.
    Invalid(String),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
            ConfigError::Serialize(e) => write!(f, "could not serialize config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// How surface units map onto terminal cells, and the frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Surface units per terminal column.
    pub cell_width: f32,
    /// Surface units per terminal row.
    pub cell_height: f32,
    /// Target frames per second.
    pub fps: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            cell_width: 7.0,
            cell_height: 14.0,
            fps: 60,
        }
    }
}

impl SurfaceConfig {
    /// Time budget for one frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.clamp(1, 240)
    }

    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("surface.cell_width", self.cell_width),
            ("surface.cell_height", self.cell_height),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(format!("{name} must be a finite number of at least 1, got {value}"));
            }
        }
        Ok(())
    }
}

/// Contact form settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// CAPTCHA secret; verification is skipped when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_secret: Option<String>,
    pub verify_url: String,
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            captcha_secret: None,
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl ContactConfig {
    /// Timeout for one verification request (at least a second).
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed random seed for reproducible animations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub effects: EffectToggles,
    pub particles: ParticleParams,
    pub rain: RainParams,
    pub network: NetworkParams,
    pub ambient: AmbientParams,
    pub surface: SurfaceConfig,
    pub contact: ContactConfig,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Parse and validate a config file's contents.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every effect parameter can be animated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.particles
            .validate()
            .and_then(|()| self.rain.validate())
            .and_then(|()| self.network.validate())
            .and_then(|()| self.surface.validate())
            .map_err(ConfigError::Invalid)
    }

    /// Serialize as pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "folio")
}

/// Default config file location, if the platform has a home directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Directory for logs and other runtime files.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("folio-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.particles.emission_count, 3);
        assert_eq!(config.rain.char_size, 14.0);
        assert!(config.contact.captcha_secret.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            seed = 7

            [effects]
            rain = false

            [rain]
            char_size = 10.0

            [contact]
            captcha_secret = "shh"
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(!config.effects.rain);
        assert!(config.effects.cursor_trail);
        assert_eq!(config.rain.char_size, 10.0);
        assert_eq!(config.rain.reset_chance, 0.025);
        assert_eq!(config.contact.captcha_secret.as_deref(), Some("shh"));
        assert_eq!(config.contact.verify_url, DEFAULT_VERIFY_URL);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let err = Config::from_toml_str("[particles]\nemission_count = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_values_are_invalid() {
        for contents in [
            "[rain]\nreset_chance = nan",
            "[rain]\nreset_chance = 1.5",
            "[particles]\nspread = inf",
            "[particles]\nradius_max = inf",
            "[particles]\nlifespan_min = 4294967295\nlifespan_max = 4294967295",
            "[network]\nmax_speed = -inf",
            "[surface]\ncell_width = 0.0",
        ] {
            let err = Config::from_toml_str(contents).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{contents}: {err}");
        }
    }

    #[test]
    fn test_invalid_value_named_in_error() {
        let err = Config::from_toml_str("[rain]\nreset_chance = nan").unwrap_err();
        assert!(err.to_string().contains("rain.reset_chance"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Some(&temp_path("does-not-exist.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved/config.toml");
        let mut config = Config::default();
        config.seed = Some(99);
        config.surface.fps = 30;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn test_frame_interval() {
        let surface = SurfaceConfig {
            fps: 50,
            ..Default::default()
        };
        assert_eq!(surface.frame_interval(), Duration::from_millis(20));

        let zero = SurfaceConfig {
            fps: 0,
            ..Default::default()
        };
        assert_eq!(zero.frame_interval(), Duration::from_secs(1));
    }
}
