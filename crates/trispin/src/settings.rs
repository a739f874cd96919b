use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::{LocationPolicy, Variant, DEFAULT_TITLE};
use serde::Deserialize;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "TRISPIN_CONFIG";
/// Settings file picked up from the working directory when present.
pub const DEFAULT_FILE: &str = "trispin.toml";

pub const DEFAULT_VERTEX_SHADER: &str = "vs_es20t1.vert";
pub const DEFAULT_FRAGMENT_SHADER: &str = "ps_es20t1.frag";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantSetting {
    Sample,
    Tutorial,
}

impl From<VariantSetting> for Variant {
    fn from(value: VariantSetting) -> Self {
        match value {
            VariantSetting::Sample => Variant::Sample,
            VariantSetting::Tutorial => Variant::Tutorial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub variant: Option<VariantSetting>,
    pub title: String,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub allow_missing_locations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: None,
            title: DEFAULT_TITLE.to_string(),
            vertex_shader: PathBuf::from(DEFAULT_VERTEX_SHADER),
            fragment_shader: PathBuf::from(DEFAULT_FRAGMENT_SHADER),
            allow_missing_locations: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads a settings file; relative shader paths are taken relative to
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings = Self::from_toml_str(&text)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        if let Some(base) = path.parent() {
            settings.vertex_shader = base.join(&settings.vertex_shader);
            settings.fragment_shader = base.join(&settings.fragment_shader);
        }
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn location_policy(&self) -> LocationPolicy {
        if self.allow_missing_locations {
            LocationPolicy::Tolerate
        } else {
            LocationPolicy::Require
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.title.trim().is_empty() {
            return Err(SettingsError::Invalid("title must not be empty".to_string()));
        }
        for (key, path) in [
            ("vertex_shader", &self.vertex_shader),
            ("fragment_shader", &self.fragment_shader),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::Invalid(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Loads settings from `$TRISPIN_CONFIG`, else `./trispin.toml`, else defaults.
pub fn discover() -> Result<Settings> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Settings::load(Path::new(&path));
    }

    let local = Path::new(DEFAULT_FILE);
    if local.is_file() {
        Settings::load(local)
    } else {
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let settings = Settings::from_toml_str("").expect("parse settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.title, DEFAULT_TITLE);
        assert_eq!(settings.location_policy(), LocationPolicy::Require);
    }

    #[test]
    fn parses_all_keys() {
        let settings = Settings::from_toml_str(
            r#"
variant = "tutorial"
title = "spin"
vertex_shader = "a.vert"
fragment_shader = "b.frag"
allow_missing_locations = true
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.variant.map(Variant::from), Some(Variant::Tutorial));
        assert_eq!(settings.title, "spin");
        assert_eq!(settings.vertex_shader, PathBuf::from("a.vert"));
        assert_eq!(settings.location_policy(), LocationPolicy::Tolerate);
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(matches!(
            Settings::from_toml_str("colour = \"red\""),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("variant = \"demo\""),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("title = \"  \""),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn load_resolves_shaders_next_to_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trispin.toml");
        fs::write(&path, "vertex_shader = \"shaders/t.vert\"\n").expect("write settings");

        let settings = Settings::load(&path).expect("load settings");
        assert_eq!(settings.vertex_shader, dir.path().join("shaders/t.vert"));
        assert_eq!(
            settings.fragment_shader,
            dir.path().join(DEFAULT_FRAGMENT_SHADER)
        );
    }

    #[test]
    fn load_reports_the_failing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "variant = [").expect("write settings");

        let err = Settings::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
