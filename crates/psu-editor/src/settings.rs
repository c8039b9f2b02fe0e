use std::path::Path;

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer};

use crate::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Options shared by every command of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Save identifier used by `create` instead of the archive's file stem.
    pub name: Option<String>,
    /// Stamped on every created or modified entry instead of the current time.
    pub timestamp: Option<NaiveDateTime>,
}

/// Timestamps are written as local `%Y-%m-%d %H:%M:%S` strings.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT).map_err(de::Error::custom)
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    editor: EditorSection,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSection {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    timestamp: Option<NaiveDateTime>,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let EditorSection { name, timestamp } = file.editor;
        Self { name, timestamp }
    }
}

impl Settings {
    pub fn from_toml_str(value: &str) -> Result<Self, Error> {
        let file = toml::from_str::<SettingsFile>(value)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(file.into())
    }
}

pub fn load_settings(path: &Path) -> Result<Settings, Error> {
    let str = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::IOError(err),
    })?;
    Settings::from_toml_str(&str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_editor_section() {
        let settings = Settings::from_toml_str(
            r#"
            [editor]
            name = "BASLUS-21050"
            timestamp = "2024-10-10 10:30:00"
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.name.as_deref(), Some("BASLUS-21050"));
        assert_eq!(
            settings.timestamp,
            NaiveDate::from_ymd_opt(2024, 10, 10)
                .unwrap()
                .and_hms_opt(10, 30, 0)
        );
    }

    #[test]
    fn missing_section_means_defaults() {
        let settings = Settings::from_toml_str("").expect("empty settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_timestamp_is_a_config_error() {
        let result = Settings::from_toml_str("[editor]\ntimestamp = \"yesterday\"\n");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings = Settings::from_toml_str(
            r#"
            [editor]
            name = "SAVE"
            compression = true

            [packer]
            include = ["*.bin"]
            "#,
        )
        .expect("settings with extra keys");
        assert_eq!(settings.name.as_deref(), Some("SAVE"));
        assert_eq!(settings.timestamp, None);
    }
}
