use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{PROGRAM_SOURCE, SCROLL_SPY},
    error::ConfigError,
    layout::{Breakpoint, LayoutHints, columns_for_width, default_breakpoints},
    storage,
};

/// User configuration, stored as JSON in the platform config directory.
/// Missing fields take their defaults, so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub program_path: PathBuf,
    pub delimiter: char,
    pub page_path: Option<PathBuf>,
    /// Fixed sessions-per-row hint. Left unset, the terminal width decides
    /// through `breakpoints`.
    pub sessions_per_row: Option<String>,
    pub breakpoints: Vec<Breakpoint>,
    /// Terminal cells per layout column when drawing the grid.
    pub column_width: u16,
    pub excluded_nav_ids: Vec<String>,
    pub unavailable_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            program_path: PathBuf::from(PROGRAM_SOURCE.path),
            delimiter: PROGRAM_SOURCE.delimiter,
            page_path: None,
            sessions_per_row: None,
            breakpoints: default_breakpoints(),
            column_width: 11,
            excluded_nav_ids: SCROLL_SPY
                .excluded_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            unavailable_message: PROGRAM_SOURCE.unavailable_message.to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        storage::read_json(path)
    }

    /// Loads the settings file, falling back to defaults when it cannot be
    /// read.
    pub fn load_or_default(path: &Path) -> Self {
        match Settings::load(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(error = %error, "using default settings");
                Settings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        storage::write_json_atomic(path, self)
    }

    /// Layout hints the grid sees on a surface `width` cells wide.
    pub fn layout_hints(&self, width: u16) -> LayoutHints {
        LayoutHints::new(
            self.sessions_per_row.clone(),
            columns_for_width(width, &self.breakpoints).map(|columns| columns.to_string()),
        )
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub program: Option<PathBuf>,
    pub page: Option<PathBuf>,
    pub sessions_per_row: Option<String>,
    pub columns: Option<u16>,
}

impl Overrides {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(program) = self.program {
            settings.program_path = program;
        }
        if let Some(page) = self.page {
            settings.page_path = Some(page);
        }
        if let Some(per_row) = self.sessions_per_row {
            settings.sessions_per_row = Some(per_row);
        }
        if let Some(columns) = self.columns {
            settings.breakpoints = vec![Breakpoint {
                min_width: 0,
                columns,
            }];
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::SystemTime};

    use super::*;

    fn unique_path(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}.json", prefix, now))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load(&unique_path("eventpage_no_settings")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.delimiter, ';');
        assert_eq!(settings.excluded_nav_ids, vec!["home".to_string()]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = unique_path("eventpage_partial_settings");
        fs::write(&path, r#"{ "program_path": "custom.csv", "column_width": 9 }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.program_path, PathBuf::from("custom.csv"));
        assert_eq!(settings.column_width, 9);
        assert_eq!(settings.breakpoints, default_breakpoints());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let path = unique_path("eventpage_broken_settings");
        fs::write(&path, "[1, 2").unwrap();

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_save_round_trip() {
        let path = unique_path("eventpage_settings_roundtrip");
        let settings = Settings {
            sessions_per_row: Some("3".to_string()),
            ..Settings::default()
        };

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_layout_hints_follow_width() {
        let settings = Settings::default();
        assert_eq!(
            settings.layout_hints(100),
            LayoutHints::new(None, Some("8".to_string()))
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut settings = Settings::default();
        Overrides {
            program: Some(PathBuf::from("other.csv")),
            sessions_per_row: Some("2".to_string()),
            columns: Some(6),
            ..Overrides::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.program_path, PathBuf::from("other.csv"));
        assert_eq!(
            settings.layout_hints(300),
            LayoutHints::new(Some("2".to_string()), Some("6".to_string()))
        );
    }
}
