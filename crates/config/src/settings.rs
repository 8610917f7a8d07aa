// Application settings
// Loaded from ~/.config/covmap/config.toml (platform config dir)

use covmap_io::AnnotationColumns;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Settings file exists but cannot be read.
    Read { path: PathBuf, message: String },
    /// Settings file is not valid TOML or has unknown keys.
    Parse { path: PathBuf, message: String },
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read settings {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid settings {}: {message}", path.display())
            }
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Header texts of the appended coverage columns
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnSettings {
    pub coverage: String,
    pub platform_coverage: String,
    pub implementation: String,
    pub opportunity: String,
    pub priority: String,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        let AnnotationColumns {
            coverage,
            platform_coverage,
            implementation,
            opportunity,
            priority,
        } = AnnotationColumns::default();
        Self {
            coverage,
            platform_coverage,
            implementation,
            opportunity,
            priority,
        }
    }
}

impl From<&ColumnSettings> for AnnotationColumns {
    fn from(c: &ColumnSettings) -> Self {
        Self {
            coverage: c.coverage.clone(),
            platform_coverage: c.platform_coverage.clone(),
            implementation: c.implementation.clone(),
            opportunity: c.opportunity.clone(),
            priority: c.priority.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Insert a thin blank row after each processed row (Excel output)
    pub spacers: bool,
    /// Name of the summary sheet placed first in Excel output
    pub summary_sheet: String,
    /// Back up the input before overwriting it in place
    pub backup: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            spacers: true,
            summary_sheet: "EPAC Coverage Summary".into(),
            backup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Cap on computed priority actions in the summary
    pub max_actions: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { max_actions: 10 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Alternative catalogue file; the embedded catalogue when unset
    pub catalogue: Option<PathBuf>,
    pub columns: ColumnSettings,
    pub output: OutputSettings,
    pub report: ReportSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("covmap")
            .join("config.toml")
    }

    /// Load from the platform config dir. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        // Relative catalogue paths are relative to the settings file
        if let (Some(catalogue), Some(dir)) = (&settings.catalogue, path.parent()) {
            if catalogue.is_relative() {
                settings.catalogue = Some(dir.join(catalogue));
            }
        }

        log::debug!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("columns.coverage", &self.columns.coverage),
            ("columns.platform_coverage", &self.columns.platform_coverage),
            ("columns.implementation", &self.columns.implementation),
            ("columns.opportunity", &self.columns.opportunity),
            ("columns.priority", &self.columns.priority),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }

        // Excel sheet names: 1-31 chars, none of []:*?/\
        let sheet = &self.output.summary_sheet;
        if sheet.is_empty()
            || sheet.chars().count() > 31
            || sheet.contains(['[', ']', ':', '*', '?', '/', '\\'])
        {
            return Err(ConfigError::Invalid(format!(
                "output.summary_sheet '{sheet}' is not a valid sheet name"
            )));
        }
        Ok(())
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
