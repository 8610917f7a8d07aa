// Configuration loading

pub mod settings;

pub use settings::{ColumnSettings, ConfigError, OutputSettings, ReportSettings, Settings};
