//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                      |
//! |------|-----------|--------------------------------------------------|
//! | 0    | Universal | Success                                          |
//! | 1    | Universal | General error (unspecified)                      |
//! | 2    | Universal | CLI usage error (bad args, unsupported format)   |
//! | 3    | io        | File could not be read, written, or backed up    |
//! | 4    | catalogue | Catalogue file is invalid                        |
//! | 5    | config    | Settings file is invalid                         |
//! | 6    | document  | Input document is empty, malformed, or lacks a   |
//! |      |           | required sheet or column                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the mapping functions below

use covmap_config::ConfigError;
use covmap_io::IoError;
use covmap_recon::CoverageError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported file extension.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Domain (3-6)
// =============================================================================

/// Input missing or unreadable, output or backup could not be written.
pub const EXIT_IO: u8 = 3;

/// Catalogue TOML failed to parse or violates a record invariant.
pub const EXIT_CATALOGUE: u8 = 4;

/// Settings TOML failed to parse, has unknown keys, or holds invalid values.
pub const EXIT_CONFIG: u8 = 5;

/// Document is empty, has no sheets, names a missing sheet, or lacks a
/// required column.
pub const EXIT_DOCUMENT: u8 = 6;

// =============================================================================
// Error mapping
// =============================================================================

pub fn coverage_exit_code(err: &CoverageError) -> u8 {
    match err {
        CoverageError::CatalogueParse(_)
        | CoverageError::InvalidControlId(_)
        | CoverageError::InvalidRecord { .. } => EXIT_CATALOGUE,
        CoverageError::MissingColumn { .. } | CoverageError::Csv(_) => EXIT_DOCUMENT,
        CoverageError::Io(_) => EXIT_IO,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Io(_) | IoError::Write(_) => EXIT_IO,
        IoError::Parse(_)
        | IoError::EmptyDocument
        | IoError::NoSheets
        | IoError::SheetNotFound { .. } => EXIT_DOCUMENT,
        IoError::UnsupportedFormat(_) => EXIT_USAGE,
    }
}

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Read { .. } => EXIT_IO,
        ConfigError::Parse { .. } | ConfigError::Invalid(_) => EXIT_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_CATALOGUE,
            EXIT_CONFIG,
            EXIT_DOCUMENT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn catalogue_errors_map_to_catalogue_code() {
        assert_eq!(
            coverage_exit_code(&CoverageError::CatalogueParse("x".into())),
            EXIT_CATALOGUE
        );
        assert_eq!(
            coverage_exit_code(&CoverageError::MissingColumn { column: "prodEffect".into() }),
            EXIT_DOCUMENT
        );
        assert_eq!(coverage_exit_code(&CoverageError::Io("x".into())), EXIT_IO);
    }

    #[test]
    fn document_errors_map_to_document_code() {
        assert_eq!(io_exit_code(&IoError::EmptyDocument), EXIT_DOCUMENT);
        assert_eq!(
            io_exit_code(&IoError::SheetNotFound { name: "x".into(), available: vec![] }),
            EXIT_DOCUMENT
        );
        assert_eq!(io_exit_code(&IoError::UnsupportedFormat("pdf".into())), EXIT_USAGE);
        assert_eq!(
            config_exit_code(&ConfigError::Invalid("x".into())),
            EXIT_CONFIG
        );
    }
}
