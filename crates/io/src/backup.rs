// Backup copies and derived output paths.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::IoError;

const BACKUP_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// `<stem>_backup_<YYYYmmdd_HHMMSS>.<ext>` next to `path`.
pub fn timestamped_backup_path(path: &Path, at: NaiveDateTime) -> PathBuf {
    let stamp = at.format(BACKUP_TIMESTAMP);
    derived_name(path, &format!("_backup_{stamp}"))
}

/// `<file>.backup` next to `path`.
pub fn suffix_backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// `<stem>.updated.<ext>`, the default effects output.
pub fn updated_output_path(path: &Path) -> PathBuf {
    derived_name(path, ".updated")
}

/// `<stem>_annotated.<ext>`, the default annotate output.
pub fn annotated_output_path(path: &Path) -> PathBuf {
    derived_name(path, "_annotated")
}

fn derived_name(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

/// Copy `source` to `backup`, refusing to overwrite an existing file.
pub fn create_backup(source: &Path, backup: &Path) -> Result<(), IoError> {
    if backup.exists() {
        return Err(IoError::Io(format!(
            "backup {} already exists",
            backup.display()
        )));
    }
    std::fs::copy(source, backup).map_err(|e| {
        IoError::Io(format!(
            "cannot back up {} to {}: {e}",
            source.display(),
            backup.display()
        ))
    })?;
    log::info!("backup created: {}", backup.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    #[test]
    fn timestamped_name() {
        assert_eq!(
            timestamped_backup_path(Path::new("/data/Controls.xlsx"), at()),
            PathBuf::from("/data/Controls_backup_20260301_140509.xlsx")
        );
        assert_eq!(
            timestamped_backup_path(Path::new("controls"), at()),
            PathBuf::from("controls_backup_20260301_140509")
        );
    }

    #[test]
    fn suffix_and_derived_names() {
        assert_eq!(
            suffix_backup_path(Path::new("dir/params.csv")),
            PathBuf::from("dir/params.csv.backup")
        );
        assert_eq!(
            updated_output_path(Path::new("dir/params.csv")),
            PathBuf::from("dir/params.updated.csv")
        );
        assert_eq!(
            annotated_output_path(Path::new("Controls.xlsx")),
            PathBuf::from("Controls_annotated.xlsx")
        );
    }

    #[test]
    fn backup_copies_and_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.csv");
        std::fs::write(&src, "Control\nAC-6\n").unwrap();

        let dest = suffix_backup_path(&src);
        create_backup(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "Control\nAC-6\n");

        assert!(matches!(create_backup(&src, &dest), Err(IoError::Io(_))));
    }
}
