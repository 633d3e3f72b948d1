//! CSV output for extracted subtitles.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Subtitle;

/// Column name of the per-document CSV.
pub const HEADER: &str = "subtitulo";

/// Column name holding the source file in the combined CSV.
pub const FILE_HEADER: &str = "archivo";

/// One row of the combined CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedEntry {
    /// Subtitle text
    pub subtitle: String,
    /// Input file the subtitle came from
    pub file: String,
}

impl CombinedEntry {
    /// Create a new combined row.
    pub fn new(subtitle: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            subtitle: subtitle.into(),
            file: file.into(),
        }
    }
}

/// Render subtitles as CSV: a `subtitulo` header and one row each.
pub fn to_csv_string(subtitles: &[Subtitle]) -> Result<String> {
    let rows = subtitles.iter().map(|s| [s.text.as_str()]);
    let bytes = render_rows(&[HEADER], rows)?;
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}

/// Write subtitles to a CSV file.
///
/// The file is written next to its destination and renamed into place, so
/// an interrupted write never leaves a partial CSV behind.
pub fn write_csv<P: AsRef<Path>>(subtitles: &[Subtitle], path: P) -> Result<()> {
    let rows = subtitles.iter().map(|s| [s.text.as_str()]);
    let bytes = render_rows(&[HEADER], rows)?;
    write_atomic(path.as_ref(), &bytes)
}

/// Write the combined `subtitulo,archivo` CSV, optionally keeping only the
/// first row for each subtitle.
pub fn write_combined_csv<P: AsRef<Path>>(
    entries: &[CombinedEntry],
    path: P,
    unique: bool,
) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    let rows = entries
        .iter()
        .filter(|e| !unique || seen.insert(e.subtitle.to_lowercase()))
        .map(|e| [e.subtitle.as_str(), e.file.as_str()]);
    let bytes = render_rows(&[HEADER, FILE_HEADER], rows)?;
    write_atomic(path.as_ref(), &bytes)
}

/// The header goes out even when there are no rows.
fn render_rows<'a, const N: usize>(
    header: &[&str; N],
    rows: impl Iterator<Item = [&'a str; N]>,
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtitles(texts: &[&str]) -> Vec<Subtitle> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Subtitle::new(*t, 1, i))
            .collect()
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(to_csv_string(&[]).unwrap(), "subtitulo\n");
    }

    #[test]
    fn test_rows_in_order() {
        let csv = to_csv_string(&subtitles(&["1. Objeto", "2. Plazo"])).unwrap();
        assert_eq!(csv, "subtitulo\n1. Objeto\n2. Plazo\n");
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let csv = to_csv_string(&subtitles(&["Plazos, lugar y forma", "Sección \"A\""])).unwrap();
        assert_eq!(
            csv,
            "subtitulo\n\"Plazos, lugar y forma\"\n\"Sección \"\"A\"\"\"\n"
        );
    }

    #[test]
    fn test_write_csv_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pliego.csv");
        std::fs::write(&path, "stale").unwrap();

        write_csv(&subtitles(&["Garantías"]), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "subtitulo\nGarantías\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_csv_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("pliego.csv");

        let err = write_csv(&[], &path).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_combined_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.csv");
        let entries = vec![
            CombinedEntry::new("Objeto", "a.pdf"),
            CombinedEntry::new("OBJETO", "b.pdf"),
            CombinedEntry::new("Plazo", "b.pdf"),
        ];

        write_combined_csv(&entries, &path, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "subtitulo,archivo\nObjeto,a.pdf\nPlazo,b.pdf\n"
        );

        write_combined_csv(&entries, &path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }
}
