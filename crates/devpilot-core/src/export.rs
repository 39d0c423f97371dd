//! Zip export of a run's outputs
//!
//! Entry layout for `search.py`:
//!
//! ```text
//! search.py            main code, under its own filename
//! search_improved.py   improved code (if any)
//! search_test.py       generated tests (if any)
//! review.txt           review body (if any)
//! ```
//!
//! Derived names use the language's canonical extension when the language is
//! known, else the filename's own extension, else `.txt`.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::constants::export::{
    FALLBACK_EXTENSION, IMPROVED_SUFFIX, REVIEW_FILE_NAME, TEST_SUFFIX,
};
use crate::language;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid filename '{0}': must be a non-empty name without path separators")]
    InvalidFilename(String),
}

/// Everything that can go into an archive. Blank optional fields are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportBundle<'a> {
    pub code: &'a str,
    pub filename: &'a str,
    pub language: &'a str,
    pub test_code: Option<&'a str>,
    pub review: Option<&'a str>,
    pub improved_code: Option<&'a str>,
}

/// Build the archive in memory
pub fn export(bundle: &ExportBundle<'_>) -> Result<Vec<u8>, ExportError> {
    let entries = entries(bundle)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in &entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::info!(entries = entries.len(), bytes = bytes.len(), "Export archive built");
    Ok(bytes)
}

/// Build the archive and write it into `dir`, returning the archive path.
pub fn write_archive(bundle: &ExportBundle<'_>, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = export(bundle)?;
    let path = dir.join(archive_name(bundle.filename)?);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// `search.py` → `search_devpilot.zip`
pub fn archive_name(filename: &str) -> Result<String, ExportError> {
    let (stem, _) = split_filename(validate_filename(filename)?);
    Ok(format!("{}_devpilot.zip", stem))
}

/// Names of the entries `export` would write, in order
pub fn entry_names(bundle: &ExportBundle<'_>) -> Result<Vec<String>, ExportError> {
    Ok(entries(bundle)?.into_iter().map(|(name, _)| name).collect())
}

/// Extension for derived entries, including the leading dot
pub fn resolve_extension(filename: &str, language: &str) -> String {
    if let Some(ext) = language::extension_for(language) {
        return ext.to_string();
    }
    match split_filename(filename).1 {
        Some(ext) => format!(".{}", ext),
        None => FALLBACK_EXTENSION.to_string(),
    }
}

fn entries<'a>(bundle: &ExportBundle<'a>) -> Result<Vec<(String, &'a str)>, ExportError> {
    let filename = validate_filename(bundle.filename)?;
    let (stem, _) = split_filename(filename);
    let ext = resolve_extension(filename, bundle.language);

    let mut entries = vec![(filename.to_string(), bundle.code)];
    if let Some(improved) = present(bundle.improved_code) {
        entries.push((format!("{}{}{}", stem, IMPROVED_SUFFIX, ext), improved));
    }
    if let Some(tests) = present(bundle.test_code) {
        entries.push((format!("{}{}{}", stem, TEST_SUFFIX, ext), tests));
    }
    if let Some(review) = present(bundle.review) {
        entries.push((REVIEW_FILE_NAME.to_string(), review));
    }

    // Later entries give way: `review.txt` next to a main `review.txt` becomes `review_1.txt`
    let mut names: Vec<String> = Vec::with_capacity(entries.len());
    for (name, _) in &mut entries {
        if names.contains(name) {
            *name = unique_name(name, &names);
        }
        names.push(name.clone());
    }
    Ok(entries)
}

fn unique_name(name: &str, taken: &[String]) -> String {
    let (stem, ext) = split_filename(name);
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        })
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|value| !value.trim().is_empty())
}

fn validate_filename(filename: &str) -> Result<&str, ExportError> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(ExportError::InvalidFilename(filename.to_string()));
    }
    Ok(trimmed)
}

/// `a.tar.py` → (`a.tar`, Some(`py`)); `.env` → (`.env`, None)
fn split_filename(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < filename.len() => {
            (&filename[..idx], Some(&filename[idx + 1..]))
        }
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use tempfile::TempDir;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, String)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    fn bundle() -> ExportBundle<'static> {
        ExportBundle {
            code: "def search(): pass",
            filename: "search.py",
            language: "Python",
            ..ExportBundle::default()
        }
    }

    #[test]
    fn test_code_and_review() {
        let bytes = export(&ExportBundle {
            review: Some("Looks good."),
            ..bundle()
        })
        .unwrap();
        let entries = read_entries(bytes);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("search.py".into(), "def search(): pass".into()));
        assert_eq!(entries[1], ("review.txt".into(), "Looks good.".into()));
    }

    #[test]
    fn test_all_fields() {
        let full = ExportBundle {
            test_code: Some("def test_search(): pass"),
            review: Some("ok"),
            improved_code: Some("def search(q): pass"),
            ..bundle()
        };
        assert_eq!(
            entry_names(&full).unwrap(),
            vec!["search.py", "search_improved.py", "search_test.py", "review.txt"]
        );
        let entries = read_entries(export(&full).unwrap());
        assert_eq!(entries[2].1, "def test_search(): pass");
    }

    #[test]
    fn test_blank_optionals_are_omitted() {
        let b = ExportBundle {
            test_code: Some("  "),
            review: Some(""),
            ..bundle()
        };
        assert_eq!(entry_names(&b).unwrap(), vec!["search.py"]);
    }

    #[test]
    fn test_language_extension_wins() {
        let b = ExportBundle {
            filename: "solution.txt",
            language: "JavaScript",
            test_code: Some("test()"),
            ..bundle()
        };
        assert_eq!(entry_names(&b).unwrap(), vec!["solution.txt", "solution_test.js"]);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert_eq!(resolve_extension("main.zig", "Zig"), ".zig");
        assert_eq!(resolve_extension("Makefile", "Unknown"), ".txt");
        assert_eq!(resolve_extension(".env", ""), ".txt");
        assert_eq!(resolve_extension("search.py", "python"), ".py");
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let b = ExportBundle {
            code: "notes",
            filename: "review.txt",
            language: "Unknown",
            review: Some("Looks good."),
            ..ExportBundle::default()
        };
        assert_eq!(entry_names(&b).unwrap(), vec!["review.txt", "review_1.txt"]);
        let entries = read_entries(export(&b).unwrap());
        assert_eq!(entries[0], ("review.txt".into(), "notes".into()));
        assert_eq!(entries[1], ("review_1.txt".into(), "Looks good.".into()));
    }

    #[test]
    fn test_invalid_filenames() {
        for name in ["", "  ", "../evil.py", "dir/a.py", "dir\\a.py", ".."] {
            let b = ExportBundle {
                filename: name,
                ..bundle()
            };
            assert!(
                matches!(export(&b), Err(ExportError::InvalidFilename(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_write_archive() {
        let dir = TempDir::new().unwrap();
        let path = write_archive(&bundle(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "search_devpilot.zip");
        let entries = read_entries(std::fs::read(path).unwrap());
        assert_eq!(entries.len(), 1);
    }
}
