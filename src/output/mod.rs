use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub mod markdown;

pub use markdown::{format_timestamp, render};

/// Write a rendered document as UTF-8, creating parent directories as needed.
///
/// Returns the absolute path of the written file.
pub fn save_to_file(document: &str, path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join(path)
    };

    if let Some(parent) = absolute.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(&absolute, document)?;
    tracing::debug!("Wrote {} bytes to {}", document.len(), absolute.display());

    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_to_file_returns_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("rick.md");

        let written = save_to_file("# Título\n\n- [00:00] ¡hola!", &path).unwrap();

        assert!(written.is_absolute());
        assert_eq!(written, path);
        assert_eq!(
            fs_err::read_to_string(&written).unwrap(),
            "# Título\n\n- [00:00] ¡hola!"
        );
    }

    #[test]
    fn test_save_to_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.md");

        save_to_file("first", &path).unwrap();
        save_to_file("second", &path).unwrap();

        assert_eq!(fs_err::read_to_string(&path).unwrap(), "second");
    }
}
