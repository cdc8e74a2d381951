use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the raw markdown source at `path`
pub fn read_source(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write rendered markup to `path`, replacing whatever was there
pub fn write_markup(path: &Path, markup: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, markup).map_err(IoError::Io)
}

/// Last modification time of the file at `path`
pub fn modified_at(path: &Path) -> Result<SystemTime, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let metadata = fs::metadata(path).map_err(IoError::Io)?;
    metadata.modified().map_err(IoError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};

    #[test]
    fn test_read_source_success() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "page.md", "# Test Content\n\nParagraph");

        let content = read_source(&path).unwrap();
        assert_eq!(content, "# Test Content\n\nParagraph");
    }

    #[test]
    fn test_read_source_not_found() {
        let dir = create_test_dir();
        let result = read_source(&dir.path().join("nonexistent.md"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_markup_creates_parent_directories() {
        let dir = create_test_dir();
        let path = dir.path().join("site").join("pages").join("page.html");

        write_markup(&path, "<h1>Hi</h1>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<h1>Hi</h1>");
        assert!(dir.path().join("site").join("pages").is_dir());
    }

    #[test]
    fn test_write_markup_overwrites_existing() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "page.html", "<p>old</p>");

        write_markup(&path, "<p>new</p>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>new</p>");
    }

    #[test]
    fn test_modified_at() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "page.md", "text");

        assert!(modified_at(&path).is_ok());
        assert!(matches!(
            modified_at(&dir.path().join("missing.md")),
            Err(IoError::NotFound(_))
        ));
    }
}
