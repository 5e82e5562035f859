//! Input path resolution.
//!
//! A conversion input is either a single file or a directory whose direct
//! children are scanned for eligible images. Anything else is a path error.

use imgconvert_common::paths::{extension_of, is_eligible_image};
use imgconvert_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name and lowercased extension of a single input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttrs {
    pub name: String,
    pub extension: String,
}

/// Classification of a conversion input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// A single existing file.
    File { path: PathBuf, attrs: FileAttrs },
    /// A directory and its eligible images, sorted by file name.
    Directory { path: PathBuf, images: Vec<PathBuf> },
}

impl ResolvedPath {
    pub fn path(&self) -> &Path {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }
}

/// Classify `path` as a file or a directory.
///
/// Relative paths are made absolute against the current directory first.
pub fn resolve(path: &Path) -> Result<ResolvedPath> {
    let path = std::path::absolute(path).map_err(|e| Error::path(path, e.to_string()))?;

    if path.is_file() {
        let attrs = file_attrs(&path);
        return Ok(ResolvedPath::File { path, attrs });
    }

    if path.is_dir() {
        let images = supported_images_in_dir(&path)?;
        return Ok(ResolvedPath::Directory { path, images });
    }

    Err(Error::path(path, "does not point to a file or directory"))
}

/// File name and lowercased extension (without dot) of `path`.
///
/// Names that are not valid UTF-8 are converted lossily; they are only used
/// for display and for the upload's file name.
pub fn file_attrs(path: &Path) -> FileAttrs {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    FileAttrs {
        name,
        extension: extension_of(path),
    }
}

/// Regular files directly inside `dir` whose extension is a source format.
///
/// The scan is not recursive. Results are sorted by file name so batches are
/// dispatched in a stable order.
pub fn supported_images_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if is_eligible_image(&path) {
            images.push(path);
        } else {
            debug!("Skipping unsupported file: {}", path.display());
        }
    }

    images.sort();
    debug!("Found {} eligible images in {}", images.len(), dir.display());
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "Holiday.HEIC");

        match resolve(&file).unwrap() {
            ResolvedPath::File { path, attrs } => {
                assert_eq!(path, file);
                assert_eq!(attrs.name, "Holiday.HEIC");
                assert_eq!(attrs.extension, "heic");
            }
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_unsupported_file_is_still_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "notes.txt");

        let resolved = resolve(&file).unwrap();
        assert!(matches!(resolved, ResolvedPath::File { ref attrs, .. } if attrs.extension == "txt"));
    }

    #[test]
    fn test_resolve_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.png");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "a.gif");
        touch(dir.path(), "README");
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        touch(&dir.path().join("nested.png"), "deep.jpg");

        match resolve(dir.path()).unwrap() {
            ResolvedPath::Directory { images, .. } => {
                let names: Vec<_> = images
                    .iter()
                    .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
                    .collect();
                assert_eq!(names, vec!["a.gif", "b.png"]);
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve(dir.path()).unwrap();
        assert!(matches!(resolved, ResolvedPath::Directory { ref images, .. } if images.is_empty()));
    }

    #[test]
    fn test_resolve_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let err = resolve(&missing).unwrap_err();
        assert!(matches!(err, Error::Path { .. }));
        assert!(err.to_string().contains("does not point to a file or directory"));
    }

    #[test]
    fn test_file_attrs_without_extension() {
        let attrs = file_attrs(Path::new("/tmp/Makefile"));
        assert_eq!(attrs.name, "Makefile");
        assert_eq!(attrs.extension, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_attrs_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/tmp").join(OsStr::from_bytes(b"bad\xff.PNG"));
        let attrs = file_attrs(&path);
        assert_eq!(attrs.name, "bad\u{FFFD}.PNG");
        assert_eq!(attrs.extension, "png");
    }
}
