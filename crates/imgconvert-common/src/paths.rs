//! Path utilities for reading and classifying file extensions.
//!
//! Extensions are compared lowercased and without their leading dot, so
//! `Photo.HEIC` and `photo.heic` are the same source format.

use std::path::Path;

use crate::formats::is_source_format;

/// Lowercased extension of `path` without the dot, or an empty string when
/// the path has none.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use imgconvert_common::paths::extension_of;
///
/// assert_eq!(extension_of(Path::new("/img/Photo.JPEG")), "jpeg");
/// assert_eq!(extension_of(Path::new("README")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// Check if a path has an extension from the source format set.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use imgconvert_common::paths::is_eligible_image;
///
/// assert!(is_eligible_image(Path::new("poster.gif")));
/// assert!(!is_eligible_image(Path::new("notes.txt")));
/// ```
pub fn is_eligible_image(path: &Path) -> bool {
    is_source_format(&extension_of(path))
}
