//! Supported image formats.
//!
//! Two fixed sets govern every conversion: the formats the remote service can
//! produce and the formats it accepts. The convertibility check only tests
//! membership on each side; it does not model which specific pairs the
//! service supports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Formats a conversion may target.
const DESTINATION_FORMATS: &[&str] = &["jpg", "png", "svg", "webp", "tiff"];

/// Formats accepted as conversion input.
const SOURCE_FORMATS: &[&str] = &[
    "jpg", "png", "svg", "jpeg", "webp", "tiff", "heic", "ico", "gif",
];

/// A destination image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Svg,
    Webp,
    Tiff,
}

impl TargetFormat {
    /// Every destination format, in canonical order.
    pub const ALL: [TargetFormat; 5] = [Self::Jpg, Self::Png, Self::Svg, Self::Webp, Self::Tiff];

    /// File extension (without dot) written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = Error;

    /// Accepts an optional leading dot and any letter case (`".PNG"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "jpg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "webp" => Ok(Self::Webp),
            "tiff" => Ok(Self::Tiff),
            _ => Err(Error::unsupported_target(normalized)),
        }
    }
}

/// Check whether a format is in the destination set.
pub fn is_destination_format(format: &str) -> bool {
    DESTINATION_FORMATS.contains(&format)
}

/// Check whether a format is in the source set.
pub fn is_source_format(format: &str) -> bool {
    SOURCE_FORMATS.contains(&format)
}

/// True iff `target` is a destination format and `source` is a source format.
///
/// # Examples
///
/// ```
/// use imgconvert_common::formats::is_convertible;
///
/// assert!(is_convertible("jpg", "jpeg"));
/// assert!(is_convertible("tiff", "ico"));
/// assert!(!is_convertible("ico", "png"));
/// assert!(!is_convertible("png", "bmp"));
/// ```
pub fn is_convertible(target: &str, source: &str) -> bool {
    is_destination_format(target) && is_source_format(source)
}

/// Get the list of destination formats.
#[must_use]
pub fn destination_formats() -> &'static [&'static str] {
    DESTINATION_FORMATS
}

/// Get the list of source formats.
#[must_use]
pub fn source_formats() -> &'static [&'static str] {
    SOURCE_FORMATS
}
