//! Imgconvert-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across imgconvert:
//!
//! - **Formats**: The destination and source image format sets, and the
//!   permissive convertibility check between them
//! - **Path Utilities**: Functions to read and classify file extensions
//! - **Error Handling**: The error taxonomy shared by every conversion step
//!
//! # Examples
//!
//! ```
//! use imgconvert_common::formats::{is_convertible, TargetFormat};
//! use imgconvert_common::paths::is_eligible_image;
//! use std::path::Path;
//!
//! assert!(is_convertible("png", "heic"));
//! assert!(!is_convertible("gif", "png"));
//!
//! let target: TargetFormat = ".WEBP".parse().unwrap();
//! assert_eq!(target, TargetFormat::Webp);
//!
//! assert!(is_eligible_image(Path::new("holiday.HEIC")));
//! ```

pub mod error;
pub mod formats;
pub mod paths;

pub use error::{ConfigErrorKind, ConfigurationError, Error, Result};
pub use formats::{is_convertible, TargetFormat};
