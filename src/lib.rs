//! Imgconvert - Image format conversion through the ConvertAPI service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod conversion;
pub mod converter;
pub mod remote;
pub mod resolver;
pub mod settings;

pub use converter::{ConversionReport, ImageConverter};
