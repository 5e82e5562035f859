//! Remote conversion service.
//!
//! The conversion itself happens on a hosted service. [`RemoteConverter`] is
//! the single capability the rest of the crate needs from it; the
//! [`ConvertApiClient`] implements it over HTTP.

pub mod convertapi;

pub use convertapi::ConvertApiClient;

use crate::conversion::ConversionJob;
use crate::settings::ConverterSettings;
use imgconvert_common::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A converted file persisted on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Converts one file on a remote service and persists the result.
#[async_trait::async_trait]
pub trait RemoteConverter: Send + Sync {
    /// Convert `job` using `settings` and write the result to `destination`.
    ///
    /// Service and transport failures are reported as
    /// [`Error::RemoteConversion`](imgconvert_common::Error::RemoteConversion)
    /// and are never retried.
    async fn convert(
        &self,
        job: &ConversionJob,
        settings: &ConverterSettings,
        destination: &Path,
    ) -> Result<SavedFile>;
}
