//! The `convert(path, format)` entry point.

use imgconvert_common::{Result, TargetFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::conversion::{
    BatchDispatcher, BatchReport, ConversionJob, DispatchPolicy, FileConverter, JobOutcome,
};
use crate::remote::RemoteConverter;
use crate::resolver::{self, ResolvedPath};
use crate::settings::ConverterSettings;

/// Result of a successful [`ImageConverter::convert`] call.
#[derive(Debug)]
pub enum ConversionReport {
    /// A single file was converted or skipped.
    File(JobOutcome),
    /// A directory was processed; per-job failures live in the report.
    Directory(BatchReport),
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        match self {
            Self::File(outcome) => outcome.status.is_success(),
            Self::Directory(report) => report.is_success(),
        }
    }
}

/// Converts image files or directories of images to a target format.
pub struct ImageConverter {
    converter: FileConverter,
    policy: DispatchPolicy,
}

impl ImageConverter {
    pub fn new(settings: ConverterSettings, remote: Arc<dyn RemoteConverter>) -> Self {
        Self {
            converter: FileConverter::new(remote, Arc::new(settings)),
            policy: DispatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &ConverterSettings {
        self.converter.settings()
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Convert the file or every eligible image in the directory at `path`.
    ///
    /// `target_format` may carry a leading dot and any letter case.
    /// Fails with [`Error::Path`](imgconvert_common::Error::Path) if `path`
    /// is neither a file nor a directory, before the target format is looked
    /// at. For a single file, format and remote errors are returned directly;
    /// for a directory they are recorded per job in the report.
    pub async fn convert(
        &self,
        path: impl AsRef<Path>,
        target_format: &str,
    ) -> Result<ConversionReport> {
        let resolved = resolver::resolve(path.as_ref())?;
        let target: TargetFormat = target_format.parse()?;

        match resolved {
            ResolvedPath::File { path, .. } => {
                let output_dir = self.output_dir_for(path.parent().unwrap_or(Path::new(".")));
                let job = ConversionJob::new(&path, target);
                let status = self.converter.convert(&job, &output_dir).await?;
                Ok(ConversionReport::File(JobOutcome {
                    source_path: path,
                    status,
                }))
            }
            ResolvedPath::Directory { path, images } => {
                info!(
                    "Converting {} images in {} to {}",
                    images.len(),
                    path.display(),
                    target
                );
                let output_dir = self.output_dir_for(&path);
                let jobs: Vec<ConversionJob> = images
                    .into_iter()
                    .map(|image| ConversionJob::new(image, target))
                    .collect();
                let dispatcher = BatchDispatcher::new(self.converter.clone(), self.policy);
                Ok(ConversionReport::Directory(
                    dispatcher.dispatch(jobs, &output_dir).await,
                ))
            }
        }
    }

    /// The configured output directory, or `fallback` when none is set.
    fn output_dir_for(&self, fallback: &Path) -> PathBuf {
        self.settings()
            .output_directory()
            .unwrap_or(fallback)
            .to_path_buf()
    }
}

impl std::fmt::Debug for ImageConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConverter")
            .field("settings", self.settings())
            .field("policy", &self.policy)
            .finish()
    }
}
