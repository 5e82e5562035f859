//! Single-file conversion.

use imgconvert_common::{is_convertible, Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::job::{ConversionJob, JobStatus};
use crate::remote::RemoteConverter;
use crate::settings::ConverterSettings;

/// Converts one job through the remote service.
///
/// Cheap to clone; the remote client and settings are shared.
#[derive(Clone)]
pub struct FileConverter {
    remote: Arc<dyn RemoteConverter>,
    settings: Arc<ConverterSettings>,
}

impl FileConverter {
    pub fn new(remote: Arc<dyn RemoteConverter>, settings: Arc<ConverterSettings>) -> Self {
        Self { remote, settings }
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Convert `job`, writing the result into `output_dir`.
    ///
    /// The format pair is checked first; a job whose source already has the
    /// target extension is then skipped without contacting the service.
    pub async fn convert(&self, job: &ConversionJob, output_dir: &Path) -> Result<JobStatus> {
        let target = job.target_format.extension();
        if !is_convertible(target, &job.source_format) {
            return Err(Error::unsupported_format(
                job.file_name.as_str(),
                job.source_format.as_str(),
                target,
            ));
        }

        if job.is_noop() {
            debug!("{} is already {}, skipping", job.file_name, target);
            return Ok(JobStatus::Skipped);
        }

        tokio::fs::create_dir_all(output_dir).await?;
        let destination = output_dir.join(job.output_file_name());

        debug!(
            "Converting {} ({} -> {}) to {}",
            job.file_name,
            job.source_format,
            target,
            destination.display()
        );
        let saved = self
            .remote
            .convert(job, &self.settings, &destination)
            .await?;
        Ok(JobStatus::Converted(saved))
    }
}
