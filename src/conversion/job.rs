//! Conversion jobs and their outcomes.

use imgconvert_common::{Error, Result, TargetFormat};
use std::path::PathBuf;

use crate::remote::SavedFile;
use crate::resolver::file_attrs;

/// One input file to convert to one target format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source_path: PathBuf,
    pub file_name: String,
    /// Lowercased source extension without dot.
    pub source_format: String,
    pub target_format: TargetFormat,
}

impl ConversionJob {
    pub fn new(source_path: impl Into<PathBuf>, target_format: TargetFormat) -> Self {
        let source_path = source_path.into();
        let attrs = file_attrs(&source_path);
        Self {
            source_path,
            file_name: attrs.name,
            source_format: attrs.extension,
            target_format,
        }
    }

    /// Source already has the target extension; nothing to convert.
    pub fn is_noop(&self) -> bool {
        self.source_format == self.target_format.extension()
    }

    /// The source file name with its extension replaced by the target's.
    ///
    /// Built from the raw file name, so non-UTF-8 names survive unchanged.
    pub fn output_file_name(&self) -> PathBuf {
        PathBuf::from(self.source_path.file_name().unwrap_or_default())
            .with_extension(self.target_format.extension())
    }
}

/// What happened to a single job.
#[derive(Debug)]
pub enum JobStatus {
    /// The remote service converted the file and it was saved locally.
    Converted(SavedFile),
    /// Source and target extensions match; the service was not called.
    Skipped,
    /// The job failed. Sibling jobs are unaffected.
    Failed(Error),
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl From<Result<JobStatus>> for JobStatus {
    fn from(result: Result<JobStatus>) -> Self {
        result.unwrap_or_else(JobStatus::Failed)
    }
}

/// A job's source path together with its status.
#[derive(Debug)]
pub struct JobOutcome {
    pub source_path: PathBuf,
    pub status: JobStatus,
}

/// Outcomes of one dispatched group, in discovery order.
#[derive(Debug)]
pub struct GroupReport {
    /// Zero-based position of the group in the batch.
    pub index: usize,
    pub outcomes: Vec<JobOutcome>,
}

/// Outcomes of a whole batch, group by group.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub groups: Vec<GroupReport>,
}

impl BatchReport {
    /// All outcomes in discovery order.
    pub fn outcomes(&self) -> impl Iterator<Item = &JobOutcome> {
        self.groups.iter().flat_map(|g| g.outcomes.iter())
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.outcomes.len()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.outcomes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Converted(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&JobStatus) -> bool) -> usize {
        self.outcomes().filter(|o| predicate(&o.status)).count()
    }
}
