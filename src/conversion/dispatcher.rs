//! Batched conversion dispatch.
//!
//! Jobs are split into consecutive groups. Each group runs concurrently with
//! a bounded number of requests in flight and must finish completely before
//! the next one starts. A fixed cooldown separates groups to stay under the
//! remote service's rate limit.

use imgconvert_common::{ConfigurationError, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::converter::FileConverter;
use super::job::{BatchReport, ConversionJob, GroupReport, JobOutcome, JobStatus};

/// Default number of jobs per group.
pub const DEFAULT_GROUP_SIZE: usize = 10;
/// Default pause between two groups.
pub const DEFAULT_GROUP_DELAY: Duration = Duration::from_secs(3);

/// Group size, cooldown and concurrency cap for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    group_size: usize,
    group_delay: Duration,
    max_workers: usize,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            group_delay: DEFAULT_GROUP_DELAY,
            max_workers: DEFAULT_GROUP_SIZE,
        }
    }
}

impl DispatchPolicy {
    /// Requires `group_size >= 1` and `1 <= max_workers <= group_size`.
    pub fn new(group_size: usize, group_delay: Duration, max_workers: usize) -> Result<Self> {
        if group_size == 0 {
            return Err(ConfigurationError::out_of_range("group_size", "must be at least 1").into());
        }
        if max_workers == 0 || max_workers > group_size {
            return Err(ConfigurationError::out_of_range(
                "max_workers",
                format!("must be between 1 and group_size ({group_size}), got {max_workers}"),
            )
            .into());
        }

        Ok(Self {
            group_size,
            group_delay,
            max_workers,
        })
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn group_delay(&self) -> Duration {
        self.group_delay
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

/// Runs jobs group by group through a [`FileConverter`].
pub struct BatchDispatcher {
    converter: FileConverter,
    policy: DispatchPolicy,
}

impl BatchDispatcher {
    pub fn new(converter: FileConverter, policy: DispatchPolicy) -> Self {
        Self { converter, policy }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Split `jobs` into consecutive groups of at most `group_size`,
    /// preserving order.
    pub fn partition(&self, jobs: Vec<ConversionJob>) -> Vec<Vec<ConversionJob>> {
        let mut groups = Vec::with_capacity(jobs.len().div_ceil(self.policy.group_size));
        let mut jobs = jobs.into_iter().peekable();
        while jobs.peek().is_some() {
            groups.push(jobs.by_ref().take(self.policy.group_size).collect());
        }
        groups
    }

    /// Convert every job, writing results into `output_dir`.
    ///
    /// Never fails as a whole: each job's result is recorded in the report.
    pub async fn dispatch(&self, jobs: Vec<ConversionJob>, output_dir: &Path) -> BatchReport {
        let groups = self.partition(jobs);
        let total = groups.len();
        let semaphore = Arc::new(Semaphore::new(self.policy.max_workers));
        let output_dir: Arc<Path> = Arc::from(output_dir);
        let mut report = BatchReport::default();

        for (index, group) in groups.into_iter().enumerate() {
            info!(
                "Dispatching group {}/{} ({} jobs)",
                index + 1,
                total,
                group.len()
            );
            let outcomes = self.run_group(group, &semaphore, &output_dir).await;
            let failed = outcomes
                .iter()
                .filter(|o| !o.status.is_success())
                .count();
            info!(
                "Group {}/{} finished: {} ok, {} failed",
                index + 1,
                total,
                outcomes.len() - failed,
                failed
            );
            report.groups.push(GroupReport { index, outcomes });

            if index + 1 < total {
                debug!("Waiting {:?} before next group", self.policy.group_delay);
                tokio::time::sleep(self.policy.group_delay).await;
            }
        }

        report
    }

    /// Run one group to completion. Outcomes keep the group's order.
    async fn run_group(
        &self,
        group: Vec<ConversionJob>,
        semaphore: &Arc<Semaphore>,
        output_dir: &Arc<Path>,
    ) -> Vec<JobOutcome> {
        let sources: Vec<PathBuf> = group.iter().map(|j| j.source_path.clone()).collect();
        let mut statuses: Vec<Option<JobStatus>> = sources.iter().map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (position, job) in group.into_iter().enumerate() {
            let converter = self.converter.clone();
            let semaphore = Arc::clone(semaphore);
            let output_dir = Arc::clone(output_dir);

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => converter.convert(&job, &output_dir).await,
                    Err(e) => Err(Error::Internal(format!("worker pool closed: {e}"))),
                };
                if let Err(ref e) = result {
                    warn!("Conversion of {} failed: {}", job.file_name, e);
                }
                (position, JobStatus::from(result))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, status)) => statuses[position] = Some(status),
                Err(e) => error!("Conversion task aborted: {}", e),
            }
        }

        sources
            .into_iter()
            .zip(statuses)
            .map(|(source_path, status)| JobOutcome {
                source_path,
                status: status.unwrap_or_else(|| {
                    JobStatus::Failed(Error::Internal("conversion task panicked".to_string()))
                }),
            })
            .collect()
    }
}
