//! Image conversion module.
//!
//! This module turns input files into conversion jobs and runs them against
//! the remote service. It includes:
//!
//! - Job and outcome types
//! - Single-file conversion with format checks and the same-extension no-op
//! - Batched dispatch with bounded concurrency and a cooldown between groups

mod converter;
mod dispatcher;
mod job;

pub use converter::FileConverter;
pub use dispatcher::{BatchDispatcher, DispatchPolicy, DEFAULT_GROUP_DELAY, DEFAULT_GROUP_SIZE};
pub use job::{BatchReport, ConversionJob, GroupReport, JobOutcome, JobStatus};
