//! Shared helpers for integration tests.
//!
//! Provides [`RecordingRemote`], an in-process [`RemoteConverter`] that
//! records when each request starts and how many run at once, so batching
//! and concurrency can be asserted without a network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use imgconvert::conversion::ConversionJob;
use imgconvert::remote::{RemoteConverter, SavedFile};
use imgconvert::settings::ConverterSettings;
use imgconvert_common::{Error, Result};
use tokio::time::Instant;

/// How long each simulated remote conversion takes.
pub const REMOTE_LATENCY: Duration = Duration::from_millis(100);

/// A remote converter that records every call.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failing: Option<String>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request for the file called `file_name`.
    pub fn failing_on(file_name: &str) -> Self {
        Self {
            failing: Some(file_name.to_string()),
            ..Self::default()
        }
    }

    /// File names in the order their requests started.
    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Start instants in the order requests started.
    pub fn call_starts(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteConverter for RecordingRemote {
    async fn convert(
        &self,
        job: &ConversionJob,
        _settings: &ConverterSettings,
        destination: &Path,
    ) -> Result<SavedFile> {
        self.calls
            .lock()
            .unwrap()
            .push((job.file_name.clone(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(REMOTE_LATENCY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.as_deref() == Some(job.file_name.as_str()) {
            return Err(Error::remote(Some(5000), "simulated service failure"));
        }

        let data = format!("{} as {}", job.file_name, job.target_format);
        std::fs::write(destination, data.as_bytes())?;
        Ok(SavedFile {
            path: destination.to_path_buf(),
            size_bytes: data.len() as u64,
        })
    }
}

/// Create `names` as small files inside `dir` and return their paths.
pub fn create_files(dir: &Path, names: &[String]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"image bytes").unwrap();
            path
        })
        .collect()
}

/// `img00.png`, `img01.png`, ...
pub fn numbered_names(count: usize, extension: &str) -> Vec<String> {
    (0..count)
        .map(|i| format!("img{i:02}.{extension}"))
        .collect()
}

pub fn settings() -> ConverterSettings {
    ConverterSettings::new("test-secret").unwrap()
}
