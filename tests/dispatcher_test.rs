//! Batch dispatch tests.
//!
//! Run on a paused tokio clock so group delays are exact and instant.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{create_files, numbered_names, settings, RecordingRemote, REMOTE_LATENCY};
use imgconvert::conversion::{DispatchPolicy, JobStatus};
use imgconvert::{ConversionReport, ImageConverter};
use imgconvert_common::Error;
use tokio::time::Instant;

fn converter(remote: Arc<RecordingRemote>, policy: DispatchPolicy) -> ImageConverter {
    ImageConverter::new(settings(), remote).with_policy(policy)
}

fn expect_directory(report: ConversionReport) -> imgconvert::conversion::BatchReport {
    match report {
        ConversionReport::Directory(batch) => batch,
        other => panic!("expected directory report, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_twenty_three_images_run_in_three_groups() {
    let dir = tempfile::tempdir().unwrap();
    let names = numbered_names(23, "png");
    create_files(dir.path(), &names);

    let remote = Arc::new(RecordingRemote::new());
    let started = Instant::now();
    let report = converter(remote.clone(), DispatchPolicy::default())
        .convert(dir.path(), "jpg")
        .await
        .unwrap();
    let elapsed = started.elapsed();

    let batch = expect_directory(report);
    assert_eq!(batch.group_sizes(), vec![10, 10, 3]);
    assert_eq!(batch.converted(), 23);
    assert!(batch.is_success());

    // Every request of a group starts before any of the next group.
    let calls = remote.call_names();
    assert_eq!(calls.len(), 23);
    for (group, chunk) in calls.chunks(10).enumerate() {
        let got: BTreeSet<&String> = chunk.iter().collect();
        let want: BTreeSet<&String> = names[group * 10..group * 10 + chunk.len()].iter().collect();
        assert_eq!(got, want, "group {group}");
    }

    let starts = remote.call_starts();
    assert!(starts[10] - starts[9] >= Duration::from_secs(3));
    assert!(starts[20] - starts[19] >= Duration::from_secs(3));

    // Two delays, three rounds of remote latency, no trailing delay.
    let expected = Duration::from_secs(6) + REMOTE_LATENCY * 3;
    assert!(elapsed >= expected, "elapsed {elapsed:?}");
    assert!(elapsed < expected + Duration::from_secs(1), "elapsed {elapsed:?}");

    for name in &names {
        let output = dir.path().join(name.replace(".png", ".jpg"));
        assert!(output.exists(), "missing {}", output.display());
    }
}

#[tokio::test(start_paused = true)]
async fn test_outcomes_keep_discovery_order() {
    let dir = tempfile::tempdir().unwrap();
    let names = numbered_names(7, "heic");
    create_files(dir.path(), &names);

    let policy = DispatchPolicy::new(3, Duration::from_secs(1), 3).unwrap();
    let report = converter(Arc::new(RecordingRemote::new()), policy)
        .convert(dir.path(), "png")
        .await
        .unwrap();

    let batch = expect_directory(report);
    let sources: Vec<String> = batch
        .outcomes()
        .map(|o| o.source_path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(sources, names);
    assert_eq!(
        batch.groups.iter().map(|g| g.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_isolated_to_its_job() {
    let dir = tempfile::tempdir().unwrap();
    let names = numbered_names(5, "png");
    create_files(dir.path(), &names);

    let remote = Arc::new(RecordingRemote::failing_on("img02.png"));
    let policy = DispatchPolicy::new(2, Duration::from_secs(3), 2).unwrap();
    let report = converter(remote.clone(), policy)
        .convert(dir.path(), "webp")
        .await
        .unwrap();

    let batch = expect_directory(report);
    assert_eq!(batch.group_sizes(), vec![2, 2, 1]);
    assert_eq!(batch.converted(), 4);
    assert_eq!(batch.failed(), 1);
    assert!(!batch.is_success());

    let failed: Vec<_> = batch
        .outcomes()
        .filter(|o| !o.status.is_success())
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].source_path.ends_with("img02.png"));
    assert_matches!(
        failed[0].status,
        JobStatus::Failed(Error::RemoteConversion { code: Some(5000), .. })
    );

    // The group holding the failure still waits before the next one.
    let starts = remote.call_starts();
    assert_eq!(starts.len(), 5);
    assert!(starts[4] - starts[3] >= Duration::from_secs(3));

    assert!(dir.path().join("img03.webp").exists());
    assert!(!dir.path().join("img02.webp").exists());
}

#[cfg(unix)]
#[tokio::test(start_paused = true)]
async fn test_non_utf8_file_name_does_not_abort_batch() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    create_files(dir.path(), &["good.png".to_string()]);
    std::fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.png")), b"image bytes").unwrap();

    let remote = Arc::new(RecordingRemote::new());
    let report = converter(remote.clone(), DispatchPolicy::default())
        .convert(dir.path(), "jpg")
        .await
        .unwrap();

    let batch = expect_directory(report);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.converted(), 2);
    assert_eq!(remote.call_count(), 2);
    assert!(dir.path().join("good.jpg").exists());
    assert!(dir.path().join(OsStr::from_bytes(b"bad\xff.jpg")).exists());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_capped_by_max_workers() {
    let dir = tempfile::tempdir().unwrap();
    create_files(dir.path(), &numbered_names(12, "gif"));

    let remote = Arc::new(RecordingRemote::new());
    let policy = DispatchPolicy::new(6, Duration::from_millis(500), 2).unwrap();
    let report = converter(remote.clone(), policy)
        .convert(dir.path(), "png")
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(remote.call_count(), 12);
    assert_eq!(remote.max_in_flight(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_only_supported_images_become_jobs() {
    let dir = tempfile::tempdir().unwrap();
    create_files(
        dir.path(),
        &["notes.txt".to_string(), "b.png".to_string(), "a.GIF".to_string()],
    );
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();

    let remote = Arc::new(RecordingRemote::new());
    let report = converter(remote.clone(), DispatchPolicy::default())
        .convert(dir.path(), "jpg")
        .await
        .unwrap();

    let batch = expect_directory(report);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.groups.len(), 1);
    assert_eq!(remote.call_names().len(), 2);
    assert!(dir.path().join("a.jpg").exists());
    assert!(dir.path().join("b.jpg").exists());
}

#[tokio::test(start_paused = true)]
async fn test_matching_extension_is_not_sent() {
    let dir = tempfile::tempdir().unwrap();
    create_files(dir.path(), &["a.jpg".to_string(), "b.png".to_string()]);

    let remote = Arc::new(RecordingRemote::new());
    let report = converter(remote.clone(), DispatchPolicy::default())
        .convert(dir.path(), "JPG")
        .await
        .unwrap();

    let batch = expect_directory(report);
    assert_eq!(batch.skipped(), 1);
    assert_eq!(batch.converted(), 1);
    assert_eq!(remote.call_names(), vec!["b.png".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_directory_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(RecordingRemote::new());

    let started = Instant::now();
    let report = converter(remote.clone(), DispatchPolicy::default())
        .convert(dir.path(), "png")
        .await
        .unwrap();

    let batch = expect_directory(report);
    assert!(batch.is_empty());
    assert_eq!(remote.call_count(), 0);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_configured_output_directory_collects_results() {
    let dir = tempfile::tempdir().unwrap();
    create_files(dir.path(), &numbered_names(3, "tiff"));
    let out = dir.path().join("converted");

    let settings = settings().with_output_directory(Some(out.clone())).unwrap();
    let converter = ImageConverter::new(settings, Arc::new(RecordingRemote::new()));
    let report = converter.convert(dir.path(), "png").await.unwrap();

    assert!(report.is_success());
    for i in 0..3 {
        assert!(out.join(format!("img{i:02}.png")).exists());
    }
}
