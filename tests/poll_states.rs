mod common;

use common::{status, ManualClock, MockService, JOB_ID};
use serde_json::json;
use std::time::Duration;
use tensorlake_tool::{
    error::ToolError,
    poll::{poll, Clock, PollSettings},
    service::{FileRef, JobStatus},
    submit::JobHandle,
};

fn handle(clock: &ManualClock) -> JobHandle {
    JobHandle {
        job_id: JOB_ID.into(),
        submitted_at: clock.now(),
        input: FileRef::FileId("file_1".into()),
    }
}

fn settings(timeout_seconds: u64) -> PollSettings {
    PollSettings {
        interval: Duration::from_secs(5),
        timeout_seconds,
    }
}

#[test]
fn pending_then_processing_then_success() {
    let service = MockService::new(vec![
        status("pending"),
        status("processing"),
        json!({ "status": "successful", "chunks": [{ "page_number": 1, "content": "# Lease" }] }),
    ]);
    let clock = ManualClock::default();

    let out = poll(&service, &clock, &handle(&clock), &settings(300)).unwrap();

    assert_eq!(out.job.status, JobStatus::Successful);
    assert_eq!(out.polls, 3);
    assert_eq!(clock.sleep_count(), 2);
    assert_eq!(out.elapsed, Duration::from_secs(10));
    assert!(clock
        .sleeps
        .lock()
        .unwrap()
        .iter()
        .all(|d| *d == Duration::from_secs(5)));
}

#[test]
fn never_terminal_times_out_with_job_id() {
    let service = MockService::with_statuses(&["processing"]);
    let clock = ManualClock::default();

    let err = poll(&service, &clock, &handle(&clock), &settings(1)).unwrap_err();

    assert!(matches!(err, ToolError::Timeout { .. }));
    let msg = err.to_string();
    assert!(msg.contains(JOB_ID), "{msg}");
    assert!(msg.contains("after 1 seconds"), "{msg}");
    assert_eq!(service.query_count(), 1);
}

#[test]
fn timeout_counts_from_submission() {
    let service = MockService::with_statuses(&["pending"]);
    let clock = ManualClock::default();

    let err = poll(&service, &clock, &handle(&clock), &settings(12)).unwrap_err();

    assert!(matches!(err, ToolError::Timeout { timeout_seconds: 12, .. }));
    // queries at t=0, 5, 10; t=15 is past the deadline
    assert_eq!(service.query_count(), 3);
}

#[test]
fn failed_first_poll_returns_without_sleeping() {
    let service = MockService::with_statuses(&["failure"]);
    let clock = ManualClock::default();

    let err = poll(&service, &clock, &handle(&clock), &settings(300)).unwrap_err();

    assert!(err.to_string().contains("FAILED"));
    assert_eq!(clock.sleep_count(), 0);
    assert_eq!(service.query_count(), 1);
}

#[test]
fn unknown_status_is_terminal_failure() {
    let service = MockService::with_statuses(&["pending", "cancelled"]);
    let clock = ManualClock::default();

    let err = poll(&service, &clock, &handle(&clock), &settings(300)).unwrap_err();

    match err {
        ToolError::RemoteTerminalFailure { status } => assert_eq!(status, "cancelled"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(clock.sleep_count(), 1);
}

#[test]
fn status_query_error_is_reported() {
    let service = MockService::new(vec![]);
    let clock = ManualClock::default();

    let err = poll(&service, &clock, &handle(&clock), &settings(300)).unwrap_err();

    assert!(matches!(err, ToolError::Service(_)));
    assert!(err.to_string().starts_with("Error processing document:"));
}

#[test]
fn status_names_parse_case_insensitively() {
    assert_eq!(JobStatus::parse("SUCCESSFUL"), JobStatus::Successful);
    assert_eq!(JobStatus::parse("Processing"), JobStatus::Processing);
    assert_eq!(JobStatus::parse("failed"), JobStatus::Failed);
    assert!(!JobStatus::parse("pending").is_terminal());
    assert!(JobStatus::parse("weird").is_terminal());
}
