//! Scheduler and aggregation behaviour with stub executors

use async_trait::async_trait;
use batchloader::app::run_targets;
use batchloader::{DownloadExecutor, OutputSink, Scheduler, Target, TaskError, TaskResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
enum Outcome {
    Success,
    Failure,
    Panic,
}

/// Decides each target's fate from its URL and records peak overlap
#[derive(Default)]
struct ScriptedExecutor {
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

fn outcome_of(url: &str) -> Outcome {
    match url {
        "ok" => Outcome::Success,
        "fail" => Outcome::Failure,
        _ => Outcome::Panic,
    }
}

#[async_trait]
impl DownloadExecutor for ScriptedExecutor {
    async fn execute(&self, target: Target) -> TaskResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        match outcome_of(&target.url) {
            Outcome::Success => TaskResult::success(target),
            Outcome::Failure => TaskResult::failure(target, TaskError::NonZeroExit(Some(1))),
            Outcome::Panic => panic!("executor blew up on {}", target.name),
        }
    }
}

fn build(outcomes: &[Outcome]) -> Vec<Target> {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let url = match o {
                Outcome::Success => "ok",
                Outcome::Failure => "fail",
                Outcome::Panic => "panic",
            };
            Target::new(format!("t{}", i), url)
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_task_is_counted_once_even_when_some_panic() {
    use Outcome::*;
    let outcomes = [
        Success, Failure, Panic, Success, Success, Panic, Failure, Success, Failure, Success,
    ];
    let exec = Arc::new(ScriptedExecutor::default());

    let mut seen = Vec::new();
    let summary = Scheduler::new(Arc::clone(&exec), 3)
        .run_with(build(&outcomes), |result| {
            seen.push((result.target.name.clone(), result.succeeded()))
        })
        .await;

    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.failed, 5);
    assert_eq!(summary.total(), outcomes.len());
    assert_eq!(exec.calls.load(Ordering::SeqCst), outcomes.len());
    assert!(exec.peak.load(Ordering::SeqCst) <= 3);

    let distinct: HashSet<_> = seen.iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(seen.len(), outcomes.len());
    assert_eq!(distinct.len(), outcomes.len());
}

#[tokio::test]
async fn panicking_task_keeps_its_target() {
    let exec = Arc::new(ScriptedExecutor::default());
    let mut failures = Vec::new();

    Scheduler::new(exec, 2)
        .run_with(build(&[Outcome::Panic]), |result| {
            if let Some(TaskError::Panicked(msg)) = &result.error {
                failures.push((result.target.name.clone(), msg.clone()));
            }
        })
        .await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "t0");
    assert!(failures[0].1.contains("executor blew up on t0"));
}

#[tokio::test]
async fn crashed_task_gets_an_inline_failure_line() {
    let (sink, captured) = OutputSink::capture();
    let targets = vec![Target::new("good", "ok"), Target::new("bad", "panic")];

    let summary = run_targets(Arc::new(ScriptedExecutor::default()), targets, 2, &sink).await;

    assert_eq!((summary.succeeded, summary.failed), (1, 1));
    let stderr = captured.stderr();
    assert!(
        stderr.contains("[bad] download failed: task panicked: executor blew up on bad\n"),
        "stderr was: {}",
        stderr
    );
    assert!(!stderr.contains("[good]"));
}

#[tokio::test]
async fn all_failures_still_run_everything() {
    let exec = Arc::new(ScriptedExecutor::default());
    let summary = Scheduler::new(Arc::clone(&exec), 1)
        .run(build(&[Outcome::Failure; 4]))
        .await;

    assert_eq!(summary.failed, 4);
    assert_eq!(exec.calls.load(Ordering::SeqCst), 4);
    assert_eq!(exec.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn two_clips_both_succeed() {
    let (sink, captured) = OutputSink::capture();
    let targets = vec![
        Target::new("clip1", "ok"),
        Target::new("clip2", "ok"),
    ];

    let summary = run_targets(Arc::new(ScriptedExecutor::default()), targets, 2, &sink).await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    let out = captured.stdout();
    assert!(out.contains("Successfully downloaded: 2"));
    assert!(out.contains("Failed downloads:      0"));
}
