//! Bounded-concurrency scheduler
//!
//! Starts downloads in input order, never more than `concurrency` at once,
//! and counts each result as soon as it finishes. A failed or panicking
//! download never stops the others.

use crate::downloader::DownloadExecutor;
use crate::queue::summary::{Summary, TaskResult};
use crate::queue::target::Target;
use crate::utils::error::TaskError;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info};

pub struct Scheduler<E> {
    executor: Arc<E>,
    concurrency: usize,
}

impl<E> Scheduler<E>
where
    E: DownloadExecutor + 'static,
{
    /// `concurrency` below 1 is treated as 1
    pub fn new(executor: Arc<E>, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every target to completion and return the tally
    pub async fn run(&self, targets: Vec<Target>) -> Summary {
        self.run_with(targets, |_| {}).await
    }

    /// Like [`Scheduler::run`], calling `on_result` for each task in
    /// completion order
    pub async fn run_with<F>(&self, targets: Vec<Target>, mut on_result: F) -> Summary
    where
        F: FnMut(&TaskResult),
    {
        let total = targets.len();
        let mut queue = targets.into_iter();
        let mut running: JoinSet<TaskResult> = JoinSet::new();
        let mut in_flight: HashMap<Id, Target> = HashMap::new();
        let mut summary = Summary::new();

        info!(
            "Scheduling {} downloads with concurrency {}",
            total, self.concurrency
        );

        loop {
            while running.len() < self.concurrency {
                let Some(target) = queue.next() else {
                    break;
                };
                debug!("Starting [{}] {}", target.name, target.url);

                let executor = Arc::clone(&self.executor);
                let handle = running.spawn({
                    let target = target.clone();
                    async move { executor.execute(target).await }
                });
                in_flight.insert(handle.id(), target);
            }

            let result = match running.join_next_with_id().await {
                Some(Ok((id, result))) => {
                    in_flight.remove(&id);
                    result
                }
                Some(Err(join_err)) => {
                    let target = in_flight
                        .remove(&join_err.id())
                        .unwrap_or_else(|| Target::new("<unknown>", ""));
                    let reason = if join_err.is_panic() {
                        panic_message(join_err.into_panic())
                    } else {
                        "cancelled".to_string()
                    };
                    error!("[{}] download task crashed: {}", target.name, reason);
                    TaskResult::failure(target, TaskError::Panicked(reason))
                }
                None => break,
            };

            summary.record(&result);
            debug!(
                "[{}] done ({}/{}), success={}",
                result.target.name,
                summary.total(),
                total,
                result.succeeded()
            );
            on_result(&result);
        }

        summary
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
