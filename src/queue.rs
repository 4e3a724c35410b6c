// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Dispatch Queue
//!
//! A bounded buffer of pending `Job`s drained by a fixed number of worker tasks. Each worker
//! executes one job at a time and publishes exactly one `QueryResult` per job, whether the query
//! succeeded, failed, was cancelled, or the executor panicked. Results arrive in completion order.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::resolver::{Failure, Job, Outcome, QueryError, QueryExecutor, QueryResult};
use crate::{Error, Result};

pub const DEFAULT_CAPACITY: usize = 65_535;
pub const DEFAULT_WORKERS: usize = 8;

type JobReceiver = Arc<Mutex<mpsc::Receiver<Job>>>;

#[derive(Debug)]
pub struct DispatchQueue {
    jobs: Option<mpsc::Sender<Job>>,
    results: mpsc::Receiver<QueryResult>,
    workers: Vec<JoinHandle<()>>,
}

impl DispatchQueue {
    /// Opens a queue buffering up to `capacity` pending jobs, drained by `workers` worker tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open<E: QueryExecutor + ?Sized>(capacity: usize, workers: usize, executor: Arc<E>) -> Result<DispatchQueue> {
        if capacity == 0 {
            return Err(Error::ConfigError {
                reason: "dispatch queue capacity must be at least 1".to_string(),
            });
        }
        if workers == 0 {
            return Err(Error::ConfigError {
                reason: "dispatch queue needs at least 1 worker".to_string(),
            });
        }

        let (jobs_tx, jobs_rx) = mpsc::channel(capacity);
        let (results_tx, results_rx) = mpsc::channel(capacity);
        let jobs_rx: JobReceiver = Arc::new(Mutex::new(jobs_rx));

        let workers = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&executor),
                    Arc::clone(&jobs_rx),
                    results_tx.clone(),
                ))
            })
            .collect();
        debug!("Opened dispatch queue with capacity {}.", capacity);

        Ok(DispatchQueue {
            jobs: Some(jobs_tx),
            results: results_rx,
            workers,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.is_none()
    }

    /// Enqueues `job`; waits only while the pending buffer is full.
    pub async fn submit(&self, job: Job) -> Result<()> {
        let jobs = self.jobs.as_ref().ok_or(Error::InternalError {
            msg: "submission to closed dispatch queue",
        })?;
        submit(jobs, job).await
    }

    /// Signals that no further jobs will arrive. Workers drain the remaining jobs and exit.
    pub fn close_submission(&mut self) {
        self.jobs = None;
    }

    /// Next available result; `None` once submission is closed and every submitted job has produced its result.
    pub async fn next_result(&mut self) -> Option<QueryResult> {
        self.results.recv().await
    }

    /// Submits `jobs` and collects exactly as many results.
    ///
    /// Submission and collection run concurrently, so any capacity works regardless of the number of jobs.
    pub async fn dispatch(&mut self, jobs: Vec<Job>) -> Result<Vec<QueryResult>> {
        let expected = jobs.len();
        let sender = self.jobs.as_ref().ok_or(Error::InternalError {
            msg: "submission to closed dispatch queue",
        })?;
        let receiver = &mut self.results;

        let submission = async move {
            for job in jobs {
                submit(sender, job).await?;
            }
            Ok::<(), Error>(())
        };
        let collection = async move {
            let mut results = Vec::with_capacity(expected);
            while results.len() < expected {
                match receiver.recv().await {
                    Some(result) => results.push(result),
                    None => break,
                }
            }
            results
        };
        let (submitted, results) = tokio::join!(submission, collection);

        submitted?;
        if results.len() != expected {
            return Err(Error::InternalError {
                msg: "dispatch queue stopped before all results arrived",
            });
        }

        Ok(results)
    }

    /// Closes submission and waits for all workers to finish; undelivered results are dropped.
    pub async fn shutdown(mut self) {
        self.close_submission();
        // Workers block on a full result channel unless it is drained.
        while self.results.recv().await.is_some() {}
        for handle in self.workers.drain(..) {
            if let Err(err) = handle.await {
                warn!("Dispatch queue worker did not finish properly: {}", err);
            }
        }
    }
}

async fn submit(jobs: &mpsc::Sender<Job>, job: Job) -> Result<()> {
    trace!("Submitting job for '{}' to {}.", job.name(), job.name_server());
    jobs.send(job).await.map_err(|_| Error::InternalError {
        msg: "dispatch queue workers have stopped",
    })
}

async fn worker<E: QueryExecutor + ?Sized>(
    id: usize,
    executor: Arc<E>,
    jobs: JobReceiver,
    results: mpsc::Sender<QueryResult>,
) {
    trace!("Dispatch queue worker {} started.", id);
    loop {
        // Only the receive is done under the lock; execution happens concurrently across workers.
        let job = jobs.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let outcome = execute_guarded(executor.as_ref(), &job).await;
        let result = QueryResult::from_outcome(job, outcome);
        debug!(
            "Worker {} finished query for '{}' at {}: {}",
            id,
            result.job().name(),
            result.job().name_server(),
            result.failure().map(ToString::to_string).unwrap_or_else(|| "ok".to_string()),
        );

        if results.send(result).await.is_err() {
            debug!("Results of dispatch queue are no longer received; worker {} stops.", id);
            break;
        }
    }
    trace!("Dispatch queue worker {} stopped.", id);
}

async fn execute_guarded<E: QueryExecutor + ?Sized>(executor: &E, job: &Job) -> Outcome {
    let start_time = Instant::now();
    match AssertUnwindSafe(executor.execute(job)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Query for '{}' at {} panicked.", job.name(), job.name_server());
            Err(Failure::new(start_time.elapsed(), QueryError::RuntimePanic))
        }
    }
}
