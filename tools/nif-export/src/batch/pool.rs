//! Bounded worker pool with completion signalling

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// One unit of scheduled work
pub trait Job: Send + 'static {
    fn label(&self) -> &str;

    /// Run to completion; an `Err` is a failed completion
    fn run(self) -> anyhow::Result<()>;
}

/// Totals for one [`JobPool::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub launched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Highest number of jobs running at once
    pub peak_running: usize,
    pub failed_labels: Vec<String>,
}

struct Completion {
    sequence: usize,
    label: String,
    result: anyhow::Result<()>,
}

/// Runs jobs on their own threads, at most `cap` at a time
///
/// Each job reports back over a channel when it finishes; the scheduler
/// blocks on that channel whenever the pool is full and drains it before
/// returning.
pub struct JobPool {
    name: String,
    cap: usize,
}

impl JobPool {
    pub fn new(name: impl Into<String>, cap: usize) -> Self {
        Self {
            name: name.into(),
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn run<J, I>(&self, jobs: I) -> PoolReport
    where
        J: Job,
        I: IntoIterator<Item = J>,
    {
        let jobs: Vec<J> = jobs.into_iter().collect();
        let total = jobs.len();
        let mut report = PoolReport::default();
        let mut running: HashMap<usize, JoinHandle<()>> = HashMap::new();
        let (tx, rx) = mpsc::channel::<Completion>();

        tracing::info!("[{}] {} jobs, at most {} at a time", self.name, total, self.cap);

        for (index, job) in jobs.into_iter().enumerate() {
            if running.len() >= self.cap {
                tracing::debug!("[{}] Reached max job count, waiting", self.name);
                if !self.wait_one(&rx, &mut running, &mut report, total) {
                    break;
                }
            }

            let sequence = index + 1;
            let label = job.label().to_string();
            tracing::info!("[{}] Starting {} - {}/{}", self.name, label, sequence, total);

            let tx = tx.clone();
            let handle = thread::spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| job.run()))
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("job panicked")));
                let _ = tx.send(Completion {
                    sequence,
                    label,
                    result,
                });
            });

            running.insert(sequence, handle);
            report.launched += 1;
            report.peak_running = report.peak_running.max(running.len());
        }
        drop(tx);

        while !running.is_empty() {
            if !self.wait_one(&rx, &mut running, &mut report, total) {
                break;
            }
        }

        tracing::info!(
            "[{}] Finished: {} succeeded, {} failed",
            self.name,
            report.succeeded,
            report.failed
        );
        report
    }

    /// Block for the next completion; false if no sender remains
    fn wait_one(
        &self,
        rx: &mpsc::Receiver<Completion>,
        running: &mut HashMap<usize, JoinHandle<()>>,
        report: &mut PoolReport,
        total: usize,
    ) -> bool {
        let Ok(completion) = rx.recv() else {
            tracing::error!("[{}] Lost contact with {} running jobs", self.name, running.len());
            return false;
        };

        if let Some(handle) = running.remove(&completion.sequence) {
            let _ = handle.join();
        }

        match completion.result {
            Ok(()) => {
                report.succeeded += 1;
                tracing::info!(
                    "[{}] Finished {} - {}/{}",
                    self.name,
                    completion.label,
                    completion.sequence,
                    total
                );
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(
                    "[{}] Failed {} - {}/{}: {:#}",
                    self.name,
                    completion.label,
                    completion.sequence,
                    total,
                    e
                );
                report.failed_labels.push(completion.label);
            }
        }
        true
    }
}
