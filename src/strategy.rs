use std::{
    ffi::OsString,
    fmt::Display,
    process::{Child, Command},
    time::{Duration, Instant},
};

use clap::ValueEnum;
use crossbeam_channel::{bounded, unbounded};
use tracing::debug;

use crate::result::{Error, Result};

/// Sentinel turning a spawned copy of this binary into an extraction
/// worker. Checked before normal argument parsing.
pub const EXTRACT_WORKER_FLAG: &str = "--extract-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    Serial,
    Threads,
    Processes,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Serial => "Serial",
            Strategy::Threads => "Parallel",
            Strategy::Processes => "Multiprocess",
        }
    }
}

/// Elapsed wall-clock time of one batch invocation.
/// Purely observational, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionReport {
    strategy: Strategy,
    elapsed: Duration,
}

impl ExecutionReport {
    pub fn new(strategy: Strategy, elapsed: Duration) -> Self {
        Self { strategy, elapsed }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Display for ExecutionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} second(s)",
            self.strategy.label(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Run every unit in input order on the calling thread.
/// The first error aborts the rest of the batch immediately.
pub fn run_serial<T, F>(items: Vec<T>, mut unit: F) -> Result<ExecutionReport>
where
    F: FnMut(T) -> Result<()>,
{
    let start = Instant::now();
    for item in items {
        unit(item)?;
    }
    Ok(ExecutionReport::new(Strategy::Serial, start.elapsed()))
}

/// Run the units on a bounded worker pool.
///
/// Workers pull indexed items from a shared channel, so at most
/// `workers` units run at once. Every unit runs to completion even
/// when some fail; afterwards the first error in item order is
/// returned.
pub fn run_threads<T, F>(workers: usize, items: Vec<T>, unit: F) -> Result<ExecutionReport>
where
    T: Send,
    F: Fn(T) -> Result<()> + Sync,
{
    let workers = workers.max(1).min(items.len().max(1));
    let start = Instant::now();

    let failures = std::thread::scope(|scope| {
        let (task_send, task_receive) = bounded::<(usize, T)>(workers);
        let (result_send, result_receive) = unbounded::<(usize, Error)>();

        for id in 0..workers {
            let task_receive = task_receive.clone();
            let result_send = result_send.clone();
            let unit = &unit;
            std::thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn_scoped(scope, move || {
                    debug!("Worker started, waiting for an item");
                    for (index, item) in task_receive {
                        if let Err(err) = unit(item) {
                            let _ = result_send.send((index, err));
                        }
                    }
                    debug!("All items consumed. Stopping the worker.");
                })
                .expect("Could not spawn worker thread");
        }
        drop(task_receive);
        drop(result_send);

        for indexed in items.into_iter().enumerate() {
            // Workers only stop once this side closes, so the send
            // cannot fail
            task_send.send(indexed).unwrap();
        }
        drop(task_send);

        result_receive.into_iter().collect::<Vec<_>>()
    });

    if let Some((index, err)) = failures.into_iter().min_by_key(|(index, _)| *index) {
        return Err(err.wrap_err_with(|| format!("Batch item {index} failed")));
    }

    Ok(ExecutionReport::new(Strategy::Threads, start.elapsed()))
}

/// Fan the items out over a pool of worker processes.
///
/// The batch is split into at most `workers` chunks and each chunk is
/// handed to a re-executed copy of this binary (`--extract-worker`).
/// All children are awaited; the first non-zero exit in chunk order
/// becomes the batch error.
pub fn run_processes<T, F>(workers: usize, items: Vec<T>, worker_argv: F) -> Result<ExecutionReport>
where
    F: Fn(&[T]) -> Vec<OsString>,
{
    let start = Instant::now();
    if items.is_empty() {
        return Ok(ExecutionReport::new(Strategy::Processes, start.elapsed()));
    }

    let workers = workers.max(1).min(items.len());
    let chunk_size = items.len().div_ceil(workers);
    let exe = std::env::current_exe()?;

    let mut children = Vec::with_capacity(workers);
    for chunk in items.chunks(chunk_size) {
        let spawned = Command::new(&exe)
            .arg(EXTRACT_WORKER_FLAG)
            .args(worker_argv(chunk))
            .spawn();
        let child = match spawned {
            Ok(child) => child,
            Err(err) => {
                // The workers already running must not outlive the batch
                reap(children);
                return Err(Error::extraction(format!(
                    "Could not spawn extraction worker: {err}"
                )));
            }
        };
        debug!("Spawned extraction worker {} for {} item(s)", child.id(), chunk.len());
        children.push(child);
    }

    let mut first_failure = None;
    for (index, mut child) in children.into_iter().enumerate() {
        let status = child
            .wait()
            .map_err(|err| Error::extraction(format!("Could not wait for worker: {err}")))?;
        if !status.success() && first_failure.is_none() {
            first_failure = Some(Error::extraction(format!(
                "Extraction worker {index} exited with {status}"
            )));
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(ExecutionReport::new(Strategy::Processes, start.elapsed())),
    }
}

/// Kill and wait out every child, tolerating the ones already gone.
fn reap(children: Vec<Child>) {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}
