use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    admission::AdmissionGate,
    completion::CompletionHandle,
    outside::Downloader,
    result::{Error, Result},
    store::{named_tempfile, ArtifactStore},
    strategy::{run_serial, run_threads, ExecutionReport, Strategy},
    types::{DownloadTask, Extension},
};

/// Runs one download batch.
///
/// Every submission passes the admission gate before touching the
/// provider, so at most `capacity` downloads are in flight no matter
/// how many workers the strategy spawns.
pub struct DownloadCoordinator<'a> {
    provider: &'a dyn Downloader,
    store: &'a ArtifactStore,
    gate: AdmissionGate,
    workers: usize,
    log: CompletionHandle,
}

impl<'a> DownloadCoordinator<'a> {
    pub fn new(
        provider: &'a dyn Downloader,
        store: &'a ArtifactStore,
        capacity: usize,
        workers: usize,
        log: CompletionHandle,
    ) -> Self {
        Self {
            provider,
            store,
            gate: AdmissionGate::new(capacity),
            workers,
            log,
        }
    }

    /// Download one identifier end to end.
    ///
    /// Blocks until the gate admits the request. On success the video
    /// sits in the store under a unique name and a completion record
    /// is queued; on failure the reserved name is released again and
    /// nothing is recorded.
    pub fn submit(&self, identifier: &str) -> Result<PathBuf> {
        let _token = self.gate.acquire();
        debug!(
            "'{identifier}' admitted, {} slot(s) left",
            self.gate.available()
        );

        let title = self
            .provider
            .probe_title(identifier)
            .map_err(|err| err.wrap_err_with(|| format!("Could not resolve '{identifier}'")))?;
        info!("Downloading video: {title}");

        let placeholder = self.store.reserve_video_path(&title)?;
        let video_path = placeholder.with_extension(Extension::Mp4.with_no_dot());

        match self.fetch_into(identifier, &video_path) {
            Ok(()) => {
                std::fs::remove_file(&placeholder)?;
                self.log.record(identifier)?;
                info!("Download completed: {title}");
                Ok(video_path)
            }
            Err(err) => {
                // Give the reserved name back
                let _ = std::fs::remove_file(&placeholder);
                Err(err.wrap_err_with(|| format!("Could not download '{identifier}'")))
            }
        }
    }

    /// Fetch into a staging file, then move it into place
    fn fetch_into(&self, identifier: &str, video_path: &Path) -> Result<()> {
        let staging = named_tempfile(Extension::Mp4)?;
        self.provider.fetch(identifier, staging.path())?;

        if std::fs::rename(staging.path(), video_path).is_err() {
            debug!("Moving file failed, falling back to copying");
            std::fs::copy(staging.path(), video_path)?;
        }

        Ok(())
    }

    fn run_task(&self, task: &mut DownloadTask) -> Result<()> {
        task.begin();
        match self.submit(&task.identifier) {
            Ok(path) => {
                task.complete(path);
                debug!("Task '{}' completed", task.identifier);
                Ok(())
            }
            Err(err) => {
                task.fail();
                debug!("Task '{}' failed", task.identifier);
                Err(err)
            }
        }
    }

    /// Run the whole batch under the given strategy.
    ///
    /// The process strategy is rejected here: separate processes could
    /// not share the admission gate, so the capacity bound would not
    /// hold across them.
    pub fn run(&self, identifiers: &[String], strategy: Strategy) -> Result<ExecutionReport> {
        let tasks: Vec<DownloadTask> = identifiers
            .iter()
            .map(|id| DownloadTask::new(id.as_str()))
            .collect();
        info!("{} download task(s) queued", tasks.len());

        match strategy {
            Strategy::Serial => run_serial(tasks, |mut task| self.run_task(&mut task)),
            Strategy::Threads => {
                run_threads(self.workers, tasks, |mut task| self.run_task(&mut task))
            }
            Strategy::Processes => Err(Error::download(
                "The process strategy cannot share the admission gate, \
                 use serial or threads for downloads",
            )),
        }
    }
}
