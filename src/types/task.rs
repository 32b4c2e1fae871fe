use std::path::PathBuf;

use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InFlight,
    Completed,
    Failed,
}

/// One manifest entry's download, from creation to completion.
/// Transitions are driven only by the download coordinator and
/// a task is never reused.
#[derive(Debug)]
pub struct DownloadTask {
    pub identifier: String,
    pub state: TaskState,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub video_path: Option<PathBuf>,
}

impl DownloadTask {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            state: TaskState::Pending,
            started_at: None,
            completed_at: None,
            video_path: None,
        }
    }

    pub fn begin(&mut self) {
        self.state = TaskState::InFlight;
        self.started_at = Some(OffsetDateTime::now_utc());
    }

    pub fn complete(&mut self, video_path: PathBuf) {
        self.state = TaskState::Completed;
        self.completed_at = Some(OffsetDateTime::now_utc());
        self.video_path = Some(video_path);
    }

    pub fn fail(&mut self) {
        self.state = TaskState::Failed;
        self.completed_at = Some(OffsetDateTime::now_utc());
    }
}
