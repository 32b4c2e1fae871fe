mod artifact;
mod emotion;
mod extension;
mod sentiment;
mod task;

pub use artifact::MediaArtifact;
pub use emotion::{EmotionCategory, EmotionProfile};
pub use extension::Extension;
pub use sentiment::Sentiment;
pub use task::{DownloadTask, TaskState};
