use std::path::{Path, PathBuf};

use crate::result::{Error, Result};

use super::{EmotionProfile, Sentiment};

/// One downloaded video and everything derived from it.
///
/// The basename is the join key across every stage output. Fields are
/// filled in stage order and never cleared once set.
#[derive(Debug)]
pub struct MediaArtifact {
    pub basename: String,
    pub video_path: PathBuf,
    pub audio_path: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
    pub translation_path: Option<PathBuf>,
    pub sentiment: Option<Sentiment>,
    pub emotions: Option<EmotionProfile>,
}

impl MediaArtifact {
    /// Build an artifact from a downloaded video file, deriving the
    /// basename from the file stem.
    pub fn from_video(video_path: &Path) -> Result<Self> {
        let basename = video_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                Error::filesystem(format!(
                    "Video path has no usable file stem: {}",
                    video_path.display()
                ))
            })?
            .to_owned();

        Ok(Self {
            basename,
            video_path: video_path.to_path_buf(),
            audio_path: None,
            transcript_path: None,
            translation_path: None,
            sentiment: None,
            emotions: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_is_the_file_stem() {
        let artifact = MediaArtifact::from_video(Path::new("Videos_output/clip1.mp4")).unwrap();
        assert_eq!(artifact.basename, "clip1");
        assert!(artifact.audio_path.is_none());
        assert!(artifact.sentiment.is_none());
    }

    #[test]
    fn suffixed_names_keep_their_suffix() {
        let artifact = MediaArtifact::from_video(Path::new("out/clip1 (2).mp4")).unwrap();
        assert_eq!(artifact.basename, "clip1 (2)");
    }
}
