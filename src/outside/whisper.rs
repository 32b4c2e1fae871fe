use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use super::command::{assert_success_command, run_command, Capture, WHISPER};
use crate::result::{Error, Result};

/// Interface for turning a wav file into plain text
pub trait Transcriber: Sync {
    fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// Interface for the [whisper.cpp](https://github.com/ggerganov/whisper.cpp) CLI
pub struct WhisperCli {
    model: PathBuf,
}

impl WhisperCli {
    /// Verify that the `whisper-cli` binary is reachable and that the
    /// model file exists
    pub fn new(model: PathBuf) -> Result<Self> {
        if assert_success_command(WHISPER, |cmd| cmd.arg("--help")).is_err() {
            return Err(Error::transcription("whisper-cli not found"));
        }
        if !model.is_file() {
            return Err(Error::transcription(format!(
                "Model file '{}' not found",
                model.display()
            )));
        }

        Ok(Self { model })
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, audio: &Path) -> Result<String> {
        let res = run_command(
            WHISPER,
            |cmd| {
                cmd.args([OsStr::new("-m"), self.model.as_os_str()])
                    .args([OsStr::new("-f"), audio.as_os_str()])
                    .arg("-nt") // No timestamps, text only
                    .arg("-np") // No progress prints on stderr
            },
            Capture::STDOUT | Capture::STDERR,
        )?;

        if !res.status.success() {
            let stderr = String::from_utf8_lossy(&res.stderr);
            return Err(Error::transcription(format!(
                "whisper-cli exited with {}: {}",
                res.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&res.stdout).trim().to_owned();
        if text.is_empty() {
            return Err(Error::transcription(format!(
                "No speech recognized in '{}'",
                audio.display()
            )));
        }

        Ok(text)
    }
}
