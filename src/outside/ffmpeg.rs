use std::{ffi::OsStr, path::Path};

use super::command::{assert_success_command, run_command, Capture, FFMPEG, FFMPEG_DEFAULT_ARGS};
use crate::result::{Error, Result};

/// Interface for converting a video into a mono 16 kHz wav file
pub trait AudioExtractor: Sync {
    fn extract(&self, video: &Path, audio_out: &Path) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org/) program
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        if assert_success_command(FFMPEG, |cmd| cmd.arg("-version")).is_ok() {
            Ok(Self)
        } else {
            Err(Error::extraction("ffmpeg not found"))
        }
    }
}

impl AudioExtractor for Ffmpeg {
    fn extract(&self, video: &Path, audio_out: &Path) -> Result<()> {
        let res = run_command(
            FFMPEG,
            |cmd| {
                cmd.args(FFMPEG_DEFAULT_ARGS)
                    .arg("-y")
                    .args([OsStr::new("-i"), video.as_os_str()])
                    .arg("-vn")
                    .args(["-acodec", "pcm_s16le"])
                    .args(["-ar", "16000"])
                    .args(["-ac", "1"])
                    .arg(audio_out)
            },
            Capture::STDERR,
        )?;

        if res.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&res.stderr);
            Err(Error::extraction(format!(
                "ffmpeg exited with {}: {}",
                res.status,
                stderr.trim()
            )))
        }
    }
}
