use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Output},
};

use miette::{miette, Context, IntoDiagnostic};

use super::command::{assert_success_command, run_command, Capture, YT_DLP};
use crate::result::{Error, Result};

/// Interface for resolving and fetching remote videos
pub trait Downloader: Sync {
    /// Ask the provider for the video title behind the identifier
    fn probe_title(&self, identifier: &str) -> Result<String>;

    /// Download the video to the given path
    fn fetch(&self, identifier: &str, dest: &Path) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
pub struct Ytdlp {
    program: &'static str,
}

impl Ytdlp {
    /// Verify that the `yt-dlp` binary is reachable
    pub fn new() -> Result<Self> {
        if assert_success_command(YT_DLP, |cmd| cmd.arg("--version")).is_ok() {
            Ok(Self { program: YT_DLP })
        } else {
            Err(Error::download("yt-dlp not found"))
        }
    }

    /// Run the command and check if it failed with saying the stream is
    /// unavailable. In that case, return a download error naming the
    /// stream. In other cases, return the output handle.
    fn run_check_availability<F>(&self, f: F, capture: Capture) -> Result<Output>
    where
        F: FnOnce(&mut Command) -> &mut Command,
    {
        let res = run_command(self.program, f, capture | Capture::STDERR)?;

        let stderr = String::from_utf8_lossy(&res.stderr);
        if let Some(line) = unavailable_line(&stderr) {
            Err(Error::download(format!("Unavailable stream: {line}")))
        } else {
            Ok(res)
        }
    }
}

/// Find the provider error line reporting an unavailable stream
fn unavailable_line(stderr: &str) -> Option<&str> {
    stderr
        .lines()
        .find(|line| line.starts_with("ERROR:") && line.to_lowercase().contains("unavailable"))
}

impl Downloader for Ytdlp {
    fn probe_title(&self, identifier: &str) -> Result<String> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .arg("--skip-download")
                    .arg("-j")
                    .arg("--")
                    .arg(identifier)
            },
            Capture::STDOUT,
        )?;

        if !res.status.success() {
            return Err(Error::download(format!(
                "Could not resolve '{identifier}'"
            )));
        }

        let output = String::from_utf8_lossy(&res.stdout);
        let title = (|| -> miette::Result<String> {
            let json = serde_json::from_str::<serde_json::Value>(&output)
                .into_diagnostic()
                .wrap_err("Could not parse json")?;
            let title = json
                .as_object()
                .ok_or_else(|| miette!("JSON is not an object"))?
                .get("title")
                .ok_or_else(|| miette!("Key 'title' not found in JSON"))?
                .as_str()
                .ok_or_else(|| miette!("Value of key 'title' is not a string"))?;
            Ok(title.to_owned())
        })()
        .map_err(Error::Download)?;

        Ok(title)
    }

    fn fetch(&self, identifier: &str, dest: &Path) -> Result<()> {
        let res = self.run_check_availability(
            |cmd| {
                cmd.arg("-q")
                    .args([OsStr::new("-o"), dest.as_os_str()])
                    .arg("--no-continue") // Or else fails when file already exists, even an empty one
                    .args(["-f", "mp4"])
                    .arg("--")
                    .arg(identifier)
            },
            Capture::empty(),
        )?;

        if res.status.success() {
            Ok(())
        } else {
            Err(Error::download("Command did run but was not successful"))
        }
    }
}
