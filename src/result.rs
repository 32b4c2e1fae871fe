use std::fmt::Display;

use miette::miette;

/// Stage-tagged error. Every failure in a run belongs to exactly one
/// of these stages, and a stage failure is fatal to the whole batch.
#[derive(Debug)]
pub enum Error {
    Download(miette::Report),
    Extraction(miette::Report),
    Transcription(miette::Report),
    Translation(miette::Report),
    Analysis(miette::Report),
    Filesystem(miette::Report),
}

impl Error {
    pub fn download(msg: impl Display) -> Self {
        Error::Download(miette!("{msg}"))
    }

    pub fn extraction(msg: impl Display) -> Self {
        Error::Extraction(miette!("{msg}"))
    }

    pub fn transcription(msg: impl Display) -> Self {
        Error::Transcription(miette!("{msg}"))
    }

    pub fn translation(msg: impl Display) -> Self {
        Error::Translation(miette!("{msg}"))
    }

    pub fn analysis(msg: impl Display) -> Self {
        Error::Analysis(miette!("{msg}"))
    }

    pub fn filesystem(msg: impl Display) -> Self {
        Error::Filesystem(miette!("{msg}"))
    }

    /// The stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Download(_) => "download",
            Error::Extraction(_) => "extraction",
            Error::Transcription(_) => "transcription",
            Error::Translation(_) => "translation",
            Error::Analysis(_) => "analysis",
            Error::Filesystem(_) => "filesystem",
        }
    }

    /// Add context to the underlying report, keeping the stage tag
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Download(report) => Error::Download(report.wrap_err(f())),
            Error::Extraction(report) => Error::Extraction(report.wrap_err(f())),
            Error::Transcription(report) => Error::Transcription(report.wrap_err(f())),
            Error::Translation(report) => Error::Translation(report.wrap_err(f())),
            Error::Analysis(report) => Error::Analysis(report.wrap_err(f())),
            Error::Filesystem(report) => Error::Filesystem(report.wrap_err(f())),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Filesystem(miette!("{err}"))
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        let stage = err.stage();
        let report = match err {
            Error::Download(report)
            | Error::Extraction(report)
            | Error::Transcription(report)
            | Error::Translation(report)
            | Error::Analysis(report)
            | Error::Filesystem(report) => report,
        };
        report.wrap_err(format!("{stage} stage failed"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
