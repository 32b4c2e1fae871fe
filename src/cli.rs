use std::path::PathBuf;

use clap::Parser;

use crate::strategy::Strategy;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("CINESENSE_", $v)
    };
}

/// Environment variable mirrored by `--verbose`, inherited by the
/// spawned extraction workers
pub const VERBOSE_ENV: &str = arg_env!("VERBOSE");

/// Batch media-analysis pipeline.
/// Download the videos listed in a manifest under bounded admission,
/// then extract, transcribe, analyze, and translate their audio.
#[derive(Parser, Debug)]
pub struct Args {
    /// The manifest file listing one video identifier per line
    #[arg(env = arg_env!("MANIFEST"))]
    pub manifest: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// Execution strategy for the download batch
    #[arg(long, value_enum, default_value_t = Strategy::Threads, env = arg_env!("DOWNLOAD_STRATEGY"))]
    pub download_strategy: Strategy,

    /// Execution strategy for the audio-extraction batch
    #[arg(long, value_enum, default_value_t = Strategy::Processes, env = arg_env!("EXTRACT_STRATEGY"))]
    pub extract_strategy: Strategy,

    /// Maximum number of downloads admitted at once
    #[arg(long, env = arg_env!("CAPACITY"))]
    pub capacity: Option<usize>,

    /// Download worker pool size (defaults to the admission capacity)
    #[arg(long, env = arg_env!("DOWNLOAD_WORKERS"))]
    pub download_workers: Option<usize>,

    /// Extraction worker pool size (defaults to the available parallelism)
    #[arg(long, env = arg_env!("EXTRACT_WORKERS"))]
    pub extract_workers: Option<usize>,

    /// Skip the download batch and analyze the videos already present
    /// in the video directory
    #[arg(long, env = arg_env!("SKIP_DOWNLOAD"))]
    pub skip_download: bool,

    /// Log debug information
    #[arg(long, short, env = VERBOSE_ENV)]
    pub verbose: bool,
}

impl Args {
    /// Fold the CLI overrides into the loaded settings
    pub fn apply_to(&self, settings: &mut crate::config::Settings) {
        if let Some(manifest) = &self.manifest {
            settings.manifest = manifest.clone();
        }
        if let Some(capacity) = self.capacity {
            settings.capacity = capacity;
        }
        if let Some(workers) = self.download_workers {
            settings.download_workers = workers;
        }
        if let Some(workers) = self.extract_workers {
            settings.extract_workers = workers;
        }
    }
}
