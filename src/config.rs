use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

/// Runtime settings, layered: built-in defaults, then an optional TOML
/// file, then `CINESENSE_*` environment variables. CLI flags override
/// the result after loading.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Manifest file listing one source identifier per line
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Directory receiving the downloaded videos
    #[serde(default = "default_video_dir")]
    pub video_dir: PathBuf,

    /// Directory receiving the extracted audio tracks
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Directory receiving the transcripts
    #[serde(default = "default_transcript_dir")]
    pub transcript_dir: PathBuf,

    /// Directory receiving the translated transcripts
    #[serde(default = "default_translation_dir")]
    pub translation_dir: PathBuf,

    /// Append-only sentiment log, one line per artifact
    #[serde(default = "default_sentiment_log")]
    pub sentiment_log: PathBuf,

    /// Append-only emotion log, one line per artifact
    #[serde(default = "default_emotion_log")]
    pub emotion_log: PathBuf,

    /// Append-only record of successful downloads
    #[serde(default = "default_download_log")]
    pub download_log: PathBuf,

    /// Maximum number of downloads admitted at once
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Download worker pool size. Zero means "use the admission capacity"
    #[serde(default)]
    pub download_workers: usize,

    /// Extraction worker pool size. Zero means "use the available parallelism"
    #[serde(default)]
    pub extract_workers: usize,

    /// whisper.cpp model file passed to the transcriber
    #[serde(default = "default_whisper_model")]
    pub whisper_model: PathBuf,

    /// Translation service endpoint
    #[serde(default = "default_translate_endpoint")]
    pub translate_endpoint: String,

    /// Optional TSV file overriding the built-in sentiment lexicon
    #[serde(default)]
    pub sentiment_lexicon: Option<PathBuf>,

    /// Optional TSV file overriding the built-in emotion lexicon
    #[serde(default)]
    pub emotion_lexicon: Option<PathBuf>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Video_urls.txt")
}

fn default_video_dir() -> PathBuf {
    PathBuf::from("Videos_output")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("Audio")
}

fn default_transcript_dir() -> PathBuf {
    PathBuf::from("Transcripts")
}

fn default_translation_dir() -> PathBuf {
    PathBuf::from("Translations")
}

fn default_sentiment_log() -> PathBuf {
    PathBuf::from("Sentiments.txt")
}

fn default_emotion_log() -> PathBuf {
    PathBuf::from("Emotions.txt")
}

fn default_download_log() -> PathBuf {
    PathBuf::from("download_log.txt")
}

fn default_capacity() -> usize {
    5
}

fn default_whisper_model() -> PathBuf {
    PathBuf::from("models/ggml-base.en.bin")
}

fn default_translate_endpoint() -> String {
    "http://localhost:5000/translate".to_owned()
}

impl Settings {
    /// Load the settings, optionally merging a TOML file under the
    /// environment layer.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file));
        }

        builder
            .add_source(config::Environment::with_prefix("CINESENSE"))
            .build()
            .into_diagnostic()
            .wrap_err("Could not assemble the configuration")?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid configuration values")
    }

    /// Effective download pool size
    pub fn download_pool(&self) -> usize {
        if self.download_workers == 0 {
            self.capacity
        } else {
            self.download_workers
        }
    }

    /// Effective extraction pool size
    pub fn extract_pool(&self) -> usize {
        if self.extract_workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.extract_workers
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_observable_contract() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.manifest, PathBuf::from("Video_urls.txt"));
        assert_eq!(settings.video_dir, PathBuf::from("Videos_output"));
        assert_eq!(settings.audio_dir, PathBuf::from("Audio"));
        assert_eq!(settings.transcript_dir, PathBuf::from("Transcripts"));
        assert_eq!(settings.translation_dir, PathBuf::from("Translations"));
        assert_eq!(settings.download_log, PathBuf::from("download_log.txt"));
        assert_eq!(settings.capacity, 5);
        assert_eq!(settings.download_pool(), 5);
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "capacity = 2\nvideo_dir = \"vids\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.capacity, 2);
        assert_eq!(settings.video_dir, PathBuf::from("vids"));
        // Untouched keys keep their defaults
        assert_eq!(settings.audio_dir, PathBuf::from("Audio"));
    }

    #[test]
    fn explicit_worker_counts_win() {
        let settings = Settings {
            download_workers: 3,
            extract_workers: 2,
            ..Settings::load(None).unwrap()
        };
        assert_eq!(settings.download_pool(), 3);
        assert_eq!(settings.extract_pool(), 2);
    }
}
