use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    completion::AnalysisLog,
    outside::{AudioExtractor, EmotionExtractor, SentimentAnalyzer, Transcriber, Translator},
    result::{Error, Result},
    store::ArtifactStore,
    strategy::{run_processes, run_serial, run_threads, ExecutionReport, Strategy},
    types::{Extension, MediaArtifact},
};

/// Derive the wav target for a video and run the extractor on it.
/// Shared by the in-process strategies and the worker-process entry.
pub fn extract_audio(
    extractor: &dyn AudioExtractor,
    audio_dir: &Path,
    video: &Path,
) -> Result<()> {
    let artifact = MediaArtifact::from_video(video)?;
    let audio = audio_dir.join(format!(
        "{}{}",
        artifact.basename,
        Extension::Wav.with_dot()
    ));

    info!("Extracting audio of {}", artifact.basename);
    extractor.extract(video, &audio).map_err(|err| {
        err.wrap_err_with(|| format!("Could not extract audio of '{}'", artifact.basename))
    })
}

/// Everything after the downloads: audio extraction as one timed
/// batch, then the text stages video by video.
pub struct AnalysisPipeline<'a> {
    extractor: &'a dyn AudioExtractor,
    transcriber: &'a dyn Transcriber,
    translator: &'a dyn Translator,
    sentiment: &'a dyn SentimentAnalyzer,
    emotions: &'a dyn EmotionExtractor,
    store: &'a ArtifactStore,
    sentiment_log: AnalysisLog,
    emotion_log: AnalysisLog,
    workers: usize,
}

impl<'a> AnalysisPipeline<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractor: &'a dyn AudioExtractor,
        transcriber: &'a dyn Transcriber,
        translator: &'a dyn Translator,
        sentiment: &'a dyn SentimentAnalyzer,
        emotions: &'a dyn EmotionExtractor,
        store: &'a ArtifactStore,
        sentiment_log: AnalysisLog,
        emotion_log: AnalysisLog,
        workers: usize,
    ) -> Self {
        Self {
            extractor,
            transcriber,
            translator,
            sentiment,
            emotions,
            store,
            sentiment_log,
            emotion_log,
            workers,
        }
    }

    /// Analyze everything currently in the video directory
    pub fn run(&mut self, extract_strategy: Strategy) -> Result<Vec<MediaArtifact>> {
        let videos = self.store.discover_videos()?;
        info!("{} video(s) to analyze", videos.len());

        let report = self.extract_batch(videos.clone(), extract_strategy)?;
        info!("{report}");

        self.analyze(&videos)
    }

    /// Convert every video to its wav track under the given strategy
    fn extract_batch(&self, videos: Vec<PathBuf>, strategy: Strategy) -> Result<ExecutionReport> {
        match strategy {
            Strategy::Serial => run_serial(videos, |video| {
                extract_audio(self.extractor, self.store.audio_dir(), &video)
            }),
            Strategy::Threads => run_threads(self.workers, videos, |video| {
                extract_audio(self.extractor, self.store.audio_dir(), &video)
            }),
            Strategy::Processes => run_processes(self.workers, videos, |chunk| {
                let mut argv = vec![self.store.audio_dir().as_os_str().to_owned()];
                argv.extend(chunk.iter().map(|video| video.as_os_str().to_owned()));
                argv
            }),
        }
    }

    /// Run the text stages over the videos in order. The first failure
    /// aborts the batch, later videos stay untouched.
    fn analyze(&mut self, videos: &[PathBuf]) -> Result<Vec<MediaArtifact>> {
        let mut artifacts = Vec::with_capacity(videos.len());
        for video in videos {
            artifacts.push(self.analyze_one(video)?);
        }
        Ok(artifacts)
    }

    fn analyze_one(&mut self, video: &Path) -> Result<MediaArtifact> {
        let mut artifact = MediaArtifact::from_video(video)?;
        let file_name = match video.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_owned(),
            None => artifact.basename.clone(),
        };

        let audio = self.store.audio_path(&artifact.basename);
        if !audio.is_file() {
            return Err(Error::extraction(format!(
                "No audio track for '{}'",
                artifact.basename
            )));
        }
        artifact.audio_path = Some(audio.clone());

        info!("Transcribing {file_name}");
        let transcript = self
            .transcriber
            .transcribe(&audio)
            .map_err(|err| err.wrap_err_with(|| format!("Could not transcribe '{file_name}'")))?;
        artifact.transcript_path = Some(self.store.write_transcript(&artifact.basename, &transcript)?);

        let sentiment = self.sentiment.analyze(&transcript)?;
        self.sentiment_log
            .append(format!("Sentiment for {file_name}: {sentiment}"))?;
        info!("Sentiment for {file_name}: {sentiment}");
        artifact.sentiment = Some(sentiment);

        let translated = self
            .translator
            .translate(&transcript)
            .map_err(|err| err.wrap_err_with(|| format!("Could not translate '{file_name}'")))?;
        artifact.translation_path =
            Some(self.store.write_translation(&artifact.basename, &translated)?);

        let profile = self.emotions.extract(&transcript)?;
        self.emotion_log
            .append(format!("Emotions for {file_name}: {profile}"))?;
        info!("Emotions for {file_name}: {profile}");
        artifact.emotions = Some(profile);

        debug!("'{file_name}' went through every stage");
        Ok(artifact)
    }
}
