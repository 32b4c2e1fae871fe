use time::UtcOffset;
use tracing::info;

use crate::{
    completion::{AnalysisLog, CompletionLog},
    config::Settings,
    coordinator::DownloadCoordinator,
    manifest,
    outside::{
        AudioExtractor, Downloader, EmotionExtractor, SentimentAnalyzer, Transcriber, Translator,
    },
    pipeline::AnalysisPipeline,
    result::Result,
    store::ArtifactStore,
    strategy::Strategy,
    types::MediaArtifact,
};

/// Capability bundle handed to the orchestrator by the composition
/// root. The binary wires the external programs, tests wire mocks.
pub struct Providers<'a> {
    pub downloader: &'a dyn Downloader,
    pub extractor: &'a dyn AudioExtractor,
    pub transcriber: &'a dyn Transcriber,
    pub translator: &'a dyn Translator,
    pub sentiment: &'a dyn SentimentAnalyzer,
    pub emotions: &'a dyn EmotionExtractor,
}

/// Runs the two phases of an invocation: the download batch, then the
/// analysis pipeline over whatever sits in the video directory.
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    providers: Providers<'a>,
    store: ArtifactStore,
    offset: UtcOffset,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings, providers: Providers<'a>, offset: UtcOffset) -> Self {
        let store = ArtifactStore::new(
            settings.video_dir.clone(),
            settings.audio_dir.clone(),
            settings.transcript_dir.clone(),
            settings.translation_dir.clone(),
        );

        Self {
            settings,
            providers,
            store,
            offset,
        }
    }

    pub fn run(
        &self,
        download_strategy: Strategy,
        extract_strategy: Strategy,
        skip_download: bool,
    ) -> Result<Vec<MediaArtifact>> {
        self.store.prepare()?;

        if skip_download {
            info!("Skipping the download batch");
        } else {
            self.download_phase(download_strategy)?;
        }

        self.analysis_phase(extract_strategy)
    }

    fn download_phase(&self, strategy: Strategy) -> Result<()> {
        let identifiers = manifest::read_identifiers(&self.settings.manifest)?;
        info!(
            "{} identifier(s) in {}",
            identifiers.len(),
            self.settings.manifest.display()
        );

        let log = CompletionLog::create(&self.settings.download_log, self.offset)?;
        let coordinator = DownloadCoordinator::new(
            self.providers.downloader,
            &self.store,
            self.settings.capacity,
            self.settings.download_pool(),
            log.handle(),
        );

        let outcome = coordinator.run(&identifiers, strategy);
        drop(coordinator);
        // Drain the writer even when the batch failed, so the records
        // of the completed downloads are durable
        let closed = log.close();

        let report = outcome?;
        closed?;
        info!("{report}");

        Ok(())
    }

    fn analysis_phase(&self, strategy: Strategy) -> Result<Vec<MediaArtifact>> {
        let sentiment_log = AnalysisLog::create(&self.settings.sentiment_log)?;
        let emotion_log = AnalysisLog::create(&self.settings.emotion_log)?;

        let mut pipeline = AnalysisPipeline::new(
            self.providers.extractor,
            self.providers.transcriber,
            self.providers.translator,
            self.providers.sentiment,
            self.providers.emotions,
            &self.store,
            sentiment_log,
            emotion_log,
            self.settings.extract_pool(),
        );

        let artifacts = pipeline.run(strategy)?;
        info!("{} artifact(s) fully analyzed", artifacts.len());

        Ok(artifacts)
    }
}
