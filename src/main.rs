use std::{ffi::OsString, path::Path, thread};

use clap::Parser;
use miette::{Context, IntoDiagnostic};
use time::UtcOffset;
use tracing::{debug, info, Level};

use cinesense::{
    cli::{Args, VERBOSE_ENV},
    config::Settings,
    logging::init_logging,
    orchestrator::{Orchestrator, Providers},
    outside::{Ffmpeg, HttpTranslator, Lexicon, WhisperCli, Ytdlp},
    pipeline,
    result::{Error, Result},
    strategy::EXTRACT_WORKER_FLAG,
};

fn main() -> miette::Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    if argv.get(1).map(|arg| arg == EXTRACT_WORKER_FLAG) == Some(true) {
        return extract_worker_main(&argv[2..]);
    }

    // Must happen before any thread spawns, later lookups are not
    // sound on Linux
    let offset = UtcOffset::current_local_offset()
        .into_diagnostic()
        .wrap_err("Could not get the local UTC offset")?;

    let args = Args::parse();
    if args.verbose {
        // Extraction workers inherit the environment, not the flag
        std::env::set_var(VERBOSE_ENV, "true");
    }
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_logging(level, offset)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_to(&mut settings);
    debug!("Effective settings: {settings:?}");

    let (ytdlp, ffmpeg, whisper) = load_external_components(&settings)?;
    let translator = HttpTranslator::new(settings.translate_endpoint.clone())?;
    let lexicon = Lexicon::load(
        settings.sentiment_lexicon.as_deref(),
        settings.emotion_lexicon.as_deref(),
    )?;

    let providers = Providers {
        downloader: &ytdlp,
        extractor: &ffmpeg,
        transcriber: &whisper,
        translator: &translator,
        sentiment: &lexicon,
        emotions: &lexicon,
    };

    let orchestrator = Orchestrator::new(&settings, providers, offset);
    orchestrator.run(
        args.download_strategy,
        args.extract_strategy,
        args.skip_download,
    )?;

    info!("All tasks completed");
    Ok(())
}

/// Probe the external programs concurrently as executing an external
/// program is not instantaneous. That way we can avoid adding the costs
fn load_external_components(settings: &Settings) -> Result<(Ytdlp, Ffmpeg, WhisperCli)> {
    let model = settings.whisper_model.clone();

    let ytdlp_thread = thread::spawn(Ytdlp::new);
    let ffmpeg_thread = thread::spawn(Ffmpeg::new);
    let whisper_thread = thread::spawn(move || WhisperCli::new(model));

    let ytdlp = ytdlp_thread.join().expect("Could not join thread")?;
    let ffmpeg = ffmpeg_thread.join().expect("Could not join thread")?;
    let whisper = whisper_thread.join().expect("Could not join thread")?;

    Ok((ytdlp, ffmpeg, whisper))
}

/// Entry point of a spawned extraction worker: convert the given
/// videos, writing the wav tracks into the first argument
fn extract_worker_main(argv: &[OsString]) -> miette::Result<()> {
    let [audio_dir, videos @ ..] = argv else {
        return Err(Error::extraction("Worker invoked without an audio directory").into());
    };

    // Fresh process, nothing else is running yet
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    init_logging(worker_level(), offset)?;

    let ffmpeg = Ffmpeg::new()?;
    for video in videos {
        pipeline::extract_audio(&ffmpeg, Path::new(audio_dir), Path::new(video))?;
    }

    Ok(())
}

/// Workers cannot see the parent's flags, only the environment it
/// passed down
fn worker_level() -> Level {
    let verbose = std::env::var(VERBOSE_ENV).is_ok_and(|value| value == "true");
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}
