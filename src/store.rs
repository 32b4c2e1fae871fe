use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tempfile::NamedTempFile;

use crate::{
    result::{Error, Result},
    types::Extension,
};

/// Filesystem layout shared by every stage.
///
/// The basename of a reserved video path is the join key for all later
/// outputs: `<audio_dir>/<basename>.wav`, `<transcript_dir>/<basename>.txt`,
/// `<translation_dir>/<basename>.txt`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    video_dir: PathBuf,
    audio_dir: PathBuf,
    transcript_dir: PathBuf,
    translation_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(
        video_dir: PathBuf,
        audio_dir: PathBuf,
        transcript_dir: PathBuf,
        translation_dir: PathBuf,
    ) -> Self {
        Self {
            video_dir,
            audio_dir,
            transcript_dir,
            translation_dir,
        }
    }

    /// Create every output directory. Idempotent.
    pub fn prepare(&self) -> Result<()> {
        for dir in [
            &self.video_dir,
            &self.audio_dir,
            &self.transcript_dir,
            &self.translation_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|err| {
                Error::filesystem(format!("Could not create {}: {err}", dir.display()))
            })?;
        }
        Ok(())
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Reserve a unique video path for a provider-reported title.
    ///
    /// Returns the path of an empty placeholder file whose stem is now
    /// taken; the video lands at the same stem with the mp4 extension.
    /// Callers must remove the placeholder once the download finished
    /// (or failed). A lock keeps two concurrent reservations from
    /// picking the same stem.
    pub fn reserve_video_path(&self, title: &str) -> Result<PathBuf> {
        static LOCK: Mutex<()> = Mutex::new(());

        let title = sanitize_title(title);

        let _guard = LOCK.lock().unwrap();
        let mut placeholder = find_unused_stem(&self.video_dir, &title, Extension::Mp4)?;
        placeholder.set_extension("empty");
        touch(&placeholder)?;

        Ok(placeholder)
    }

    pub fn audio_path(&self, basename: &str) -> PathBuf {
        self.audio_dir
            .join(format!("{basename}{}", Extension::Wav.with_dot()))
    }

    pub fn transcript_path(&self, basename: &str) -> PathBuf {
        self.transcript_dir
            .join(format!("{basename}{}", Extension::Txt.with_dot()))
    }

    pub fn translation_path(&self, basename: &str) -> PathBuf {
        self.translation_dir
            .join(format!("{basename}{}", Extension::Txt.with_dot()))
    }

    pub fn write_transcript(&self, basename: &str, text: &str) -> Result<PathBuf> {
        let path = self.transcript_path(basename);
        std::fs::write(&path, text).map_err(|err| {
            Error::filesystem(format!("Could not write {}: {err}", path.display()))
        })?;
        Ok(path)
    }

    pub fn write_translation(&self, basename: &str, text: &str) -> Result<PathBuf> {
        let path = self.translation_path(basename);
        std::fs::write(&path, text).map_err(|err| {
            Error::filesystem(format!("Could not write {}: {err}", path.display()))
        })?;
        Ok(path)
    }

    /// List the downloaded videos, sorted by file name so analysis
    /// order is deterministic.
    pub fn discover_videos(&self) -> Result<Vec<PathBuf>> {
        let entries = self.video_dir.read_dir().map_err(|err| {
            Error::filesystem(format!(
                "Could not read {}: {err}",
                self.video_dir.display()
            ))
        })?;

        let mut videos: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Extension::from_path(path) == Some(Extension::Mp4))
            .collect();
        videos.sort();

        Ok(videos)
    }
}

/// Strip characters that cannot appear in a file name.
/// An empty result falls back to "video".
pub fn sanitize_title(title: &str) -> String {
    const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    let clean: String = title
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .collect();
    let clean = clean.trim().to_owned();

    if clean.is_empty() {
        "video".to_owned()
    } else {
        clean
    }
}

/// Find an unused `<title><ext>` stem in the directory, suffixing
/// ` (n)` on collision. A stem is taken if either the target file or
/// its `.empty` placeholder exists.
fn find_unused_stem(dir: &Path, title: &str, extension: Extension) -> Result<PathBuf> {
    let mut output = dir.to_path_buf();

    let is_free =
        |output: &Path| !(output.exists() || output.with_extension("empty").exists());

    let dot_ext = extension.with_dot();

    // Check filenames one by one until one does not exist
    output.push(format!("{title}{dot_ext}"));
    if is_free(&output) {
        return Ok(output);
    }

    for n in 2u16.. {
        output.set_file_name(format!("{title} ({n}){dot_ext}"));
        if is_free(&output) {
            return Ok(output);
        }
    }

    Err(Error::filesystem(format!(
        "No free file name left for title '{title}'"
    )))
}

fn touch(path: &Path) -> Result<()> {
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

/// Create a named temporary file with the given extension.
///
/// The file is deleted when the handle drops, so the handle must stay
/// alive for as long as the path is used.
pub fn named_tempfile(extension: Extension) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new()
        .suffix(extension.with_dot())
        .tempfile()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> ArtifactStore {
        ArtifactStore::new(
            dir.join("Videos_output"),
            dir.join("Audio"),
            dir.join("Transcripts"),
            dir.join("Translations"),
        )
    }

    #[test]
    fn prepare_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.prepare().unwrap();
        store.prepare().unwrap();
        assert!(tmp.path().join("Videos_output").is_dir());
        assert!(tmp.path().join("Audio").is_dir());
    }

    #[test]
    fn paths_share_the_basename() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        assert!(store.audio_path("clip1").ends_with("Audio/clip1.wav"));
        assert!(store
            .transcript_path("clip1")
            .ends_with("Transcripts/clip1.txt"));
        assert!(store
            .translation_path("clip1")
            .ends_with("Translations/clip1.txt"));
    }

    #[test]
    fn same_title_reserves_distinct_stems() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.prepare().unwrap();

        let first = store.reserve_video_path("clip").unwrap();
        let second = store.reserve_video_path("clip").unwrap();

        assert_eq!(first.file_name().unwrap(), "clip.empty");
        assert_eq!(second.file_name().unwrap(), "clip (2).empty");
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn existing_video_blocks_its_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.prepare().unwrap();
        std::fs::write(store.video_dir().join("clip.mp4"), b"x").unwrap();

        let reserved = store.reserve_video_path("clip").unwrap();
        assert_eq!(reserved.file_name().unwrap(), "clip (2).empty");
    }

    #[test]
    fn titles_are_sanitized() {
        assert_eq!(sanitize_title("a/b\\c: the \"movie\"?"), "abc the movie");
        assert_eq!(sanitize_title("  plain title  "), "plain title");
        assert_eq!(sanitize_title("///"), "video");
    }

    #[test]
    fn discovery_only_sees_sorted_mp4s() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.prepare().unwrap();
        std::fs::write(store.video_dir().join("b.mp4"), b"x").unwrap();
        std::fs::write(store.video_dir().join("a.mp4"), b"x").unwrap();
        std::fs::write(store.video_dir().join("notes.txt"), b"x").unwrap();
        std::fs::write(store.video_dir().join("c.empty"), b"").unwrap();

        let videos = store.discover_videos().unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn write_helpers_persist_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.prepare().unwrap();

        let path = store.write_transcript("clip1", "hello world").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello world");

        let path = store.write_translation("clip1", "hola mundo").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hola mundo");
    }
}
