mod command;
mod ffmpeg;
mod lexicon;
mod translate;
mod whisper;
mod ytdlp;

pub use ffmpeg::{AudioExtractor, Ffmpeg};
pub use lexicon::{EmotionExtractor, Lexicon, SentimentAnalyzer};
pub use translate::{HttpTranslator, Translator, SOURCE_LANG, TARGET_LANG};
pub use whisper::{Transcriber, WhisperCli};
pub use ytdlp::{Downloader, Ytdlp};
