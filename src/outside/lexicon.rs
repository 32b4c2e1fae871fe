use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
    sync::OnceLock,
};

use indoc::indoc;
use regex::Regex;
use tracing::{debug, info};

use crate::{
    result::{Error, Result},
    types::{EmotionCategory, EmotionProfile, Sentiment},
};

/// Interface for scoring the sentiment of a plain-text transcript
pub trait SentimentAnalyzer: Sync {
    fn analyze(&self, text: &str) -> Result<Sentiment>;
}

/// Interface for extracting an emotion profile from a plain-text transcript
pub trait EmotionExtractor: Sync {
    fn extract(&self, text: &str) -> Result<EmotionProfile>;
}

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Words, keeping inner apostrophes ("don't" stays one token)
fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"[a-z']+").unwrap())
}

/// Compact seed so the pipeline scores something sensible out of the box.
/// Columns: word, polarity [-1, 1], subjectivity [0, 1]
const SENTIMENT_SEED: &str = indoc! {"
    # word	polarity	subjectivity
    amazing	0.6	0.9
    awesome	1.0	1.0
    awful	-1.0	1.0
    bad	-0.7	0.67
    beautiful	0.85	1.0
    best	1.0	0.3
    boring	-1.0	1.0
    brilliant	0.9	0.9
    broken	-0.4	0.4
    calm	0.3	0.3
    cheap	-0.4	0.7
    disappointing	-0.6	0.7
    dreadful	-1.0	1.0
    excellent	1.0	1.0
    excited	0.34	0.8
    fantastic	0.4	0.9
    fun	0.3	0.2
    good	0.7	0.6
    great	0.8	0.75
    happy	0.8	1.0
    hate	-0.8	0.9
    horrible	-1.0	1.0
    interesting	0.5	0.5
    love	0.5	0.6
    lovely	0.7	0.9
    nice	0.6	1.0
    painful	-0.7	0.8
    perfect	1.0	1.0
    pleasant	0.5	0.8
    poor	-0.4	0.6
    sad	-0.5	1.0
    scary	-0.5	1.0
    slow	-0.3	0.4
    terrible	-1.0	1.0
    ugly	-0.7	0.9
    useless	-0.5	0.4
    wonderful	1.0	1.0
    worst	-1.0	1.0
    wrong	-0.5	0.54
"};

/// Word to emotion associations, one pair per line with an association
/// flag. Same shape as the NRC emotion lexicon so that a downloaded
/// copy can be dropped in as an override file.
const EMOTION_SEED: &str = indoc! {"
    # word	category	flag
    abandoned	fear	1
    abandoned	sadness	1
    afraid	fear	1
    alarm	fear	1
    alarm	surprise	1
    angry	anger	1
    anxious	anticipation	1
    anxious	fear	1
    astonished	surprise	1
    await	anticipation	1
    betray	anger	1
    betray	sadness	1
    calm	trust	1
    celebrate	joy	1
    cheerful	joy	1
    cry	sadness	1
    danger	fear	1
    death	fear	1
    death	sadness	1
    delight	joy	1
    despair	fear	1
    despair	sadness	1
    disgusting	disgust	1
    eager	anticipation	1
    expect	anticipation	1
    faith	trust	1
    filthy	disgust	1
    friend	joy	1
    friend	trust	1
    furious	anger	1
    gift	anticipation	1
    gift	joy	1
    gift	surprise	1
    grief	sadness	1
    gross	disgust	1
    happy	joy	1
    hate	anger	1
    hate	disgust	1
    honest	trust	1
    hope	anticipation	1
    hope	joy	1
    horror	fear	1
    hostile	anger	1
    laugh	joy	1
    lonely	sadness	1
    love	joy	1
    love	trust	1
    loyal	trust	1
    mourn	sadness	1
    nasty	anger	1
    nasty	disgust	1
    outrage	anger	1
    panic	fear	1
    plan	anticipation	1
    rage	anger	1
    reliable	trust	1
    rotten	disgust	1
    sad	sadness	1
    scared	fear	1
    shock	fear	1
    shock	surprise	1
    smile	joy	1
    sorrow	sadness	1
    sudden	surprise	1
    terror	fear	1
    threat	fear	1
    unexpected	surprise	1
    vile	disgust	1
"};

/// Word-list scorer backing both text analysis stages.
///
/// Sentiment is the mean polarity and subjectivity over the matched
/// words. Emotions are relative frequencies: hits per category divided
/// by the total affect hits in the text.
pub struct Lexicon {
    sentiment: HashMap<String, (f64, f64)>,
    emotions: HashMap<String, Vec<EmotionCategory>>,
}

impl Lexicon {
    /// Load the embedded word lists, replaced by the override files
    /// when given
    pub fn load(sentiment_file: Option<&Path>, emotion_file: Option<&Path>) -> Result<Self> {
        let sentiment = match sentiment_file {
            Some(path) => parse_sentiment_tsv(&read_lexicon_file(path)?)?,
            None => parse_sentiment_tsv(SENTIMENT_SEED)?,
        };
        let emotions = match emotion_file {
            Some(path) => parse_emotion_tsv(&read_lexicon_file(path)?)?,
            None => parse_emotion_tsv(EMOTION_SEED)?,
        };

        info!(
            "Lexicon loaded: {} sentiment words, {} emotion words",
            sentiment.len(),
            emotions.len()
        );

        Ok(Self {
            sentiment,
            emotions,
        })
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        token_re()
            .find_iter(&lowered)
            .map(|m| m.as_str().to_owned())
            .collect()
    }
}

impl SentimentAnalyzer for Lexicon {
    fn analyze(&self, text: &str) -> Result<Sentiment> {
        let mut hits = 0usize;
        let mut polarity = 0.0;
        let mut subjectivity = 0.0;

        for token in self.tokens(text) {
            if let Some(&(p, s)) = self.sentiment.get(&token) {
                hits += 1;
                polarity += p;
                subjectivity += s;
            }
        }

        if hits == 0 {
            return Ok(Sentiment::new(0.0, 0.0));
        }

        let hits = hits as f64;
        Ok(Sentiment::new(polarity / hits, subjectivity / hits))
    }
}

impl EmotionExtractor for Lexicon {
    fn extract(&self, text: &str) -> Result<EmotionProfile> {
        let mut counts: BTreeMap<EmotionCategory, usize> = BTreeMap::new();
        let mut total = 0usize;

        for token in self.tokens(text) {
            if let Some(categories) = self.emotions.get(&token) {
                for &category in categories {
                    *counts.entry(category).or_default() += 1;
                    total += 1;
                }
            }
        }

        let mut profile = EmotionProfile::new();
        if total > 0 {
            for (category, count) in counts {
                profile.set(category, count as f64 / total as f64);
            }
        }
        debug!("{total} affect hit(s) in {} char(s) of text", text.len());

        Ok(profile)
    }
}

fn read_lexicon_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| {
        Error::analysis(format!("Could not read lexicon '{}': {err}", path.display()))
    })
}

/// Parse `word<TAB>polarity<TAB>subjectivity` lines. Blank lines and
/// `#` comments are skipped.
fn parse_sentiment_tsv(src: &str) -> Result<HashMap<String, (f64, f64)>> {
    let mut map = HashMap::new();

    for (lineno, line) in data_lines(src) {
        let mut fields = line.split('\t');
        let entry = (|| {
            let word = fields.next()?;
            let polarity: f64 = fields.next()?.trim().parse().ok()?;
            let subjectivity: f64 = fields.next()?.trim().parse().ok()?;
            Some((word, polarity, subjectivity))
        })();

        let Some((word, polarity, subjectivity)) = entry else {
            return Err(Error::analysis(format!(
                "Malformed sentiment lexicon line {lineno}: '{line}'"
            )));
        };
        map.insert(word.to_lowercase(), (polarity, subjectivity));
    }

    Ok(map)
}

/// Parse `word<TAB>category<TAB>flag` lines (NRC association format).
/// Rows flagged 0 and rows naming categories outside the eight tracked
/// ones (the NRC file also carries positive/negative) are skipped.
fn parse_emotion_tsv(src: &str) -> Result<HashMap<String, Vec<EmotionCategory>>> {
    let mut map: HashMap<String, Vec<EmotionCategory>> = HashMap::new();

    for (lineno, line) in data_lines(src) {
        let mut fields = line.split('\t');
        let (Some(word), Some(category)) = (fields.next(), fields.next()) else {
            return Err(Error::analysis(format!(
                "Malformed emotion lexicon line {lineno}: '{line}'"
            )));
        };

        let flag = fields.next().map(str::trim).unwrap_or("1");
        if flag == "0" {
            continue;
        }
        if flag != "1" {
            return Err(Error::analysis(format!(
                "Malformed emotion lexicon line {lineno}: '{line}'"
            )));
        }

        let Some(category) = EmotionCategory::from_str_opt(category.trim()) else {
            continue;
        };

        let categories = map.entry(word.to_lowercase()).or_default();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    Ok(map)
}

/// Number the lines, dropping blanks and comments
fn data_lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::load(None, None).unwrap()
    }

    #[test]
    fn seed_lists_are_well_formed() {
        let lex = lexicon();
        assert!(lex.sentiment.len() >= 30);
        assert!(lex.emotions.len() >= 50);
        assert_eq!(lex.sentiment.get("good"), Some(&(0.7, 0.6)));
        assert_eq!(
            lex.emotions.get("love"),
            Some(&vec![EmotionCategory::Joy, EmotionCategory::Trust])
        );
    }

    #[test]
    fn sentiment_is_the_mean_over_matched_words() {
        let lex = lexicon();

        let single = lex.analyze("a good day").unwrap();
        assert!((single.polarity() - 0.7).abs() < 1e-9);
        assert!((single.subjectivity() - 0.6).abs() < 1e-9);

        // good (0.7, 0.6) and bad (-0.7, 0.67) average out
        let mixed = lex.analyze("good things, bad things").unwrap();
        assert!(mixed.polarity().abs() < 1e-9);
        assert!((mixed.subjectivity() - 0.635).abs() < 1e-9);
    }

    #[test]
    fn unmatched_text_scores_neutral() {
        let lex = lexicon();
        for text in ["", "the quick brown fox", "12345 !!!"] {
            let sentiment = lex.analyze(text).unwrap();
            assert_eq!(sentiment.polarity(), 0.0);
            assert_eq!(sentiment.subjectivity(), 0.0);

            let profile = lex.extract(text).unwrap();
            for category in EmotionCategory::ALL {
                assert_eq!(profile.get(category), 0.0);
            }
        }
    }

    #[test]
    fn emotions_are_relative_frequencies() {
        let lex = lexicon();
        let profile = lex.extract("happy, happy and scared").unwrap();

        assert!((profile.get(EmotionCategory::Joy) - 2.0 / 3.0).abs() < 1e-9);
        assert!((profile.get(EmotionCategory::Fear) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(profile.get(EmotionCategory::Anger), 0.0);
    }

    #[test]
    fn multi_category_words_count_once_per_category() {
        let lex = lexicon();
        // love maps to both joy and trust, so two affect hits
        let profile = lex.extract("love").unwrap();
        assert_eq!(profile.get(EmotionCategory::Joy), 0.5);
        assert_eq!(profile.get(EmotionCategory::Trust), 0.5);
    }

    #[test]
    fn tokenizer_keeps_apostrophes_and_case_folds() {
        let lex = lexicon();
        // "GREAT" matches, "don't" stays one token and matches nothing
        let sentiment = lex.analyze("GREAT, isn't it").unwrap();
        assert!((sentiment.polarity() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn override_file_replaces_the_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentiment.tsv");
        std::fs::write(&path, "zork\t1.0\t1.0\n").unwrap();

        let lex = Lexicon::load(Some(&path), None).unwrap();
        assert_eq!(lex.sentiment.len(), 1);
        let sentiment = lex.analyze("zork").unwrap();
        assert_eq!(sentiment.polarity(), 1.0);
        // The seed words are gone
        assert_eq!(lex.analyze("good").unwrap().polarity(), 0.0);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let err = parse_sentiment_tsv("word without tabs\n").unwrap_err();
        assert_eq!(err.stage(), "analysis");
        let report = miette::Report::from(err);
        assert!(format!("{report:?}").contains("line 1"));

        let err = parse_emotion_tsv("word\tjoy\tmaybe\n").unwrap_err();
        assert_eq!(err.stage(), "analysis");
    }

    #[test]
    fn emotion_rows_flagged_zero_or_unknown_are_skipped() {
        let map = parse_emotion_tsv("calm\tjoy\t0\ncalm\tpositive\t1\ncalm\ttrust\t1\n").unwrap();
        assert_eq!(map.get("calm"), Some(&vec![EmotionCategory::Trust]));
    }
}
