use std::fmt::Display;

/// Polarity/subjectivity pair produced by the sentiment provider.
///
/// Polarity lives in [-1, 1] (negative to positive), subjectivity
/// in [0, 1] (objective to subjective). Construction clamps both so
/// the invariant holds whatever the provider returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    polarity: f64,
    subjectivity: f64,
}

impl Sentiment {
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }

    pub fn polarity(&self) -> f64 {
        self.polarity
    }

    pub fn subjectivity(&self) -> f64 {
        self.subjectivity
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sentiment(polarity={}, subjectivity={})",
            self.polarity, self.subjectivity
        )
    }
}
