use std::{collections::BTreeMap, fmt::Display, ops::Deref};

/// The fixed affect category set of the emotion lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EmotionCategory {
    Fear,
    Anger,
    Anticipation,
    Trust,
    Surprise,
    Sadness,
    Disgust,
    Joy,
}

impl EmotionCategory {
    pub const ALL: [Self; 8] = [
        Self::Fear,
        Self::Anger,
        Self::Anticipation,
        Self::Trust,
        Self::Surprise,
        Self::Sadness,
        Self::Disgust,
        Self::Joy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fear => "fear",
            Self::Anger => "anger",
            Self::Anticipation => "anticipation",
            Self::Trust => "trust",
            Self::Surprise => "surprise",
            Self::Sadness => "sadness",
            Self::Disgust => "disgust",
            Self::Joy => "joy",
        }
    }

    /// Parse a lexicon category name
    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cat| cat.as_str() == s)
    }
}

impl Display for EmotionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category affect frequencies for one transcript.
///
/// Always carries every category of the fixed set, zero-filled at
/// construction. Frequencies are non-negative and need not sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionProfile(BTreeMap<EmotionCategory, f64>);

impl EmotionProfile {
    pub fn new() -> Self {
        Self(EmotionCategory::ALL.iter().map(|&cat| (cat, 0.0)).collect())
    }

    pub fn set(&mut self, category: EmotionCategory, frequency: f64) {
        self.0.insert(category, frequency.clamp(0.0, 1.0));
    }

    pub fn get(&self, category: EmotionCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }
}

impl Default for EmotionProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for EmotionProfile {
    type Target = BTreeMap<EmotionCategory, f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for EmotionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (category, frequency)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{category}': {frequency}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_always_carries_the_full_category_set() {
        let profile = EmotionProfile::new();
        assert_eq!(profile.len(), EmotionCategory::ALL.len());
        for cat in EmotionCategory::ALL {
            assert_eq!(profile.get(cat), 0.0);
        }
    }

    #[test]
    fn set_clamps_to_unit_interval() {
        let mut profile = EmotionProfile::new();
        profile.set(EmotionCategory::Joy, 1.7);
        profile.set(EmotionCategory::Fear, -0.3);
        assert_eq!(profile.get(EmotionCategory::Joy), 1.0);
        assert_eq!(profile.get(EmotionCategory::Fear), 0.0);
        assert_eq!(profile.len(), EmotionCategory::ALL.len());
    }

    #[test]
    fn category_names_round_trip() {
        for cat in EmotionCategory::ALL {
            assert_eq!(EmotionCategory::from_str_opt(cat.as_str()), Some(cat));
        }
        assert_eq!(EmotionCategory::from_str_opt("positive"), None);
    }
}
