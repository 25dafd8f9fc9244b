//! Keyword theme classification
//!
//! Counts, per theme, the whitespace tokens that contain any of the theme's
//! keywords as a substring, then normalizes the counts into a [`ThemeProfile`].

use crate::lexicon::KeywordLexicon;
use crate::types::ThemeProfile;

/// Classifier over a fixed keyword lexicon
#[derive(Debug, Clone, Default)]
pub struct ThemeClassifier {
    lexicon: KeywordLexicon,
}

impl ThemeClassifier {
    pub fn new(lexicon: KeywordLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &KeywordLexicon {
        &self.lexicon
    }

    /// Classify a text block.
    ///
    /// Matching is case-insensitive and substring-based: `"hopeful"` counts for
    /// `"hope"`. Each keyword is counted independently, so a token containing two
    /// keywords contributes twice. Returns `None` when nothing matched.
    pub fn classify(&self, text: &str) -> Option<ThemeProfile> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();

        let mut counts = [0u32; 4];
        for (theme, keywords) in self.lexicon.entries() {
            counts[theme.index()] = keywords
                .iter()
                .map(|keyword| count_containing(&tokens, keyword))
                .sum();
        }

        ThemeProfile::from_counts(counts)
    }
}

/// Classify `text` with the default lexicon
pub fn classify(text: &str) -> Option<ThemeProfile> {
    ThemeClassifier::default().classify(text)
}

fn count_containing(tokens: &[&str], keyword: &str) -> u32 {
    tokens.iter().filter(|t| t.contains(keyword)).count() as u32
}
