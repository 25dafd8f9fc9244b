//! Theme keyword lexicon
//!
//! Fixed mapping from each theme to the keyword substrings that signal it, plus
//! the canned "key interest" sentence shown for a dominant theme.

use crate::error::InsightError;
use crate::types::Theme;
use serde::{Deserialize, Serialize};

const WONDER_KEYWORDS: [&str; 4] = ["inspiration", "dreams", "pride", "hope"];
const NOSTALGIA_KEYWORDS: [&str; 4] = ["heritage", "tradition", "wisdom", "roots"];
const PROGRESS_KEYWORDS: [&str; 4] = ["innovation", "technology", "future", "growth"];
const IDENTITY_KEYWORDS: [&str; 4] = ["community", "culture", "legacy", "spirit"];

/// Keyword lexicon, one ordered keyword list per theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLexicon {
    wonder: Vec<String>,
    nostalgia: Vec<String>,
    progress: Vec<String>,
    identity: Vec<String>,
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            wonder: owned(&WONDER_KEYWORDS),
            nostalgia: owned(&NOSTALGIA_KEYWORDS),
            progress: owned(&PROGRESS_KEYWORDS),
            identity: owned(&IDENTITY_KEYWORDS),
        }
    }
}

impl KeywordLexicon {
    /// Replace the keyword list for `theme`.
    ///
    /// Keywords are trimmed and lowercased; empty ones are dropped since they would
    /// match every token.
    pub fn with_keywords<I, S>(mut self, theme: Theme, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.keywords_mut(theme) = normalize(keywords);
        self
    }

    /// Load a lexicon from JSON (`{"wonder": [...], ...}`); omitted themes keep
    /// their default keywords
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        #[derive(Deserialize)]
        struct Partial {
            wonder: Option<Vec<String>>,
            nostalgia: Option<Vec<String>>,
            progress: Option<Vec<String>>,
            identity: Option<Vec<String>>,
        }

        let partial: Partial = serde_json::from_str(json)?;
        let mut lexicon = Self::default();
        for (theme, keywords) in [
            (Theme::Wonder, partial.wonder),
            (Theme::Nostalgia, partial.nostalgia),
            (Theme::Progress, partial.progress),
            (Theme::Identity, partial.identity),
        ] {
            if let Some(keywords) = keywords {
                lexicon = lexicon.with_keywords(theme, keywords);
            }
        }
        Ok(lexicon)
    }

    /// Keywords associated with `theme`, lowercase
    pub fn keywords(&self, theme: Theme) -> &[String] {
        match theme {
            Theme::Wonder => &self.wonder,
            Theme::Nostalgia => &self.nostalgia,
            Theme::Progress => &self.progress,
            Theme::Identity => &self.identity,
        }
    }

    fn keywords_mut(&mut self, theme: Theme) -> &mut Vec<String> {
        match theme {
            Theme::Wonder => &mut self.wonder,
            Theme::Nostalgia => &mut self.nostalgia,
            Theme::Progress => &mut self.progress,
            Theme::Identity => &mut self.identity,
        }
    }

    /// Iterate `(theme, keywords)` in priority order
    pub fn entries(&self) -> impl Iterator<Item = (Theme, &[String])> + '_ {
        Theme::ALL.into_iter().map(move |t| (t, self.keywords(t)))
    }

    /// Canned sentence for the "Key Interest" insight
    pub fn interest_sentence(theme: Theme) -> &'static str {
        match theme {
            Theme::Wonder => "You seem drawn to Bengaluru's inspiring scientific achievements",
            Theme::Nostalgia => "The city's historical evolution appears to resonate with you",
            Theme::Progress => "The technological advancement narrative captures your attention",
            Theme::Identity => "You connect with Bengaluru's unique cultural identity",
        }
    }

    /// Serialize lexicon to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_shape() {
        let lexicon = KeywordLexicon::default();
        for (_, keywords) in lexicon.entries() {
            assert_eq!(keywords.len(), 4);
            assert!(keywords.iter().all(|k| k == &k.to_lowercase()));
        }
        assert_eq!(lexicon.keywords(Theme::Wonder)[2], "pride");
        assert_eq!(lexicon.keywords(Theme::Progress)[0], "innovation");
    }

    #[test]
    fn test_interest_sentences_distinct() {
        let sentences: Vec<&str> = Theme::ALL
            .iter()
            .map(|t| KeywordLexicon::interest_sentence(*t))
            .collect();
        for (i, a) in sentences.iter().enumerate() {
            for b in &sentences[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_lexicon_json_keys() {
        let json = KeywordLexicon::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["identity"][3], "spirit");
        assert_eq!(value["nostalgia"][0], "heritage");
    }

    #[test]
    fn test_custom_keywords_normalized() {
        let lexicon =
            KeywordLexicon::default().with_keywords(Theme::Wonder, ["  Awe ", "", "Marvel"]);
        assert_eq!(lexicon.keywords(Theme::Wonder), ["awe", "marvel"]);
        assert_eq!(lexicon.keywords(Theme::Identity)[0], "community");
    }

    #[test]
    fn test_lexicon_from_json_overrides_some_themes() {
        let lexicon = KeywordLexicon::from_json(r#"{ "progress": ["Rocket", "orbit"] }"#).unwrap();
        assert_eq!(lexicon.keywords(Theme::Progress), ["rocket", "orbit"]);
        assert_eq!(lexicon.keywords(Theme::Nostalgia)[0], "heritage");

        assert!(KeywordLexicon::from_json("[1, 2]").is_err());
    }
}
