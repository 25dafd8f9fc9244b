//! Core data types
//!
//! This module defines the themes, per-block theme profiles, and insight records
//! that flow between the classifier, the engine, and the render sink.

use crate::error::InsightError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotional/topical theme used to classify a text block
///
/// Declaration order is the fixed ranking priority used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Wonder,
    Nostalgia,
    Progress,
    Identity,
}

impl Theme {
    /// All themes in priority order
    pub const ALL: [Theme; 4] = [
        Theme::Wonder,
        Theme::Nostalgia,
        Theme::Progress,
        Theme::Identity,
    ];

    /// Position of this theme in [`Theme::ALL`]
    pub fn index(self) -> usize {
        match self {
            Theme::Wonder => 0,
            Theme::Nostalgia => 1,
            Theme::Progress => 2,
            Theme::Identity => 3,
        }
    }

    /// Lowercase label shown in insight text
    pub fn label(self) -> &'static str {
        match self {
            Theme::Wonder => "wonder",
            Theme::Nostalgia => "nostalgia",
            Theme::Progress => "progress",
            Theme::Identity => "identity",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Theme {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .ok_or_else(|| InsightError::ParseError(format!("unknown theme: {s}")))
    }
}

/// Normalized theme weights for a single text block
///
/// Weights are non-negative and sum to 1. A block with no keyword matches has
/// no profile at all rather than a zero profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThemeProfile {
    pub wonder: f64,
    pub nostalgia: f64,
    pub progress: f64,
    pub identity: f64,
}

impl ThemeProfile {
    /// Build a profile from raw per-theme match counts (indexed by [`Theme::index`]).
    ///
    /// Returns `None` when every count is zero.
    pub fn from_counts(counts: [u32; 4]) -> Option<Self> {
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return None;
        }
        let total = total as f64;
        Some(Self {
            wonder: counts[0] as f64 / total,
            nostalgia: counts[1] as f64 / total,
            progress: counts[2] as f64 / total,
            identity: counts[3] as f64 / total,
        })
    }

    /// Build a profile from explicit weights, checking they are finite,
    /// non-negative, and sum to 1
    pub fn from_weights(
        wonder: f64,
        nostalgia: f64,
        progress: f64,
        identity: f64,
    ) -> Result<Self, InsightError> {
        let weights = [wonder, nostalgia, progress, identity];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(InsightError::ParseError(format!(
                "theme weights must be finite and non-negative, got {weights:?}"
            )));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > PROFILE_SUM_TOLERANCE {
            return Err(InsightError::ParseError(format!(
                "theme weights must sum to 1, got {sum}"
            )));
        }
        Ok(Self {
            wonder,
            nostalgia,
            progress,
            identity,
        })
    }

    /// Weight for a single theme
    pub fn weight(&self, theme: Theme) -> f64 {
        match theme {
            Theme::Wonder => self.wonder,
            Theme::Nostalgia => self.nostalgia,
            Theme::Progress => self.progress,
            Theme::Identity => self.identity,
        }
    }

    /// Iterate `(theme, weight)` pairs in priority order
    pub fn iter(&self) -> impl Iterator<Item = (Theme, f64)> + '_ {
        Theme::ALL.into_iter().map(move |t| (t, self.weight(t)))
    }
}

const PROFILE_SUM_TOLERANCE: f64 = 1e-6;

impl<'de> Deserialize<'de> for ThemeProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Weights {
            wonder: f64,
            nostalgia: f64,
            progress: f64,
            identity: f64,
        }

        let w = Weights::deserialize(deserializer)?;
        Self::from_weights(w.wonder, w.nostalgia, w.progress, w.identity)
            .map_err(serde::de::Error::custom)
    }
}

/// Identifier of a text block, `p<index>` in document order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId(String);

impl BlockId {
    /// Identifier for the block at `index` in document order
    pub fn from_index(index: usize) -> Self {
        Self(format!("p{index}"))
    }

    /// Document-order index encoded in the identifier
    pub fn index(&self) -> usize {
        // Validated on construction
        self.0[1..].parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BlockId {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('p')
            .ok_or_else(|| InsightError::InvalidBlockId(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InsightError::InvalidBlockId(s.to_string()));
        }
        let index: usize = digits
            .parse()
            .map_err(|_| InsightError::InvalidBlockId(s.to_string()))?;
        Ok(Self::from_index(index))
    }
}

impl TryFrom<String> for BlockId {
    type Error = InsightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latest theme snapshot for a block: its profile and the dwell count at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParagraphThemeRecord {
    pub profile: ThemeProfile,
    pub dwell_count: u64,
}

/// Human-readable insight shown in the reading widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_serialization() {
        let json = serde_json::to_string(&Theme::Nostalgia).unwrap();
        assert_eq!(json, "\"nostalgia\"");

        let parsed: Theme = serde_json::from_str("\"identity\"").unwrap();
        assert_eq!(parsed, Theme::Identity);
    }

    #[test]
    fn test_theme_priority_order() {
        for (i, theme) in Theme::ALL.iter().enumerate() {
            assert_eq!(theme.index(), i);
        }
        assert!(Theme::Wonder < Theme::Identity);
        assert_eq!("progress".parse::<Theme>().unwrap(), Theme::Progress);
        assert!("awe".parse::<Theme>().is_err());
    }

    #[test]
    fn test_profile_from_counts() {
        assert!(ThemeProfile::from_counts([0, 0, 0, 0]).is_none());

        let profile = ThemeProfile::from_counts([1, 2, 0, 1]).unwrap();
        assert!((profile.wonder - 0.25).abs() < 1e-9);
        assert!((profile.nostalgia - 0.5).abs() < 1e-9);
        assert_eq!(profile.progress, 0.0);
        let sum: f64 = profile.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_block_id_format() {
        let id = BlockId::from_index(7);
        assert_eq!(id.as_str(), "p7");
        assert_eq!(id.index(), 7);

        assert_eq!("p12".parse::<BlockId>().unwrap(), BlockId::from_index(12));
        assert!("12".parse::<BlockId>().is_err());
        assert!("p".parse::<BlockId>().is_err());
        assert!("p-1".parse::<BlockId>().is_err());
        assert!("px".parse::<BlockId>().is_err());
    }

    #[test]
    fn test_block_id_serde() {
        let id: BlockId = serde_json::from_str("\"p3\"").unwrap();
        assert_eq!(id.index(), 3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p3\"");
        assert!(serde_json::from_str::<BlockId>("\"intro\"").is_err());
    }

    #[test]
    fn test_profile_deserialize_validates_weights() {
        let profile: ThemeProfile = serde_json::from_str(
            r#"{ "wonder": 0.25, "nostalgia": 0.25, "progress": 0.5, "identity": 0.0 }"#,
        )
        .unwrap();
        assert_eq!(profile, ThemeProfile::from_counts([1, 1, 2, 0]).unwrap());

        let unnormalized =
            r#"{ "wonder": 2.0, "nostalgia": 0.0, "progress": 0.0, "identity": 0.0 }"#;
        assert!(serde_json::from_str::<ThemeProfile>(unnormalized).is_err());

        let negative = r#"{ "wonder": 1.5, "nostalgia": -0.5, "progress": 0.0, "identity": 0.0 }"#;
        assert!(serde_json::from_str::<ThemeProfile>(negative).is_err());

        let round_trip = ThemeProfile::from_counts([1, 2, 0, 0]).unwrap();
        let json = serde_json::to_string(&round_trip).unwrap();
        assert_eq!(serde_json::from_str::<ThemeProfile>(&json).unwrap(), round_trip);
    }
}
