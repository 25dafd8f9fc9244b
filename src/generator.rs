//! Insight generation
//!
//! Aggregates stored theme records into attention-weighted theme totals, ranks
//! them, and renders the "Reading Pattern" and "Key Interest" insights.

use crate::lexicon::KeywordLexicon;
use crate::types::{Insight, ParagraphThemeRecord, Theme};
use serde::{Deserialize, Serialize};

/// Title of the insight summarizing the leading themes
pub const READING_PATTERN_TITLE: &str = "Reading Pattern";

/// Title of the insight carrying the canned sentence for the top theme
pub const KEY_INTEREST_TITLE: &str = "Key Interest";

/// Attention-weighted sum of theme weights across all recorded blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeTotals {
    pub wonder: f64,
    pub nostalgia: f64,
    pub progress: f64,
    pub identity: f64,
}

impl ThemeTotals {
    pub fn get(&self, theme: Theme) -> f64 {
        match theme {
            Theme::Wonder => self.wonder,
            Theme::Nostalgia => self.nostalgia,
            Theme::Progress => self.progress,
            Theme::Identity => self.identity,
        }
    }

    fn add(&mut self, theme: Theme, value: f64) {
        let slot = match theme {
            Theme::Wonder => &mut self.wonder,
            Theme::Nostalgia => &mut self.nostalgia,
            Theme::Progress => &mut self.progress,
            Theme::Identity => &mut self.identity,
        };
        *slot += value;
    }

    /// Themes sorted by total, descending.
    ///
    /// The sort is stable over [`Theme::ALL`], so equal totals keep priority order.
    pub fn ranked(&self) -> Vec<(Theme, f64)> {
        let mut ranked: Vec<(Theme, f64)> = Theme::ALL.iter().map(|t| (*t, self.get(*t))).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn has_signal(&self) -> bool {
        Theme::ALL.iter().any(|t| self.get(*t) > 0.0)
    }
}

/// Sum `profile[theme] * dwell_count` over all records
pub fn aggregate<'a, I>(records: I) -> ThemeTotals
where
    I: IntoIterator<Item = &'a ParagraphThemeRecord>,
{
    let mut totals = ThemeTotals::default();
    for record in records {
        let attention = record.dwell_count as f64;
        for (theme, weight) in record.profile.iter() {
            totals.add(theme, weight * attention);
        }
    }
    totals
}

/// Build insights from aggregated totals.
///
/// Empty when no theme has a non-zero total. The secondary theme is only named
/// when it carries some weight of its own.
pub fn insights_from_totals(totals: &ThemeTotals) -> Vec<Insight> {
    if !totals.has_signal() {
        return Vec::new();
    }

    let ranked = totals.ranked();
    let primary = ranked[0].0;
    let secondary = ranked.get(1).filter(|(_, total)| *total > 0.0).map(|(t, _)| *t);

    let themes = match secondary {
        Some(secondary) => format!("{primary} and {secondary}"),
        None => primary.to_string(),
    };

    vec![
        Insight {
            title: READING_PATTERN_TITLE.to_string(),
            content: format!(
                "Your reading shows strong engagement with {themes} themes in the narrative."
            ),
        },
        Insight {
            title: KEY_INTEREST_TITLE.to_string(),
            content: KeywordLexicon::interest_sentence(primary).to_string(),
        },
    ]
}

/// Aggregate records and build insights in one step
pub fn generate_insights<'a, I>(records: I) -> Vec<Insight>
where
    I: IntoIterator<Item = &'a ParagraphThemeRecord>,
{
    insights_from_totals(&aggregate(records))
}
