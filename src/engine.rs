//! Insight engine
//!
//! Single owner of all mutable reading state: dwell counters and the latest theme
//! record per block. Visibility callbacks and the periodic tick both go through
//! `&mut InsightEngine`, so there is exactly one writer at a time.

use crate::classifier::ThemeClassifier;
use crate::config::{DwellSampling, InsightConfig};
use crate::dwell::DwellCounters;
use crate::error::InsightError;
use crate::generator::{self, ThemeTotals};
use crate::render::{HtmlCardRenderer, RenderSink};
use crate::types::{BlockId, Insight, ParagraphThemeRecord, ThemeProfile};
use std::collections::BTreeMap;

/// Stateful engagement insight generator driving a render sink
pub struct InsightEngine<S: RenderSink> {
    config: InsightConfig,
    classifier: ThemeClassifier,
    dwell: DwellCounters,
    records: BTreeMap<BlockId, ParagraphThemeRecord>,
    renderer: HtmlCardRenderer,
    sink: S,
    ticks: u64,
}

impl<S: RenderSink> InsightEngine<S> {
    /// Create an engine with default configuration
    pub fn new(sink: S) -> Self {
        Self::with_config(InsightConfig::default(), sink)
    }

    pub fn with_config(config: InsightConfig, sink: S) -> Self {
        Self {
            config,
            classifier: ThemeClassifier::default(),
            dwell: DwellCounters::new(),
            records: BTreeMap::new(),
            renderer: HtmlCardRenderer::new(),
            sink,
            ticks: 0,
        }
    }

    /// Replace the classifier (e.g. with a custom lexicon)
    pub fn with_classifier(mut self, classifier: ThemeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the card renderer (e.g. with a seeded one)
    pub fn with_renderer(mut self, renderer: HtmlCardRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Classify a text block without touching engine state
    pub fn classify(&self, text: &str) -> Option<ThemeProfile> {
        self.classifier.classify(text)
    }

    /// Count one observation of `id` and refresh the insight display.
    ///
    /// Every observation re-renders from all stored records, not just this block's.
    pub fn record_observation(&mut self, id: &BlockId) -> Result<(), InsightError> {
        let count = self.dwell.record(id);
        log::debug!("observed {id} (dwell {count})");
        self.update_display()
    }

    /// Count one dwell sample for each id without re-rendering
    pub fn sample_dwell<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a BlockId>,
    {
        for id in ids {
            self.dwell.record(id);
        }
    }

    /// Re-classify the blocks currently on screen and overwrite their records.
    ///
    /// Blocks without any theme signal leave their previous record untouched, as do
    /// blocks that are no longer on screen.
    pub fn refresh_profiles<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = (&'a BlockId, &'a str)>,
    {
        for (id, text) in visible {
            if let Some(profile) = self.classifier.classify(text) {
                let dwell_count = self.dwell.get(id);
                log::trace!("refreshed {id}: {profile:?} at dwell {dwell_count}");
                self.records.insert(
                    id.clone(),
                    ParagraphThemeRecord {
                        profile,
                        dwell_count,
                    },
                );
            }
        }
    }

    /// Insights from the current records; empty until some themed block has dwell
    pub fn generate_insights(&self) -> Vec<Insight> {
        generator::generate_insights(self.records.values())
    }

    /// Crossing notification from the visibility tracker.
    ///
    /// Under `DwellSampling::OnCrossing` this is [`Self::record_observation`]. Under
    /// `PerTick` dwell is sampled at ticks instead and the crossing is not counted.
    /// Returns whether the crossing was counted.
    pub fn observe_crossing(&mut self, id: &BlockId) -> Result<bool, InsightError> {
        match self.config.dwell_sampling {
            DwellSampling::OnCrossing => {
                self.record_observation(id)?;
                Ok(true)
            }
            DwellSampling::PerTick => Ok(false),
        }
    }

    /// Periodic tick: refresh visible profiles, then generate insights.
    ///
    /// Under `DwellSampling::PerTick` every visible block also gets one dwell sample.
    /// Use [`Self::tick_sampling`] when the blocks above the observation threshold
    /// differ from the fully visible ones.
    pub fn tick<'a, I>(&mut self, visible: I) -> Result<Vec<Insight>, InsightError>
    where
        I: IntoIterator<Item = (&'a BlockId, &'a str)>,
    {
        let visible: Vec<(&BlockId, &str)> = visible.into_iter().collect();
        let sampled: Vec<&BlockId> = visible.iter().map(|(id, _)| *id).collect();
        self.tick_sampling(visible, sampled)
    }

    /// Periodic tick with an explicit set of blocks at or above the observation
    /// threshold.
    ///
    /// `in_view` is only read under `DwellSampling::PerTick`, where each of those
    /// blocks gets one dwell sample before the refresh and the display re-renders
    /// afterwards. Under `OnCrossing` ticks never render.
    pub fn tick_sampling<'a, 'b, V, I>(
        &mut self,
        visible: V,
        in_view: I,
    ) -> Result<Vec<Insight>, InsightError>
    where
        V: IntoIterator<Item = (&'a BlockId, &'a str)>,
        I: IntoIterator<Item = &'b BlockId>,
    {
        self.ticks += 1;
        let per_tick = self.config.dwell_sampling == DwellSampling::PerTick;
        if per_tick {
            self.sample_dwell(in_view);
        }
        self.refresh_profiles(visible);

        let insights = self.generate_insights();
        if per_tick {
            self.render(&insights)?;
        }
        Ok(insights)
    }

    /// Render current insights into the sink.
    ///
    /// With no insights the sink keeps whatever it showed before.
    pub fn update_display(&mut self) -> Result<(), InsightError> {
        let insights = self.generate_insights();
        self.render(&insights)
    }

    fn render(&mut self, insights: &[Insight]) -> Result<(), InsightError> {
        if insights.is_empty() {
            return Ok(());
        }
        let markup = self.renderer.render(insights);
        log::debug!("rendering {} insight cards", insights.len());
        self.sink.replace_content(&markup)
    }

    /// Attention-weighted theme totals across all records
    pub fn theme_totals(&self) -> ThemeTotals {
        generator::aggregate(self.records.values())
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn dwell(&self) -> &DwellCounters {
        &self.dwell
    }

    pub fn records(&self) -> &BTreeMap<BlockId, ParagraphThemeRecord> {
        &self.records
    }

    pub fn record(&self, id: &BlockId) -> Option<&ParagraphThemeRecord> {
        self.records.get(id)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
