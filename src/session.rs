//! Reading session replay
//!
//! A reading session is the article's blocks (text plus layout) and a log of scroll,
//! resize, and tick events. Replaying it drives the visibility tracker and the
//! insight engine exactly as the live page would, one event at a time.

use crate::config::InsightConfig;
use crate::dwell::DwellCounters;
use crate::engine::InsightEngine;
use crate::error::InsightError;
use crate::generator::ThemeTotals;
use crate::render::{ContainerSink, HtmlCardRenderer};
use crate::types::{BlockId, Insight, ParagraphThemeRecord};
use crate::visibility::{BlockLayout, Viewport, VisibilityTracker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on ticks synthesized for a log without tick events (a day at 1s)
pub const MAX_SYNTHESIZED_TICKS: u64 = 86_400;

/// One text block of the article, in document order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlock {
    pub text: String,
    /// Offset from the top of the page
    pub top: f64,
    pub height: f64,
}

/// Event in a reading session log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ReadingEvent {
    /// Page scrolled to `scroll_y`
    Scroll { at_ms: u64, scroll_y: f64 },
    /// Viewport height changed
    Resize { at_ms: u64, viewport_height: f64 },
    /// Periodic engagement sampling tick
    Tick { at_ms: u64 },
}

impl ReadingEvent {
    pub fn at_ms(&self) -> u64 {
        match self {
            ReadingEvent::Scroll { at_ms, .. }
            | ReadingEvent::Resize { at_ms, .. }
            | ReadingEvent::Tick { at_ms } => *at_ms,
        }
    }

    /// Layout changes sort ahead of ticks sharing a timestamp
    fn order_key(&self) -> (u64, u8) {
        match self {
            ReadingEvent::Scroll { at_ms, .. } | ReadingEvent::Resize { at_ms, .. } => (*at_ms, 0),
            ReadingEvent::Tick { at_ms } => (*at_ms, 1),
        }
    }
}

/// A recorded reading session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub viewport_height: f64,
    pub blocks: Vec<SessionBlock>,
    #[serde(default)]
    pub events: Vec<ReadingEvent>,
}

impl ReadingSession {
    /// Block identifiers in document order
    pub fn block_ids(&self) -> Vec<BlockId> {
        (0..self.blocks.len()).map(BlockId::from_index).collect()
    }

    fn validate(&self) -> Result<(), InsightError> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(InsightError::InvalidSession(format!(
                "viewport_height must be positive, got {}",
                self.viewport_height
            )));
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if !block.top.is_finite() || !block.height.is_finite() || block.height < 0.0 {
                return Err(InsightError::InvalidSession(format!(
                    "block p{index} has invalid layout (top {}, height {})",
                    block.top, block.height
                )));
            }
        }
        for event in &self.events {
            if let ReadingEvent::Resize {
                viewport_height, ..
            } = event
            {
                if !(viewport_height.is_finite() && *viewport_height > 0.0) {
                    return Err(InsightError::InvalidSession(format!(
                        "resize at {}ms has invalid viewport_height {viewport_height}",
                        event.at_ms()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parse a reading session JSON string
pub fn parse_session(json: &str) -> Result<ReadingSession, InsightError> {
    serde_json::from_str(json)
        .map_err(|e| InsightError::ParseError(format!("Failed to parse reading session: {}", e)))
}

/// Engine state and outputs after a full replay
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub block_count: usize,
    pub observations: u64,
    pub ticks: u64,
    /// Blocks in the order they faded in
    pub revealed: Vec<BlockId>,
    pub dwell: DwellCounters,
    pub records: BTreeMap<BlockId, ParagraphThemeRecord>,
    pub theme_totals: ThemeTotals,
    pub insights: Vec<Insight>,
    /// Last markup written to the insight container (empty if never rendered)
    pub markup: String,
}

/// Replay a session with an unseeded card renderer
pub fn replay_session(
    session: &ReadingSession,
    config: &InsightConfig,
) -> Result<ReplaySummary, InsightError> {
    replay_with_renderer(session, config, HtmlCardRenderer::new())
}

/// Replay a session, rendering cards with `renderer`.
///
/// An initial viewport at the top of the page is applied before the first event.
/// With `DwellSampling::PerTick`, crossings only report visibility and each tick
/// samples dwell and re-renders. If the log carries no tick events, ticks are
/// synthesized every `tick_interval_ms` up to the last event, and a log that would
/// need more than [`MAX_SYNTHESIZED_TICKS`] of them is rejected.
pub fn replay_with_renderer(
    session: &ReadingSession,
    config: &InsightConfig,
    renderer: HtmlCardRenderer,
) -> Result<ReplaySummary, InsightError> {
    config.validate()?;
    session.validate()?;

    let ids = session.block_ids();
    let texts: BTreeMap<&BlockId, &str> = ids
        .iter()
        .zip(&session.blocks)
        .map(|(id, block)| (id, block.text.as_str()))
        .collect();

    let layouts = session
        .blocks
        .iter()
        .enumerate()
        .map(|(i, b)| BlockLayout::new(i, b.top, b.height))
        .collect();
    let mut tracker = VisibilityTracker::new(
        layouts,
        config.observation_threshold,
        config.reveal_threshold,
    );
    let mut engine = InsightEngine::with_config(config.clone(), ContainerSink::default())
        .with_renderer(renderer);

    let events = scheduled_events(&session.events, config.tick_interval_ms)?;
    let mut viewport = Viewport::new(0.0, session.viewport_height);
    let mut revealed = Vec::new();
    let mut observations = 0u64;

    log::debug!(
        "replaying session {} ({} blocks, {} events)",
        session.session_id,
        ids.len(),
        events.len()
    );

    let initial = tracker.update(&viewport);
    revealed.extend(initial.revealed);
    observations += initial.observed.len() as u64;
    for id in &initial.observed {
        engine.observe_crossing(id)?;
    }

    for event in &events {
        match event {
            ReadingEvent::Scroll { scroll_y, .. } => viewport.scroll_y = *scroll_y,
            ReadingEvent::Resize {
                viewport_height, ..
            } => viewport.height = *viewport_height,
            ReadingEvent::Tick { .. } => {
                let visible = tracker.fully_visible(&viewport);
                let insights = engine.tick_sampling(
                    visible
                        .iter()
                        .filter_map(|id| texts.get(id).map(|text| (id, *text))),
                    tracker.intersecting(),
                )?;
                log::trace!("tick at {}ms: {} insights", event.at_ms(), insights.len());
                continue;
            }
        }

        let update = tracker.update(&viewport);
        revealed.extend(update.revealed);
        observations += update.observed.len() as u64;
        for id in &update.observed {
            engine.observe_crossing(id)?;
        }
    }

    let duration_ms = events.last().map(ReadingEvent::at_ms).unwrap_or(0);
    let insights = engine.generate_insights();
    let theme_totals = engine.theme_totals();
    let ticks = engine.tick_count();
    let dwell = engine.dwell().clone();
    let records = engine.records().clone();
    let markup = engine.into_sink().content().to_string();

    Ok(ReplaySummary {
        session_id: session.session_id.clone(),
        started_at: session.started_at,
        duration_ms,
        block_count: ids.len(),
        observations,
        ticks,
        revealed,
        dwell,
        records,
        theme_totals,
        insights,
        markup,
    })
}

/// Sort events by time, synthesizing periodic ticks when the log has none
fn scheduled_events(
    events: &[ReadingEvent],
    tick_interval_ms: u64,
) -> Result<Vec<ReadingEvent>, InsightError> {
    let mut scheduled = events.to_vec();

    let has_ticks = events
        .iter()
        .any(|e| matches!(e, ReadingEvent::Tick { .. }));
    if !has_ticks && tick_interval_ms > 0 {
        let last = events.iter().map(ReadingEvent::at_ms).max().unwrap_or(0);
        let count = last / tick_interval_ms;
        if count > MAX_SYNTHESIZED_TICKS {
            return Err(InsightError::InvalidSession(format!(
                "session spans {last}ms, which needs {count} ticks at {tick_interval_ms}ms \
                 (limit {MAX_SYNTHESIZED_TICKS}); include tick events in the log"
            )));
        }
        // k * interval <= last, so no overflow
        let synthesized = (1..=count).map(|k| ReadingEvent::Tick {
            at_ms: k * tick_interval_ms,
        });
        scheduled.extend(synthesized);
    }

    scheduled.sort_by_key(ReadingEvent::order_key);
    Ok(scheduled)
}
