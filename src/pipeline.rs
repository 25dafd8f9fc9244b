//! Session pipeline orchestration
//!
//! Public entry points that take reading session JSON through parsing, replay,
//! and report encoding.

use crate::config::InsightConfig;
use crate::encoder::InsightReportEncoder;
use crate::error::InsightError;
use crate::render::HtmlCardRenderer;
use crate::session::{parse_session, replay_with_renderer, ReplaySummary};

/// Convert reading session JSON to an insight report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = session_to_report(session_json)?;
/// ```
pub fn session_to_report(session_json: String) -> Result<String, InsightError> {
    InsightProcessor::new().process(&session_json)
}

/// Processor reusing one configuration and report instance id across sessions
pub struct InsightProcessor {
    config: InsightConfig,
    encoder: InsightReportEncoder,
    render_seed: Option<u64>,
}

impl Default for InsightProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightProcessor {
    /// Create a processor with default configuration
    pub fn new() -> Self {
        Self {
            config: InsightConfig::default(),
            encoder: InsightReportEncoder::new(),
            render_seed: None,
        }
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: InsightConfig) -> Result<Self, InsightError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Use a fixed seed for the decorative meter fills
    pub fn with_render_seed(mut self, seed: u64) -> Self {
        self.render_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Replay a session and return the raw summary
    pub fn replay(&self, session_json: &str) -> Result<ReplaySummary, InsightError> {
        let session = parse_session(session_json)?;
        let renderer = match self.render_seed {
            Some(seed) => HtmlCardRenderer::with_seed(seed),
            None => HtmlCardRenderer::new(),
        };
        replay_with_renderer(&session, &self.config, renderer)
    }

    /// Replay a session and return the report JSON
    pub fn process(&self, session_json: &str) -> Result<String, InsightError> {
        let summary = self.replay(session_json)?;
        self.encoder.encode_to_json(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DwellSampling;

    fn sample_session_json() -> &'static str {
        r#"{
            "session_id": "sess-bengaluru",
            "started_at": "2024-03-02T09:00:00Z",
            "viewport_height": 800,
            "blocks": [
                { "text": "Generations of heritage, wisdom and tradition shaped the old town", "top": 0, "height": 300 },
                { "text": "Today its innovation and technology point to the future", "top": 400, "height": 300 },
                { "text": "Community festivals keep the culture alive", "top": 1200, "height": 300 }
            ],
            "events": [
                { "event_type": "scroll", "at_ms": 2500, "scroll_y": 900 },
                { "event_type": "scroll", "at_ms": 6000, "scroll_y": 900 }
            ]
        }"#
    }

    #[test]
    fn test_session_to_report_stateless() {
        let json = session_to_report(sample_session_json().to_string()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["report_version"], "1.0.0");
        assert_eq!(report["provenance"]["session_id"], "sess-bengaluru");
        assert_eq!(report["summary"]["ticks"], 6);
        assert_eq!(report["summary"]["observations"], 3);
        assert!(report["insights"].as_array().unwrap().len() == 2);
    }

    #[test]
    fn test_processor_reuses_instance_id() {
        let processor = InsightProcessor::new();
        let a: serde_json::Value =
            serde_json::from_str(&processor.process(sample_session_json()).unwrap()).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(&processor.process(sample_session_json()).unwrap()).unwrap();
        assert_eq!(a["producer"]["instance_id"], b["producer"]["instance_id"]);
        assert_eq!(a["insights"], b["insights"]);
    }

    #[test]
    fn test_seeded_markup_is_reproducible() {
        let processor = InsightProcessor::new().with_render_seed(5);
        let a = processor.replay(sample_session_json()).unwrap();
        let b = processor.replay(sample_session_json()).unwrap();
        assert!(!a.markup.is_empty());
        assert_eq!(a.markup, b.markup);
    }

    #[test]
    fn test_per_tick_config() {
        let config = InsightConfig {
            dwell_sampling: DwellSampling::PerTick,
            ..InsightConfig::default()
        };
        let processor = InsightProcessor::with_config(config).unwrap();
        let summary = processor.replay(sample_session_json()).unwrap();

        // p0 and p1 sampled at ticks 1s and 2s, p2 at ticks 3s..6s
        assert_eq!(summary.dwell.total(), 8);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = InsightConfig {
            tick_interval_ms: 0,
            ..InsightConfig::default()
        };
        assert!(InsightProcessor::with_config(config).is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(session_to_report("not valid json".to_string()).is_err());
    }
}
