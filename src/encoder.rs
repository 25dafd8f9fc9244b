//! Insight report encoder
//!
//! Encodes a replayed reading session into a JSON report carrying producer
//! metadata, per-block dwell and theme data, theme totals, and the insights.

use crate::error::InsightError;
use crate::generator::ThemeTotals;
use crate::session::ReplaySummary;
use crate::types::{BlockId, Insight, Theme, ThemeProfile};
use crate::{INSIGHT_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub session_id: String,
    pub started_at_utc: String,
    pub computed_at_utc: String,
}

/// Session-level counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub duration_ms: u64,
    pub blocks: usize,
    pub observations: u64,
    pub ticks: u64,
    pub total_dwell: u64,
    pub revealed_blocks: Vec<BlockId>,
}

/// Per-block dwell and latest theme profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockReport {
    pub block_id: BlockId,
    pub dwell_count: u64,
    /// Dwell count captured with the profile; may lag `dwell_count`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiled_at_dwell: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ThemeProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub summary: ReportSummary,
    pub theme_totals: ThemeTotals,
    /// Themes with non-zero totals, strongest first
    pub ranked_themes: Vec<Theme>,
    pub blocks: Vec<BlockReport>,
    pub insights: Vec<Insight>,
}

/// Insight report encoder
pub struct InsightReportEncoder {
    instance_id: String,
}

impl Default for InsightReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a replay summary into a report
    pub fn encode(&self, summary: &ReplaySummary) -> InsightReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: INSIGHT_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            session_id: summary.session_id.clone(),
            started_at_utc: summary.started_at.to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let report_summary = ReportSummary {
            duration_ms: summary.duration_ms,
            blocks: summary.block_count,
            observations: summary.observations,
            ticks: summary.ticks,
            total_dwell: summary.dwell.total(),
            revealed_blocks: summary.revealed.clone(),
        };

        let ranked_themes = summary
            .theme_totals
            .ranked()
            .into_iter()
            .filter(|(_, total)| *total > 0.0)
            .map(|(theme, _)| theme)
            .collect();

        InsightReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            summary: report_summary,
            theme_totals: summary.theme_totals,
            ranked_themes,
            blocks: self.build_blocks(summary),
            insights: summary.insights.clone(),
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(&self, summary: &ReplaySummary) -> Result<String, InsightError> {
        let report = self.encode(summary);
        serde_json::to_string_pretty(&report).map_err(InsightError::JsonError)
    }

    /// Blocks that were observed or profiled, in document order
    fn build_blocks(&self, summary: &ReplaySummary) -> Vec<BlockReport> {
        (0..summary.block_count)
            .map(BlockId::from_index)
            .filter_map(|id| {
                let dwell_count = summary.dwell.get(&id);
                let record = summary.records.get(&id);
                if dwell_count == 0 && record.is_none() {
                    return None;
                }
                Some(BlockReport {
                    dwell_count,
                    profiled_at_dwell: record.map(|r| r.dwell_count),
                    profile: record.map(|r| r.profile),
                    block_id: id,
                })
            })
            .collect()
    }
}
