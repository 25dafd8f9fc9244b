//! Reading Insight - engagement insights for long-form articles
//!
//! Tracks which text blocks a reader dwells on, classifies each block against a
//! small theme lexicon, and turns the attention-weighted theme mix into
//! human-readable insights: visibility tracking → dwell counting → theme
//! classification → aggregation → insight rendering.
//!
//! ## Modules
//!
//! - **Engine**: [`InsightEngine`] owns all reading state and drives a render sink
//! - **Session replay**: replay a recorded reading session into an insight report

pub mod classifier;
pub mod config;
pub mod dwell;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod generator;
pub mod lexicon;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod types;
pub mod visibility;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::{classify, ThemeClassifier};
pub use config::{DwellSampling, InsightConfig};
pub use engine::InsightEngine;
pub use error::InsightError;
pub use pipeline::{session_to_report, InsightProcessor};
pub use types::{BlockId, Insight, ParagraphThemeRecord, Theme, ThemeProfile};

/// Crate version embedded in all reports
pub const INSIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "reading-insight";
