//! Insight card rendering
//!
//! Turns insights into the widget's markup fragment and hands it to a render sink,
//! which replaces its previous content wholesale.

use crate::error::InsightError;
use crate::types::Insight;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;

/// Id of the container element the insight widget renders into
pub const INSIGHTS_CONTAINER_ID: &str = "insights-content";

/// Destination for rendered insight markup
pub trait RenderSink {
    /// Replace the sink's content with `markup`
    fn replace_content(&mut self, markup: &str) -> Result<(), InsightError>;
}

/// In-memory container element
#[derive(Debug, Clone)]
pub struct ContainerSink {
    container_id: String,
    attached: bool,
    content: String,
    renders: usize,
}

impl Default for ContainerSink {
    fn default() -> Self {
        Self::new(INSIGHTS_CONTAINER_ID)
    }
}

impl ContainerSink {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            attached: true,
            content: String::new(),
            renders: 0,
        }
    }

    /// A container that is missing from the document; every write fails
    pub fn detached(container_id: impl Into<String>) -> Self {
        Self {
            attached: false,
            ..Self::new(container_id)
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of successful replacements so far
    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl RenderSink for ContainerSink {
    fn replace_content(&mut self, markup: &str) -> Result<(), InsightError> {
        if !self.attached {
            return Err(InsightError::RenderError(format!(
                "container #{} not found",
                self.container_id
            )));
        }
        self.content.clear();
        self.content.push_str(markup);
        self.renders += 1;
        Ok(())
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn replace_content(&mut self, _markup: &str) -> Result<(), InsightError> {
        Ok(())
    }
}

/// Renders insights as `insight-card` elements.
///
/// Each card carries an engagement meter whose fill width is random decoration;
/// it carries no information about the insight.
#[derive(Debug, Clone)]
pub struct HtmlCardRenderer {
    rng: StdRng,
}

impl Default for HtmlCardRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlCardRenderer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Renderer with a reproducible meter fill sequence
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Render all insights into one fragment
    pub fn render(&mut self, insights: &[Insight]) -> String {
        let mut markup = String::new();
        for insight in insights {
            let fill: f64 = self.rng.gen_range(0.0..100.0);
            let _ = write!(
                markup,
                concat!(
                    "<div class=\"insight-card\">",
                    "<strong>{}</strong>",
                    "<p>{}</p>",
                    "<div class=\"engagement-meter\"><div class=\"meter-bar\">",
                    "<div class=\"meter-fill\" style=\"width: {:.1}%\"></div>",
                    "</div></div>",
                    "</div>"
                ),
                escape_html(&insight.title),
                escape_html(&insight.content),
                fill
            );
        }
        markup
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_insights() -> Vec<Insight> {
        vec![
            Insight {
                title: "Reading Pattern".to_string(),
                content: "Your reading shows strong engagement with wonder themes in the narrative."
                    .to_string(),
            },
            Insight {
                title: "Key Interest".to_string(),
                content: "You seem drawn to Bengaluru's inspiring scientific achievements"
                    .to_string(),
            },
        ]
    }

    #[test]
    fn test_one_card_per_insight() {
        let mut renderer = HtmlCardRenderer::with_seed(7);
        let markup = renderer.render(&sample_insights());

        assert_eq!(markup.matches("class=\"insight-card\"").count(), 2);
        assert_eq!(markup.matches("class=\"meter-fill\"").count(), 2);
        assert!(markup.contains("<strong>Key Interest</strong>"));
        assert!(markup.contains("Bengaluru&#39;s inspiring"));
    }

    #[test]
    fn test_meter_fill_within_range() {
        let mut renderer = HtmlCardRenderer::new();
        let markup = renderer.render(&sample_insights());

        for part in markup.split("width: ").skip(1) {
            let value: f64 = part.split('%').next().unwrap().parse().unwrap();
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_seeded_renderer_is_reproducible() {
        let a = HtmlCardRenderer::with_seed(42).render(&sample_insights());
        let b = HtmlCardRenderer::with_seed(42).render(&sample_insights());
        assert_eq!(a, b);
    }

    #[test]
    fn test_escapes_markup() {
        let insights = vec![Insight {
            title: "<b>".to_string(),
            content: "a & b".to_string(),
        }];
        let markup = HtmlCardRenderer::with_seed(1).render(&insights);
        assert!(markup.contains("<strong>&lt;b&gt;</strong>"));
        assert!(markup.contains("<p>a &amp; b</p>"));
    }

    #[test]
    fn test_container_replaces_content() {
        let mut sink = ContainerSink::default();
        sink.replace_content("first").unwrap();
        sink.replace_content("second").unwrap();
        assert_eq!(sink.content(), "second");
        assert_eq!(sink.render_count(), 2);
    }

    #[test]
    fn test_detached_container_fails() {
        let mut sink = ContainerSink::detached("missing");
        let err = sink.replace_content("x").unwrap_err();
        assert!(err.to_string().contains("#missing"));
        assert_eq!(sink.render_count(), 0);
    }
}
