//! Visibility tracking
//!
//! Geometry-driven stand-in for the page's intersection observers. Blocks are laid
//! out in page coordinates; each viewport update reports the blocks that crossed
//! the observation threshold (dwell path) and the blocks revealed for the first
//! time (fade-in path). The two paths use independent thresholds.

use crate::types::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vertical placement of a text block in page coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub id: BlockId,
    /// Distance from the top of the page
    pub top: f64,
    pub height: f64,
}

impl BlockLayout {
    pub fn new(index: usize, top: f64, height: f64) -> Self {
        Self {
            id: BlockId::from_index(index),
            top,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height.max(0.0)
    }

    /// Fraction of the block's height inside the viewport, in [0, 1]
    pub fn intersection_ratio(&self, viewport: &Viewport) -> f64 {
        let view_top = viewport.scroll_y;
        let view_bottom = viewport.bottom();

        if self.height <= 0.0 {
            let inside = self.top >= view_top && self.top <= view_bottom;
            return if inside { 1.0 } else { 0.0 };
        }

        let overlap = self.bottom().min(view_bottom) - self.top.max(view_top);
        (overlap / self.height).clamp(0.0, 1.0)
    }

    /// Whether the block lies entirely within the viewport
    pub fn is_fully_visible(&self, viewport: &Viewport) -> bool {
        let rel_top = self.top - viewport.scroll_y;
        let rel_bottom = self.bottom() - viewport.scroll_y;
        rel_top >= 0.0 && rel_bottom <= viewport.height
    }
}

/// Scroll position and height of the visible window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    pub fn bottom(&self) -> f64 {
        self.scroll_y + self.height
    }
}

/// Blocks that changed state during one viewport update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityUpdate {
    /// Crossed upward through the observation threshold
    pub observed: Vec<BlockId>,
    /// Intersecting for the first time
    pub revealed: Vec<BlockId>,
}

impl VisibilityUpdate {
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty() && self.revealed.is_empty()
    }
}

/// Threshold-crossing tracker over a fixed set of blocks
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    blocks: Vec<BlockLayout>,
    observation_threshold: f64,
    reveal_threshold: f64,
    intersecting: BTreeSet<BlockId>,
    revealed: BTreeSet<BlockId>,
}

impl VisibilityTracker {
    pub fn new(blocks: Vec<BlockLayout>, observation_threshold: f64, reveal_threshold: f64) -> Self {
        Self {
            blocks,
            observation_threshold,
            reveal_threshold,
            intersecting: BTreeSet::new(),
            revealed: BTreeSet::new(),
        }
    }

    pub fn blocks(&self) -> &[BlockLayout] {
        &self.blocks
    }

    /// Apply a new viewport and report crossings.
    ///
    /// A block already above the observation threshold is not reported again until
    /// it drops below and re-enters. Reveals are one-way.
    pub fn update(&mut self, viewport: &Viewport) -> VisibilityUpdate {
        let mut update = VisibilityUpdate::default();

        for block in &self.blocks {
            let ratio = block.intersection_ratio(viewport);

            if meets_threshold(ratio, self.observation_threshold) {
                if self.intersecting.insert(block.id.clone()) {
                    update.observed.push(block.id.clone());
                }
            } else {
                self.intersecting.remove(&block.id);
            }

            if meets_threshold(ratio, self.reveal_threshold) && self.revealed.insert(block.id.clone())
            {
                update.revealed.push(block.id.clone());
            }
        }

        if !update.is_empty() {
            log::trace!(
                "visibility update: observed={:?} revealed={:?}",
                update.observed,
                update.revealed
            );
        }

        update
    }

    /// Blocks currently at or above the observation threshold
    pub fn intersecting(&self) -> impl Iterator<Item = &BlockId> {
        self.intersecting.iter()
    }

    /// Blocks that have faded in so far
    pub fn revealed(&self) -> impl Iterator<Item = &BlockId> {
        self.revealed.iter()
    }

    /// Blocks lying entirely within `viewport`, in document order
    pub fn fully_visible(&self, viewport: &Viewport) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.is_fully_visible(viewport))
            .map(|b| b.id.clone())
            .collect()
    }
}

/// A zero threshold means "any intersection at all"
fn meets_threshold(ratio: f64, threshold: f64) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blocks() -> Vec<BlockLayout> {
        vec![
            BlockLayout::new(0, 0.0, 200.0),
            BlockLayout::new(1, 300.0, 200.0),
            BlockLayout::new(2, 900.0, 400.0),
        ]
    }

    #[test]
    fn test_intersection_ratio() {
        let block = BlockLayout::new(0, 100.0, 200.0);
        assert_eq!(block.intersection_ratio(&Viewport::new(0.0, 800.0)), 1.0);
        assert!((block.intersection_ratio(&Viewport::new(200.0, 800.0)) - 0.5).abs() < 1e-9);
        assert_eq!(block.intersection_ratio(&Viewport::new(400.0, 800.0)), 0.0);
    }

    #[test]
    fn test_fully_visible() {
        let tracker = VisibilityTracker::new(three_blocks(), 0.5, 0.0);
        let ids = tracker.fully_visible(&Viewport::new(0.0, 600.0));
        assert_eq!(ids, vec![BlockId::from_index(0), BlockId::from_index(1)]);

        // Partially scrolled past p0
        let ids = tracker.fully_visible(&Viewport::new(100.0, 600.0));
        assert_eq!(ids, vec![BlockId::from_index(1)]);
    }

    #[test]
    fn test_observation_fires_once_per_crossing() {
        let mut tracker = VisibilityTracker::new(three_blocks(), 0.5, 0.0);
        let viewport = Viewport::new(0.0, 600.0);

        let first = tracker.update(&viewport);
        assert_eq!(first.observed, vec![BlockId::from_index(0), BlockId::from_index(1)]);

        // Same viewport again: nothing crosses
        let second = tracker.update(&viewport);
        assert!(second.is_empty());

        // Scroll p0 out, then back in
        tracker.update(&Viewport::new(800.0, 600.0));
        let back = tracker.update(&viewport);
        assert_eq!(back.observed, vec![BlockId::from_index(0), BlockId::from_index(1)]);
    }

    #[test]
    fn test_reveal_uses_any_intersection_and_is_one_way() {
        let mut tracker = VisibilityTracker::new(three_blocks(), 0.5, 0.0);

        // p2 barely enters: 50 of 400 pixels visible
        let update = tracker.update(&Viewport::new(350.0, 600.0));
        assert!(update.revealed.contains(&BlockId::from_index(2)));
        assert!(!update.observed.contains(&BlockId::from_index(2)));

        tracker.update(&Viewport::new(5000.0, 600.0));
        let update = tracker.update(&Viewport::new(350.0, 600.0));
        assert!(update.revealed.is_empty());
        assert_eq!(tracker.revealed().count(), 2);
    }

    #[test]
    fn test_zero_height_block() {
        let block = BlockLayout::new(4, 50.0, 0.0);
        assert_eq!(block.intersection_ratio(&Viewport::new(0.0, 100.0)), 1.0);
        assert_eq!(block.intersection_ratio(&Viewport::new(60.0, 100.0)), 0.0);
    }
}
