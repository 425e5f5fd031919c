//! Discrete time-block grid.
//!
//! Validity windows are compared against the night through a fixed-granularity
//! grid of blocks. Block `b` covers `[origin + b / bpd, origin + (b + 1) / bpd)`
//! where `bpd` is the number of blocks per day.

use std::ops::Range;

use qtty::{Minute, Quantity};
use thiserror::Error;

use crate::units::{convert, night_start, Mjd};
use crate::window::ValidityWindow;

/// Index of a block on the grid.
pub type BlockIndex = i64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlockGridError {
    /// Block size was zero, negative or not finite
    #[error("Block size must be positive and finite, got {0} minutes")]
    InvalidBlockSize(f64),
}

/// Fixed-granularity grid mapping timestamps to block indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockGrid {
    origin: Mjd,
    block_size: Quantity<Minute>,
}

impl Default for BlockGrid {
    /// Twenty-minute blocks anchored at MJD 0.
    fn default() -> Self {
        Self {
            origin: Mjd::new(0.0),
            block_size: Quantity::new(20.0),
        }
    }
}

impl BlockGrid {
    pub fn new(origin: Mjd, block_size: Quantity<Minute>) -> Result<Self, BlockGridError> {
        let minutes = block_size.value();
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(BlockGridError::InvalidBlockSize(minutes));
        }
        Ok(Self { origin, block_size })
    }

    pub fn origin(&self) -> Mjd {
        self.origin
    }

    pub fn block_size(&self) -> Quantity<Minute> {
        self.block_size
    }

    pub fn blocks_per_day(&self) -> f64 {
        let day: Quantity<Minute> = convert(Mjd::new(1.0));
        day.value() / self.block_size.value()
    }

    /// Continuous grid coordinate of `t` (block units since origin).
    fn position(&self, t: Mjd) -> f64 {
        (t - self.origin).value() * self.blocks_per_day()
    }

    /// Block containing `t`.
    pub fn block_index(&self, t: Mjd) -> BlockIndex {
        self.position(t).floor() as BlockIndex
    }

    /// Start time of block `b`.
    pub fn block_start(&self, b: BlockIndex) -> Mjd {
        self.origin + Mjd::new(b as f64 / self.blocks_per_day())
    }

    /// Blocks making up the night containing `now`: `[block(floor(now)), block(floor(now) + 1))`.
    pub fn night_blocks(&self, now: Mjd) -> Range<BlockIndex> {
        let start = night_start(now);
        self.block_index(start)..self.block_index(start + Mjd::new(1.0))
    }

    /// Blocks touched by a half-open window.
    ///
    /// With `complete_only` only blocks lying entirely inside the window are
    /// returned; otherwise every block the window overlaps.
    pub fn window_blocks(&self, window: &ValidityWindow, complete_only: bool) -> Range<BlockIndex> {
        let lo = self.position(window.start());
        let hi = self.position(window.end());
        if complete_only {
            let first = lo.ceil() as BlockIndex;
            let last = hi.floor() as BlockIndex;
            first..last.max(first)
        } else {
            lo.floor() as BlockIndex..hi.ceil() as BlockIndex
        }
    }
}

/// Blocks common to both ranges; empty when they do not meet.
pub fn clamp_blocks(blocks: Range<BlockIndex>, to: &Range<BlockIndex>) -> Range<BlockIndex> {
    let start = blocks.start.max(to.start);
    let end = blocks.end.min(to.end);
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: f64, end: f64) -> ValidityWindow {
        ValidityWindow::from_mjd(start, end).unwrap()
    }

    #[test]
    fn test_default_grid_has_72_blocks_per_day() {
        let grid = BlockGrid::default();
        assert!((grid.blocks_per_day() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_block_size() {
        assert_eq!(
            BlockGrid::new(Mjd::new(0.0), Quantity::new(0.0)),
            Err(BlockGridError::InvalidBlockSize(0.0))
        );
        assert!(BlockGrid::new(Mjd::new(0.0), Quantity::new(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_block_index_on_boundaries() {
        let grid = BlockGrid::default();
        assert_eq!(grid.block_index(Mjd::new(59000.0)), 59000 * 72);
        assert_eq!(grid.block_index(Mjd::new(59000.25)), 59000 * 72 + 18);
        assert_eq!(grid.block_index(Mjd::new(59000.26)), 59000 * 72 + 18);
    }

    #[test]
    fn test_night_blocks_cover_one_day() {
        let grid = BlockGrid::default();
        let night = grid.night_blocks(Mjd::new(59000.6));
        assert_eq!(night.start, 59000 * 72);
        assert_eq!(night.end, 59001 * 72);
        assert_eq!(night.count(), 72);
    }

    #[test]
    fn test_aligned_window_complete_and_partial_agree() {
        let grid = BlockGrid::default();
        let win = w(59000.25, 59000.5);
        let complete = grid.window_blocks(&win, true);
        let all = grid.window_blocks(&win, false);
        assert_eq!(complete, all);
        assert_eq!(complete.count(), 18);
    }

    #[test]
    fn test_unaligned_window_partial_edges() {
        let grid = BlockGrid::default();
        // Starts and ends mid-block.
        let win = w(59000.26, 59000.49);
        let complete = grid.window_blocks(&win, true);
        let all = grid.window_blocks(&win, false);
        assert_eq!(all.start, 59000 * 72 + 18);
        assert_eq!(all.end, 59000 * 72 + 36);
        assert_eq!(complete.start, 59000 * 72 + 19);
        assert_eq!(complete.end, 59000 * 72 + 35);
    }

    #[test]
    fn test_clamp_blocks_intersects_ranges() {
        assert_eq!(clamp_blocks(10..20, &(15..30)), 15..20);
        assert_eq!(clamp_blocks(0..i64::MAX, &(15..30)), 15..30);
        assert!(clamp_blocks(0..5, &(15..30)).is_empty());
    }

    #[test]
    fn test_far_future_window_end_stays_a_range() {
        let grid = BlockGrid::default();
        let win = w(59000.25, 1.0e12);
        let blocks = grid.window_blocks(&win, true);
        assert_eq!(blocks.start, 59000 * 72 + 18);
        assert_eq!(blocks.end, 72_000_000_000_000);
    }

    #[test]
    fn test_window_shorter_than_a_block_has_no_complete_blocks() {
        let grid = BlockGrid::default();
        let win = w(59000.251, 59000.252);
        assert_eq!(grid.window_blocks(&win, true).count(), 0);
        assert_eq!(grid.window_blocks(&win, false).count(), 1);
    }
}
