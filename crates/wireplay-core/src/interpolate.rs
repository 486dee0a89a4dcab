//! Frame interpolation for a single step's motion.
//!
//! Pure math, no side effects. A [`FramePath`] samples the straight line
//! between two endpoint positions in `frame_count` increments.
//!
//! # Invariants
//!
//! - `at(0)` equals the origin position **exactly** and `at(frame_count)`
//!   equals the destination **exactly** (bit-for-bit, no floating residue).
//!   Interior frames may carry ordinary floating-point error.

/// A 2-D position in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Linear path from one endpoint position to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePath {
    from: Point,
    to: Point,
    frame_count: u32,
}

impl FramePath {
    /// Build a path sampled at `frame_count` increments (frames run
    /// `0..=frame_count`). A zero count is clamped to 1 so the token still
    /// departs and arrives.
    #[must_use]
    pub fn new(from: Point, to: Point, frame_count: u32) -> Self {
        Self { from, to, frame_count: frame_count.max(1) }
    }

    /// Number of motion increments; the last valid frame index.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Position at frame `index`.
    ///
    /// Indices at or beyond `frame_count` saturate to the destination, so a
    /// caller iterating `0..=frame_count` lands exactly on both ends.
    #[must_use]
    pub fn at(&self, index: u32) -> Point {
        if index == 0 {
            return self.from;
        }
        if index >= self.frame_count {
            return self.to;
        }

        let t = f64::from(index) / f64::from(self.frame_count);
        Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        )
    }

    /// Lazy, restartable iterator over `(index, position)` samples.
    pub fn frames(&self) -> impl Iterator<Item = (u32, Point)> + '_ {
        (0..=self.frame_count).map(|i| (i, self.at(i)))
    }
}
