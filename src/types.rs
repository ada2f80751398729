//! Shared geometry and direction types.
//!
//! These are plain values used by every other module: the window store,
//! the layouts, the engine and the snapshots handed out to callers.

use serde::{Deserialize, Serialize};

/// A rectangle on the integer plane.
///
/// Width and height are signed so that edge arithmetic (gaps, deltas,
/// re-centering) never needs casts; a well-formed rect has both >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn max_x(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn max_y(&self) -> i32 {
        self.y + self.height
    }

    /// Center X coordinate
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Center Y coordinate
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x(), self.center_y())
    }

    /// Shrink the rect by the given margin on each side.
    pub fn gap(&self, left: i32, right: i32, top: i32, bottom: i32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0),
            (self.height - top - bottom).max(0),
        )
    }

    /// Whether `other` lies entirely inside this rect.
    pub fn includes(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn includes_point(&self, (x, y): (i32, i32)) -> bool {
        self.x <= x && x < self.max_x() && self.y <= y && y < self.max_y()
    }

    /// Whether the two rects share a non-empty area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }
}

/// Per-edge deviation of an actual geometry from the intended one.
///
/// Positive values mean the edge moved outward (the window grew on that side).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectDelta {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl RectDelta {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self { left, right, top, bottom }
    }

    /// Delta that turns `basis` into `target`.
    pub fn from_rects(basis: &Rect, target: &Rect) -> Self {
        Self {
            left: basis.x - target.x,
            right: target.max_x() - basis.max_x(),
            top: basis.y - target.y,
            bottom: target.max_y() - basis.max_y(),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == RectDelta::default()
    }
}

/// Direction used for neighbor search and window movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Whether this direction moves along the vertical axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Whether searching in this direction walks toward larger coordinates.
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

/// Edge of a window that a resize grows or shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassDirection {
    North,
    South,
    East,
    West,
}

/// One step forward or backward through an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Forward,
    Backward,
}

impl Step {
    pub fn value(self) -> i32 {
        match self {
            Step::Forward => 1,
            Step::Backward => -1,
        }
    }

    pub fn invert(self) -> Step {
        match self {
            Step::Forward => Step::Backward,
            Step::Backward => Step::Forward,
        }
    }
}

/// Whether the open ranges `[a_start, a_end)` and `[b_start, b_end)` overlap.
pub fn overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Wrap a possibly negative index into `0..len`.
pub fn wrap_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    (((index % len) + len) % len) as usize
}
