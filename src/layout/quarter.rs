use super::{LayoutKind, Tile, WindowsLayout};
use crate::driver::WindowId;
use crate::state::WindowState;
use crate::types::{Rect, RectDelta};

const CAPACITY: usize = 4;
const MIN_SPLIT: f64 = 0.2;
const MAX_SPLIT: f64 = 0.8;

/// Up to four tiles in quadrants; extra tiles float on top.
#[derive(Debug, Clone)]
pub struct QuarterLayout {
    gap: i32,
    /// Width share of the left column
    vsplit: f64,
    /// Height share of the top-left tile
    lhsplit: f64,
    /// Height share of the top-right tile
    rhsplit: f64,
}

impl QuarterLayout {
    pub fn new(gap: i32) -> Self {
        Self {
            gap,
            vsplit: 0.5,
            lhsplit: 0.5,
            rhsplit: 0.5,
        }
    }

    pub fn splits(&self) -> (f64, f64, f64) {
        (self.vsplit, self.lhsplit, self.rhsplit)
    }
}

/// Move the boundary at `ratio` of `length` by `delta` units.
fn shift(ratio: f64, length: i32, delta: i32) -> f64 {
    if length <= 0 {
        return ratio;
    }
    let boundary = (length as f64 * ratio).floor();
    ((boundary + delta as f64) / length as f64).clamp(MIN_SPLIT, MAX_SPLIT)
}

impl WindowsLayout for QuarterLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Quarter
    }

    fn capacity(&self) -> Option<usize> {
        Some(CAPACITY)
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.state = if i < CAPACITY {
                WindowState::Tiled
            } else {
                WindowState::TiledAfloat
            };
        }

        let gap1 = self.gap / 2;
        let gap2 = self.gap - gap1;
        let left_width = (area.width as f64 * self.vsplit).floor() as i32;
        let right_width = area.width - left_width;
        let right_x = area.x + left_width;
        let right_top_height = (area.height as f64 * self.rhsplit).floor() as i32;
        let left_top_height = (area.height as f64 * self.lhsplit).floor() as i32;

        let left = Rect::new(area.x, area.y, left_width, area.height);
        let right = Rect::new(right_x, area.y, right_width, area.height);
        let right_top = Rect::new(right_x, area.y, right_width, right_top_height);
        let right_bottom = Rect::new(
            right_x,
            area.y + right_top_height,
            right_width,
            area.height - right_top_height,
        );

        let geometries = match tiles.len() {
            0 => Vec::new(),
            1 => vec![area],
            2 => vec![left.gap(0, gap1, 0, 0), right.gap(gap2, 0, 0, 0)],
            3 => vec![
                left.gap(0, gap1, 0, 0),
                right_top.gap(gap2, 0, 0, gap1),
                right_bottom.gap(gap2, 0, gap2, 0),
            ],
            _ => vec![
                Rect::new(area.x, area.y, left_width, left_top_height).gap(0, gap1, 0, gap1),
                right_top.gap(gap2, 0, 0, gap1),
                right_bottom.gap(gap2, 0, gap2, 0),
                Rect::new(
                    area.x,
                    area.y + left_top_height,
                    left_width,
                    area.height - left_top_height,
                )
                .gap(0, gap1, gap2, 0),
            ],
        };
        for (tile, geometry) in tiles.iter_mut().zip(geometries) {
            tile.geometry = geometry;
        }
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: WindowId, delta: RectDelta) -> bool {
        let n = tiles.len().min(CAPACITY);
        let Some(index) = tiles.iter().take(CAPACITY).position(|t| t.id == basis) else {
            return false;
        };
        if n < 2 {
            return false;
        }

        match index {
            0 | 3 if delta.right != 0 => self.vsplit = shift(self.vsplit, area.width, delta.right),
            1 | 2 if delta.left != 0 => self.vsplit = shift(self.vsplit, area.width, -delta.left),
            _ => {}
        }
        if n == 4 {
            match index {
                0 if delta.bottom != 0 => {
                    self.lhsplit = shift(self.lhsplit, area.height, delta.bottom)
                }
                3 if delta.top != 0 => self.lhsplit = shift(self.lhsplit, area.height, -delta.top),
                _ => {}
            }
        }
        if n >= 3 {
            match index {
                1 if delta.bottom != 0 => {
                    self.rhsplit = shift(self.rhsplit, area.height, delta.bottom)
                }
                2 if delta.top != 0 => self.rhsplit = shift(self.rhsplit, area.height, -delta.top),
                _ => {}
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 1000,
        height: 800,
    };

    #[test]
    fn test_four_quadrants() {
        let mut tiles = test_tiles(4);
        QuarterLayout::new(0).apply(&mut tiles, AREA);
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 500, 400));
        assert_eq!(tiles[1].geometry, Rect::new(500, 0, 500, 400));
        assert_eq!(tiles[2].geometry, Rect::new(500, 400, 500, 400));
        assert_eq!(tiles[3].geometry, Rect::new(0, 400, 500, 400));
    }

    #[test]
    fn test_overflow_tiles_float() {
        let mut tiles = test_tiles(6);
        QuarterLayout::new(0).apply(&mut tiles, AREA);
        assert!(tiles[..4].iter().all(|t| t.state == WindowState::Tiled));
        assert!(tiles[4..].iter().all(|t| t.state == WindowState::TiledAfloat));
        assert_eq!(tiles[5].geometry, Rect::default());
    }

    #[test]
    fn test_gaps_split_between_neighbours() {
        let mut tiles = test_tiles(3);
        QuarterLayout::new(9).apply(&mut tiles, AREA);
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 496, 800));
        assert_eq!(tiles[1].geometry, Rect::new(505, 0, 495, 396));
        assert_eq!(tiles[2].geometry, Rect::new(505, 405, 495, 395));
    }

    #[test]
    fn test_adjust_moves_splits_within_bounds() {
        let mut layout = QuarterLayout::new(0);
        let mut tiles = test_tiles(4);
        layout.apply(&mut tiles, AREA);

        let basis = tiles[0].id;
        assert!(layout.adjust(AREA, &mut tiles, basis, RectDelta::new(0, 100, 0, 80)));
        let (v, lh, rh) = layout.splits();
        assert!((v - 0.6).abs() < 1e-9);
        assert!((lh - 0.6).abs() < 1e-9);
        assert!((rh - 0.5).abs() < 1e-9);

        let basis = tiles[2].id;
        layout.adjust(AREA, &mut tiles, basis, RectDelta::new(900, 0, 0, 0));
        assert!((layout.splits().0 - MIN_SPLIT).abs() < 1e-9);
    }
}
