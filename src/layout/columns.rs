use super::utils::{adjust_area_weights, split_area_weighted};
use super::{tile_all, LayoutKind, Tile, WindowsLayout};
use crate::driver::WindowId;
use crate::types::{Rect, RectDelta};

/// One full-height column per tile, widths proportional to the tile weights.
#[derive(Debug, Clone)]
pub struct ColumnsLayout {
    gap: i32,
}

impl ColumnsLayout {
    pub fn new(gap: i32) -> Self {
        Self { gap }
    }
}

impl WindowsLayout for ColumnsLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Columns
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        let rects = split_area_weighted(area, &weights, self.gap, true);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.geometry = rect;
        }
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: WindowId, delta: RectDelta) -> bool {
        let Some(index) = tiles.iter().position(|t| t.id == basis) else {
            return false;
        };
        let n = tiles.len() as f64;
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        let adjusted = adjust_area_weights(area, &weights, self.gap, index, delta, true);
        for (tile, weight) in tiles.iter_mut().zip(adjusted) {
            tile.weight = weight * n;
        }
        true
    }
}
