use super::utils::{adjust_area_half_weights, adjust_area_weights, split_area_half_weighted, split_area_weighted};
use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::driver::WindowId;
use crate::persist::LayoutState;
use crate::types::{Rect, RectDelta};

const MIN_MASTER_TILES: usize = 1;
const MAX_MASTER_TILES: usize = 10;
const MASTER_RATIO_STEP: f64 = 0.05;

/// Master column in the middle, stacks on both sides.
///
/// Tiles after the masters fill the right stack first (rounded up), the rest
/// go to the left stack.
#[derive(Debug, Clone)]
pub struct ThreeColumnLayout {
    master_ratio: f64,
    gap: i32,
    num_master: usize,
}

impl ThreeColumnLayout {
    pub fn new(master_ratio: f64, gap: i32, saved: LayoutState) -> Self {
        Self {
            master_ratio,
            gap,
            num_master: saved.num_master_tiles.clamp(MIN_MASTER_TILES, MAX_MASTER_TILES),
        }
    }

    pub fn num_master_tiles(&self) -> usize {
        self.num_master
    }

    pub fn master_ratio(&self) -> f64 {
        self.master_ratio
    }

    fn column_weights(&self) -> [f64; 3] {
        let side = (1.0 - self.master_ratio) / 2.0;
        [side, self.master_ratio, side]
    }

    /// Number of tiles in the right stack
    fn right_stack_len(&self, n: usize) -> usize {
        (n - self.num_master).div_ceil(2)
    }

    fn apply_column(&self, tiles: &mut [Tile], area: Rect) {
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        let rects = split_area_weighted(area, &weights, self.gap, false);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.geometry = rect;
        }
    }

    fn adjust_column(&self, tiles: &mut [Tile], area: Rect, basis: WindowId, delta: RectDelta) {
        let Some(index) = tiles.iter().position(|t| t.id == basis) else {
            return;
        };
        let n = tiles.len() as f64;
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        let adjusted = adjust_area_weights(area, &weights, self.gap, index, delta, false);
        for (tile, weight) in tiles.iter_mut().zip(adjusted) {
            tile.weight = weight * n;
        }
    }
}

impl WindowsLayout for ThreeColumnLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::ThreeColumn
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        let n = tiles.len();
        let m = self.num_master;

        if n <= m {
            self.apply_column(tiles, area);
        } else if n == m + 1 {
            let (master_area, stack_area) = split_area_half_weighted(area, self.master_ratio, self.gap, true);
            let (masters, stack) = tiles.split_at_mut(m);
            self.apply_column(masters, master_area);
            self.apply_column(stack, stack_area);
        } else {
            let columns = split_area_weighted(area, &self.column_weights(), self.gap, true);
            let right_len = self.right_stack_len(n);
            let (masters, rest) = tiles.split_at_mut(m);
            let (right, left) = rest.split_at_mut(right_len);
            self.apply_column(left, columns[0]);
            self.apply_column(masters, columns[1]);
            self.apply_column(right, columns[2]);
        }
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: WindowId, delta: RectDelta) -> bool {
        let Some(index) = tiles.iter().position(|t| t.id == basis) else {
            return false;
        };
        let n = tiles.len();
        let m = self.num_master;

        if n <= m {
            self.adjust_column(tiles, area, basis, delta);
        } else if n == m + 1 {
            let (master_area, stack_area) = split_area_half_weighted(area, self.master_ratio, self.gap, true);
            let on_master = index < m;
            let target = usize::from(!on_master);
            let ratio = adjust_area_half_weights(area, self.master_ratio, self.gap, target, delta, true);
            let (masters, stack) = tiles.split_at_mut(m);
            if on_master {
                self.adjust_column(masters, master_area, basis, delta);
            } else {
                self.adjust_column(stack, stack_area, basis, delta);
            }
            self.master_ratio = ratio.clamp(0.05, 0.95);
        } else {
            let weights = self.column_weights();
            let columns = split_area_weighted(area, &weights, self.gap, true);
            let right_len = self.right_stack_len(n);
            let column = if index < m {
                1
            } else if index < m + right_len {
                2
            } else {
                0
            };

            let adjusted = adjust_area_weights(area, &weights, self.gap, column, delta, true);
            let ratio = if column == 1 {
                adjusted[1]
            } else {
                1.0 - 2.0 * adjusted[column]
            };

            let (masters, rest) = tiles.split_at_mut(m);
            let (right, left) = rest.split_at_mut(right_len);
            match column {
                0 => self.adjust_column(left, columns[0], basis, delta),
                1 => self.adjust_column(masters, columns[1], basis, delta),
                _ => self.adjust_column(right, columns[2], basis, delta),
            }
            self.master_ratio = ratio.clamp(0.05, 0.95);
        }
        true
    }

    fn execute_action(&mut self, action: &Action) -> LayoutResponse {
        match action {
            Action::IncreaseMasterAreaWindowCount => {
                self.num_master = (self.num_master + 1).min(MAX_MASTER_TILES);
            }
            Action::DecreaseMasterAreaWindowCount => {
                self.num_master = self.num_master.saturating_sub(1).max(MIN_MASTER_TILES);
            }
            Action::IncreaseMasterAreaSize => {
                self.master_ratio = (self.master_ratio + MASTER_RATIO_STEP).clamp(0.05, 0.95);
            }
            Action::DecreaseMasterAreaSize => {
                self.master_ratio = (self.master_ratio - MASTER_RATIO_STEP).clamp(0.05, 0.95);
            }
            _ => return LayoutResponse::Fallthrough,
        }
        LayoutResponse::Handled
    }

    fn hint(&self) -> Option<String> {
        Some(self.num_master.to_string())
    }

    fn saved_state(&self) -> LayoutState {
        LayoutState {
            num_master_tiles: self.num_master,
            ..LayoutState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    fn layout() -> ThreeColumnLayout {
        ThreeColumnLayout::new(0.5, 0, LayoutState::default())
    }

    #[test]
    fn test_two_tiles_split_by_ratio() {
        let mut tiles = test_tiles(2);
        layout().apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 500, 600));
        assert_eq!(tiles[1].geometry, Rect::new(500, 0, 500, 600));
    }

    #[test]
    fn test_master_in_the_middle() {
        let mut tiles = test_tiles(4);
        layout().apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        // Master centred, tiles 2 and 3 on the right, tile 4 on the left
        assert_eq!(tiles[0].geometry, Rect::new(250, 0, 500, 600));
        assert_eq!(tiles[1].geometry, Rect::new(750, 0, 250, 300));
        assert_eq!(tiles[2].geometry, Rect::new(750, 300, 250, 300));
        assert_eq!(tiles[3].geometry, Rect::new(0, 0, 250, 600));
    }

    #[test]
    fn test_adjust_master_edge_changes_ratio() {
        let area = Rect::new(0, 0, 1000, 600);
        let mut layout = layout();
        let mut tiles = test_tiles(3);
        layout.apply(&mut tiles, area);
        let basis = tiles[0].id;
        assert!(layout.adjust(area, &mut tiles, basis, RectDelta::new(0, 50, 0, 0)));
        assert!((layout.master_ratio() - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_master_count_bounds() {
        let mut layout = layout();
        layout.execute_action(&Action::DecreaseMasterAreaWindowCount);
        assert_eq!(layout.num_master_tiles(), 1);
        for _ in 0..20 {
            layout.execute_action(&Action::IncreaseMasterAreaWindowCount);
        }
        assert_eq!(layout.num_master_tiles(), 10);
        assert_eq!(layout.saved_state().num_master_tiles, 10);
        assert_eq!(layout.hint().as_deref(), Some("10"));
    }
}
