use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::types::Rect;

const MIN_SPACE: f64 = 0.04;
const MAX_SPACE: f64 = 0.35;
const SPACE_STEP: f64 = 0.01;
/// Minimum card width as a share of the area width
const MIN_CARD_RATIO: f64 = 0.4;

/// Overlapping full-height cards fanned out from the right.
#[derive(Debug, Clone)]
pub struct SpreadLayout {
    /// Offset between cards as a share of the area width
    space: f64,
}

impl SpreadLayout {
    pub fn new(space: f64) -> Self {
        Self {
            space: space.clamp(MIN_SPACE, MAX_SPACE),
        }
    }

    pub fn space(&self) -> f64 {
        self.space
    }
}

impl WindowsLayout for SpreadLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Spread
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        let n = tiles.len() as i32;
        if n == 0 {
            return;
        }

        let space_width = (area.width as f64 * self.space).floor() as i32;
        let min_card = MIN_CARD_RATIO * area.width as f64;
        let mut card_width = area.width - space_width * (n - 1);
        let mut fanned = n;
        // Past the minimum card width, the oldest cards stack on the left edge
        while (card_width as f64) < min_card && fanned > 1 {
            card_width += space_width;
            fanned -= 1;
        }

        for (i, tile) in tiles.iter_mut().enumerate() {
            let i = i as i32;
            let offset = if i < fanned { space_width * (fanned - i - 1) } else { 0 };
            tile.geometry = Rect::new(area.x + offset, area.y, card_width, area.height);
        }
    }

    fn execute_action(&mut self, action: &Action) -> LayoutResponse {
        match action {
            Action::DecreaseMasterAreaSize => {
                self.space = (self.space - SPACE_STEP).max(MIN_SPACE);
            }
            Action::IncreaseMasterAreaSize => {
                self.space = (self.space + SPACE_STEP).min(MAX_SPACE);
            }
            _ => return LayoutResponse::Fallthrough,
        }
        LayoutResponse::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    #[test]
    fn test_cards_fan_out() {
        let mut tiles = test_tiles(3);
        SpreadLayout::new(0.1).apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(200, 0, 800, 600));
        assert_eq!(tiles[1].geometry, Rect::new(100, 0, 800, 600));
        assert_eq!(tiles[2].geometry, Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_cards_keep_minimum_width() {
        let area = Rect::new(0, 0, 1000, 600);
        let mut tiles = test_tiles(12);
        SpreadLayout::new(0.1).apply(&mut tiles, area);
        for tile in &tiles {
            assert!(tile.geometry.width >= 400);
            assert!(area.includes(&tile.geometry));
        }
        assert_eq!(tiles[11].geometry.x, 0);
    }
}
