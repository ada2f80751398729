use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::types::Rect;

const MIN_SPACE: i32 = 16;
const MAX_SPACE: i32 = 160;
const SPACE_STEP: i32 = 8;

/// Cascading tiles, each one `space` pixels further down and left of the last.
#[derive(Debug, Clone)]
pub struct StairLayout {
    space: i32,
}

impl StairLayout {
    pub fn new(space: i32) -> Self {
        Self {
            space: space.clamp(MIN_SPACE, MAX_SPACE),
        }
    }

    pub fn space(&self) -> i32 {
        self.space
    }
}

impl WindowsLayout for StairLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Stair
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        let n = tiles.len() as i32;
        for (i, tile) in tiles.iter_mut().enumerate() {
            let i = i as i32;
            let dx = (self.space * (n - i - 1)).min(area.width);
            let dy = (self.space * i).min(area.height);
            tile.geometry = Rect::new(area.x + dx, area.y + dy, area.width - dx, area.height - dy);
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
    fn test_stair_steps() {
        let mut tiles = test_tiles(3);
        StairLayout::new(24).apply(&mut tiles, Rect::new(0, 0, 1000, 800));
        assert_eq!(tiles[0].geometry, Rect::new(48, 0, 952, 800));
        assert_eq!(tiles[1].geometry, Rect::new(24, 24, 976, 776));
        assert_eq!(tiles[2].geometry, Rect::new(0, 48, 1000, 752));
    }

    #[test]
    fn test_space_actions_are_clamped() {
        let mut layout = StairLayout::new(24);
        layout.execute_action(&Action::DecreaseMasterAreaSize);
        layout.execute_action(&Action::DecreaseMasterAreaSize);
        assert_eq!(layout.space(), 16);
        for _ in 0..30 {
            layout.execute_action(&Action::IncreaseMasterAreaSize);
        }
        assert_eq!(layout.space(), 160);
    }
}
