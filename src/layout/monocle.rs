use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::types::{Direction, Rect, Step};

/// Every tile covers the whole area; only the focused one is meant to be seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonocleLayout;

impl WindowsLayout for MonocleLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Monocle
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        for tile in tiles.iter_mut() {
            tile.geometry = area;
        }
    }

    fn execute_action(&mut self, action: &Action) -> LayoutResponse {
        match action {
            Action::FocusDirection {
                direction: Direction::Up | Direction::Left,
            } => {
                LayoutResponse::FocusOrder(Step::Backward)
            }
            Action::FocusDirection {
                direction: Direction::Down | Direction::Right,
            } => {
                LayoutResponse::FocusOrder(Step::Forward)
            }
            _ => LayoutResponse::Fallthrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;
    use crate::state::WindowState;

    #[test]
    fn test_all_tiles_fill_area() {
        let area = Rect::new(5, 5, 800, 600);
        let mut tiles = test_tiles(4);
        tiles[2].state = WindowState::TiledAfloat;
        MonocleLayout.apply(&mut tiles, area);
        assert!(tiles.iter().all(|t| t.geometry == area && t.state == WindowState::Tiled));
    }

    #[test]
    fn test_directional_focus_becomes_order_focus() {
        let mut layout = MonocleLayout;
        assert_eq!(
            layout.execute_action(&Action::FocusDirection {
                direction: Direction::Left
            }),
            LayoutResponse::FocusOrder(Step::Backward)
        );
        assert_eq!(
            layout.execute_action(&Action::FocusDirection {
                direction: Direction::Down
            }),
            LayoutResponse::FocusOrder(Step::Forward)
        );
        assert_eq!(layout.execute_action(&Action::Rotate), LayoutResponse::Fallthrough);
    }
}
