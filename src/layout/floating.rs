use super::{LayoutKind, Tile, WindowsLayout};
use crate::state::WindowState;
use crate::types::Rect;

/// Leaves every tile where the user put it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingLayout;

impl WindowsLayout for FloatingLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Floating
    }

    fn apply(&mut self, tiles: &mut [Tile], _area: Rect) {
        for tile in tiles.iter_mut() {
            tile.state = WindowState::TiledAfloat;
        }
    }
}
