use super::part::{Angle, HalfSplit, Part, PartId, PartTree, Stack};
use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::driver::WindowId;
use crate::persist::LayoutState;
use crate::types::{Rect, RectDelta};

const MAX_MASTER_TILES: usize = 10;
const MASTER_RATIO_STEP: f64 = 0.05;

/// Master area and stack, each a weighted stack of tiles.
#[derive(Debug)]
pub struct TileLayout {
    tree: PartTree,
    root: PartId,
    master: PartId,
    stack: PartId,
}

impl TileLayout {
    pub fn new(master_ratio: f64, gap: i32, saved: LayoutState) -> Self {
        let mut tree = PartTree::new();
        let angle = Angle::from_degrees(i32::from(saved.rotation));
        let stack_part = Stack {
            gap,
            horizontal: !angle.horizontal(),
            flipped: false,
        };
        let master = tree.insert(Part::Stack(stack_part));
        let stack = tree.insert(Part::Stack(stack_part));
        let root = tree.insert(Part::HalfSplit(HalfSplit {
            primary: master,
            secondary: stack,
            angle,
            gap,
            ratio: master_ratio,
            primary_size: saved.num_master_tiles.min(MAX_MASTER_TILES),
        }));
        Self {
            tree,
            root,
            master,
            stack,
        }
    }

    fn root(&self) -> HalfSplit {
        // The root is created in `new` and never removed
        self.tree.split(self.root).copied().unwrap_or(HalfSplit {
            primary: self.master,
            secondary: self.stack,
            angle: Angle::Deg0,
            gap: 0,
            ratio: 0.5,
            primary_size: 1,
        })
    }

    pub fn num_master_tiles(&self) -> usize {
        self.root().primary_size
    }

    pub fn master_ratio(&self) -> f64 {
        self.root().ratio
    }

    fn rotate(&mut self, degrees: i32) {
        let Some(root) = self.tree.split_mut(self.root) else {
            return;
        };
        root.angle = root.angle.rotate(degrees);
        let horizontal = !root.angle.horizontal();
        for id in [self.master, self.stack] {
            if let Some(stack) = self.tree.stack_mut(id) {
                stack.horizontal = horizontal;
            }
        }
    }
}

impl WindowsLayout for TileLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Tile
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        self.tree.apply(self.root, area, tiles);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: WindowId, delta: RectDelta) -> bool {
        self.tree.adjust(self.root, area, tiles, basis, delta);
        true
    }

    fn execute_action(&mut self, action: &Action) -> LayoutResponse {
        match action {
            Action::Rotate => self.rotate(90),
            Action::RotateReverse => self.rotate(-90),
            Action::RotatePart => {
                if let Some(master) = self.tree.stack_mut(self.master) {
                    master.flipped = !master.flipped;
                }
            }
            Action::IncreaseMasterAreaWindowCount
            | Action::DecreaseMasterAreaWindowCount
            | Action::IncreaseMasterAreaSize
            | Action::DecreaseMasterAreaSize => {
                let Some(root) = self.tree.split_mut(self.root) else {
                    return LayoutResponse::Fallthrough;
                };
                match action {
                    Action::IncreaseMasterAreaWindowCount => {
                        root.primary_size = (root.primary_size + 1).min(MAX_MASTER_TILES);
                    }
                    Action::DecreaseMasterAreaWindowCount => {
                        root.primary_size = root.primary_size.saturating_sub(1);
                    }
                    Action::IncreaseMasterAreaSize => {
                        root.ratio = (root.ratio + MASTER_RATIO_STEP).clamp(0.05, 0.95);
                    }
                    _ => {
                        root.ratio = (root.ratio - MASTER_RATIO_STEP).clamp(0.05, 0.95);
                    }
                }
            }
            _ => return LayoutResponse::Fallthrough,
        }
        LayoutResponse::Handled
    }

    fn hint(&self) -> Option<String> {
        Some(self.num_master_tiles().to_string())
    }

    fn saved_state(&self) -> LayoutState {
        let root = self.root();
        LayoutState {
            rotation: root.angle.degrees() as u16,
            num_master_tiles: root.primary_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    fn layout() -> TileLayout {
        TileLayout::new(0.5, 0, LayoutState::default())
    }

    #[test]
    fn test_master_and_stack() {
        let mut layout = layout();
        let mut tiles = test_tiles(3);
        layout.apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 500, 600));
        assert_eq!(tiles[1].geometry, Rect::new(500, 0, 500, 300));
        assert_eq!(tiles[2].geometry, Rect::new(500, 300, 500, 300));
    }

    #[test]
    fn test_master_count_actions() {
        let mut layout = layout();
        assert_eq!(layout.execute_action(&Action::IncreaseMasterAreaWindowCount), LayoutResponse::Handled);
        assert_eq!(layout.num_master_tiles(), 2);

        let mut tiles = test_tiles(3);
        layout.apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 500, 300));
        assert_eq!(tiles[1].geometry, Rect::new(0, 300, 500, 300));
        assert_eq!(tiles[2].geometry, Rect::new(500, 0, 500, 600));

        for _ in 0..5 {
            layout.execute_action(&Action::DecreaseMasterAreaWindowCount);
        }
        assert_eq!(layout.num_master_tiles(), 0);
        layout.apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 1000, 200));
    }

    #[test]
    fn test_master_size_actions_are_clamped() {
        let mut layout = layout();
        layout.execute_action(&Action::IncreaseMasterAreaSize);
        assert!((layout.master_ratio() - 0.55).abs() < 1e-9);
        for _ in 0..30 {
            layout.execute_action(&Action::DecreaseMasterAreaSize);
        }
        assert!((layout.master_ratio() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_swaps_stack_orientation() {
        let mut layout = layout();
        layout.execute_action(&Action::Rotate);
        assert_eq!(layout.saved_state().rotation, 90);

        let mut tiles = test_tiles(3);
        layout.apply(&mut tiles, Rect::new(0, 0, 1000, 600));
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 1000, 300));
        assert_eq!(tiles[1].geometry, Rect::new(0, 300, 500, 300));
        assert_eq!(tiles[2].geometry, Rect::new(500, 300, 500, 300));

        layout.execute_action(&Action::RotateReverse);
        layout.execute_action(&Action::RotateReverse);
        assert_eq!(layout.saved_state().rotation, 270);
    }

    #[test]
    fn test_restores_saved_state() {
        let layout = TileLayout::new(
            0.55,
            0,
            LayoutState {
                rotation: 180,
                num_master_tiles: 3,
            },
        );
        assert_eq!(layout.num_master_tiles(), 3);
        assert_eq!(layout.saved_state().rotation, 180);
    }

    #[test]
    fn test_unrelated_action_falls_through() {
        let mut layout = layout();
        assert_eq!(layout.execute_action(&Action::FocusNextWindow), LayoutResponse::Fallthrough);
    }
}
