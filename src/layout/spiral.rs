use super::part::{Angle, HalfSplit, Part, PartId, PartTree};
use super::{tile_all, LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::action::Action;
use crate::driver::WindowId;
use crate::persist::LayoutState;
use crate::types::{Rect, RectDelta};

/// A chain of half-splits, one level per tile, each turned a quarter further.
///
/// Only the root follows the rotate actions; deeper levels keep their
/// fixed angles so the spiral keeps its shape.
#[derive(Debug)]
pub struct SpiralLayout {
    tree: PartTree,
    root: PartId,
    depth: usize,
    gap: i32,
}

impl SpiralLayout {
    pub fn new(gap: i32, saved: LayoutState) -> Self {
        let mut tree = PartTree::new();
        let primary = tree.insert(Part::Fill);
        let secondary = tree.insert(Part::Fill);
        let root = tree.insert(Part::HalfSplit(HalfSplit {
            primary,
            secondary,
            angle: Angle::from_degrees(i32::from(saved.rotation)),
            gap,
            ratio: 0.5,
            primary_size: 1,
        }));
        Self {
            tree,
            root,
            depth: 1,
            gap,
        }
    }

    /// Number of half-splits in the chain
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Grow the chain until it has room for `depth` tiles.
    fn bore(&mut self, depth: usize) {
        if self.depth >= depth {
            return;
        }

        let mut deepest = self.root;
        for _ in 0..self.depth - 1 {
            match self.tree.split(deepest) {
                Some(split) => deepest = split.secondary,
                None => return,
            }
        }

        let mut i = self.depth - 1;
        while i < depth - 1 {
            let Some(last_fill) = self.tree.split(deepest).map(|s| s.secondary) else {
                return;
            };
            let primary = self.tree.insert(Part::Fill);
            let next = self.tree.insert(Part::HalfSplit(HalfSplit {
                primary,
                secondary: last_fill,
                angle: Angle::from_degrees(((i + 1) % 4) as i32 * 90),
                gap: self.gap,
                ratio: 0.5,
                primary_size: 1,
            }));
            if let Some(split) = self.tree.split_mut(deepest) {
                split.secondary = next;
            }
            deepest = next;
            i += 1;
        }
        log::debug!("Spiral bored to depth {}", depth);
        self.depth = depth;
    }

    fn rotate(&mut self, degrees: i32) {
        if let Some(root) = self.tree.split_mut(self.root) {
            root.angle = root.angle.rotate(degrees);
        }
    }

    fn angle(&self) -> Angle {
        self.tree.split(self.root).map_or(Angle::Deg0, |s| s.angle)
    }
}

impl WindowsLayout for SpiralLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Spiral
    }

    fn apply(&mut self, tiles: &mut [Tile], area: Rect) {
        tile_all(tiles);
        self.bore(tiles.len());
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
            _ => return LayoutResponse::Fallthrough,
        }
        LayoutResponse::Handled
    }

    fn saved_state(&self) -> LayoutState {
        LayoutState {
            rotation: self.angle().degrees() as u16,
            ..LayoutState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    #[test]
    fn test_spiral_growth() {
        let area = Rect::new(0, 0, 1200, 800);
        let mut layout = SpiralLayout::new(0, LayoutState::default());

        let mut tiles = test_tiles(1);
        layout.apply(&mut tiles, area);
        assert_eq!(tiles[0].geometry, area);

        let mut tiles = test_tiles(3);
        layout.apply(&mut tiles, area);
        assert_eq!(layout.depth(), 3);
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 600, 800));
        assert_eq!(tiles[1].geometry, Rect::new(600, 0, 600, 400));
        assert_eq!(tiles[2].geometry, Rect::new(600, 400, 600, 400));

        let mut tiles = test_tiles(4);
        layout.apply(&mut tiles, area);
        // Third level puts its primary on the right
        assert_eq!(tiles[2].geometry, Rect::new(900, 400, 300, 400));
        assert_eq!(tiles[3].geometry, Rect::new(600, 400, 300, 400));
    }

    #[test]
    fn test_bore_never_shrinks() {
        let area = Rect::new(0, 0, 1200, 800);
        let mut layout = SpiralLayout::new(0, LayoutState::default());
        let mut tiles = test_tiles(5);
        layout.apply(&mut tiles, area);
        let parts = layout.tree.len();
        let mut tiles = test_tiles(2);
        layout.apply(&mut tiles, area);
        assert_eq!(layout.depth(), 5);
        assert_eq!(layout.tree.len(), parts);
        assert_eq!(tiles[1].geometry, Rect::new(600, 0, 600, 800));
    }

    #[test]
    fn test_rotation_is_saved() {
        let mut layout = SpiralLayout::new(0, LayoutState::default());
        assert_eq!(layout.execute_action(&Action::RotateReverse), LayoutResponse::Handled);
        assert_eq!(layout.saved_state().rotation, 270);

        let restored = SpiralLayout::new(0, layout.saved_state());
        assert_eq!(restored.angle(), Angle::Deg270);
    }
}
