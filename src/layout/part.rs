//! Split tree for recursive layouts.
//!
//! The tree is stored in an arena:
//! - Leaf parts are `Fill` (every tile gets the whole area) or `Stack`
//!   (tiles share the area in weighted rows or columns)
//! - Internal parts are half-splits giving `primary_size` tiles to the
//!   primary child and the rest to the secondary child
//!
//! Children are arena keys, so growing the tree or changing a ratio in place
//! never fights the borrow checker.

use slotmap::{new_key_type, SlotMap};

use super::utils;
use super::Tile;
use crate::driver::WindowId;
use crate::types::{Rect, RectDelta};

new_key_type! {
    /// Unique identifier for a part in the split tree
    pub struct PartId;
}

/// Orientation and primary side of a half-split, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angle {
    /// Primary on the left
    Deg0,
    /// Primary on top
    Deg90,
    /// Primary on the right
    Deg180,
    /// Primary at the bottom
    Deg270,
}

impl Angle {
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Angle::Deg90,
            180 => Angle::Deg180,
            270 => Angle::Deg270,
            _ => Angle::Deg0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Angle::Deg0 => 0,
            Angle::Deg90 => 90,
            Angle::Deg180 => 180,
            Angle::Deg270 => 270,
        }
    }

    pub fn rotate(self, degrees: i32) -> Self {
        Angle::from_degrees(self.degrees() + degrees)
    }

    /// Children side by side
    pub fn horizontal(self) -> bool {
        matches!(self, Angle::Deg0 | Angle::Deg180)
    }

    /// Primary child takes the far side
    pub fn reversed(self) -> bool {
        matches!(self, Angle::Deg180 | Angle::Deg270)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HalfSplit {
    pub primary: PartId,
    pub secondary: PartId,
    pub angle: Angle,
    pub gap: i32,
    /// Share of the area given to the primary child, in (0, 1)
    pub ratio: f64,
    /// Number of tiles the primary child takes
    pub primary_size: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Stack {
    pub gap: i32,
    /// Tiles side by side instead of stacked
    pub horizontal: bool,
    /// Tiles laid out in reverse order
    pub flipped: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum Part {
    Fill,
    Stack(Stack),
    HalfSplit(HalfSplit),
}

#[derive(Debug, Default)]
pub struct PartTree {
    parts: SlotMap<PartId, Part>,
}

impl PartTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: Part) -> PartId {
        self.parts.insert(part)
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id)
    }

    pub fn get_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id)
    }

    pub fn split(&self, id: PartId) -> Option<&HalfSplit> {
        match self.parts.get(id) {
            Some(Part::HalfSplit(split)) => Some(split),
            _ => None,
        }
    }

    pub fn split_mut(&mut self, id: PartId) -> Option<&mut HalfSplit> {
        match self.parts.get_mut(id) {
            Some(Part::HalfSplit(split)) => Some(split),
            _ => None,
        }
    }

    pub fn stack_mut(&mut self, id: PartId) -> Option<&mut Stack> {
        match self.parts.get_mut(id) {
            Some(Part::Stack(stack)) => Some(stack),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Lay out `tiles` inside `area`, writing each tile's geometry.
    pub fn apply(&self, id: PartId, area: Rect, tiles: &mut [Tile]) {
        match self.parts.get(id) {
            Some(Part::Fill) => {
                for tile in tiles.iter_mut() {
                    tile.geometry = area;
                }
            }
            Some(Part::Stack(stack)) => apply_stack(stack, area, tiles),
            Some(Part::HalfSplit(split)) => {
                let split = *split;
                if tiles.len() <= split.primary_size {
                    self.apply(split.primary, area, tiles);
                } else if split.primary_size == 0 {
                    self.apply(split.secondary, area, tiles);
                } else {
                    let (primary_area, secondary_area) = split_areas(&split, area);
                    let (primary_tiles, secondary_tiles) = tiles.split_at_mut(split.primary_size);
                    self.apply(split.primary, primary_area, primary_tiles);
                    self.apply(split.secondary, secondary_area, secondary_tiles);
                }
            }
            None => log::warn!("Layout part {:?} missing from the tree", id),
        }
    }

    /// Feed the resize of `basis` back into the tree.
    ///
    /// Returns the part of `delta` that this subtree did not consume, so the
    /// caller can move the next boundary out.
    pub fn adjust(
        &mut self,
        id: PartId,
        area: Rect,
        tiles: &mut [Tile],
        basis: WindowId,
        delta: RectDelta,
    ) -> RectDelta {
        let Some(index) = tiles.iter().position(|t| t.id == basis) else {
            return delta;
        };
        let part = match self.parts.get(id) {
            Some(part) => *part,
            None => return delta,
        };

        match part {
            Part::Fill => delta,
            Part::Stack(stack) => adjust_stack(&stack, area, tiles, index, delta),
            Part::HalfSplit(split) => {
                if tiles.len() <= split.primary_size {
                    return self.adjust(split.primary, area, tiles, basis, delta);
                }
                if split.primary_size == 0 {
                    return self.adjust(split.secondary, area, tiles, basis, delta);
                }

                let (primary_area, secondary_area) = split_areas(&split, area);
                let (primary_tiles, secondary_tiles) = tiles.split_at_mut(split.primary_size);
                let on_primary = index < split.primary_size;
                let delta = if on_primary {
                    self.adjust(split.primary, primary_area, primary_tiles, basis, delta)
                } else {
                    self.adjust(split.secondary, secondary_area, secondary_tiles, basis, delta)
                };

                let reversed = split.angle.reversed();
                let target = usize::from(!on_primary);
                let oriented = if reversed { 1.0 - split.ratio } else { split.ratio };
                let adjusted = utils::adjust_area_half_weights(
                    area,
                    oriented,
                    split.gap,
                    if reversed { 1 - target } else { target },
                    delta,
                    split.angle.horizontal(),
                );
                let ratio = if reversed { 1.0 - adjusted } else { adjusted };
                if let Some(node) = self.split_mut(id) {
                    node.ratio = ratio.clamp(0.05, 0.95);
                }

                consume_edge(split.angle, on_primary, delta)
            }
        }
    }
}

fn split_areas(split: &HalfSplit, area: Rect) -> (Rect, Rect) {
    let reversed = split.angle.reversed();
    let ratio = if reversed { 1.0 - split.ratio } else { split.ratio };
    let (first, second) =
        utils::split_area_half_weighted(area, ratio, split.gap, split.angle.horizontal());
    if reversed {
        (second, first)
    } else {
        (first, second)
    }
}

/// Zero the edge that lies on the split boundary
fn consume_edge(angle: Angle, on_primary: bool, delta: RectDelta) -> RectDelta {
    let mut rest = delta;
    match (angle, on_primary) {
        (Angle::Deg0, true) | (Angle::Deg180, false) => rest.right = 0,
        (Angle::Deg0, false) | (Angle::Deg180, true) => rest.left = 0,
        (Angle::Deg90, true) | (Angle::Deg270, false) => rest.bottom = 0,
        (Angle::Deg90, false) | (Angle::Deg270, true) => rest.top = 0,
    }
    rest
}

fn apply_stack(stack: &Stack, area: Rect, tiles: &mut [Tile]) {
    let mut weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
    if stack.flipped {
        weights.reverse();
    }
    let mut rects = utils::split_area_weighted(area, &weights, stack.gap, stack.horizontal);
    if stack.flipped {
        rects.reverse();
    }
    for (tile, rect) in tiles.iter_mut().zip(rects) {
        tile.geometry = rect;
    }
}

fn adjust_stack(stack: &Stack, area: Rect, tiles: &mut [Tile], index: usize, delta: RectDelta) -> RectDelta {
    let n = tiles.len();
    let mut weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
    let mut target = index;
    let mut oriented = delta;
    if stack.flipped {
        weights.reverse();
        target = n - 1 - index;
    }
    let new_weights = utils::adjust_area_weights(area, &weights, stack.gap, target, oriented, stack.horizontal);
    for (i, weight) in new_weights.into_iter().enumerate() {
        let slot = if stack.flipped { n - 1 - i } else { i };
        tiles[slot].weight = weight * n as f64;
    }

    // Edges along the stack are consumed except at its ends
    let first = target == 0;
    let last = target + 1 == n;
    if stack.horizontal {
        if !first {
            oriented.left = 0;
        }
        if !last {
            oriented.right = 0;
        }
    } else {
        if !first {
            oriented.top = 0;
        }
        if !last {
            oriented.bottom = 0;
        }
    }
    oriented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_tiles;

    fn half_split(tree: &mut PartTree, angle: Angle, ratio: f64, gap: i32) -> PartId {
        let primary = tree.insert(Part::Fill);
        let secondary = tree.insert(Part::Fill);
        tree.insert(Part::HalfSplit(HalfSplit {
            primary,
            secondary,
            angle,
            gap,
            ratio,
            primary_size: 1,
        }))
    }

    #[test]
    fn test_fill_gives_whole_area() {
        let mut tree = PartTree::new();
        let fill = tree.insert(Part::Fill);
        let mut tiles = test_tiles(3);
        let area = Rect::new(0, 0, 100, 100);
        tree.apply(fill, area, &mut tiles);
        assert!(tiles.iter().all(|t| t.geometry == area));
    }

    #[test]
    fn test_half_split_conserves_area() {
        let area = Rect::new(7, 11, 1003, 761);
        for angle in [Angle::Deg0, Angle::Deg90, Angle::Deg180, Angle::Deg270] {
            for ratio in [0.05, 0.3, 0.5, 0.77, 0.95] {
                for gap in [0, 6] {
                    let mut tree = PartTree::new();
                    let root = half_split(&mut tree, angle, ratio, gap);
                    let mut tiles = test_tiles(2);
                    tree.apply(root, area, &mut tiles);
                    let (a, b) = (tiles[0].geometry, tiles[1].geometry);
                    assert!(!a.intersects(&b));
                    assert!(area.includes(&a) && area.includes(&b));
                    if angle.horizontal() {
                        assert_eq!(a.width + b.width + gap, area.width);
                        assert_eq!((a.height, b.height), (area.height, area.height));
                    } else {
                        assert_eq!(a.height + b.height + gap, area.height);
                        assert_eq!((a.width, b.width), (area.width, area.width));
                    }
                }
            }
        }
    }

    #[test]
    fn test_primary_side_follows_angle() {
        let area = Rect::new(0, 0, 1000, 1000);
        let expectations = [
            (Angle::Deg0, Rect::new(0, 0, 300, 1000)),
            (Angle::Deg90, Rect::new(0, 0, 1000, 300)),
            (Angle::Deg180, Rect::new(700, 0, 300, 1000)),
            (Angle::Deg270, Rect::new(0, 700, 1000, 300)),
        ];
        for (angle, primary) in expectations {
            let mut tree = PartTree::new();
            let root = half_split(&mut tree, angle, 0.3, 0);
            let mut tiles = test_tiles(2);
            tree.apply(root, area, &mut tiles);
            assert_eq!(tiles[0].geometry, primary, "angle {:?}", angle);
        }
    }

    #[test]
    fn test_single_tile_stays_in_primary() {
        let mut tree = PartTree::new();
        let root = half_split(&mut tree, Angle::Deg0, 0.5, 0);
        let mut tiles = test_tiles(1);
        let area = Rect::new(0, 0, 100, 100);
        tree.apply(root, area, &mut tiles);
        assert_eq!(tiles[0].geometry, area);
    }

    #[test]
    fn test_adjust_moves_ratio_and_consumes_edge() {
        let area = Rect::new(0, 0, 1000, 800);
        let mut tree = PartTree::new();
        let root = half_split(&mut tree, Angle::Deg0, 0.5, 0);
        let mut tiles = test_tiles(2);
        tree.apply(root, area, &mut tiles);

        let basis = tiles[0].id;
        let rest = tree.adjust(root, area, &mut tiles, basis, RectDelta::new(0, 100, 0, 0));
        assert_eq!(rest, RectDelta::default());
        let ratio = tree.split(root).unwrap().ratio;
        assert!((ratio - 0.6).abs() < 1e-9);

        // Reversed split: growing the primary leftwards also grows its share
        let mut tree = PartTree::new();
        let root = half_split(&mut tree, Angle::Deg180, 0.5, 0);
        let rest = tree.adjust(root, area, &mut tiles, basis, RectDelta::new(100, 0, 0, 20));
        assert_eq!(rest, RectDelta::new(0, 0, 0, 20));
        let ratio = tree.split(root).unwrap().ratio;
        assert!((ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_stack_splits_and_flips() {
        let mut tree = PartTree::new();
        let stack = tree.insert(Part::Stack(Stack {
            gap: 0,
            horizontal: false,
            flipped: false,
        }));
        let area = Rect::new(0, 0, 100, 300);
        let mut tiles = test_tiles(3);
        tree.apply(stack, area, &mut tiles);
        assert_eq!(tiles[0].geometry, Rect::new(0, 0, 100, 100));
        assert_eq!(tiles[2].geometry, Rect::new(0, 200, 100, 100));

        if let Some(stack) = tree.stack_mut(stack) {
            stack.flipped = true;
        }
        tree.apply(stack, area, &mut tiles);
        assert_eq!(tiles[0].geometry, Rect::new(0, 200, 100, 100));
        assert_eq!(tiles[2].geometry, Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn test_stack_adjust_updates_weights() {
        let mut tree = PartTree::new();
        let stack = tree.insert(Part::Stack(Stack {
            gap: 0,
            horizontal: false,
            flipped: false,
        }));
        let area = Rect::new(0, 0, 100, 300);
        let mut tiles = test_tiles(3);
        let basis = tiles[1].id;
        let rest = tree.adjust(stack, area, &mut tiles, basis, RectDelta::new(5, 0, 0, 30));
        // The middle row consumed its bottom edge, the horizontal edge passes through
        assert_eq!(rest, RectDelta::new(5, 0, 0, 0));
        assert!((tiles[1].weight - 1.3).abs() < 1e-9);
        assert!((tiles[2].weight - 0.7).abs() < 1e-9);
        assert!((tiles[0].weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_rotation_wraps() {
        assert_eq!(Angle::Deg270.rotate(90), Angle::Deg0);
        assert_eq!(Angle::Deg0.rotate(-90), Angle::Deg270);
        assert_eq!(Angle::from_degrees(450), Angle::Deg90);
    }
}
