//! Layouts: strategies mapping an ordered list of tiles to geometries.
//!
//! Every layout implements [`WindowsLayout`]. The set of layouts is closed,
//! so they live in the [`Layout`] enum and calls dispatch statically through
//! `enum_dispatch`.

mod columns;
mod floating;
mod monocle;
pub mod part;
mod quarter;
mod spiral;
mod spread;
mod stair;
mod three_column;
mod tile;
pub mod utils;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::config::LayoutsConfig;
use crate::driver::WindowId;
use crate::persist::LayoutState;
use crate::state::WindowState;
use crate::types::{Rect, RectDelta, Step};

pub use columns::ColumnsLayout;
pub use floating::FloatingLayout;
pub use monocle::MonocleLayout;
pub use quarter::QuarterLayout;
pub use spiral::SpiralLayout;
pub use spread::SpreadLayout;
pub use stair::StairLayout;
pub use three_column::ThreeColumnLayout;
pub use tile::TileLayout;

/// One tileable window as a layout sees it.
///
/// Layouts write `geometry` and `state`, and the resizing ones also `weight`.
/// The engine copies the results back onto the managed windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub id: WindowId,
    pub geometry: Rect,
    pub state: WindowState,
    pub weight: f64,
}

/// What a layout did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutResponse {
    /// The layout consumed the action
    Handled,
    /// Run the default behaviour
    Fallthrough,
    /// Run focus-by-order instead
    FocusOrder(Step),
}

/// Capabilities shared by every layout.
#[enum_dispatch]
pub trait WindowsLayout {
    fn kind(&self) -> LayoutKind;

    /// Compute geometries and states for `tiles` inside `area`.
    fn apply(&mut self, tiles: &mut [Tile], area: Rect);

    /// Feed an interactive resize of `basis` back into the layout's ratios.
    /// Returns false when the layout has no notion of adjustment.
    fn adjust(&mut self, _area: Rect, _tiles: &mut [Tile], _basis: WindowId, _delta: RectDelta) -> bool {
        false
    }

    fn execute_action(&mut self, _action: &Action) -> LayoutResponse {
        LayoutResponse::Fallthrough
    }

    /// Maximum number of tiles, `None` when unbounded
    fn capacity(&self) -> Option<usize> {
        None
    }

    /// Extra text for the layout popup
    fn hint(&self) -> Option<String> {
        None
    }

    /// Settings worth keeping across restarts
    fn saved_state(&self) -> LayoutState {
        LayoutState::default()
    }
}

#[enum_dispatch(WindowsLayout)]
#[derive(Debug)]
pub enum Layout {
    Tile(TileLayout),
    Monocle(MonocleLayout),
    ThreeColumn(ThreeColumnLayout),
    Columns(ColumnsLayout),
    Spiral(SpiralLayout),
    Stair(StairLayout),
    Spread(SpreadLayout),
    Quarter(QuarterLayout),
    Floating(FloatingLayout),
}

impl Layout {
    /// Instantiate a layout, restoring its persisted settings.
    pub fn new(kind: LayoutKind, config: &LayoutsConfig, gap: i32, saved: LayoutState) -> Self {
        match kind {
            LayoutKind::Tile => TileLayout::new(config.tile_master_ratio, gap, saved).into(),
            LayoutKind::Monocle => MonocleLayout.into(),
            LayoutKind::ThreeColumn => {
                ThreeColumnLayout::new(config.three_column_master_ratio, gap, saved).into()
            }
            LayoutKind::Columns => ColumnsLayout::new(gap).into(),
            LayoutKind::Spiral => SpiralLayout::new(gap, saved).into(),
            LayoutKind::Stair => StairLayout::new(config.stair_space).into(),
            LayoutKind::Spread => SpreadLayout::new(config.spread_space).into(),
            LayoutKind::Quarter => QuarterLayout::new(gap).into(),
            LayoutKind::Floating => FloatingLayout.into(),
        }
    }
}

/// Identifies a layout in configuration, actions and persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Tile,
    Monocle,
    ThreeColumn,
    Columns,
    Spiral,
    Stair,
    Spread,
    Quarter,
    Floating,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 9] = [
        LayoutKind::Tile,
        LayoutKind::Monocle,
        LayoutKind::ThreeColumn,
        LayoutKind::Columns,
        LayoutKind::Spiral,
        LayoutKind::Stair,
        LayoutKind::Spread,
        LayoutKind::Quarter,
        LayoutKind::Floating,
    ];

    /// Key used in persisted state
    pub fn key(self) -> &'static str {
        match self {
            LayoutKind::Tile => "tile",
            LayoutKind::Monocle => "monocle",
            LayoutKind::ThreeColumn => "three_column",
            LayoutKind::Columns => "columns",
            LayoutKind::Spiral => "spiral",
            LayoutKind::Stair => "stair",
            LayoutKind::Spread => "spread",
            LayoutKind::Quarter => "quarter",
            LayoutKind::Floating => "floating",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Tile => "Tile Layout",
            LayoutKind::Monocle => "Monocle Layout",
            LayoutKind::ThreeColumn => "Three Column Layout",
            LayoutKind::Columns => "Columns Layout",
            LayoutKind::Spiral => "Spiral Layout",
            LayoutKind::Stair => "Stair Layout",
            LayoutKind::Spread => "Spread Layout",
            LayoutKind::Quarter => "Quarter Layout",
            LayoutKind::Floating => "Floating Layout",
        }
    }

    /// Whether tiles of this layout partition the area without overlapping
    pub fn is_partitioning(self) -> bool {
        matches!(
            self,
            LayoutKind::Tile
                | LayoutKind::ThreeColumn
                | LayoutKind::Columns
                | LayoutKind::Spiral
                | LayoutKind::Quarter
        )
    }

    pub fn icon(self) -> String {
        format!("tessel-{}", self.key().replace('_', ""))
    }
}

/// Mark every tile tiled
fn tile_all(tiles: &mut [Tile]) {
    for tile in tiles.iter_mut() {
        tile.state = WindowState::Tiled;
    }
}

#[cfg(test)]
pub(crate) fn test_tiles(n: usize) -> Vec<Tile> {
    (0..n)
        .map(|i| Tile {
            id: WindowId(i as u64 + 1),
            geometry: Rect::default(),
            state: WindowState::Tiled,
            weight: 1.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutsConfig;

    fn layout(kind: LayoutKind, gap: i32) -> Layout {
        Layout::new(kind, &LayoutsConfig::default(), gap, LayoutState::default())
    }

    #[test]
    fn test_partitioning_layouts_never_overlap() {
        let area = Rect::new(10, 20, 1900, 1040);
        for kind in LayoutKind::ALL.into_iter().filter(|k| k.is_partitioning()) {
            for gap in [0, 8] {
                let mut layout = layout(kind, gap);
                let max = layout.capacity().unwrap_or(12);
                for n in 1..=max {
                    let mut tiles = test_tiles(n);
                    layout.apply(&mut tiles, area);
                    for (i, a) in tiles.iter().enumerate() {
                        assert!(
                            area.includes(&a.geometry),
                            "{:?} n={} tile {} escapes: {:?}",
                            kind,
                            n,
                            i,
                            a.geometry
                        );
                        for b in &tiles[i + 1..] {
                            assert!(
                                !a.geometry.intersects(&b.geometry),
                                "{:?} n={} overlap {:?} {:?}",
                                kind,
                                n,
                                a.geometry,
                                b.geometry
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_layout_keeps_tiles_inside_area() {
        let area = Rect::new(0, 0, 1600, 900);
        for kind in LayoutKind::ALL {
            let mut layout = layout(kind, 4);
            let mut tiles = test_tiles(6);
            layout.apply(&mut tiles, area);
            assert_eq!(layout.kind(), kind);
            for tile in tiles.iter().filter(|t| t.state == WindowState::Tiled) {
                assert!(area.includes(&tile.geometry), "{:?}: {:?}", kind, tile.geometry);
            }
        }
    }

    #[test]
    fn test_layout_kind_names() {
        assert_eq!(LayoutKind::ThreeColumn.key(), "three_column");
        assert_eq!(LayoutKind::ThreeColumn.icon(), "tessel-threecolumn");
        assert_eq!(LayoutKind::Tile.name(), "Tile Layout");
        let json = serde_json::to_string(&LayoutKind::ThreeColumn).unwrap();
        assert_eq!(json, "\"three_column\"");
    }
}
