//! Serializable views of the engine state.
//!
//! Used by `tesselctl simulate` to print results and by tests to check
//! invariants after a sequence of events.

use serde::{Deserialize, Serialize};

use crate::driver::WindowId;
use crate::layout::LayoutKind;
use crate::state::WindowState;
use crate::types::Rect;

/// Snapshot of the full engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub activity: Option<String>,
    pub desktop: Option<u32>,
    pub current_window: Option<WindowId>,
    /// Surfaces of the current activity and desktop
    pub surfaces: Vec<SurfaceSnapshot>,
    /// Every managed window, in layout order
    pub windows: Vec<WindowSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub id: String,
    pub screen: usize,
    pub desktop: u32,
    pub group: i32,
    pub layout: LayoutKind,
    pub working_area: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub state: WindowState,
    /// Geometry the engine asked for
    pub geometry: Rect,
    /// Geometry the compositor reports
    pub actual_geometry: Rect,
    pub group: i32,
    pub screen: usize,
    pub hidden: bool,
    pub minimized: bool,
    pub timestamp: u64,
}

impl EngineSnapshot {
    pub fn window(&self, id: WindowId) -> Option<&WindowSnapshot> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Check the invariants that must hold between events.
    ///
    /// Returns a description of every violation found.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        // Check: a group is shown on at most one screen
        for (i, a) in self.surfaces.iter().enumerate() {
            for b in &self.surfaces[i + 1..] {
                if a.group == b.group && a.group >= 0 {
                    violations.push(format!(
                        "Group {} is shown on screens {} and {}",
                        a.group, a.screen, b.screen
                    ));
                }
            }
        }

        // Check: the current window is managed
        if let Some(current) = self.current_window {
            if self.window(current).is_none() {
                violations.push(format!("Current window {} is not managed", current));
            }
        }

        // Check: tiles of partitioning layouts stay inside their surface and never overlap
        for surface in self.surfaces.iter().filter(|s| s.layout.is_partitioning()) {
            let tiles: Vec<&WindowSnapshot> = self
                .windows
                .iter()
                .filter(|w| w.group == surface.group && w.state == WindowState::Tiled)
                .filter(|w| !w.hidden && !w.minimized)
                .collect();
            for (i, a) in tiles.iter().enumerate() {
                if !surface.working_area.includes(&a.geometry) {
                    violations.push(format!(
                        "Window {} at {:?} escapes surface {}",
                        a.id, a.geometry, surface.id
                    ));
                }
                for b in &tiles[i + 1..] {
                    if a.geometry.intersects(&b.geometry) {
                        violations.push(format!("Windows {} and {} overlap", a.id, b.id));
                    }
                }
            }
        }

        violations
    }
}
