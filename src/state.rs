//! Window state machine types.
//!
//! A managed window carries an internal state chosen by the engine, but the
//! compositor can override it at any time (the user fullscreens, maximizes or
//! minimizes a window by other means). The overrides are never stored: they are
//! recomputed from the live external flags on every read.
//!
//! ```text
//!                 manage()
//!  ┌───────────┐ ─────────► ┌───────────┐
//!  │ Unmanaged │            │ Undecided │
//!  └───────────┘            └─────┬─────┘
//!                                 │ arrange(): should_float?
//!                   ┌─────────────┴─────────────┐
//!                   ▼                           ▼
//!             ┌──────────┐  toggle_float  ┌──────────┐  sole tile  ┌───────────┐
//!             │ Floating │ ◄────────────► │  Tiled   │ ◄─────────► │ Maximized │
//!             └──────────┘                └────┬─────┘             └───────────┘
//!                                              │ layout has no room
//!                                              ▼
//!                                        ┌─────────────┐
//!                                        │ TiledAfloat │
//!                                        └─────────────┘
//!
//!  external flags (fullscreen > maximized > minimized) mask all of the above:
//!  NativeFullscreen, NativeMaximized, NativeMinimized
//! ```

use serde::{Deserialize, Serialize};

/// Every state a managed window can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Initial value, before the engine took the window
    Unmanaged,

    // Compositor-owned overrides
    NativeFullscreen,
    NativeMaximized,
    NativeMinimized,

    // Engine-owned states
    Floating,
    Maximized,
    Tiled,
    /// A window the layout would tile but currently treats as floating
    TiledAfloat,
    /// Managed, placement not decided yet
    Undecided,
}

impl WindowState {
    /// Eligible for layout-driven placement.
    pub fn is_tileable(self) -> bool {
        matches!(
            self,
            WindowState::Tiled | WindowState::Maximized | WindowState::TiledAfloat
        )
    }

    /// Part of the current layout.
    pub fn is_tiled(self) -> bool {
        matches!(self, WindowState::Tiled | WindowState::Maximized)
    }

    /// Geometry loosely managed, restored from the remembered float geometry.
    pub fn is_floating(self) -> bool {
        matches!(self, WindowState::Floating | WindowState::TiledAfloat)
    }

    /// Whether the state comes from the compositor rather than the engine.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            WindowState::NativeFullscreen
                | WindowState::NativeMaximized
                | WindowState::NativeMinimized
        )
    }
}

/// Live flags reported by the compositor for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFlags {
    pub fullscreen: bool,
    pub maximized: bool,
    pub minimized: bool,
}

/// Resolve the state a window reports.
///
/// External flags take precedence over the internal state in the order
/// fullscreen, maximized, minimized.
pub fn effective_state(internal: WindowState, external: ExternalFlags) -> WindowState {
    match external {
        ExternalFlags { fullscreen: true, .. } => WindowState::NativeFullscreen,
        ExternalFlags { maximized: true, .. } => WindowState::NativeMaximized,
        ExternalFlags { minimized: true, .. } => WindowState::NativeMinimized,
        _ => internal,
    }
}
