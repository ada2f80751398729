//! Interfaces the engine expects from the compositor side.
//!
//! The engine never talks to a compositor directly. Whatever drives it
//! (a real compositor adapter, or the headless implementation used by the
//! tests and the simulator) hands it objects satisfying these traits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::ExternalFlags;
use crate::types::Rect;

/// Opaque, stable window identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A window as seen from the compositor.
pub trait WindowHandle: fmt::Debug {
    fn id(&self) -> WindowId;

    /// Geometry the window actually has right now
    fn geometry(&self) -> Rect;

    fn fullscreen(&self) -> bool;
    fn maximized(&self) -> bool;
    fn minimized(&self) -> bool;
    fn set_minimized(&mut self, minimized: bool);
    fn shaded(&self) -> bool;

    /// The window must never be managed (panels, desktop, ignore rules)
    fn should_ignore(&self) -> bool;
    /// The window should start floating (dialogs, fixed size, float rules)
    fn should_float(&self) -> bool;

    /// Screen index the window is on
    fn screen(&self) -> usize;
    fn set_screen(&mut self, screen: usize);
    /// Desktop the window is on, `None` when it is on all desktops
    fn desktop(&self) -> Option<u32>;
    fn set_desktop(&mut self, desktop: u32);

    fn hidden(&self) -> bool;
    fn set_hidden(&mut self, hidden: bool);

    /// The user is dragging or resizing the window
    fn interactive(&self) -> bool;

    /// Write geometry, border and keep-above state back to the compositor.
    /// `None` leaves the corresponding property untouched.
    fn commit(&mut self, geometry: Option<Rect>, no_border: Option<bool>, keep_above: Option<bool>);

    /// Visible on the given activity and desktop (and not minimized)
    fn visible(&self, activity: &str, desktop: u32) -> bool;

    fn external_flags(&self) -> ExternalFlags {
        ExternalFlags {
            fullscreen: self.fullscreen(),
            maximized: self.maximized(),
            minimized: self.minimized(),
        }
    }
}

/// The compositor-wide facts and services the engine needs.
pub trait Compositor {
    fn current_activity(&self) -> Option<String>;
    fn current_desktop(&self) -> Option<u32>;
    fn desktop_count(&self) -> u32;
    fn screen_count(&self) -> usize;
    fn active_screen(&self) -> usize;

    /// Placement area of a screen on a desktop
    fn working_area(&self, screen: usize, desktop: u32) -> Rect;

    /// Make `desktop` the current desktop
    fn switch_desktop(&mut self, desktop: u32);

    fn active_window(&self) -> Option<WindowId>;
    fn set_active_window(&mut self, window: WindowId);

    /// Fire-and-forget popup
    fn show_notification(&mut self, text: &str, icon: Option<&str>, hint: Option<&str>);
}
