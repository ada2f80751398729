//! Managed windows.
//!
//! Wraps a compositor [`WindowHandle`] with the engine's intent: the state it
//! asked for, the geometry the layout computed, and the geometry to restore
//! when floating.

use std::collections::HashMap;
use std::fmt;

use crate::config::GeneralConfig;
use crate::driver::{WindowHandle, WindowId};
use crate::persist::WindowConfig;
use crate::state::{effective_state, WindowState};
use crate::surface::Surface;
use crate::types::{Rect, RectDelta};

pub struct ManagedWindow {
    handle: Box<dyn WindowHandle>,
    internal_state: WindowState,
    state_previously_asked: WindowState,
    should_commit_float: bool,
    /// Geometry computed by the layout
    pub geometry: Rect,
    /// Geometry restored when the window floats
    pub float_geometry: Rect,
    pub surface: Option<Surface>,
    pub group: i32,
    /// Engine clock value of the last focus
    pub timestamp: u64,
    weights: HashMap<i32, f64>,
}

impl ManagedWindow {
    /// Wrap a handle, restoring its persisted record if there is one.
    pub fn new(handle: Box<dyn WindowHandle>, group: i32, saved: Option<WindowConfig>) -> Self {
        let geometry = handle.geometry();
        let should_commit_float = handle.should_float();
        let mut window = Self {
            handle,
            internal_state: WindowState::Unmanaged,
            state_previously_asked: WindowState::Floating,
            should_commit_float,
            geometry,
            float_geometry: geometry,
            surface: None,
            group,
            timestamp: 0,
            weights: HashMap::new(),
        };

        if let Some(saved) = saved {
            if saved.group >= 0 {
                window.group = saved.group;
            }
            if saved.minimized {
                log::info!("Restoring minimized window {}", window);
                window.handle.set_minimized(true);
                window.set_state(WindowState::NativeMinimized);
            }
        }
        window
    }

    pub fn id(&self) -> WindowId {
        self.handle.id()
    }

    pub fn handle(&self) -> &dyn WindowHandle {
        self.handle.as_ref()
    }

    /// State as seen from outside, external overrides included
    pub fn state(&self) -> WindowState {
        effective_state(self.internal_state, self.handle.external_flags())
    }

    /// Ask for a new internal state.
    ///
    /// Always records the effective state before the write. Asking for the
    /// current effective state does nothing else.
    pub fn set_state(&mut self, value: WindowState) {
        let current = self.state();
        self.state_previously_asked = current;
        if current == value {
            return;
        }

        if (current == WindowState::Unmanaged || current.is_tileable()) && value.is_floating() {
            self.should_commit_float = true;
        } else if current.is_floating() && value.is_tileable() {
            self.float_geometry = self.actual_geometry();
        }
        self.internal_state = value;
    }

    pub fn state_previously_asked(&self) -> WindowState {
        self.state_previously_asked
    }

    pub fn is_tileable(&self) -> bool {
        self.state().is_tileable()
    }

    pub fn is_tiled(&self) -> bool {
        self.state().is_tiled()
    }

    pub fn is_floating(&self) -> bool {
        self.state().is_floating()
    }

    pub fn shaded(&self) -> bool {
        self.handle.shaded()
    }

    pub fn minimized(&self) -> bool {
        self.handle.minimized()
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.handle.set_minimized(minimized);
    }

    pub fn should_float(&self) -> bool {
        self.handle.should_float()
    }

    pub fn should_ignore(&self) -> bool {
        self.handle.should_ignore()
    }

    pub fn screen(&self) -> usize {
        self.handle.screen()
    }

    pub fn hidden(&self) -> bool {
        self.handle.hidden()
    }

    /// Hide or show the window. Minimized windows are left alone.
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.handle.hidden() == hidden {
            return;
        }
        if self.handle.minimized() {
            log::debug!("Not changing visibility of minimized window {}", self);
            return;
        }
        log::debug!("Set hidden {} on {}", hidden, self);
        self.handle.set_hidden(hidden);
    }

    pub fn actual_geometry(&self) -> Rect {
        self.handle.geometry()
    }

    /// How far the actual geometry drifted from the layout's intent
    pub fn geometry_delta(&self) -> RectDelta {
        RectDelta::from_rects(&self.geometry, &self.actual_geometry())
    }

    /// Sizing hint of the window within its current group
    pub fn weight(&self) -> f64 {
        self.weights.get(&self.group).copied().unwrap_or(1.0)
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weights.insert(self.group, weight);
    }

    /// Place the window on a surface, moving the handle there if needed.
    pub fn set_surface(&mut self, surface: Surface) {
        if self.handle.screen() != surface.screen {
            self.handle.set_screen(surface.screen);
        }
        if let Some(desktop) = self.handle.desktop() {
            if desktop != surface.desktop {
                self.handle.set_desktop(surface.desktop);
            }
        }
        self.surface = Some(surface);
    }

    pub fn visible(&self, activity: &str, desktop: u32) -> bool {
        self.handle.visible(activity, desktop)
    }

    /// Visible on the surface and a member of the group it shows
    pub fn visible_on(&self, surface: &Surface) -> bool {
        self.visible(&surface.activity, surface.desktop) && self.group == surface.group
    }

    /// Apply a geometry right away, bypassing the state machine
    pub fn force_geometry(&mut self, geometry: Rect) {
        self.handle.commit(Some(geometry), None, None);
    }

    /// Write the engine's intent for the current state back to the handle.
    pub fn commit(&mut self, config: &GeneralConfig) {
        let Some((surface_group, working_area)) =
            self.surface.as_ref().map(|s| (s.group, s.working_area))
        else {
            return;
        };
        if surface_group != self.group {
            self.set_hidden(true);
            return;
        }
        self.set_hidden(false);
        if self.handle.interactive() {
            return;
        }

        let state = self.state();
        log::debug!("Commit {:?} {}", state, self);
        match state {
            WindowState::NativeMaximized => self.handle.commit(Some(working_area), None, None),
            WindowState::NativeFullscreen => self.handle.commit(None, None, None),
            WindowState::Floating | WindowState::TiledAfloat => {
                if self.should_commit_float {
                    self.handle.commit(
                        Some(self.float_geometry),
                        Some(false),
                        Some(config.keep_float_above),
                    );
                    self.should_commit_float = false;
                }
            }
            WindowState::Maximized => self.handle.commit(Some(self.geometry), Some(true), Some(false)),
            WindowState::Tiled | WindowState::NativeMinimized => self.handle.commit(
                Some(self.geometry),
                Some(config.no_tile_border),
                Some(false),
            ),
            WindowState::Unmanaged | WindowState::Undecided => {}
        }
    }

    /// Record to persist for this window
    pub fn saved_config(&self) -> WindowConfig {
        WindowConfig {
            group: self.group,
            minimized: self.minimized(),
        }
    }
}

impl fmt::Display for ManagedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({}, group {})", self.id(), self.group)
    }
}

impl fmt::Debug for ManagedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedWindow")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("geometry", &self.geometry)
            .field("group", &self.group)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWindow;

    fn surface(group: i32) -> Surface {
        Surface::new(
            0,
            "default",
            1,
            1,
            Rect::new(0, 0, 1000, 800),
            group,
            &GeneralConfig::default(),
        )
    }

    fn managed(handle: &HeadlessWindow) -> ManagedWindow {
        let mut window = ManagedWindow::new(Box::new(handle.clone()), 1, None);
        window.set_surface(surface(1));
        window
    }

    #[test]
    fn test_override_restores_internal_state() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Tiled);

        handle.set_fullscreen(true);
        assert_eq!(window.state(), WindowState::NativeFullscreen);
        handle.set_fullscreen(false);
        assert_eq!(window.state(), WindowState::Tiled);
    }

    #[test]
    fn test_float_commit_happens_once_per_entry() {
        let handle = HeadlessWindow::new(1, Rect::new(10, 10, 300, 200));
        let mut window = managed(&handle);
        let config = GeneralConfig::default();
        window.set_state(WindowState::Tiled);
        window.set_state(WindowState::Floating);

        window.commit(&config);
        window.commit(&config);
        let geometry_writes = handle.commits().iter().filter(|c| c.geometry.is_some()).count();
        assert_eq!(geometry_writes, 1);
        assert_eq!(handle.commits()[0].keep_above, Some(true));
    }

    #[test]
    fn test_leaving_float_snapshots_actual_geometry() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Floating);
        handle.move_to(Rect::new(40, 50, 300, 200));
        window.set_state(WindowState::Tiled);
        assert_eq!(window.float_geometry, Rect::new(40, 50, 300, 200));
    }

    #[test]
    fn test_previous_state_recorded_on_noop_write() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Tiled);
        window.set_state(WindowState::Floating);
        assert_eq!(window.state_previously_asked(), WindowState::Tiled);
        window.set_state(WindowState::Floating);
        assert_eq!(window.state_previously_asked(), WindowState::Floating);
    }

    #[test]
    fn test_commit_skipped_while_interactive() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Tiled);
        handle.set_interactive(true);
        window.commit(&GeneralConfig::default());
        assert!(handle.commits().is_empty());
    }

    #[test]
    fn test_maximized_commit_drops_border() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Maximized);
        window.geometry = Rect::new(0, 0, 1000, 800);
        window.commit(&GeneralConfig::default());
        let commit = handle.commits()[0];
        assert_eq!(commit.geometry, Some(Rect::new(0, 0, 1000, 800)));
        assert_eq!(commit.no_border, Some(true));
        assert_eq!(handle.geometry(), Rect::new(0, 0, 1000, 800));
    }

    #[test]
    fn test_foreign_group_gets_hidden() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_state(WindowState::Tiled);
        window.group = 2;
        window.commit(&GeneralConfig::default());
        assert!(handle.hidden());
        assert!(handle.commits().is_empty());
    }

    #[test]
    fn test_restores_persisted_minimized_flag() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let saved = WindowConfig {
            group: 5,
            minimized: true,
        };
        let window = ManagedWindow::new(Box::new(handle.clone()), 1, Some(saved));
        assert!(handle.minimized());
        assert_eq!(window.group, 5);
        assert_eq!(window.state(), WindowState::NativeMinimized);
    }

    #[test]
    fn test_weight_is_per_group() {
        let handle = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
        let mut window = managed(&handle);
        window.set_weight(2.5);
        assert_eq!(window.weight(), 2.5);
        window.group = 3;
        assert_eq!(window.weight(), 1.0);
    }
}
