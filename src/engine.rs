//! The arrangement engine.
//!
//! Owns the managed windows and the per-surface layouts, and turns compositor
//! events and user actions into geometry commits. Surfaces are rebuilt from
//! the compositor and the group map whenever an operation needs one, so the
//! engine never acts on a stale group mapping.
//!
//! An arrangement pass runs in two phases: every touched surface computes its
//! geometries first, then every visible window commits.

mod group;
mod neighbor;

use crate::action::Action;
use crate::config::{Config, SpawnLocation};
use crate::driver::{Compositor, WindowHandle, WindowId};
use crate::layout::{LayoutKind, LayoutResponse, Tile, WindowsLayout};
use crate::layout_store::LayoutStore;
use crate::persist::Persistence;
use crate::snapshot::{EngineSnapshot, SurfaceSnapshot, WindowSnapshot};
use crate::state::WindowState;
use crate::surface::Surface;
use crate::types::{wrap_index, CompassDirection, Direction, Rect, RectDelta, Step};
use crate::window::ManagedWindow;
use crate::window_store::WindowStore;

/// Share of the working area a tile grows or shrinks per resize step
const TILE_RESIZE_STEP: f64 = 0.03;

/// Share of the working area a floating window moves or grows per step
const FLOAT_STEP: f64 = 0.05;

/// Distance a dropped tile must travel from its slot to become floating
const UNTILE_DISTANCE: f64 = 30.0;

pub struct Engine {
    config: Config,
    compositor: Box<dyn Compositor>,
    persistence: Persistence,
    windows: WindowStore,
    layouts: LayoutStore,
    /// Monotonic counter stamped on focused windows
    clock: u64,
}

impl Engine {
    pub fn new(config: Config, compositor: Box<dyn Compositor>, persistence: Persistence) -> Self {
        let layouts = LayoutStore::new(&config.layouts, config.gaps.tile);
        log::info!(
            "Engine ready: {} screen(s), {} desktop(s)",
            compositor.screen_count(),
            compositor.desktop_count()
        );
        Self {
            config,
            compositor,
            persistence,
            windows: WindowStore::new(),
            layouts,
            clock: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&ManagedWindow> {
        self.windows.get(id)
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    // ---- Surfaces ----

    fn current_place(&self) -> Option<(String, u32)> {
        Some((
            self.compositor.current_activity()?,
            self.compositor.current_desktop()?,
        ))
    }

    /// Build the surface of `screen` on an activity and desktop
    fn surface_at(&mut self, screen: usize, activity: &str, desktop: u32) -> Surface {
        let group = self
            .persistence
            .surface_group(desktop, screen, self.compositor.screen_count());
        Surface::new(
            screen,
            activity,
            desktop,
            self.compositor.desktop_count(),
            self.compositor.working_area(screen, desktop),
            group,
            &self.config.general,
        )
    }

    /// Surfaces of every screen on the current activity and desktop
    pub fn screens(&mut self) -> Vec<Surface> {
        let Some((activity, desktop)) = self.current_place() else {
            return Vec::new();
        };
        (0..self.compositor.screen_count())
            .map(|screen| self.surface_at(screen, &activity, desktop))
            .collect()
    }

    /// Surface of the active screen
    pub fn current_surface(&mut self) -> Option<Surface> {
        let (activity, desktop) = self.current_place()?;
        let screen = self.compositor.active_screen();
        Some(self.surface_at(screen, &activity, desktop))
    }

    /// Surface of the screen the window's handle reports.
    fn screen_surface(&mut self, id: WindowId) -> Option<Surface> {
        let (activity, current_desktop) = self.current_place()?;
        let window = self.windows.get(id)?;
        let screen = window.screen();
        let desktop = window.handle().desktop().unwrap_or(current_desktop);
        Some(self.surface_at(screen, &activity, desktop))
    }

    /// Re-resolve the surface a window belongs to and store it on the window.
    ///
    /// A window follows its group: if some screen of its desktop shows the
    /// group, that screen's surface wins over the screen the handle reports.
    fn resolve_surface(&mut self, id: WindowId) -> Option<Surface> {
        let (activity, current_desktop) = self.current_place()?;
        let (group, desktop) = {
            let window = self.windows.get(id)?;
            (window.group, window.handle().desktop().unwrap_or(current_desktop))
        };
        let shown = (0..self.compositor.screen_count())
            .map(|screen| self.surface_at(screen, &activity, desktop))
            .find(|surface| surface.group == group);
        let surface = match shown {
            Some(surface) => surface,
            None => self.screen_surface(id)?,
        };
        if let Some(window) = self.windows.get_mut(id) {
            window.surface = Some(surface.clone());
        }
        Some(surface)
    }

    /// The focused window, if the engine manages it
    pub fn current_window(&self) -> Option<WindowId> {
        self.compositor
            .active_window()
            .filter(|id| self.windows.contains(*id))
    }

    pub fn set_current_window(&mut self, id: WindowId) {
        log::debug!("Focusing window {}", id);
        self.compositor.set_active_window(id);
    }

    fn notify(&mut self, text: &str, hint: Option<String>) {
        self.compositor.show_notification(text, None, hint.as_deref());
    }

    // ---- Lifecycle ----

    /// Start managing a window.
    ///
    /// Returns the new id, or `None` when the window is ignored or already
    /// managed.
    pub fn manage(&mut self, handle: Box<dyn WindowHandle>) -> Option<WindowId> {
        let id = handle.id();
        if handle.should_ignore() {
            log::debug!("Ignoring window {}", id);
            return None;
        }

        let current_desktop = self.compositor.current_desktop().unwrap_or(1);
        let desktop = handle.desktop().unwrap_or(current_desktop);
        let group = self
            .persistence
            .surface_group(desktop, handle.screen(), self.compositor.screen_count());
        let saved = self.persistence.window_config(id);
        let spawn = self.config.general.new_window_spawn_location;

        let mut window = ManagedWindow::new(handle, group, saved);
        window.set_state(if spawn == SpawnLocation::Floating {
            WindowState::Floating
        } else {
            WindowState::Undecided
        });

        let focused = self.current_window();
        let result = match (spawn, focused) {
            (SpawnLocation::Master, _) => self.windows.unshift(window),
            (SpawnLocation::BeforeFocused, Some(focused)) => self
                .windows
                .push(window)
                .and_then(|()| self.windows.move_window(id, focused, false)),
            (SpawnLocation::AfterFocused, Some(focused)) => self
                .windows
                .push(window)
                .and_then(|()| self.windows.move_window(id, focused, true)),
            _ => self.windows.push(window),
        };
        if let Err(e) = result {
            log::error!("Failed to manage window {}: {}", id, e);
            debug_assert!(false, "{}", e);
            return None;
        }

        let group = self.windows.get(id).map_or(group, |w| w.group);
        let shown = self.screens().iter().any(|s| s.group == group);
        let surface = self.resolve_surface(id);
        if let Some(window) = self.windows.get_mut(id) {
            window.set_hidden(!shown);
            log::info!("Managing {}", window);
            let saved = window.saved_config();
            self.persistence.set_window_config(id, &saved);
        }

        if let Some(surface) = surface {
            self.arrange(Some(&surface));
        }
        Some(id)
    }

    /// Stop managing a window and re-arrange the surface it left.
    pub fn unmanage(&mut self, id: WindowId) {
        let surface = self.windows.get(id).and_then(|w| w.surface.clone());
        match self.windows.remove(id) {
            Ok(window) => log::info!("Unmanaging {}", window),
            Err(e) => {
                log::debug!("Unmanage: {}", e);
                return;
            }
        }
        if let Some(surface) = surface {
            self.arrange(Some(&surface));
        }
    }

    // ---- Arrangement ----

    /// Arrange one surface, or every surface of the current activity and
    /// desktop when `surface` is `None`.
    pub fn arrange(&mut self, surface: Option<&Surface>) {
        if self.current_place().is_none() {
            log::debug!("No current activity or desktop, skipping arrange");
            return;
        }
        let surfaces = match surface {
            Some(s) => vec![self.surface_at(s.screen, &s.activity, s.desktop)],
            None => self.screens(),
        };

        for surface in &surfaces {
            self.arrange_screen(surface);
        }
        for surface in &surfaces {
            self.commit_arrangement(surface);
        }
    }

    /// Compute geometries for the visible windows of one surface.
    fn arrange_screen(&mut self, surface: &Surface) {
        let visible = self.windows.visible_windows_on(surface);
        log::debug!("Arranging {} ({} visible)", surface, visible.len());
        for &id in &visible {
            if let Some(window) = self.windows.get_mut(id) {
                window.set_surface(surface.clone());
                if window.state() == WindowState::Undecided {
                    window.set_state(if window.should_float() {
                        WindowState::Floating
                    } else {
                        WindowState::Tiled
                    });
                }
            }
        }

        let tileables = self.windows.visible_tileable_windows_on(surface);
        let working_area = surface.working_area;
        let monocle = self.layouts.current_kind(surface) == LayoutKind::Monocle;
        let tiling_area = if monocle && self.config.general.monocle_maximize {
            working_area
        } else {
            self.config.tiling_area(working_area)
        };

        if self.config.general.maximize_sole_tile && tileables.len() == 1 {
            if let Some(window) = self.windows.get_mut(tileables[0]) {
                window.set_state(WindowState::Maximized);
                window.geometry = working_area;
            }
        } else if !tileables.is_empty() {
            let mut tiles = self.tiles(&tileables);
            self.layouts
                .current_layout(surface, &self.persistence)
                .apply(&mut tiles, tiling_area);
            for tile in &tiles {
                if let Some(window) = self.windows.get_mut(tile.id) {
                    window.set_state(tile.state);
                    window.geometry = tile.geometry;
                    window.set_weight(tile.weight);
                }
            }
        }

        let ratio = self.config.general.limit_tile_width_ratio;
        if ratio > 0.0 && !monocle {
            let max_width = (working_area.height as f64 * ratio).floor() as i32;
            for &id in &tileables {
                let Some(window) = self.windows.get_mut(id) else {
                    continue;
                };
                if window.is_tiled() && window.geometry.width > max_width {
                    let g = window.geometry;
                    window.geometry =
                        Rect::new(g.x + (g.width - max_width) / 2, g.y, max_width, g.height);
                }
            }
        }
    }

    /// Commit every visible window of one surface.
    fn commit_arrangement(&mut self, surface: &Surface) {
        let config = &self.config.general;
        for id in self.windows.visible_windows_on(surface) {
            if let Some(window) = self.windows.get_mut(id) {
                window.commit(config);
            }
        }
    }

    fn tiles(&self, ids: &[WindowId]) -> Vec<Tile> {
        ids.iter()
            .filter_map(|&id| self.windows.get(id))
            .map(|w| Tile {
                id: w.id(),
                geometry: w.geometry,
                state: w.state(),
                weight: w.weight(),
            })
            .collect()
    }

    /// Feed `delta` on `basis` into the layout of `surface`, keeping only the weights.
    fn adjust_tiles(&mut self, surface: &Surface, ids: &[WindowId], basis: WindowId, delta: RectDelta) {
        let area = self.config.tiling_area(surface.working_area);
        let mut tiles = self.tiles(ids);
        let adjusted = self
            .layouts
            .current_layout(surface, &self.persistence)
            .adjust(area, &mut tiles, basis, delta);
        if !adjusted {
            return;
        }
        for tile in &tiles {
            if let Some(window) = self.windows.get_mut(tile.id) {
                window.set_weight(tile.weight);
            }
        }
        self.layouts.persist(surface, &mut self.persistence);
    }

    /// Adapt the layout to the size the user gave `basis`.
    pub fn adjust_layout(&mut self, basis: WindowId) {
        let Some(surface) = self.resolve_surface(basis) else {
            return;
        };
        let Some(delta) = self.windows.get(basis).map(|w| w.geometry_delta()) else {
            return;
        };
        if delta.is_zero() {
            return;
        }
        let tiles = self.windows.visible_tiled_windows_on(&surface);
        self.adjust_tiles(&surface, &tiles, basis, delta);
    }

    // ---- Resizing and moving ----

    /// Grow or shrink a window one step towards `dir`.
    pub fn resize_window(&mut self, id: WindowId, dir: CompassDirection, step: Step) {
        let Some(state) = self.windows.get(id).map(|w| w.state()) else {
            return;
        };
        if state.is_floating() {
            self.resize_float(id, dir, step);
        } else if state.is_tiled() {
            self.resize_tile(id, dir, step);
        }
    }

    /// Resize a floating window by a share of its working area.
    pub fn resize_float(&mut self, id: WindowId, dir: CompassDirection, step: Step) {
        let Some(surface) = self.resolve_surface(id) else {
            return;
        };
        let (h_step, v_step) = float_steps(surface.working_area);
        let (dw, dh) = match dir {
            CompassDirection::East => (h_step * step.value(), 0),
            CompassDirection::West => (-h_step * step.value(), 0),
            CompassDirection::South => (0, v_step * step.value()),
            CompassDirection::North => (0, -v_step * step.value()),
        };
        if let Some(window) = self.windows.get_mut(id) {
            let g = window.actual_geometry();
            window.force_geometry(Rect::new(
                g.x,
                g.y,
                (g.width + dw).max(1),
                (g.height + dh).max(1),
            ));
        }
    }

    /// Resize a tile by adjusting the layout around it.
    pub fn resize_tile(&mut self, basis: WindowId, dir: CompassDirection, step: Step) {
        let Some(surface) = self.resolve_surface(basis) else {
            return;
        };
        let Some(origin) = self.windows.get(basis).map(|w| w.geometry) else {
            return;
        };

        // Without a neighbour on the east or south, move the opposite edge
        let tiled: Vec<Rect> = self
            .windows
            .visible_tiled_windows_on(&surface)
            .into_iter()
            .filter_map(|id| self.windows.get(id).map(|w| w.geometry))
            .collect();
        let (dir, step) = match dir {
            CompassDirection::East if !tiled.iter().any(|g| g.x >= origin.max_x()) => {
                (CompassDirection::West, step.invert())
            }
            CompassDirection::South if !tiled.iter().any(|g| g.y >= origin.max_y()) => {
                (CompassDirection::North, step.invert())
            }
            _ => (dir, step),
        };

        let h = (surface.working_area.width as f64 * TILE_RESIZE_STEP) as i32 * step.value();
        let v = (surface.working_area.height as f64 * TILE_RESIZE_STEP) as i32 * step.value();
        let delta = match dir {
            CompassDirection::East => RectDelta::new(0, h, 0, 0),
            CompassDirection::West => RectDelta::new(h, 0, 0, 0),
            CompassDirection::South => RectDelta::new(0, 0, 0, v),
            CompassDirection::North => RectDelta::new(0, 0, v, 0),
        };
        log::debug!("Resizing tile {} towards {:?}: {:?}", basis, dir, delta);

        let tiles = self.windows.visible_tileable_windows_on(&surface);
        self.adjust_tiles(&surface, &tiles, basis, delta);
    }

    /// Move a floating window by a share of its working area.
    pub fn move_float(&mut self, id: WindowId, dir: Direction) {
        let Some(surface) = self.resolve_surface(id) else {
            return;
        };
        let (h_step, v_step) = float_steps(surface.working_area);
        let (dx, dy) = match dir {
            Direction::Up => (0, -v_step),
            Direction::Down => (0, v_step),
            Direction::Left => (-h_step, 0),
            Direction::Right => (h_step, 0),
        };
        if let Some(window) = self.windows.get_mut(id) {
            let g = window.actual_geometry();
            window.force_geometry(Rect::new(g.x + dx, g.y + dy, g.width, g.height));
        }
    }

    /// Re-commit a tile the compositor resized behind the engine's back.
    pub fn enforce_size(&mut self, id: WindowId) {
        let config = &self.config.general;
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        if window.is_tiled() && window.actual_geometry() != window.geometry {
            log::debug!("Enforcing size of {}", window);
            window.commit(config);
        }
    }

    // ---- Focus and ordering ----

    /// Focus the next or previous window of the current surface in layout order.
    pub fn focus_order(&mut self, step: Step, include_hidden: bool) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        let windows = if include_hidden {
            self.windows.all_windows_on(&surface)
        } else {
            self.windows.visible_windows_on(&surface)
        };
        if windows.is_empty() {
            return;
        }

        let index = self
            .current_window()
            .and_then(|current| windows.iter().position(|&w| w == current));
        let target = match index {
            Some(index) => windows[wrap_index(index as i64 + step.value() as i64, windows.len())],
            None => windows[0],
        };
        self.set_current_window(target);
    }

    /// Move a window one slot forward or backward among the visible windows.
    pub fn swap_order(&mut self, id: WindowId, step: Step) {
        let Some(surface) = self.resolve_surface(id) else {
            return;
        };
        let visible = self.windows.visible_windows_on(&surface);
        if visible.len() < 2 {
            return;
        }
        let Some(index) = visible.iter().position(|&w| w == id) else {
            return;
        };
        let target = visible[wrap_index(index as i64 + step.value() as i64, visible.len())];
        self.move_into_slot(id, target);
    }

    /// Move `id` to the position `target` holds now.
    fn move_into_slot(&mut self, id: WindowId, target: WindowId) {
        let ids = self.windows.ids();
        let from = ids.iter().position(|&w| w == id);
        let to = ids.iter().position(|&w| w == target);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        if let Err(e) = self.windows.move_window(id, target, from < to) {
            log::debug!("Move: {}", e);
        }
    }

    pub fn toggle_float(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(id) {
            let state = if window.is_tileable() {
                WindowState::Floating
            } else {
                WindowState::Tiled
            };
            log::debug!("Toggling {} to {:?}", window, state);
            window.set_state(state);
        }
    }

    /// Promote a window to master and re-arrange its surface.
    pub fn set_master(&mut self, id: WindowId) {
        if let Err(e) = self.windows.put_window_to_master(id) {
            log::debug!("Set master: {}", e);
            return;
        }
        if let Some(surface) = self.resolve_surface(id) {
            self.arrange(Some(&surface));
        }
    }

    // ---- Layouts ----

    /// Kind of the layout active on the current surface
    pub fn current_layout_kind(&mut self) -> Option<LayoutKind> {
        let surface = self.current_surface()?;
        Some(self.layouts.current_kind(&surface))
    }

    pub fn is_layout_monocle_and_minimize_rest(&mut self) -> bool {
        self.config.general.monocle_minimize_rest
            && self.current_layout_kind() == Some(LayoutKind::Monocle)
    }

    pub fn cycle_layout(&mut self, step: Step) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        if self
            .layouts
            .cycle_layout(&surface, step, &self.persistence)
            .is_some()
        {
            self.on_layout_changed();
        }
    }

    pub fn toggle_layout(&mut self, kind: LayoutKind) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        if self
            .layouts
            .toggle_layout(&surface, kind, &self.persistence)
            .is_some()
        {
            self.on_layout_changed();
        }
    }

    fn on_layout_changed(&mut self) {
        self.show_layout_notification();
        if self.is_layout_monocle_and_minimize_rest() {
            if let Some(current) = self.current_window() {
                self.minimize_others(current);
            }
        }
    }

    /// Show the name of the current layout
    pub fn show_layout_notification(&mut self) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        let layout = self.layouts.current_layout(&surface, &self.persistence);
        let kind = layout.kind();
        let hint = layout.hint();
        log::info!("Layout on {} is now {}", surface, kind.name());
        self.compositor
            .show_notification(kind.name(), Some(&kind.icon()), hint.as_deref());
    }

    /// Minimize every tile sharing the window's screen, and restore the rest.
    pub fn minimize_others(&mut self, id: WindowId) {
        let Some(surface) = self.resolve_surface(id) else {
            return;
        };
        let Some(screen) = self.windows.get(id).map(|w| w.screen()) else {
            return;
        };
        let tiled = self.windows.visible_tiled_windows_on(&surface);
        let is_tile = tiled.contains(&id);
        for tile in tiled {
            if let Some(window) = self.windows.get_mut(tile) {
                let minimize = is_tile && tile != id && window.screen() == screen;
                window.set_minimized(minimize);
            }
        }
    }

    // ---- Actions ----

    /// Run a user action: the layout gets the first word, then the default
    /// behaviour, then the current surface is re-arranged.
    pub fn execute(&mut self, action: Action) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        log::debug!("Executing {} on {}", action.key(), surface);
        let response = self
            .layouts
            .current_layout(&surface, &self.persistence)
            .execute_action(&action);
        match response {
            LayoutResponse::Handled => self.layouts.persist(&surface, &mut self.persistence),
            LayoutResponse::FocusOrder(step) => {
                let include_hidden = self.is_layout_monocle_and_minimize_rest();
                self.focus_order(step, include_hidden);
            }
            LayoutResponse::Fallthrough => self.execute_default(action),
        }
        self.arrange(Some(&surface));
    }

    fn execute_default(&mut self, action: Action) {
        let current = self.current_window();
        let resize = match action {
            Action::IncreaseWindowWidth => Some((CompassDirection::East, Step::Forward)),
            Action::DecreaseWindowWidth => Some((CompassDirection::East, Step::Backward)),
            Action::IncreaseWindowHeight => Some((CompassDirection::South, Step::Forward)),
            Action::DecreaseWindowHeight => Some((CompassDirection::South, Step::Backward)),
            _ => None,
        };
        if let Some((dir, step)) = resize {
            if let Some(window) = current {
                self.resize_window(window, dir, step);
            }
            return;
        }

        match action {
            Action::FocusNextWindow | Action::FocusPreviousWindow => {
                let step = if action == Action::FocusNextWindow {
                    Step::Forward
                } else {
                    Step::Backward
                };
                let include_hidden = self.is_layout_monocle_and_minimize_rest();
                self.focus_order(step, include_hidden);
            }
            Action::FocusDirection { direction } => self.focus_dir(direction),
            Action::MoveNextPosition => {
                if let Some(window) = current {
                    self.swap_order(window, Step::Forward);
                }
            }
            Action::MovePreviousPosition => {
                if let Some(window) = current {
                    self.swap_order(window, Step::Backward);
                }
            }
            Action::MoveDirection { direction } => self.swap_dir_or_move_float(direction),
            Action::MoveToSurface { direction } => self.move_to_surface_dir(direction),
            Action::ToggleFloat => {
                if let Some(window) = current {
                    self.toggle_float(window);
                }
            }
            Action::PushToMaster => {
                if let Some(window) = current {
                    self.set_master(window);
                }
            }
            Action::IncreaseMasterAreaWindowCount
            | Action::DecreaseMasterAreaWindowCount
            | Action::IncreaseMasterAreaSize
            | Action::DecreaseMasterAreaSize => self.notify("No Master Area", None),
            Action::Rotate | Action::RotateReverse | Action::RotatePart => {
                self.notify("Rotation Not Applicable", None)
            }
            Action::NextLayout => self.cycle_layout(Step::Forward),
            Action::PreviousLayout => self.cycle_layout(Step::Backward),
            Action::ToggleLayout { layout } => self.toggle_layout(layout),
            Action::SwapGroupToSurface { group } => self.swap_group_to_active_surface(group),
            Action::MoveWindowToGroup { group } => {
                self.move_window_to_group(group, None);
            }
            Action::IncreaseWindowWidth
            | Action::DecreaseWindowWidth
            | Action::IncreaseWindowHeight
            | Action::DecreaseWindowHeight => {}
        }
    }

    // ---- Events ----

    /// A new window appeared.
    ///
    /// A tile that overflows the capacity of the current layout moves on to
    /// the next desktop, and the compositor follows it there.
    pub fn on_window_added(&mut self, handle: Box<dyn WindowHandle>) -> Option<WindowId> {
        let id = self.manage(handle)?;
        if !self.windows.get(id).is_some_and(|w| w.is_tileable()) {
            return Some(id);
        }
        let Some(surface) = self.current_surface() else {
            return Some(id);
        };
        let Some(capacity) = self
            .layouts
            .current_layout(&surface, &self.persistence)
            .capacity()
        else {
            return Some(id);
        };
        let tiles = self.windows.visible_tileable_windows_on(&surface);
        if tiles.len() <= capacity || !tiles.contains(&id) {
            return Some(id);
        }
        let Some(next_desktop) = surface.next() else {
            return Some(id);
        };

        log::info!(
            "Surface {} is full, moving window {} to desktop {}",
            surface,
            id,
            next_desktop
        );
        let next = self.surface_at(surface.screen, &surface.activity, next_desktop);
        if let Some(window) = self.windows.get_mut(id) {
            window.group = next.group;
            window.set_surface(next);
        }
        self.compositor.switch_desktop(next_desktop);
        self.arrange(Some(&surface));
        self.arrange(None);
        Some(id)
    }

    pub fn on_window_removed(&mut self, id: WindowId) {
        self.unmanage(id);
        if self.is_layout_monocle_and_minimize_rest() && self.current_window().is_none() {
            log::debug!("Focusing a minimized window after removal");
            self.focus_order(Step::Forward, true);
        }
    }

    /// A drag is in progress: a tile over exactly one other tile trades places with it.
    pub fn on_window_move(&mut self, id: WindowId) {
        if self.windows.get(id).map(|w| w.state()) != Some(WindowState::Tiled) {
            return;
        }
        let Some(surface) = self.current_surface() else {
            return;
        };
        let Some(center) = self.windows.get(id).map(|w| w.actual_geometry().center()) else {
            return;
        };
        let targets: Vec<WindowId> = self
            .windows
            .visible_tiled_windows_on(&surface)
            .into_iter()
            .filter(|&tile| tile != id)
            .filter(|&tile| {
                self.windows
                    .get(tile)
                    .is_some_and(|w| w.actual_geometry().includes_point(center))
            })
            .collect();
        let [target] = targets[..] else {
            return;
        };

        if self.config.general.mouse_drag_insert {
            self.move_into_slot(id, target);
        } else if let Err(e) = self.windows.swap(id, target) {
            log::debug!("Drag swap: {}", e);
            return;
        }
        self.arrange(Some(&surface));
    }

    /// A drag ended. A tile dropped far from its slot floats, anything else snaps back.
    pub fn on_window_move_over(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        if self.config.general.untile_by_dragging && window.state() == WindowState::Tiled {
            let actual = window.actual_geometry();
            let distance = f64::hypot(
                (actual.x - window.geometry.x) as f64,
                (actual.y - window.geometry.y) as f64,
            );
            if distance > UNTILE_DISTANCE {
                if let Some(window) = self.windows.get_mut(id) {
                    window.float_geometry = actual;
                    window.set_state(WindowState::Floating);
                }
                let surface = self.resolve_surface(id);
                self.arrange(surface.as_ref());
                self.notify("Window Untiled", None);
                return;
            }
        }
        let config = &self.config.general;
        if let Some(window) = self.windows.get_mut(id) {
            window.commit(config);
        }
    }

    pub fn on_window_resize(&mut self, id: WindowId) {
        let general = &self.config.general;
        if !(general.adjust_layout && general.adjust_layout_live) {
            return;
        }
        if self.windows.get(id).map(|w| w.state()) == Some(WindowState::Tiled) {
            self.adjust_layout(id);
            let surface = self.resolve_surface(id);
            self.arrange(surface.as_ref());
        }
    }

    pub fn on_window_resize_over(&mut self, id: WindowId) {
        let tiled = self.windows.get(id).is_some_and(|w| w.is_tiled());
        if self.config.general.adjust_layout && tiled {
            self.adjust_layout(id);
            let surface = self.resolve_surface(id);
            self.arrange(surface.as_ref());
        } else {
            self.enforce_size(id);
        }
    }

    pub fn on_window_maximize_changed(&mut self, id: WindowId) {
        let surface = self.resolve_surface(id);
        self.arrange(surface.as_ref());
    }

    pub fn on_window_geometry_changed(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get(id) {
            log::debug!("Geometry of {} changed to {:?}", window, window.actual_geometry());
        }
        self.enforce_size(id);
    }

    /// The compositor moved a window to another screen: it joins that screen's group.
    pub fn on_window_screen_changed(&mut self, id: WindowId) {
        if let Some(surface) = self.screen_surface(id) {
            self.move_window_to_surface(id, &surface);
        }
    }

    pub fn on_window_minimize_changed(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(id) else {
            return;
        };
        let minimized = window.minimized();
        let saved = window.saved_config();
        log::debug!("Window {} minimized: {}", id, minimized);
        if !minimized {
            self.set_current_window(id);
        }
        self.persistence.set_window_config(id, &saved);
        let surface = self.resolve_surface(id);
        self.arrange(surface.as_ref());
    }

    pub fn on_window_focused(&mut self, id: WindowId) {
        self.clock += 1;
        let clock = self.clock;
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        window.timestamp = clock;
        if self.is_layout_monocle_and_minimize_rest() {
            self.minimize_others(id);
        }
    }

    pub fn on_window_shade_changed(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        let state = if window.shaded() {
            WindowState::Floating
        } else {
            window.state_previously_asked()
        };
        window.set_state(state);
        let surface = self.resolve_surface(id);
        self.arrange(surface.as_ref());
    }

    /// The active screen, desktop or activity changed.
    pub fn on_current_surface_changed(&mut self) {
        log::debug!("Current surface changed");
        self.arrange(None);
    }

    // ---- Inspection ----

    /// Capture the current state for inspection
    pub fn snapshot(&mut self) -> EngineSnapshot {
        let place = self.current_place();
        let surfaces = self
            .screens()
            .into_iter()
            .map(|surface| SurfaceSnapshot {
                layout: self.layouts.current_kind(&surface),
                screen: surface.screen,
                desktop: surface.desktop,
                group: surface.group,
                id: surface.id,
                working_area: surface.working_area,
            })
            .collect();
        let windows = self
            .windows
            .iter()
            .map(|w| WindowSnapshot {
                id: w.id(),
                state: w.state(),
                geometry: w.geometry,
                actual_geometry: w.actual_geometry(),
                group: w.group,
                screen: w.screen(),
                hidden: w.hidden(),
                minimized: w.minimized(),
                timestamp: w.timestamp,
            })
            .collect();
        EngineSnapshot {
            activity: place.as_ref().map(|(activity, _)| activity.clone()),
            desktop: place.map(|(_, desktop)| desktop),
            current_window: self.current_window(),
            surfaces,
            windows,
        }
    }
}

fn float_steps(area: Rect) -> (i32, i32) {
    (
        (area.width as f64 * FLOAT_STEP) as i32,
        (area.height as f64 * FLOAT_STEP) as i32,
    )
}
