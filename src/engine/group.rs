//! Virtual groups: moving windows between groups and groups between screens.
//!
//! Each screen of a desktop shows one group at a time. The mapping lives in
//! the persisted group map, so every surface built after a remap sees it.

use super::Engine;
use crate::driver::WindowId;
use crate::surface::Surface;

impl Engine {
    /// Move a window (the current one when `window` is `None`) into `group`.
    ///
    /// The window shows up on the screen mapping the group, or is hidden
    /// when no screen of the current desktop does. Returns the surface the
    /// window left.
    pub fn move_window_to_group(&mut self, group: i32, window: Option<WindowId>) -> Option<Surface> {
        let id = window.or_else(|| self.current_window())?;
        let old_group = self.windows.get(id)?.group;
        self.notify("Move window to group", Some(group.to_string()));

        let screens = self.screens();
        let old_surface = screens.iter().find(|s| s.group == old_group).cloned();
        let target = screens.into_iter().find(|s| s.group == group);
        log::info!("Moving window {} from group {} to group {}", id, old_group, group);

        let window = self.windows.get_mut(id)?;
        window.group = group;
        match &target {
            Some(surface) => {
                window.set_surface(surface.clone());
                window.set_hidden(false);
            }
            None => window.set_hidden(true),
        }
        let saved = window.saved_config();
        self.persistence.set_window_config(id, &saved);

        if let Some(old) = &old_surface {
            self.arrange(Some(old));
        }
        if let Some(target) = &target {
            self.arrange(Some(target));
        }
        old_surface
    }

    /// Move a window onto `surface`, joining the group it shows.
    pub fn move_window_to_surface(&mut self, id: WindowId, surface: &Surface) {
        log::debug!("Moving window {} to {}", id, surface);
        self.move_window_to_group(surface.group, Some(id));
    }

    /// Show `group` on `screen` of the current desktop.
    ///
    /// The group previously shown there moves to the screen `group` came
    /// from, or stays hidden when `group` was not shown anywhere.
    pub fn swap_group_to_surface(&mut self, group: i32, screen: usize) {
        let Some((activity, desktop)) = self.current_place() else {
            return;
        };
        let old_screen = self
            .screens()
            .into_iter()
            .find(|s| s.group == group)
            .map(|s| s.screen);

        self.remap_group(group, screen, &activity, desktop);

        let surface = self.surface_at(screen, &activity, desktop);
        self.arrange(Some(&surface));
        if let Some(old_screen) = old_screen.filter(|&s| s != screen) {
            let old = self.surface_at(old_screen, &activity, desktop);
            self.arrange(Some(&old));
        }
    }

    fn remap_group(&mut self, group: i32, screen: usize, activity: &str, desktop: u32) {
        let surface = self.surface_at(screen, activity, desktop);
        let displaced = surface.group;
        if displaced == group {
            return;
        }
        self.set_group_hidden(&surface, true);

        let holder = (0..self.compositor.screen_count())
            .filter(|&s| s != screen)
            .find(|&s| self.surface_at(s, activity, desktop).group == group);
        match holder {
            Some(other) => {
                log::info!("Group {} moves to screen {}", displaced, other);
                self.persistence.set_surface_group(desktop, other, displaced);
                let fresh = self.surface_at(other, activity, desktop);
                self.set_group_hidden(&fresh, false);
            }
            None => log::info!("Group {} is no longer shown", displaced),
        }

        log::info!("Showing group {} on screen {}", group, screen);
        self.persistence.set_surface_group(desktop, screen, group);
        let fresh = self.surface_at(screen, activity, desktop);
        self.set_group_hidden(&fresh, false);
    }

    fn set_group_hidden(&mut self, surface: &Surface, hidden: bool) {
        for id in self.windows.visible_windows_on(surface) {
            if let Some(window) = self.windows.get_mut(id) {
                window.set_hidden(hidden);
            }
        }
    }

    /// Recall `group` to the active screen and focus its first tile.
    pub fn swap_group_to_active_surface(&mut self, group: i32) {
        self.notify("Recall group", Some(group.to_string()));
        let screen = self.compositor.active_screen();
        self.swap_group_to_surface(group, screen);

        let Some(surface) = self.current_surface() else {
            return;
        };
        if let Some(&first) = self.windows.visible_tiled_windows_on(&surface).first() {
            self.set_current_window(first);
        }
    }
}
