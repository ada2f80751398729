//! Directional navigation between tiles and between surfaces.

use super::Engine;
use crate::driver::WindowId;
use crate::surface::Surface;
use crate::types::{overlap, Direction, Rect};
use crate::window_store::WindowStore;

/// Tiles a few pixels out of line still count as the closest ones
const EDGE_TOLERANCE: i32 = 5;

/// The tile from `pool` next to `origin` in direction `dir`.
///
/// Candidates lie strictly on the requested side and overlap `origin` on the
/// perpendicular axis. Among the ones whose near edge is within
/// [`EDGE_TOLERANCE`] of the closest edge, the most recently focused wins.
pub(crate) fn closest_neighbor(
    windows: &WindowStore,
    origin: Rect,
    pool: &[WindowId],
    dir: Direction,
) -> Option<WindowId> {
    let sign = if dir.is_forward() { 1 } else { -1 };
    let candidates: Vec<(WindowId, Rect, u64)> = pool
        .iter()
        .filter_map(|&id| windows.get(id).map(|w| (id, w.geometry, w.timestamp)))
        .filter(|(_, g, _)| {
            if dir.is_vertical() {
                g.y * sign > origin.y * sign && overlap(origin.x, origin.max_x(), g.x, g.max_x())
            } else {
                g.x * sign > origin.x * sign && overlap(origin.y, origin.max_y(), g.y, g.max_y())
            }
        })
        .collect();

    let edges = candidates.iter().map(|(_, g, _)| *g);
    let closest = match dir {
        Direction::Up => edges.map(|g| g.max_y()).max()?,
        Direction::Down => edges.map(|g| g.y).min()?,
        Direction::Left => edges.map(|g| g.max_x()).max()?,
        Direction::Right => edges.map(|g| g.x).min()?,
    };

    candidates
        .into_iter()
        .filter(|(_, g, _)| match dir {
            Direction::Up => g.max_y() > closest - EDGE_TOLERANCE,
            Direction::Down => g.y < closest + EDGE_TOLERANCE,
            Direction::Left => g.max_x() > closest - EDGE_TOLERANCE,
            Direction::Right => g.x < closest + EDGE_TOLERANCE,
        })
        .min_by_key(|&(_, _, timestamp)| std::cmp::Reverse(timestamp))
        .map(|(id, _, _)| id)
}

/// The surface next to `origin` in direction `dir`, by distance between centres.
pub(crate) fn closest_surface(origin: Rect, surfaces: &[Surface], dir: Direction) -> Option<Surface> {
    let (cx, cy) = origin.center();
    surfaces
        .iter()
        .filter(|surface| {
            let area = surface.working_area;
            let (sx, sy) = area.center();
            match dir {
                Direction::Up => sy < cy && overlap(area.x, area.max_x(), origin.x, origin.max_x()),
                Direction::Down => sy > cy && overlap(area.x, area.max_x(), origin.x, origin.max_x()),
                Direction::Left => sx < cx && overlap(area.y, area.max_y(), origin.y, origin.max_y()),
                Direction::Right => sx > cx && overlap(area.y, area.max_y(), origin.y, origin.max_y()),
            }
        })
        .map(|surface| {
            let (sx, sy) = surface.working_area.center();
            (surface, f64::hypot((sx - cx) as f64, (sy - cy) as f64))
        })
        .fold(None, |best: Option<(&Surface, f64)>, (surface, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((surface, distance)),
        })
        .map(|(surface, _)| surface.clone())
}

impl Engine {
    /// Visible tiles a directional search may land on
    fn neighbor_pool(&self, surface: &Surface, whole_desktop: bool) -> Vec<WindowId> {
        if whole_desktop {
            self.windows
                .visible_tiled_windows(&surface.activity, surface.desktop)
        } else {
            self.windows.visible_tiled_windows_on(surface)
        }
    }

    /// Focus the tile next to the current window.
    pub fn focus_dir(&mut self, dir: Direction) {
        let Some(surface) = self.current_surface() else {
            return;
        };
        let Some(current) = self.current_window() else {
            if let Some(&first) = self.windows.visible_windows_on(&surface).first() {
                self.set_current_window(first);
            }
            return;
        };
        let Some(origin) = self.windows.get(current).map(|w| w.geometry) else {
            return;
        };
        let pool = self.neighbor_pool(&surface, self.config.general.move_between_surfaces);
        if let Some(neighbor) = closest_neighbor(&self.windows, origin, &pool, dir) {
            self.set_current_window(neighbor);
        }
    }

    /// Trade places with the tile next to the current window.
    ///
    /// With `move_between_surfaces`, a window at the edge of its screen moves
    /// to the closest surface in that direction instead, landing in the slot
    /// nearest to where it came from.
    pub fn swap_direction(&mut self, dir: Direction) {
        let Some(current_surface) = self.current_surface() else {
            return;
        };
        let Some(window) = self.current_window() else {
            let tiles = self.windows.visible_tiled_windows_on(&current_surface);
            if tiles.len() > 1 {
                self.set_current_window(tiles[0]);
            }
            return;
        };
        let Some(surface) = self.resolve_surface(window) else {
            return;
        };
        let Some(origin) = self.windows.get(window).map(|w| w.geometry) else {
            return;
        };

        let pool = self.neighbor_pool(&surface, true);
        let neighbor = closest_neighbor(&self.windows, origin, &pool, dir);
        let neighbor_surface = match neighbor {
            Some(neighbor) => self.resolve_surface(neighbor),
            None => None,
        };
        log::debug!("Swap neighbor of {} towards {:?}: {:?}", window, dir, neighbor);

        if let (Some(neighbor), Some(other)) = (neighbor, &neighbor_surface) {
            if *other == surface {
                let before = self.windows.visible_windows_on(&surface);
                self.move_into_slot(window, neighbor);
                let after = self.windows.visible_windows_on(&surface);
                let index = |ids: &[WindowId]| ids.iter().position(|&w| w == window);
                if index(&before) == index(&after) {
                    if let Err(e) = self.windows.swap(window, neighbor) {
                        log::debug!("Swap: {}", e);
                    }
                }
                return;
            }
        }
        if !self.config.general.move_between_surfaces {
            return;
        }

        let others: Vec<Surface> = self
            .screens()
            .into_iter()
            .filter(|s| *s != surface)
            .collect();
        let Some(closest) = closest_surface(origin, &others, dir) else {
            return;
        };

        if neighbor_surface.as_ref() == Some(&closest) {
            log::info!("Moving {} next to its neighbour on {}", window, closest);
            if let Some(managed) = self.windows.get_mut(window) {
                managed.group = closest.group;
                managed.set_surface(closest.clone());
                let saved = managed.saved_config();
                self.persistence.set_window_config(window, &saved);
            }
            // Lay the window out on its new surface before picking the slot
            self.arrange_screen(&closest);
            let pool = self.neighbor_pool(&closest, false);
            if let Some(slot) = closest_neighbor(&self.windows, origin, &pool, dir) {
                self.move_into_slot(window, slot);
            }
            self.arrange(Some(&surface));
            self.arrange(Some(&closest));
        } else {
            log::info!("Moving {} to {}", window, closest);
            self.move_window_to_surface(window, &closest);
        }
    }

    /// Move floating windows, swap tiled ones.
    pub fn swap_dir_or_move_float(&mut self, dir: Direction) {
        match self.current_window() {
            Some(window) if self.windows.get(window).is_some_and(|w| w.is_floating()) => {
                self.move_float(window, dir);
            }
            _ => self.swap_direction(dir),
        }
    }

    /// Send the current window to the closest surface in direction `dir`.
    pub fn move_to_surface_dir(&mut self, dir: Direction) {
        let Some(window) = self.current_window() else {
            return;
        };
        let Some(surface) = self.resolve_surface(window) else {
            return;
        };
        let Some(origin) = self.windows.get(window).map(|w| w.geometry) else {
            return;
        };
        let others: Vec<Surface> = self
            .screens()
            .into_iter()
            .filter(|s| *s != surface)
            .collect();
        if let Some(closest) = closest_surface(origin, &others, dir) {
            self.move_window_to_surface(window, &closest);
        }
    }
}
