//! Ordered collection of managed windows.
//!
//! The order is the layout order: the first tileable window on a surface is
//! the master. Every query walks the collection in order and returns ids, so
//! callers never hold a borrow across a mutation.

use thiserror::Error;

use crate::driver::WindowId;
use crate::surface::Surface;
use crate::window::ManagedWindow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("window {0} is not managed")]
    NotFound(WindowId),
    #[error("window {0} is already managed")]
    DuplicateKey(WindowId),
}

#[derive(Debug, Default)]
pub struct WindowStore {
    windows: Vec<ManagedWindow>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id() == id)
    }

    fn index_of(&self, id: WindowId) -> Result<usize, StoreError> {
        self.position(id).ok_or(StoreError::NotFound(id))
    }

    pub fn get(&self, id: WindowId) -> Option<&ManagedWindow> {
        self.windows.iter().find(|w| w.id() == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ManagedWindow> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedWindow> {
        self.windows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ManagedWindow> {
        self.windows.iter_mut()
    }

    /// All ids in order
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.id()).collect()
    }

    /// Append at the end.
    pub fn push(&mut self, window: ManagedWindow) -> Result<(), StoreError> {
        if self.contains(window.id()) {
            return Err(StoreError::DuplicateKey(window.id()));
        }
        self.windows.push(window);
        Ok(())
    }

    /// Insert at the front, making the window the master.
    pub fn unshift(&mut self, window: ManagedWindow) -> Result<(), StoreError> {
        if self.contains(window.id()) {
            return Err(StoreError::DuplicateKey(window.id()));
        }
        self.windows.insert(0, window);
        Ok(())
    }

    pub fn remove(&mut self, id: WindowId) -> Result<ManagedWindow, StoreError> {
        let index = self.index_of(id)?;
        Ok(self.windows.remove(index))
    }

    /// Move `id` next to `target`: before it, or after it when `after` is set.
    pub fn move_window(&mut self, id: WindowId, target: WindowId, after: bool) -> Result<(), StoreError> {
        let from = self.index_of(id)?;
        self.index_of(target)?;
        if id == target {
            return Ok(());
        }
        let window = self.windows.remove(from);
        let to = self.index_of(target)?;
        let to = if after { to + 1 } else { to };
        self.windows.insert(to, window);
        Ok(())
    }

    /// Exchange the positions of two windows.
    pub fn swap(&mut self, a: WindowId, b: WindowId) -> Result<(), StoreError> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.windows.swap(ia, ib);
        Ok(())
    }

    /// Move a window to the front.
    pub fn put_window_to_master(&mut self, id: WindowId) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        let window = self.windows.remove(index);
        self.windows.insert(0, window);
        Ok(())
    }

    fn filter_ids(&self, pred: impl Fn(&ManagedWindow) -> bool) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|w| pred(w))
            .map(|w| w.id())
            .collect()
    }

    /// Windows placed on the surface, minimized ones included
    pub fn all_windows_on(&self, surface: &Surface) -> Vec<WindowId> {
        self.filter_ids(|w| w.group == surface.group && w.surface.as_ref() == Some(surface))
    }

    pub fn visible_windows_on(&self, surface: &Surface) -> Vec<WindowId> {
        self.filter_ids(|w| w.visible_on(surface))
    }

    pub fn visible_tiled_windows_on(&self, surface: &Surface) -> Vec<WindowId> {
        self.filter_ids(|w| w.is_tiled() && w.visible_on(surface))
    }

    pub fn visible_tileable_windows_on(&self, surface: &Surface) -> Vec<WindowId> {
        self.filter_ids(|w| w.is_tileable() && w.visible_on(surface))
    }

    /// Windows visible on the desktop, any group
    pub fn visible_windows(&self, activity: &str, desktop: u32) -> Vec<WindowId> {
        self.filter_ids(|w| w.visible(activity, desktop))
    }

    pub fn visible_tiled_windows(&self, activity: &str, desktop: u32) -> Vec<WindowId> {
        self.filter_ids(|w| w.is_tiled() && w.visible(activity, desktop))
    }
}
