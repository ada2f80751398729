//! Layout selection per surface.
//!
//! Each surface id owns its own set of layout instances, so rotating the
//! spiral on one screen does not rotate it on another. Instances are created
//! on first use with their persisted settings.

use std::collections::HashMap;

use crate::config::LayoutsConfig;
use crate::layout::{Layout, LayoutKind, WindowsLayout};
use crate::persist::Persistence;
use crate::surface::Surface;
use crate::types::{wrap_index, Step};

/// Layouts of one surface
#[derive(Debug)]
struct SurfaceLayouts {
    layouts: HashMap<LayoutKind, Layout>,
    current: LayoutKind,
    previous: Option<LayoutKind>,
}

/// Key of a layout instance in persisted state
pub fn layout_uid(surface: &Surface, kind: LayoutKind) -> String {
    format!("{}/{}", surface.id, kind.key())
}

/// Manages the layouts of every surface
#[derive(Debug)]
pub struct LayoutStore {
    config: LayoutsConfig,
    gap: i32,
    entries: HashMap<String, SurfaceLayouts>,
}

impl LayoutStore {
    /// Create a store choosing from `config.enabled`, tiles separated by `gap`
    pub fn new(config: &LayoutsConfig, gap: i32) -> Self {
        Self {
            config: config.clone(),
            gap,
            entries: HashMap::new(),
        }
    }

    fn default_kind(&self) -> LayoutKind {
        self.config.enabled.first().copied().unwrap_or(LayoutKind::Tile)
    }

    /// Kind of the layout active on `surface`
    pub fn current_kind(&self, surface: &Surface) -> LayoutKind {
        self.entries
            .get(&surface.id)
            .map_or_else(|| self.default_kind(), |entry| entry.current)
    }

    /// The layout active on `surface`, created on first use
    pub fn current_layout(&mut self, surface: &Surface, persistence: &Persistence) -> &mut Layout {
        let kind = self.current_kind(surface);
        self.select(surface, kind, persistence)
    }

    /// Move through the enabled layouts.
    ///
    /// Returns the new layout, or `None` when there is nothing to switch to.
    pub fn cycle_layout(
        &mut self,
        surface: &Surface,
        step: Step,
        persistence: &Persistence,
    ) -> Option<&mut Layout> {
        let current = self.current_kind(surface);
        let candidates = &self.config.enabled;
        let next = match candidates.iter().position(|k| *k == current) {
            Some(index) => candidates[wrap_index(index as i64 + step.value() as i64, candidates.len())],
            None => *candidates.first()?,
        };
        if next == current {
            return None;
        }
        self.remember_previous(surface, current);
        Some(self.select(surface, next, persistence))
    }

    /// Switch to `kind`, or back to the previous layout if `kind` is already active.
    ///
    /// Returns the new layout, or `None` when the selection did not change.
    pub fn toggle_layout(
        &mut self,
        surface: &Surface,
        kind: LayoutKind,
        persistence: &Persistence,
    ) -> Option<&mut Layout> {
        let current = self.current_kind(surface);
        let target = if current != kind {
            kind
        } else {
            let previous = self.entries.get(&surface.id).and_then(|e| e.previous)?;
            if previous == current {
                return None;
            }
            previous
        };
        self.remember_previous(surface, current);
        Some(self.select(surface, target, persistence))
    }

    /// Write the active layout's settings to `persistence`
    pub fn persist(&self, surface: &Surface, persistence: &mut Persistence) {
        let Some(entry) = self.entries.get(&surface.id) else {
            return;
        };
        if let Some(layout) = entry.layouts.get(&entry.current) {
            persistence.set_layout_state(&layout_uid(surface, entry.current), &layout.saved_state());
        }
    }

    fn remember_previous(&mut self, surface: &Surface, kind: LayoutKind) {
        self.entries
            .entry(surface.id.clone())
            .or_insert_with(|| SurfaceLayouts {
                layouts: HashMap::new(),
                current: kind,
                previous: None,
            })
            .previous = Some(kind);
    }

    /// Make `kind` current on `surface`, instantiating it if needed
    fn select(&mut self, surface: &Surface, kind: LayoutKind, persistence: &Persistence) -> &mut Layout {
        let entry = self
            .entries
            .entry(surface.id.clone())
            .or_insert_with(|| SurfaceLayouts {
                layouts: HashMap::new(),
                current: kind,
                previous: None,
            });
        entry.current = kind;
        let config = &self.config;
        let gap = self.gap;
        entry.layouts.entry(kind).or_insert_with(|| {
            log::debug!("Creating {} for surface {}", kind.name(), surface.id);
            Layout::new(kind, config, gap, persistence.layout_state(&layout_uid(surface, kind)))
        })
    }
}
