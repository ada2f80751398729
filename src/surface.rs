//! Surfaces: one screen on one activity and desktop.
//!
//! A surface is a plain value. The engine builds surfaces on demand from the
//! compositor and the persisted group map, so a surface never goes stale for
//! longer than one event.

use std::fmt;

use serde::Serialize;

use crate::config::GeneralConfig;
use crate::types::Rect;

/// Group value meaning "not mapped to any screen"
pub const UNMAPPED_GROUP: i32 = -1;

/// Addressable screen region for a given activity and desktop.
#[derive(Debug, Clone, Serialize)]
pub struct Surface {
    pub screen: usize,
    pub activity: String,
    pub desktop: u32,
    /// Number of desktops at construction, bounds `next()`
    pub desktop_count: u32,
    /// Area in which windows are placed
    pub working_area: Rect,
    /// Virtual group currently shown on this surface
    pub group: i32,
    /// Layout Store key
    pub id: String,
}

impl Surface {
    pub fn new(
        screen: usize,
        activity: &str,
        desktop: u32,
        desktop_count: u32,
        working_area: Rect,
        group: i32,
        config: &GeneralConfig,
    ) -> Self {
        let mut id = screen.to_string();
        if config.layout_per_activity {
            id.push('@');
            id.push_str(activity);
        }
        if config.layout_per_desktop {
            id.push('#');
            id.push_str(&desktop.to_string());
        }

        Self {
            screen,
            activity: activity.to_string(),
            desktop,
            desktop_count,
            working_area,
            group,
            id,
        }
    }

    /// Desktop of the surface that follows this one on the same screen.
    ///
    /// `None` on the last desktop. The engine turns the returned desktop
    /// into a full surface, since the working area and group come from
    /// outside.
    pub fn next(&self) -> Option<u32> {
        if self.desktop >= self.desktop_count {
            None
        } else {
            Some(self.desktop + 1)
        }
    }

    pub fn same_place(&self, screen: usize, activity: &str, desktop: u32) -> bool {
        self.screen == screen && self.activity == activity && self.desktop == desktop
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.same_place(other.screen, &other.activity, other.desktop)
    }
}

impl Eq for Surface {}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface({}, {}, {}, group {})",
            self.screen, self.activity, self.desktop, self.group
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(config: &GeneralConfig, desktop: u32) -> Surface {
        Surface::new(1, "work", desktop, 4, Rect::new(0, 0, 100, 100), 2, config)
    }

    #[test]
    fn test_id_per_activity_and_desktop() {
        let config = GeneralConfig::default();
        assert_eq!(surface(&config, 3).id, "1@work#3");

        let config = GeneralConfig {
            layout_per_activity: false,
            ..Default::default()
        };
        assert_eq!(surface(&config, 3).id, "1#3");

        let config = GeneralConfig {
            layout_per_activity: false,
            layout_per_desktop: false,
            ..Default::default()
        };
        assert_eq!(surface(&config, 3).id, "1");
    }

    #[test]
    fn test_next_stops_at_last_desktop() {
        let config = GeneralConfig::default();
        assert_eq!(surface(&config, 1).next(), Some(2));
        assert_eq!(surface(&config, 4).next(), None);
    }

    #[test]
    fn test_equality_ignores_group_and_area() {
        let config = GeneralConfig::default();
        let a = surface(&config, 1);
        let mut b = a.clone();
        b.group = 9;
        b.working_area = Rect::new(5, 5, 5, 5);
        assert_eq!(a, b);
        assert_ne!(a, surface(&config, 2));
    }
}
