//! In-memory compositor and windows.
//!
//! These stand in for a real compositor adapter in tests and in the
//! `tesselctl simulate` command. Handles are cheap clones over shared state,
//! so a test keeps one clone to inspect what the engine committed while the
//! engine owns another.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::config::RulesConfig;
use crate::driver::{Compositor, WindowHandle, WindowId};
use crate::types::Rect;

/// One call to [`WindowHandle::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub geometry: Option<Rect>,
    pub no_border: Option<bool>,
    pub keep_above: Option<bool>,
}

type CommitHook = Box<dyn FnMut(WindowId)>;

struct WindowInner {
    id: WindowId,
    geometry: Rect,
    fullscreen: bool,
    maximized: bool,
    minimized: bool,
    shaded: bool,
    hidden: bool,
    screen: usize,
    desktop: Option<u32>,
    /// Empty means all activities
    activities: Vec<String>,
    interactive: bool,
    should_ignore: bool,
    should_float: bool,
    min_size: Option<(i32, i32)>,
    max_size: Option<(i32, i32)>,
    no_border: bool,
    no_border_managed: bool,
    no_border_original: bool,
    keep_above: bool,
    commits: Vec<CommitRecord>,
    commit_hook: Option<CommitHook>,
}

#[derive(Clone)]
pub struct HeadlessWindow {
    inner: Rc<RefCell<WindowInner>>,
}

impl HeadlessWindow {
    /// A plain tileable window on screen 0, desktop 1.
    pub fn new(id: u64, geometry: Rect) -> Self {
        Self {
            inner: Rc::new(RefCell::new(WindowInner {
                id: WindowId(id),
                geometry,
                fullscreen: false,
                maximized: false,
                minimized: false,
                shaded: false,
                hidden: false,
                screen: 0,
                desktop: Some(1),
                activities: Vec::new(),
                interactive: false,
                should_ignore: false,
                should_float: false,
                min_size: None,
                max_size: None,
                no_border: false,
                no_border_managed: false,
                no_border_original: false,
                keep_above: false,
                commits: Vec::new(),
                commit_hook: None,
            })),
        }
    }

    pub fn on_screen(self, screen: usize) -> Self {
        self.inner.borrow_mut().screen = screen;
        self
    }

    /// `None` puts the window on all desktops
    pub fn on_desktop(self, desktop: Option<u32>) -> Self {
        self.inner.borrow_mut().desktop = desktop;
        self
    }

    pub fn on_activities(self, activities: &[&str]) -> Self {
        self.inner.borrow_mut().activities = activities.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn floating(self, should_float: bool) -> Self {
        self.inner.borrow_mut().should_float = should_float;
        self
    }

    pub fn ignored(self, should_ignore: bool) -> Self {
        self.inner.borrow_mut().should_ignore = should_ignore;
        self
    }

    /// Derive the float and ignore hints from class and title rules
    pub fn classified(self, class: &str, title: &str, rules: &RulesConfig) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            inner.should_ignore |= rules.should_ignore(class, title);
            inner.should_float |= rules.should_float(class, title);
        }
        self
    }

    pub fn with_min_size(self, width: i32, height: i32) -> Self {
        self.inner.borrow_mut().min_size = Some((width, height));
        self
    }

    pub fn with_max_size(self, width: i32, height: i32) -> Self {
        self.inner.borrow_mut().max_size = Some((width, height));
        self
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.inner.borrow_mut().fullscreen = fullscreen;
    }

    pub fn set_maximized(&self, maximized: bool) {
        self.inner.borrow_mut().maximized = maximized;
    }

    pub fn set_shaded(&self, shaded: bool) {
        self.inner.borrow_mut().shaded = shaded;
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.inner.borrow_mut().interactive = interactive;
    }

    /// Change the geometry as the user would, without a commit
    pub fn move_to(&self, geometry: Rect) {
        self.inner.borrow_mut().geometry = geometry;
    }

    /// Called after every commit, with the handle released
    pub fn set_commit_hook(&self, hook: impl FnMut(WindowId) + 'static) {
        self.inner.borrow_mut().commit_hook = Some(Box::new(hook));
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.inner.borrow().commits.clone()
    }

    pub fn clear_commits(&self) {
        self.inner.borrow_mut().commits.clear();
    }

    pub fn has_border(&self) -> bool {
        !self.inner.borrow().no_border
    }

    pub fn keep_above(&self) -> bool {
        self.inner.borrow().keep_above
    }

    fn adjust_geometry(inner: &WindowInner, geometry: Rect) -> Rect {
        let mut width = geometry.width;
        let mut height = geometry.height;
        if let Some((max_w, max_h)) = inner.max_size {
            width = width.min(max_w);
            height = height.min(max_h);
        }
        if let Some((min_w, min_h)) = inner.min_size {
            width = width.max(min_w);
            height = height.max(min_h);
        }
        Rect::new(geometry.x, geometry.y, width, height)
    }
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HeadlessWindow")
            .field("id", &inner.id)
            .field("geometry", &inner.geometry)
            .field("screen", &inner.screen)
            .field("desktop", &inner.desktop)
            .finish()
    }
}

impl WindowHandle for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.inner.borrow().id
    }

    fn geometry(&self) -> Rect {
        self.inner.borrow().geometry
    }

    fn fullscreen(&self) -> bool {
        self.inner.borrow().fullscreen
    }

    fn maximized(&self) -> bool {
        self.inner.borrow().maximized
    }

    fn minimized(&self) -> bool {
        self.inner.borrow().minimized
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.inner.borrow_mut().minimized = minimized;
    }

    fn shaded(&self) -> bool {
        self.inner.borrow().shaded
    }

    fn should_ignore(&self) -> bool {
        self.inner.borrow().should_ignore
    }

    fn should_float(&self) -> bool {
        self.inner.borrow().should_float
    }

    fn screen(&self) -> usize {
        self.inner.borrow().screen
    }

    fn set_screen(&mut self, screen: usize) {
        self.inner.borrow_mut().screen = screen;
    }

    fn desktop(&self) -> Option<u32> {
        self.inner.borrow().desktop
    }

    fn set_desktop(&mut self, desktop: u32) {
        self.inner.borrow_mut().desktop = Some(desktop);
    }

    fn hidden(&self) -> bool {
        self.inner.borrow().hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.inner.borrow_mut().hidden = hidden;
    }

    fn interactive(&self) -> bool {
        self.inner.borrow().interactive
    }

    fn commit(&mut self, geometry: Option<Rect>, no_border: Option<bool>, keep_above: Option<bool>) {
        let hook = {
            let mut inner = self.inner.borrow_mut();
            inner.commits.push(CommitRecord {
                geometry,
                no_border,
                keep_above,
            });

            if let Some(no_border) = no_border {
                if !inner.no_border_managed && no_border {
                    // Entering managed mode: back up the border state
                    inner.no_border_original = inner.no_border;
                } else if inner.no_border_managed && !inner.no_border {
                    inner.no_border_original = false;
                }
                if no_border {
                    inner.no_border = true;
                } else if inner.no_border_managed {
                    inner.no_border = inner.no_border_original;
                }
                inner.no_border_managed = no_border;
            }

            if let Some(keep_above) = keep_above {
                inner.keep_above = keep_above;
            }

            if let Some(geometry) = geometry {
                inner.geometry = Self::adjust_geometry(&inner, geometry);
            }
            inner.commit_hook.take()
        };

        if let Some(mut hook) = hook {
            let id = self.id();
            hook(id);
            let mut inner = self.inner.borrow_mut();
            if inner.commit_hook.is_none() {
                inner.commit_hook = Some(hook);
            }
        }
    }

    fn visible(&self, activity: &str, desktop: u32) -> bool {
        let inner = self.inner.borrow();
        !inner.minimized
            && inner.desktop.is_none_or(|d| d == desktop)
            && (inner.activities.is_empty() || inner.activities.iter().any(|a| a == activity))
    }
}

/// Popup recorded by the headless compositor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub text: String,
    pub icon: Option<String>,
    pub hint: Option<String>,
}

struct CompositorInner {
    activity: Option<String>,
    desktop: Option<u32>,
    desktop_count: u32,
    /// Working area per screen, shared by every desktop
    screens: Vec<Rect>,
    active_screen: usize,
    active_window: Option<WindowId>,
    notifications: Vec<Notification>,
}

#[derive(Clone)]
pub struct HeadlessCompositor {
    inner: Rc<RefCell<CompositorInner>>,
}

impl HeadlessCompositor {
    /// Compositor on activity "default", desktop 1 of `desktop_count`
    pub fn new(screens: Vec<Rect>, desktop_count: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CompositorInner {
                activity: Some("default".to_string()),
                desktop: Some(1),
                desktop_count: desktop_count.max(1),
                screens,
                active_screen: 0,
                active_window: None,
                notifications: Vec::new(),
            })),
        }
    }

    pub fn set_current_desktop(&self, desktop: Option<u32>) {
        self.inner.borrow_mut().desktop = desktop;
    }

    pub fn set_current_activity(&self, activity: Option<&str>) {
        self.inner.borrow_mut().activity = activity.map(str::to_string);
    }

    pub fn set_active_screen(&self, screen: usize) {
        self.inner.borrow_mut().active_screen = screen;
    }

    pub fn set_working_area(&self, screen: usize, area: Rect) {
        if let Some(slot) = self.inner.borrow_mut().screens.get_mut(screen) {
            *slot = area;
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.borrow().notifications.clone()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.inner.borrow().active_window
    }
}

impl Compositor for HeadlessCompositor {
    fn current_activity(&self) -> Option<String> {
        self.inner.borrow().activity.clone()
    }

    fn current_desktop(&self) -> Option<u32> {
        self.inner.borrow().desktop
    }

    fn desktop_count(&self) -> u32 {
        self.inner.borrow().desktop_count
    }

    fn screen_count(&self) -> usize {
        self.inner.borrow().screens.len()
    }

    fn active_screen(&self) -> usize {
        self.inner.borrow().active_screen
    }

    fn working_area(&self, screen: usize, _desktop: u32) -> Rect {
        self.inner
            .borrow()
            .screens
            .get(screen)
            .copied()
            .unwrap_or_default()
    }

    fn switch_desktop(&mut self, desktop: u32) {
        log::debug!("Switching to desktop {}", desktop);
        self.inner.borrow_mut().desktop = Some(desktop);
    }

    fn active_window(&self) -> Option<WindowId> {
        self.inner.borrow().active_window
    }

    fn set_active_window(&mut self, window: WindowId) {
        self.inner.borrow_mut().active_window = Some(window);
    }

    fn show_notification(&mut self, text: &str, icon: Option<&str>, hint: Option<&str>) {
        log::info!("Notification: {} {}", text, hint.unwrap_or(""));
        self.inner.borrow_mut().notifications.push(Notification {
            text: text.to_string(),
            icon: icon.map(str::to_string),
            hint: hint.map(str::to_string),
        });
    }
}
