//! Event dispatch with a re-entrancy latch.
//!
//! Compositors echo our own commits back as geometry and screen events
//! while we are still arranging. Those echoes must not reach the engine:
//! an event arriving while another one is in flight is dropped (not
//! queued) and recorded in the event log.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::driver::{WindowHandle, WindowId};
use crate::engine::Engine;
use crate::event_log::{EventLog, EventOutcome};
use crate::snapshot::EngineSnapshot;

/// Something that happened on the compositor side, or a user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    WindowRemoved { window: WindowId },
    WindowFocused { window: WindowId },
    /// Interactive move in progress
    WindowMove { window: WindowId },
    WindowMoveOver { window: WindowId },
    /// Interactive resize in progress
    WindowResize { window: WindowId },
    WindowResizeOver { window: WindowId },
    WindowGeometryChanged { window: WindowId },
    WindowScreenChanged { window: WindowId },
    WindowMaximizeChanged { window: WindowId },
    WindowMinimizeChanged { window: WindowId },
    WindowShadeChanged { window: WindowId },
    /// The active activity or desktop switched
    CurrentSurfaceChanged,
    Action(Action),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::WindowRemoved { .. } => "window_removed",
            Event::WindowFocused { .. } => "window_focused",
            Event::WindowMove { .. } => "window_move",
            Event::WindowMoveOver { .. } => "window_move_over",
            Event::WindowResize { .. } => "window_resize",
            Event::WindowResizeOver { .. } => "window_resize_over",
            Event::WindowGeometryChanged { .. } => "window_geometry_changed",
            Event::WindowScreenChanged { .. } => "window_screen_changed",
            Event::WindowMaximizeChanged { .. } => "window_maximize_changed",
            Event::WindowMinimizeChanged { .. } => "window_minimize_changed",
            Event::WindowShadeChanged { .. } => "window_shade_changed",
            Event::CurrentSurfaceChanged => "current_surface_changed",
            Event::Action(_) => "action",
        }
    }

    /// The window the event is about, if any
    pub fn window(&self) -> Option<WindowId> {
        match *self {
            Event::WindowRemoved { window }
            | Event::WindowFocused { window }
            | Event::WindowMove { window }
            | Event::WindowMoveOver { window }
            | Event::WindowResize { window }
            | Event::WindowResizeOver { window }
            | Event::WindowGeometryChanged { window }
            | Event::WindowScreenChanged { window }
            | Event::WindowMaximizeChanged { window }
            | Event::WindowMinimizeChanged { window }
            | Event::WindowShadeChanged { window } => Some(window),
            Event::CurrentSurfaceChanged | Event::Action(_) => None,
        }
    }
}

/// Clears the in-flight flag when the handler returns or unwinds
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Owns the engine and serializes every entry into it
pub struct Controller {
    engine: RefCell<Engine>,
    in_flight: Cell<bool>,
    log: RefCell<EventLog>,
}

impl Controller {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: RefCell::new(engine),
            in_flight: Cell::new(false),
            log: RefCell::new(EventLog::new()),
        }
    }

    /// Take the latch, or record the event as dropped
    fn enter(&self, name: &str, window: Option<WindowId>) -> Option<InFlight<'_>> {
        if self.in_flight.replace(true) {
            log::debug!("Dropping {} for {:?}: another event is in flight", name, window);
            self.record(name, window, EventOutcome::Dropped);
            return None;
        }
        Some(InFlight(&self.in_flight))
    }

    fn record(&self, name: &str, window: Option<WindowId>, outcome: EventOutcome) {
        if let Ok(mut log) = self.log.try_borrow_mut() {
            log.record(name, window, outcome);
        }
    }

    /// Offer a new window to the engine. Returns its id when it got managed.
    pub fn add_window(&self, handle: Box<dyn WindowHandle>) -> Option<WindowId> {
        let id = handle.id();
        let _guard = self.enter("window_added", Some(id))?;
        let managed = self.engine.try_borrow_mut().ok()?.on_window_added(handle);
        self.record("window_added", Some(id), EventOutcome::Handled);
        managed
    }

    /// Deliver an event. Returns `false` when it was dropped.
    pub fn dispatch(&self, event: Event) -> bool {
        let name = event.name();
        let window = event.window();
        let Some(_guard) = self.enter(name, window) else {
            return false;
        };
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            self.record(name, window, EventOutcome::Dropped);
            return false;
        };

        log::debug!("Dispatching {} for {:?}", name, window);
        match event {
            Event::WindowRemoved { window } => engine.on_window_removed(window),
            Event::WindowFocused { window } => engine.on_window_focused(window),
            Event::WindowMove { window } => engine.on_window_move(window),
            Event::WindowMoveOver { window } => engine.on_window_move_over(window),
            Event::WindowResize { window } => engine.on_window_resize(window),
            Event::WindowResizeOver { window } => engine.on_window_resize_over(window),
            Event::WindowGeometryChanged { window } => engine.on_window_geometry_changed(window),
            Event::WindowScreenChanged { window } => engine.on_window_screen_changed(window),
            Event::WindowMaximizeChanged { window } => engine.on_window_maximize_changed(window),
            Event::WindowMinimizeChanged { window } => engine.on_window_minimize_changed(window),
            Event::WindowShadeChanged { window } => engine.on_window_shade_changed(window),
            Event::CurrentSurfaceChanged => engine.on_current_surface_changed(),
            Event::Action(action) => engine.execute(action),
        }
        drop(engine);

        self.record(name, window, EventOutcome::Handled);
        true
    }

    pub fn execute(&self, action: Action) -> bool {
        self.dispatch(Event::Action(action))
    }

    /// Run `f` against the engine, unless an event is in flight
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
        if self.in_flight.get() {
            return None;
        }
        let mut engine = self.engine.try_borrow_mut().ok()?;
        Some(f(&mut engine))
    }

    pub fn snapshot(&self) -> Option<EngineSnapshot> {
        self.with_engine(|engine| engine.snapshot())
    }

    pub fn event_log(&self) -> std::cell::Ref<'_, EventLog> {
        self.log.borrow()
    }

    pub fn into_engine(self) -> Engine {
        self.engine.into_inner()
    }
}
