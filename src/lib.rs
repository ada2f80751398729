//! tessel - a tiling window arrangement engine
//!
//! The engine keeps an ordered list of managed windows, runs each one
//! through a small state machine (tiled, floating, maximized, ...) and
//! arranges the tileable ones on every screen with one of a fixed set of
//! layouts. It never talks to a compositor itself: a driver hands it
//! [`driver::WindowHandle`] and [`driver::Compositor`] implementations and
//! forwards events through a [`controller::Controller`].
//!
//! The [`headless`] module provides in-memory collaborators, used by the
//! tests and by `tesselctl simulate`.

pub mod action;
pub mod config;
pub mod controller;
pub mod driver;
pub mod engine;
pub mod event_log;
pub mod headless;
pub mod layout;
pub mod layout_store;
pub mod persist;
pub mod snapshot;
pub mod state;
pub mod surface;
pub mod types;
pub mod window;
pub mod window_store;
