//! Headless scenarios driving the engine end to end.

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use tessel::action::Action;
use tessel::config::Config;
use tessel::controller::{Controller, Event};
use tessel::driver::{Compositor, WindowHandle, WindowId};
use tessel::engine::Engine;
use tessel::headless::{HeadlessCompositor, HeadlessWindow};
use tessel::layout::LayoutKind;
use tessel::persist::{FileBackend, Persistence};
use tessel::state::WindowState;
use tessel::types::{Direction, Rect};

const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 1000,
    height: 600,
};

fn config_with_layouts(enabled: &[LayoutKind]) -> Config {
    let mut config = Config::default();
    config.layouts.enabled = enabled.to_vec();
    config
}

fn setup(config: Config, screens: Vec<Rect>, desktops: u32) -> (Engine, HeadlessCompositor) {
    let compositor = HeadlessCompositor::new(screens, desktops);
    let engine = Engine::new(config, Box::new(compositor.clone()), Persistence::in_memory());
    (engine, compositor)
}

fn add(engine: &mut Engine, id: u64) -> HeadlessWindow {
    let window = HeadlessWindow::new(id, Rect::new(10, 10, 300, 200));
    engine.on_window_added(Box::new(window.clone()));
    window
}

fn focus(engine: &mut Engine, compositor: &HeadlessCompositor, id: u64) {
    let mut compositor = compositor.clone();
    compositor.set_active_window(WindowId(id));
    engine.on_window_focused(WindowId(id));
}

fn assert_valid(engine: &mut Engine) {
    let violations = engine.snapshot().validate();
    assert!(violations.is_empty(), "violations: {:?}", violations);
}

#[test]
fn spiral_fills_the_screen_as_windows_arrive() {
    let screen = Rect::new(0, 0, 1200, 800);
    let (mut engine, _) = setup(config_with_layouts(&[LayoutKind::Spiral]), vec![screen], 1);

    let w1 = add(&mut engine, 1);
    assert_eq!(w1.geometry(), screen);

    let w2 = add(&mut engine, 2);
    let w3 = add(&mut engine, 3);
    assert_eq!(w1.geometry(), Rect::new(0, 0, 600, 800));
    assert_eq!(w2.geometry(), Rect::new(600, 0, 600, 400));
    assert_eq!(w3.geometry(), Rect::new(600, 400, 600, 400));
    assert_valid(&mut engine);
}

#[test]
fn swapping_groups_between_screens() {
    let left = Rect::new(0, 0, 1000, 600);
    let right = Rect::new(1000, 0, 1000, 600);
    let compositor = HeadlessCompositor::new(vec![left, right], 1);
    let mut persistence = Persistence::in_memory();
    persistence.set_surface_group(1, 0, 3);
    persistence.set_surface_group(1, 1, 5);
    let mut engine = Engine::new(Config::default(), Box::new(compositor.clone()), persistence);

    let a = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
    let b = HeadlessWindow::new(2, Rect::new(1000, 0, 100, 100)).on_screen(1);
    engine.on_window_added(Box::new(a.clone()));
    engine.on_window_added(Box::new(b.clone()));
    assert_eq!(engine.window(WindowId(1)).map(|w| w.group), Some(3));
    assert_eq!(engine.window(WindowId(2)).map(|w| w.group), Some(5));

    engine.swap_group_to_surface(5, 0);

    let groups: Vec<i32> = engine.screens().iter().map(|s| s.group).collect();
    assert_eq!(groups, vec![5, 3]);
    assert_eq!(b.geometry(), left);
    assert_eq!(a.geometry(), right);
    assert!(!a.hidden());
    assert!(!b.hidden());
    assert_valid(&mut engine);
}

#[test]
fn sole_tile_is_maximized_in_every_layout() {
    for kind in LayoutKind::ALL {
        let mut config = config_with_layouts(&[kind]);
        config.general.maximize_sole_tile = true;
        let (mut engine, _) = setup(config, vec![SCREEN], 1);

        let w1 = add(&mut engine, 1);
        assert_eq!(w1.geometry(), SCREEN, "{:?}", kind);
        assert_eq!(
            engine.window(WindowId(1)).map(|w| w.state()),
            Some(WindowState::Maximized),
            "{:?}",
            kind
        );
        assert!(!w1.has_border());

        // A second tile ends the maximization
        add(&mut engine, 2);
        assert_ne!(
            engine.window(WindowId(1)).map(|w| w.state()),
            Some(WindowState::Maximized),
            "{:?}",
            kind
        );
    }
}

#[test]
fn directional_focus_is_symmetric_between_columns() {
    let (mut engine, compositor) = setup(config_with_layouts(&[LayoutKind::Columns]), vec![SCREEN], 1);
    for id in 1..=3 {
        add(&mut engine, id);
    }

    focus(&mut engine, &compositor, 1);
    engine.focus_dir(Direction::Right);
    assert_eq!(compositor.focused(), Some(WindowId(2)));
    engine.focus_dir(Direction::Right);
    assert_eq!(compositor.focused(), Some(WindowId(3)));
    engine.focus_dir(Direction::Left);
    assert_eq!(compositor.focused(), Some(WindowId(2)));
    engine.focus_dir(Direction::Left);
    assert_eq!(compositor.focused(), Some(WindowId(1)));

    // Nothing further left
    engine.focus_dir(Direction::Left);
    assert_eq!(compositor.focused(), Some(WindowId(1)));
}

#[test]
fn floating_window_is_committed_once() {
    let (mut engine, _) = setup(Config::default(), vec![SCREEN], 1);
    let dialog = HeadlessWindow::new(1, Rect::new(100, 100, 320, 240)).floating(true);
    engine.on_window_added(Box::new(dialog.clone()));
    add(&mut engine, 2);
    engine.arrange(None);
    engine.arrange(None);

    let geometries: Vec<Option<Rect>> = dialog.commits().iter().map(|c| c.geometry).collect();
    assert_eq!(geometries, vec![Some(Rect::new(100, 100, 320, 240))]);
    assert!(dialog.keep_above());
}

#[test]
fn compositor_state_overrides_the_layout() {
    let (mut engine, _) = setup(Config::default(), vec![SCREEN], 1);
    let w1 = add(&mut engine, 1);
    let w2 = add(&mut engine, 2);

    w1.set_fullscreen(true);
    w1.set_maximized(true);
    engine.arrange(None);
    assert_eq!(
        engine.window(WindowId(1)).map(|w| w.state()),
        Some(WindowState::NativeFullscreen)
    );
    assert_eq!(w2.geometry(), SCREEN);

    w1.set_fullscreen(false);
    engine.arrange(None);
    assert_eq!(
        engine.window(WindowId(1)).map(|w| w.state()),
        Some(WindowState::NativeMaximized)
    );

    w1.set_maximized(false);
    engine.arrange(None);
    assert_eq!(
        engine.window(WindowId(1)).map(|w| w.state()),
        Some(WindowState::Tiled)
    );
    assert!(w2.geometry().width < SCREEN.width);
    assert_valid(&mut engine);
}

#[test]
fn commit_echoes_are_dropped_by_the_controller() {
    let compositor = HeadlessCompositor::new(vec![SCREEN], 1);
    let engine = Engine::new(Config::default(), Box::new(compositor), Persistence::in_memory());
    let controller = Rc::new(Controller::new(engine));

    let echoes = Rc::new(Cell::new(0usize));
    let w1 = HeadlessWindow::new(1, Rect::new(0, 0, 100, 100));
    {
        let weak = Rc::downgrade(&controller);
        let echoes = echoes.clone();
        w1.set_commit_hook(move |id| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            if !controller.dispatch(Event::WindowGeometryChanged { window: id }) {
                echoes.set(echoes.get() + 1);
            }
        });
    }
    controller.add_window(Box::new(w1.clone()));
    controller.add_window(Box::new(HeadlessWindow::new(2, Rect::new(0, 0, 100, 100))));
    assert!(controller.execute(Action::NextLayout));

    assert!(echoes.get() >= 3);
    assert_eq!(controller.event_log().dropped_count(), echoes.get());
    let snapshot = controller.snapshot().expect("engine idle");
    assert_eq!(snapshot.surfaces[0].layout, LayoutKind::Monocle);
    assert!(snapshot.validate().is_empty());
}

#[test]
fn overflowing_window_moves_to_the_next_desktop() {
    let (mut engine, compositor) = setup(config_with_layouts(&[LayoutKind::Quarter]), vec![SCREEN], 2);
    let windows: Vec<HeadlessWindow> = (1..=5).map(|id| add(&mut engine, id)).collect();

    assert_eq!(compositor.current_desktop(), Some(2));
    assert_eq!(windows[4].desktop(), Some(2));
    assert_eq!(engine.window(WindowId(5)).map(|w| w.group), Some(2));
    assert_eq!(windows[4].geometry(), SCREEN);
    assert!(!windows[4].hidden());
    for window in &windows[..4] {
        assert_eq!(window.desktop(), Some(1));
    }
}

#[test]
fn monocle_minimizes_everything_but_the_focus() {
    let mut config = config_with_layouts(&[LayoutKind::Monocle, LayoutKind::Tile]);
    config.general.monocle_minimize_rest = true;
    let (mut engine, compositor) = setup(config, vec![SCREEN], 1);
    let windows: Vec<HeadlessWindow> = (1..=3).map(|id| add(&mut engine, id)).collect();

    focus(&mut engine, &compositor, 2);
    assert!(windows[0].minimized());
    assert!(!windows[1].minimized());
    assert!(windows[2].minimized());
    assert_eq!(windows[1].geometry(), SCREEN);
}

#[test]
fn persisted_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let compositor = HeadlessCompositor::new(vec![SCREEN], 1);
        let persistence = Persistence::new(Box::new(FileBackend::open(&path).unwrap()));
        let mut engine = Engine::new(Config::default(), Box::new(compositor), persistence);
        let windows: Vec<HeadlessWindow> = (1..=4).map(|id| add(&mut engine, id)).collect();

        engine.move_window_to_group(7, Some(WindowId(1)));
        let mut w2 = windows[1].clone();
        w2.set_minimized(true);
        engine.on_window_minimize_changed(WindowId(2));
        engine.execute(Action::IncreaseMasterAreaWindowCount);
    }

    let compositor = HeadlessCompositor::new(vec![SCREEN], 1);
    let persistence = Persistence::new(Box::new(FileBackend::open(&path).unwrap()));
    let mut engine = Engine::new(Config::default(), Box::new(compositor), persistence);
    let windows: Vec<HeadlessWindow> = (1..=4).map(|id| add(&mut engine, id)).collect();

    assert_eq!(engine.window(WindowId(1)).map(|w| w.group), Some(7));
    assert!(windows[0].hidden());
    assert!(windows[1].minimized());
    // Two master tiles: the remaining windows share the master column
    assert_eq!(windows[2].geometry(), Rect::new(0, 0, 1000, 300));
    assert_eq!(windows[3].geometry(), Rect::new(0, 300, 1000, 300));
    assert_valid(&mut engine);
}
