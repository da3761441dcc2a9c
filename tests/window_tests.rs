//! Frame Scheduler Tests
//!
//! Tests for:
//! - Lazy initialization and hook dispatch order (handler before listeners)
//! - Resize ordering: release-size, buffer resize, create-size
//! - Minimized short-circuit and the slow-frame guard
//! - Device-loss recovery and fatal error propagation

mod common;

use std::time::Duration;

use common::{count_of, entries, index_of, new_log, push, RecordingBackend, RecordingHandler};
use glint::graphics::{GraphicsError, PresentFlags};
use glint::window::RenderWindow;

fn new_window(
    backend: RecordingBackend,
    log: &common::EventLog,
) -> RenderWindow<RecordingBackend, RecordingHandler> {
    RenderWindow::new(backend, (), RecordingHandler::new(log.clone()))
}

fn render(window: &mut RenderWindow<RecordingBackend, RecordingHandler>) -> glint::Result<()> {
    window.render(1, PresentFlags::NONE)
}

// ============================================================================
// Lazy Initialization & Hook Order
// ============================================================================

#[test]
fn first_render_initializes_then_updates_then_draws() {
    common::init_test_logging();
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);

    render(&mut window).unwrap();

    assert!(window.resources.device_available());
    let events = entries(&log);
    let positions: Vec<usize> = [
        "create_device Hardware",
        "handler.create_device_resources",
        "handler.create_device_size_resources",
        "handler.update",
        "begin_draw",
        "handler.draw",
        "end_draw",
        "present 1",
    ]
    .iter()
    .map(|e| index_of(&log, e))
    .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "frame event order wrong: {events:?}");
}

#[test]
fn second_render_does_not_reinitialize() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);

    render(&mut window).unwrap();
    render(&mut window).unwrap();

    assert_eq!(count_of(&log, "create_device Hardware"), 1);
    assert_eq!(window.resources.generation(), 1);
}

#[test]
fn listeners_run_after_the_handler_for_each_hook() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);

    let listener_log = log.clone();
    window
        .listeners
        .create_device_resources
        .push(Box::new(move |_| push(&listener_log, "listener.create_device_resources")));
    let listener_log = log.clone();
    window
        .listeners
        .draw
        .push(Box::new(move |_, _| push(&listener_log, "listener.draw")));

    render(&mut window).unwrap();

    assert!(
        index_of(&log, "handler.create_device_resources")
            < index_of(&log, "listener.create_device_resources")
    );
    assert!(index_of(&log, "handler.draw") < index_of(&log, "listener.draw"));
    assert!(index_of(&log, "listener.draw") < index_of(&log, "end_draw"));
}

// ============================================================================
// Resize Ordering
// ============================================================================

#[test]
fn resize_releases_size_resources_before_buffers_and_recreates_after() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    log.borrow_mut().clear();

    window.on_resize(false, 1024, 768).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "handler.release_device_size_resources",
            "detach_surface",
            "resize_buffers 1024x768",
            "attach_surface",
            "handler.create_device_size_resources",
        ]
    );
}

#[test]
fn resize_before_initialization_fires_no_hooks() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);

    window.on_resize(false, 1024, 768).unwrap();

    assert!(entries(&log).is_empty());
}

#[test]
fn resize_to_minimized_only_records_the_flag() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    log.borrow_mut().clear();

    window.on_resize(true, 0, 0).unwrap();

    assert!(window.minimized());
    assert!(entries(&log).is_empty());
}

// ============================================================================
// Minimized Short-Circuit & Slow-Frame Guard
// ============================================================================

#[test]
fn minimized_render_touches_neither_clock_nor_backend() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    window.on_resize(true, 0, 0).unwrap();
    let frames_before = window.clock.total_frames();
    log.borrow_mut().clear();

    render(&mut window).unwrap();

    assert!(entries(&log).is_empty());
    assert_eq!(window.clock.total_frames(), frames_before);
}

#[test]
fn restored_window_renders_again() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    window.on_resize(true, 0, 0).unwrap();
    window.on_resize(false, 800, 600).unwrap();
    log.borrow_mut().clear();

    render(&mut window).unwrap();

    assert_eq!(count_of(&log, "handler.draw"), 1);
}

#[test]
fn slow_frame_skips_update_but_still_draws() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    assert_eq!(count_of(&log, "handler.update"), 1);

    // Stall past the logic-freeze threshold.
    std::thread::sleep(Duration::from_millis(250));
    render(&mut window).unwrap();

    assert_eq!(count_of(&log, "handler.update"), 1);
    assert_eq!(count_of(&log, "handler.draw"), 2);
}

// ============================================================================
// Device Loss & Fatal Errors
// ============================================================================

#[test]
fn device_loss_releases_resources_and_reports_success() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    log.borrow_mut().clear();

    window.resources.backend.end_draw_errors = vec![GraphicsError::DeviceReset];
    render(&mut window).unwrap();

    assert!(!window.resources.device_available());
    assert!(
        index_of(&log, "handler.release_device_size_resources")
            < index_of(&log, "handler.release_device_resources")
    );
    assert!(index_of(&log, "handler.release_device_resources") < index_of(&log, "drop device"));
}

#[test]
fn render_after_device_loss_rebuilds_a_new_generation() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();

    window.resources.backend.end_draw_errors = vec![GraphicsError::DeviceRemoved];
    render(&mut window).unwrap();
    assert_eq!(window.resources.generation(), 1);

    render(&mut window).unwrap();

    assert!(window.resources.device_available());
    assert_eq!(window.resources.generation(), 2);
    assert_eq!(count_of(&log, "handler.create_device_resources"), 2);
    assert_eq!(count_of(&log, "handler.create_device_size_resources"), 2);
}

#[test]
fn non_loss_errors_propagate_but_the_clock_still_closes_the_frame() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    let frames_before = window.clock.total_frames();

    window.resources.backend.end_draw_errors =
        vec![GraphicsError::Backend("out of memory".into())];
    let result = render(&mut window);

    assert!(result.is_err());
    assert!(window.resources.device_available());
    assert_eq!(window.clock.total_frames(), frames_before + 1);
}

#[test]
fn shutdown_fires_release_hooks_once() {
    let log = new_log();
    let mut window = new_window(RecordingBackend::new(log.clone()), &log);
    render(&mut window).unwrap();
    log.borrow_mut().clear();

    window.shutdown();

    assert_eq!(count_of(&log, "handler.release_device_size_resources"), 1);
    assert_eq!(count_of(&log, "handler.release_device_resources"), 1);
    assert_eq!(count_of(&log, "drop device"), 1);
}
