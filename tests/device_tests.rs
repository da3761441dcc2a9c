//! Device Resource Lifecycle Tests
//!
//! Tests for:
//! - Lazy initialization and driver priority fallback
//! - Availability gating: resize/no-op before initialization
//! - Cached brush semantics (`get_color`)
//! - Release order and generation counting

mod common;

use common::{count_of, entries, new_log, RecordingBackend};
use glint::device::DeviceResources;
use glint::errors::GlintError;
use glint::graphics::{Color, DriverKind};

fn new_resources(backend: RecordingBackend) -> DeviceResources<RecordingBackend> {
    DeviceResources::new(backend)
}

// ============================================================================
// Initialization & Driver Priority
// ============================================================================

#[test]
fn initialize_creates_device_target_brush_swap_chain() {
    common::init_test_logging();
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));

    resources.initialize_device(&()).unwrap();

    assert!(resources.device_available());
    assert_eq!(
        entries(&log),
        vec![
            "create_device Hardware",
            "create_target",
            "create_solid_brush",
            "create_swap_chain",
            "attach_surface",
        ]
    );
}

#[test]
fn hardware_failure_falls_back_to_next_driver() {
    let log = new_log();
    let mut backend = RecordingBackend::new(log.clone());
    backend.failing_drivers = vec![DriverKind::Hardware];
    let mut resources = new_resources(backend);

    resources.initialize_device(&()).unwrap();

    assert!(resources.device_available());
    assert_eq!(count_of(&log, "create_device Hardware -> unavailable"), 1);
    assert_eq!(count_of(&log, "create_device Fallback"), 1);
}

#[test]
fn exhausting_all_drivers_fails_with_no_supported_driver() {
    let log = new_log();
    let mut backend = RecordingBackend::new(log);
    backend.failing_drivers = vec![DriverKind::Hardware, DriverKind::Fallback];
    let mut resources = new_resources(backend);

    let error = resources.initialize_device(&()).unwrap_err();
    assert!(matches!(
        error,
        GlintError::NoSupportedDriver {
            last_tried: DriverKind::Fallback,
            ..
        }
    ));
    assert!(!resources.device_available());
}

#[test]
fn cpu_initialization_attaches_bitmap_surface() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));

    resources.initialize_device_cpu(&(), 320, 240).unwrap();

    assert!(resources.device_available());
    assert_eq!(count_of(&log, "attach_cpu_surface 320x240"), 1);
    assert_eq!(count_of(&log, "attach_surface"), 0);
}

#[test]
fn generation_increments_on_each_initialize() {
    let mut resources = new_resources(RecordingBackend::new(new_log()));
    assert_eq!(resources.generation(), 0);

    resources.initialize_device(&()).unwrap();
    assert_eq!(resources.generation(), 1);

    resources.release_device_resources();
    resources.initialize_device(&()).unwrap();
    assert_eq!(resources.generation(), 2);
}

// ============================================================================
// Availability Gating
// ============================================================================

#[test]
fn resize_before_initialization_is_a_noop() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));

    resources.resize(640, 480).unwrap();

    assert!(entries(&log).is_empty());
}

#[test]
fn resize_after_release_is_a_noop() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));
    resources.initialize_device(&()).unwrap();
    resources.release_device_resources();
    log.borrow_mut().clear();

    resources.resize(640, 480).unwrap();

    assert!(entries(&log).is_empty());
}

#[test]
fn resize_detaches_resizes_and_reattaches() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));
    resources.initialize_device(&()).unwrap();
    log.borrow_mut().clear();

    resources.resize(1024, 768).unwrap();

    assert_eq!(
        entries(&log),
        vec!["detach_surface", "resize_buffers 1024x768", "attach_surface"]
    );
}

#[test]
fn cpu_target_resize_requires_explicit_dimensions() {
    let mut resources = new_resources(RecordingBackend::new(new_log()));
    resources.initialize_device_cpu(&(), 320, 240).unwrap();

    assert!(resources.resize(0, 0).is_err());
    assert!(resources.resize(640, 480).is_ok());
}

#[test]
fn rejected_cpu_resize_leaves_the_device_attached_and_available() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));
    resources.initialize_device_cpu(&(), 320, 240).unwrap();
    log.borrow_mut().clear();

    assert!(resources.resize(0, 0).is_err());

    assert!(resources.device_available());
    assert!(entries(&log).is_empty());

    // The surface was never detached, so the next frame renders on the same
    // generation instead of rebuilding.
    resources.begin_draw().unwrap();
    resources.end_draw().unwrap();
    assert_eq!(resources.generation(), 1);
}

// ============================================================================
// Cached Brush
// ============================================================================

#[test]
fn get_color_before_initialize_fails() {
    let mut resources = new_resources(RecordingBackend::new(new_log()));
    let error = resources.get_color(Color::RED).unwrap_err();
    assert!(matches!(error, GlintError::NotInitialized { .. }));
}

#[test]
fn get_color_round_trips_the_requested_color() {
    let mut resources = new_resources(RecordingBackend::new(new_log()));
    resources.initialize_device(&()).unwrap();

    let brush = resources.get_color(Color::RED).unwrap();
    assert_eq!(brush.color, Color::RED);

    let brush = resources.get_color(Color::DIM_GRAY).unwrap();
    assert_eq!(brush.color, Color::DIM_GRAY);
}

#[test]
fn get_color_mutates_one_cached_brush() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));
    resources.initialize_device(&()).unwrap();

    let first_id = resources.get_color(Color::RED).unwrap().id;
    let second_id = resources.get_color(Color::WHITE).unwrap().id;

    assert_eq!(first_id, second_id);
    assert_eq!(count_of(&log, "create_solid_brush"), 1);
}

// ============================================================================
// Release Order
// ============================================================================

#[test]
fn release_disposes_brush_swap_chain_target_device_in_order() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));
    resources.initialize_device(&()).unwrap();
    log.borrow_mut().clear();

    resources.release_device_resources();

    assert!(!resources.device_available());
    assert_eq!(
        entries(&log),
        vec![
            "drop brush",
            "drop swap_chain",
            "detach_surface",
            "drop target",
            "drop device",
        ]
    );
}

#[test]
fn release_without_initialize_is_harmless() {
    let log = new_log();
    let mut resources = new_resources(RecordingBackend::new(log.clone()));

    resources.release_device_resources();

    assert!(!resources.device_available());
    assert!(entries(&log).is_empty());
}
