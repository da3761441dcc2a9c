//! Shared test doubles: a recording graphics backend and a counting physics
//! world.
//!
//! The recording backend writes every call into a log shared with the test
//! (and with any recording handlers/listeners), so ordering across the
//! backend/hook boundary can be asserted from one sequence. Mock resource
//! types log their own drops, which makes disposal order observable too.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Affine2, Vec2};
use glint::clock::FrameClock;
use glint::device::{DeviceResources, Frame};
use glint::graphics::{
    Color, DriverKind, GraphicsBackend, GraphicsError, PresentFlags, Rect,
};
use glint::physics::{BodyDef, BodyKey, ColliderShape, PhysicsWorld, PlanarWorld};
use glint::window::RenderHandler;

/// Routes engine log output through the test harness capture.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn push(log: &EventLog, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

pub fn entries(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// Index of the first log entry equal to `entry`; panics if absent.
pub fn index_of(log: &EventLog, entry: &str) -> usize {
    entries(log)
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("log entry '{entry}' not found in {:?}", entries(log)))
}

pub fn count_of(log: &EventLog, entry: &str) -> usize {
    entries(log).iter().filter(|e| *e == entry).count()
}

// ============================================================================
// Recording graphics backend
// ============================================================================

pub struct MockDevice {
    log: EventLog,
    pub driver: DriverKind,
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        push(&self.log, "drop device");
    }
}

pub struct MockSwapChain {
    log: EventLog,
    pub width: u32,
    pub height: u32,
}

impl Drop for MockSwapChain {
    fn drop(&mut self) {
        push(&self.log, "drop swap_chain");
    }
}

pub struct MockTarget {
    log: EventLog,
    pub surface_attached: bool,
    pub transform: Affine2,
}

impl Drop for MockTarget {
    fn drop(&mut self) {
        push(&self.log, "drop target");
    }
}

#[derive(Debug)]
pub struct MockBrush {
    log: EventLog,
    /// Distinguishes brush objects across calls.
    pub id: u32,
    pub color: Color,
}

impl Drop for MockBrush {
    fn drop(&mut self) {
        push(&self.log, "drop brush");
    }
}

/// A [`GraphicsBackend`] that records every call and can be scripted to fail.
pub struct RecordingBackend {
    pub log: EventLog,
    /// Driver kinds whose `create_device` fails.
    pub failing_drivers: Vec<DriverKind>,
    /// Errors returned by successive `end_draw` calls, consumed in order.
    pub end_draw_errors: Vec<GraphicsError>,
    next_brush_id: u32,
}

impl RecordingBackend {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failing_drivers: Vec::new(),
            end_draw_errors: Vec::new(),
            next_brush_id: 0,
        }
    }
}

impl GraphicsBackend for RecordingBackend {
    type Device = MockDevice;
    type SwapChain = MockSwapChain;
    type Target = MockTarget;
    type Brush = MockBrush;
    type Window = ();

    fn create_device(&mut self, driver: DriverKind) -> Result<MockDevice, GraphicsError> {
        if self.failing_drivers.contains(&driver) {
            push(&self.log, format!("create_device {driver:?} -> unavailable"));
            return Err(GraphicsError::DriverUnavailable(driver));
        }
        push(&self.log, format!("create_device {driver:?}"));
        Ok(MockDevice {
            log: self.log.clone(),
            driver,
        })
    }

    fn create_target(&mut self, _device: &MockDevice) -> Result<MockTarget, GraphicsError> {
        push(&self.log, "create_target");
        Ok(MockTarget {
            log: self.log.clone(),
            surface_attached: false,
            transform: Affine2::IDENTITY,
        })
    }

    fn create_swap_chain(
        &mut self,
        _device: &MockDevice,
        _window: &(),
    ) -> Result<MockSwapChain, GraphicsError> {
        push(&self.log, "create_swap_chain");
        Ok(MockSwapChain {
            log: self.log.clone(),
            width: 800,
            height: 600,
        })
    }

    fn create_solid_brush(
        &mut self,
        _target: &MockTarget,
        color: Color,
    ) -> Result<MockBrush, GraphicsError> {
        push(&self.log, "create_solid_brush");
        let id = self.next_brush_id;
        self.next_brush_id += 1;
        Ok(MockBrush {
            log: self.log.clone(),
            id,
            color,
        })
    }

    fn set_brush_color(&mut self, brush: &mut MockBrush, color: Color) {
        brush.color = color;
    }

    fn attach_swap_chain_surface(
        &mut self,
        _swap_chain: &mut MockSwapChain,
        target: &mut MockTarget,
    ) -> Result<(), GraphicsError> {
        push(&self.log, "attach_surface");
        target.surface_attached = true;
        Ok(())
    }

    fn attach_cpu_surface(
        &mut self,
        _device: &MockDevice,
        target: &mut MockTarget,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError> {
        push(&self.log, format!("attach_cpu_surface {width}x{height}"));
        target.surface_attached = true;
        Ok(())
    }

    fn detach_surface(&mut self, target: &mut MockTarget) {
        push(&self.log, "detach_surface");
        target.surface_attached = false;
    }

    fn target_is_valid(&self, target: &MockTarget) -> bool {
        target.surface_attached
    }

    fn resize_buffers(
        &mut self,
        swap_chain: &mut MockSwapChain,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError> {
        push(&self.log, format!("resize_buffers {width}x{height}"));
        if width > 0 {
            swap_chain.width = width;
        }
        if height > 0 {
            swap_chain.height = height;
        }
        Ok(())
    }

    fn begin_draw(&mut self, _target: &mut MockTarget) {
        push(&self.log, "begin_draw");
    }

    fn end_draw(&mut self, _target: &mut MockTarget) -> Result<(), GraphicsError> {
        if self.end_draw_errors.is_empty() {
            push(&self.log, "end_draw");
            Ok(())
        } else {
            let error = self.end_draw_errors.remove(0);
            push(&self.log, format!("end_draw -> {error}"));
            Err(error)
        }
    }

    fn present(
        &mut self,
        _swap_chain: &mut MockSwapChain,
        sync_interval: u32,
        _flags: PresentFlags,
    ) -> Result<(), GraphicsError> {
        push(&self.log, format!("present {sync_interval}"));
        Ok(())
    }

    fn clear(&mut self, _target: &mut MockTarget, _color: Color) {
        push(&self.log, "clear");
    }

    fn set_transform(&mut self, target: &mut MockTarget, transform: Affine2) {
        target.transform = transform;
    }

    fn transform(&self, target: &MockTarget) -> Affine2 {
        target.transform
    }

    fn fill_rect(&mut self, _target: &mut MockTarget, _rect: Rect, _brush: &MockBrush) {
        push(&self.log, "fill_rect");
    }

    fn stroke_rect(
        &mut self,
        _target: &mut MockTarget,
        _rect: Rect,
        _line_width: f32,
        _brush: &MockBrush,
    ) {
        push(&self.log, "stroke_rect");
    }

    fn draw_line(
        &mut self,
        _target: &mut MockTarget,
        _from: Vec2,
        _to: Vec2,
        _line_width: f32,
        _brush: &MockBrush,
    ) {
        push(&self.log, "draw_line");
    }

    fn fill_circle(
        &mut self,
        _target: &mut MockTarget,
        _center: Vec2,
        _radius: f32,
        _brush: &MockBrush,
    ) {
        push(&self.log, "fill_circle");
    }

    fn target_size(&self, _target: &MockTarget) -> (f32, f32) {
        (800.0, 600.0)
    }
}

// ============================================================================
// Recording handler
// ============================================================================

/// A [`RenderHandler`] writing every hook invocation into the shared log.
pub struct RecordingHandler {
    pub log: EventLog,
}

impl RecordingHandler {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl RenderHandler<RecordingBackend> for RecordingHandler {
    fn create_device_resources(&mut self, _resources: &mut DeviceResources<RecordingBackend>) {
        push(&self.log, "handler.create_device_resources");
    }

    fn create_device_size_resources(
        &mut self,
        _resources: &mut DeviceResources<RecordingBackend>,
    ) {
        push(&self.log, "handler.create_device_size_resources");
    }

    fn release_device_size_resources(
        &mut self,
        _resources: &mut DeviceResources<RecordingBackend>,
    ) {
        push(&self.log, "handler.release_device_size_resources");
    }

    fn release_device_resources(&mut self, _resources: &mut DeviceResources<RecordingBackend>) {
        push(&self.log, "handler.release_device_resources");
    }

    fn update(&mut self, _resources: &mut DeviceResources<RecordingBackend>, _dt: f32) {
        push(&self.log, "handler.update");
    }

    fn draw(&mut self, _frame: &mut Frame<'_, RecordingBackend>, _clock: &FrameClock) {
        push(&self.log, "handler.draw");
    }
}

// ============================================================================
// Counting physics world
// ============================================================================

/// Delegates to a [`PlanarWorld`] while counting the calls the scene is
/// expected to ration.
pub struct CountingWorld {
    pub inner: PlanarWorld,
    pub step_calls: usize,
    pub process_changes_calls: usize,
    pub destroy_calls: usize,
}

impl CountingWorld {
    pub fn new() -> Self {
        Self {
            inner: PlanarWorld::new(),
            step_calls: 0,
            process_changes_calls: 0,
            destroy_calls: 0,
        }
    }
}

impl PhysicsWorld for CountingWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyKey {
        self.inner.create_body(def)
    }

    fn destroy_body(&mut self, body: BodyKey) {
        self.destroy_calls += 1;
        self.inner.destroy_body(body);
    }

    fn step(&mut self, dt: f32) {
        self.step_calls += 1;
        self.inner.step(dt);
    }

    fn process_changes(&mut self) {
        self.process_changes_calls += 1;
        self.inner.process_changes();
    }

    fn position(&self, body: BodyKey) -> Vec2 {
        self.inner.position(body)
    }

    fn set_position(&mut self, body: BodyKey, position: Vec2) {
        self.inner.set_position(body, position);
    }

    fn rotation(&self, body: BodyKey) -> f32 {
        self.inner.rotation(body)
    }

    fn set_rotation(&mut self, body: BodyKey, rotation: f32) {
        self.inner.set_rotation(body, rotation);
    }

    fn linear_velocity(&self, body: BodyKey) -> Vec2 {
        self.inner.linear_velocity(body)
    }

    fn set_linear_velocity(&mut self, body: BodyKey, velocity: Vec2) {
        self.inner.set_linear_velocity(body, velocity);
    }

    fn set_fixtures(&mut self, body: BodyKey, fixtures: &[ColliderShape]) {
        self.inner.set_fixtures(body, fixtures);
    }

    fn fixtures(&self, body: BodyKey) -> &[ColliderShape] {
        self.inner.fixtures(body)
    }

    fn touching(&self, body: BodyKey) -> Vec<BodyKey> {
        self.inner.touching(body)
    }
}
