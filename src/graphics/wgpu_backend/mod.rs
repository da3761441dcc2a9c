//! Production [`GraphicsBackend`] on wgpu.
//!
//! Resource mapping: a device is an adapter plus device/queue pair; a swap
//! chain is a configured `wgpu::Surface`; a target is the drawing context
//! holding the frame's geometry batch and deferred error. The swap-chain
//! state sits behind a `parking_lot::Mutex` shared between the swap-chain and
//! target handles, which resize and present independently of each other.
//!
//! Error model: `begin_draw` acquires the backbuffer and records any failure
//! instead of returning it; `end_draw` surfaces the recorded error or flushes
//! the batch. Surface loss maps onto the recoverable device-loss pair
//! (`Lost` ⇒ removed, `Outdated`/`Timeout` ⇒ reset), which the frame
//! scheduler answers with a teardown and lazy rebuild.
//!
//! Presentation pacing is fixed at swap-chain creation from
//! [`WgpuSettings::vsync`]; the per-present sync interval cannot override it
//! on this API and is ignored beyond zero/nonzero logging.

mod pipeline;

use std::sync::Arc;

use glam::{Affine2, Vec2};
use parking_lot::Mutex;
use wgpu::util::DeviceExt;

use super::{
    Color, DriverKind, GraphicsBackend, GraphicsError, NativeWindow, PresentFlags, Rect,
};
use pipeline::{ColorPipeline, GeometryBatch};

/// Backend construction settings.
#[derive(Debug, Clone)]
pub struct WgpuSettings {
    pub power_preference: wgpu::PowerPreference,
    /// Chooses the present mode when swap chains are created.
    pub vsync: bool,
    /// Initial swap-chain dimensions; resized to the window on the first
    /// resize event.
    pub width: u32,
    pub height: u32,
}

impl Default for WgpuSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            vsync: true,
            width: 1280,
            height: 720,
        }
    }
}

/// wgpu-backed [`GraphicsBackend`] implementation.
pub struct WgpuBackend {
    instance: wgpu::Instance,
    settings: WgpuSettings,
}

impl WgpuBackend {
    #[must_use]
    pub fn new(settings: WgpuSettings) -> Self {
        Self {
            instance: wgpu::Instance::default(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &WgpuSettings {
        &self.settings
    }
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new(WgpuSettings::default())
    }
}

/// Adapter plus device/queue pair.
pub struct WgpuDevice {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

struct SwapChainShared {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    /// Backbuffer acquired by `begin_draw`, consumed by `present`.
    acquired: Option<wgpu::SurfaceTexture>,
}

/// A configured window surface.
pub struct WgpuSwapChain {
    device: wgpu::Device,
    shared: Arc<Mutex<SwapChainShared>>,
}

enum TargetSurface {
    SwapChain(Arc<Mutex<SwapChainShared>>),
    Cpu {
        texture: wgpu::Texture,
        width: u32,
        height: u32,
    },
}

/// Drawing context: geometry batch, transform, and the frame's deferred
/// error.
pub struct WgpuTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: Option<TargetSurface>,
    batch: GeometryBatch,
    transform: Affine2,
    clear: Option<Color>,
    pipeline: Option<ColorPipeline>,
    deferred: Option<GraphicsError>,
}

/// Solid-color brush; just the color, restyled freely between draws.
pub struct WgpuBrush {
    color: Color,
}

fn map_surface_error(error: wgpu::SurfaceError) -> GraphicsError {
    match error {
        wgpu::SurfaceError::Lost => GraphicsError::DeviceRemoved,
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Timeout => GraphicsError::DeviceReset,
        other => GraphicsError::Backend(other.to_string()),
    }
}

fn wgpu_color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(color.r),
        g: f64::from(color.g),
        b: f64::from(color.b),
        a: f64::from(color.a),
    }
}

impl GraphicsBackend for WgpuBackend {
    type Device = WgpuDevice;
    type SwapChain = WgpuSwapChain;
    type Target = WgpuTarget;
    type Brush = WgpuBrush;
    type Window = NativeWindow;

    fn create_device(&mut self, driver: DriverKind) -> Result<WgpuDevice, GraphicsError> {
        let adapter = pollster::block_on(self.instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: self.settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: matches!(driver, DriverKind::Fallback),
            },
        ))
        .map_err(|e| {
            log::debug!("{driver:?} adapter request failed: {e}");
            GraphicsError::DriverUnavailable(driver)
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glint device"),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))
        .map_err(|e| GraphicsError::Backend(e.to_string()))?;

        log::info!("{driver:?} device created on '{}'", adapter.get_info().name);
        Ok(WgpuDevice {
            adapter,
            device,
            queue,
        })
    }

    fn create_target(&mut self, device: &WgpuDevice) -> Result<WgpuTarget, GraphicsError> {
        Ok(WgpuTarget {
            device: device.device.clone(),
            queue: device.queue.clone(),
            surface: None,
            batch: GeometryBatch::new(),
            transform: Affine2::IDENTITY,
            clear: None,
            pipeline: None,
            deferred: None,
        })
    }

    fn create_swap_chain(
        &mut self,
        device: &WgpuDevice,
        window: &NativeWindow,
    ) -> Result<WgpuSwapChain, GraphicsError> {
        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(|e| GraphicsError::Backend(e.to_string()))?;

        let mut config = surface
            .get_default_config(
                &device.adapter,
                self.settings.width.max(1),
                self.settings.height.max(1),
            )
            .ok_or_else(|| {
                GraphicsError::Backend("surface not supported by adapter".to_string())
            })?;
        config.present_mode = if self.settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device.device, &config);

        Ok(WgpuSwapChain {
            device: device.device.clone(),
            shared: Arc::new(Mutex::new(SwapChainShared {
                surface,
                config,
                acquired: None,
            })),
        })
    }

    fn create_solid_brush(
        &mut self,
        _target: &WgpuTarget,
        color: Color,
    ) -> Result<WgpuBrush, GraphicsError> {
        Ok(WgpuBrush { color })
    }

    fn set_brush_color(&mut self, brush: &mut WgpuBrush, color: Color) {
        brush.color = color;
    }

    fn attach_swap_chain_surface(
        &mut self,
        swap_chain: &mut WgpuSwapChain,
        target: &mut WgpuTarget,
    ) -> Result<(), GraphicsError> {
        target.surface = Some(TargetSurface::SwapChain(swap_chain.shared.clone()));
        Ok(())
    }

    fn attach_cpu_surface(
        &mut self,
        device: &WgpuDevice,
        target: &mut WgpuTarget,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError> {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint cpu target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        target.surface = Some(TargetSurface::Cpu {
            texture,
            width,
            height,
        });
        Ok(())
    }

    fn detach_surface(&mut self, target: &mut WgpuTarget) {
        target.surface = None;
    }

    fn target_is_valid(&self, target: &WgpuTarget) -> bool {
        target.surface.is_some()
    }

    fn resize_buffers(
        &mut self,
        swap_chain: &mut WgpuSwapChain,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError> {
        let mut shared = swap_chain.shared.lock();
        // Any outstanding backbuffer must be dropped before reconfiguring.
        shared.acquired = None;
        if width > 0 {
            shared.config.width = width;
        }
        if height > 0 {
            shared.config.height = height;
        }
        let SwapChainShared {
            surface, config, ..
        } = &mut *shared;
        surface.configure(&swap_chain.device, config);
        log::debug!("swap chain resized to {}x{}", config.width, config.height);
        Ok(())
    }

    fn begin_draw(&mut self, target: &mut WgpuTarget) {
        target.batch.clear();
        target.clear = None;
        target.deferred = None;

        if let Some(TargetSurface::SwapChain(shared)) = &target.surface {
            let mut shared = shared.lock();
            if shared.acquired.is_none() {
                match shared.surface.get_current_texture() {
                    Ok(texture) => shared.acquired = Some(texture),
                    Err(e) => target.deferred = Some(map_surface_error(e)),
                }
            }
        } else if target.surface.is_none() {
            target.deferred = Some(GraphicsError::Backend(
                "begin_draw on a target with no surface attached".to_string(),
            ));
        }
    }

    fn end_draw(&mut self, target: &mut WgpuTarget) -> Result<(), GraphicsError> {
        if let Some(error) = target.deferred.take() {
            target.batch.clear();
            return Err(error);
        }

        let WgpuTarget {
            device,
            queue,
            surface,
            batch,
            clear,
            pipeline,
            ..
        } = target;

        match surface {
            Some(TargetSurface::SwapChain(shared)) => {
                let shared = shared.lock();
                let Some(texture) = shared.acquired.as_ref() else {
                    return Err(GraphicsError::Backend(
                        "end_draw without an acquired backbuffer".to_string(),
                    ));
                };
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                flush_batch(
                    device,
                    queue,
                    pipeline,
                    batch,
                    clear,
                    &view,
                    shared.config.format,
                    shared.config.width as f32,
                    shared.config.height as f32,
                );
            }
            Some(TargetSurface::Cpu {
                texture,
                width,
                height,
            }) => {
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                flush_batch(
                    device,
                    queue,
                    pipeline,
                    batch,
                    clear,
                    &view,
                    wgpu::TextureFormat::Rgba8Unorm,
                    *width as f32,
                    *height as f32,
                );
            }
            None => {
                return Err(GraphicsError::Backend(
                    "end_draw on a target with no surface attached".to_string(),
                ));
            }
        }

        batch.clear();
        *clear = None;
        Ok(())
    }

    fn present(
        &mut self,
        swap_chain: &mut WgpuSwapChain,
        sync_interval: u32,
        _flags: PresentFlags,
    ) -> Result<(), GraphicsError> {
        let mut shared = swap_chain.shared.lock();
        if sync_interval == 0 && shared.config.present_mode == wgpu::PresentMode::AutoVsync {
            log::trace!("sync interval 0 requested; pacing stays at the configured vsync mode");
        }
        if let Some(texture) = shared.acquired.take() {
            texture.present();
        }
        Ok(())
    }

    fn clear(&mut self, target: &mut WgpuTarget, color: Color) {
        // Clearing discards everything batched so far in this frame.
        target.batch.clear();
        target.clear = Some(color);
    }

    fn set_transform(&mut self, target: &mut WgpuTarget, transform: Affine2) {
        target.transform = transform;
    }

    fn transform(&self, target: &WgpuTarget) -> Affine2 {
        target.transform
    }

    fn fill_rect(&mut self, target: &mut WgpuTarget, rect: Rect, brush: &WgpuBrush) {
        let transform = target.transform;
        target.batch.fill_rect(&transform, rect, brush.color);
    }

    fn stroke_rect(
        &mut self,
        target: &mut WgpuTarget,
        rect: Rect,
        line_width: f32,
        brush: &WgpuBrush,
    ) {
        let transform = target.transform;
        target
            .batch
            .stroke_rect(&transform, rect, line_width, brush.color);
    }

    fn draw_line(
        &mut self,
        target: &mut WgpuTarget,
        from: Vec2,
        to: Vec2,
        line_width: f32,
        brush: &WgpuBrush,
    ) {
        let transform = target.transform;
        target
            .batch
            .line(&transform, from, to, line_width, brush.color);
    }

    fn fill_circle(
        &mut self,
        target: &mut WgpuTarget,
        center: Vec2,
        radius: f32,
        brush: &WgpuBrush,
    ) {
        let transform = target.transform;
        target
            .batch
            .fill_circle(&transform, center, radius, brush.color);
    }

    fn target_size(&self, target: &WgpuTarget) -> (f32, f32) {
        match &target.surface {
            Some(TargetSurface::SwapChain(shared)) => {
                let shared = shared.lock();
                (shared.config.width as f32, shared.config.height as f32)
            }
            Some(TargetSurface::Cpu { width, height, .. }) => (*width as f32, *height as f32),
            None => (0.0, 0.0),
        }
    }
}

/// Uploads the frame's batch and records one render pass into `view`.
#[allow(clippy::too_many_arguments)]
fn flush_batch(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &mut Option<ColorPipeline>,
    batch: &GeometryBatch,
    clear: &mut Option<Color>,
    view: &wgpu::TextureView,
    format: wgpu::TextureFormat,
    width: f32,
    height: f32,
) {
    let load = match clear.take() {
        Some(color) => wgpu::LoadOp::Clear(wgpu_color(color)),
        None => wgpu::LoadOp::Load,
    };

    if pipeline.as_ref().is_none_or(|p| p.format() != format) {
        *pipeline = Some(ColorPipeline::new(device, format));
    }

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("glint frame encoder"),
    });

    let vertices = batch.ndc_vertices(width, height);
    let vertex_buffer = (!vertices.is_empty()).then(|| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("glint frame vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        })
    });

    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint geometry pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        if let (Some(pipeline), Some(buffer)) = (pipeline.as_ref(), vertex_buffer.as_ref()) {
            pass.set_pipeline(pipeline.raw());
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..batch.vertex_count(), 0..1);
        }
    }

    queue.submit(std::iter::once(encoder.finish()));
}
