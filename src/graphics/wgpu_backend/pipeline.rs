//! Colored-geometry flush pipeline.
//!
//! Drawing calls tessellate into a CPU-side vertex batch in pixel space; the
//! batch is converted to normalized device coordinates and flushed through a
//! single untextured pipeline when the frame closes.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

use crate::graphics::{Color, Rect};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(super) struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

const CIRCLE_SEGMENTS: u32 = 32;

const SHADER: &str = r"
struct VsIn {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";

/// The untextured alpha-blended triangle pipeline, specialized to one surface
/// format.
pub(super) struct ColorPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
}

impl ColorPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Geometry Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Geometry Pipeline Layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Geometry Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self { format, pipeline }
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

/// Pixel-space triangle accumulator for one frame.
#[derive(Default)]
pub(super) struct GeometryBatch {
    vertices: Vec<Vertex>,
}

impl GeometryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn fill_rect(&mut self, transform: &Affine2, rect: Rect, color: Color) {
        let [a, b, c, d] = rect.corners();
        self.triangle(transform, a, b, c, color);
        self.triangle(transform, a, c, d, color);
    }

    pub fn stroke_rect(&mut self, transform: &Affine2, rect: Rect, line_width: f32, color: Color) {
        let [a, b, c, d] = rect.corners();
        self.line(transform, a, b, line_width, color);
        self.line(transform, b, c, line_width, color);
        self.line(transform, c, d, line_width, color);
        self.line(transform, d, a, line_width, color);
    }

    /// Line segments keep their pixel width regardless of the transform's
    /// scale; only the endpoints are transformed.
    pub fn line(&mut self, transform: &Affine2, from: Vec2, to: Vec2, line_width: f32, color: Color) {
        let from = transform.transform_point2(from);
        let to = transform.transform_point2(to);
        let direction = to - from;
        if direction.length_squared() == 0.0 {
            return;
        }
        let normal = direction.perp().normalize() * (line_width * 0.5);

        let (a, b, c, d) = (from + normal, to + normal, to - normal, from - normal);
        self.push_raw(a, color);
        self.push_raw(b, color);
        self.push_raw(c, color);
        self.push_raw(a, color);
        self.push_raw(c, color);
        self.push_raw(d, color);
    }

    pub fn fill_circle(&mut self, transform: &Affine2, center: Vec2, radius: f32, color: Color) {
        for i in 0..CIRCLE_SEGMENTS {
            let a0 = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
            let a1 = (i + 1) as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
            self.triangle(
                transform,
                center,
                center + Vec2::from_angle(a0) * radius,
                center + Vec2::from_angle(a1) * radius,
                color,
            );
        }
    }

    /// Converts the pixel-space batch to normalized device coordinates for a
    /// target of the given dimensions.
    pub fn ndc_vertices(&self, width: f32, height: f32) -> Vec<Vertex> {
        self.vertices
            .iter()
            .map(|v| Vertex {
                position: [
                    v.position[0] / width * 2.0 - 1.0,
                    1.0 - v.position[1] / height * 2.0,
                ],
                color: v.color,
            })
            .collect()
    }

    fn triangle(&mut self, transform: &Affine2, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.push_raw(transform.transform_point2(a), color);
        self.push_raw(transform.transform_point2(b), color);
        self.push_raw(transform.transform_point2(c), color);
    }

    fn push_raw(&mut self, position: Vec2, color: Color) {
        self.vertices.push(Vertex {
            position: position.to_array(),
            color: [color.r, color.g, color.b, color.a],
        });
    }
}
