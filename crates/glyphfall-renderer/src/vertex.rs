// GPU vertex types for the instanced scene pass.

use bytemuck::{Pod, Zeroable};
use glyphfall_sim::CellInstance;

/// Corner of the shared unit quad; instanced into every grid cell.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Unit quad as a 4-vertex triangle strip, top-left origin.
pub const UNIT_QUAD: [QuadVertex; 4] = [
    QuadVertex { position: [0.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { position: [1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { position: [0.0, 1.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
];

impl QuadVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Vertex layout for `glyphfall_sim::CellInstance` (32-byte stride, the
/// trailing padding is not exposed to the shader).
pub const CELL_INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        // cell_origin
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
        // glyph_index
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 3,
            format: wgpu::VertexFormat::Uint32,
        },
        // brightness
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32,
        },
        // is_head
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 5,
            format: wgpu::VertexFormat::Float32,
        },
    ],
};
