//! Parsed geometry and material records.
//!
//! These are plain CPU-side values produced by the parsers in
//! [`crate::resources`]. They never change shape after loading; only the
//! per-batch poses stored on the [`Scene`](super::scene::Scene) mutate.

/// Anything that can describe its own GPU vertex layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Object and material name of geometry declared before any `o` or `usemtl`.
pub const DEFAULT_NAME: &str = "_default";

pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
pub const DEFAULT_TEX_COORDS: [f32; 2] = [0.0, 0.0];

/// One slot of the shared, deduplicated vertex pool.
///
/// Laid out exactly as the renderer consumes it: position, normal, texture
/// coordinate, all `f32`, 32 bytes per vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A run of triangle indices sharing one material and one source object.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryBatch {
    pub material: String,
    pub object_name: String,
    pub indices: Vec<u32>,
}

impl GeometryBatch {
    pub fn new(material: &str, object_name: &str) -> Self {
        Self {
            material: material.to_string(),
            object_name: object_name.to_string(),
            indices: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Output of the mesh parser: vertex pool, batches in declaration order and the
/// material libraries the document asked for.
#[derive(Clone, Debug, Default)]
pub struct MeshDocument {
    pub vertices: Vec<ModelVertex>,
    pub batches: Vec<GeometryBatch>,
    pub material_libs: Vec<String>,
}

/// A named surface description from a material library.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub emissive: [f32; 3],
    pub diffuse_map: Option<String>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            diffuse_map: None,
        }
    }
}
