//! GPU side of a loaded scene.
//!
//! [`SceneBuffers`] owns every buffer the shaders read: the shared vertex pool,
//! one index buffer per batch, the per-batch instance and material data, the
//! light block and the per-frame uniforms. Drawing batch `i` means binding
//! index buffer `i`, material `i` and instance slot `i..i + 1`.

use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    data_structures::{instance::InstanceRaw, light::LightsUniform, scene::Scene},
};

/// Per-batch color the shader multiplies the texture sample with.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
}

/// Per-frame values shared by every draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameParams {
    time: f32,
    debug_mode: u32,
    _padding: [u32; 2],
}

impl FrameParams {
    pub fn new(time: f32, debug_mode: u32) -> Self {
        Self {
            time,
            debug_mode,
            _padding: [0; 2],
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn debug_mode(&self) -> u32 {
        self.debug_mode
    }
}

/// Current poses of all renderable batches, in batch order.
pub fn instance_data(scene: &Scene) -> Vec<InstanceRaw> {
    scene.poses.iter().map(|pose| pose.to_raw()).collect()
}

pub fn material_data(scene: &Scene) -> Vec<MaterialUniform> {
    (0..scene.batches.len())
        .map(|batch| MaterialUniform {
            base_color: scene.base_color(batch),
        })
        .collect()
}

pub struct BatchBuffers {
    pub index: wgpu::Buffer,
    pub index_count: u32,
    pub material: wgpu::Buffer,
}

pub struct SceneBuffers {
    pub vertex: wgpu::Buffer,
    pub batches: Vec<BatchBuffers>,
    pub instances: wgpu::Buffer,
    pub lights: wgpu::Buffer,
    pub camera: wgpu::Buffer,
    pub frame: wgpu::Buffer,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device, scene: &Scene) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Vertex Buffer"),
            contents: bytemuck::cast_slice(scene.vertex_data()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let batches = scene
            .batches
            .iter()
            .zip(material_data(scene))
            .map(|(batch, material)| BatchBuffers {
                index: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", batch.object_name)),
                    contents: bytemuck::cast_slice(&batch.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: batch.indices.len() as u32,
                material: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Material Buffer", batch.object_name)),
                    contents: bytemuck::bytes_of(&material),
                    usage: wgpu::BufferUsages::UNIFORM,
                }),
            })
            .collect();

        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data(scene)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let lights_uniform = LightsUniform::new(scene.lighting.ambient, &scene.lights);
        let lights = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::bytes_of(&lights_uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let camera = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::new()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Params Buffer"),
            contents: bytemuck::bytes_of(&FrameParams::new(0.0, 0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!(
            "uploaded {} vertices and {} batches",
            scene.vertices.len(),
            scene.batches.len()
        );

        Self {
            vertex,
            batches,
            instances,
            lights,
            camera,
            frame,
        }
    }

    /// Re-uploads the batch poses written by the last tick.
    pub fn write_poses(&self, queue: &wgpu::Queue, scene: &Scene) {
        if scene.poses.is_empty() {
            return;
        }
        queue.write_buffer(
            &self.instances,
            0,
            bytemuck::cast_slice(&instance_data(scene)),
        );
    }

    pub fn write_camera(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera, 0, bytemuck::bytes_of(uniform));
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, params: FrameParams) {
        queue.write_buffer(&self.frame, 0, bytemuck::bytes_of(&params));
    }
}
