//! Point lights extracted from marker geometry and their uniform layout.

/// Upper bound on lights the uniform can carry.
pub const MAX_LIGHTS: usize = 16;

/// A point light placed at the centroid of a marker batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Fixed lighting parameters applied to every scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLighting {
    pub ambient: [f32; 4],
    pub light_color: [f32; 3],
    pub light_intensity: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            ambient: [0.4, 0.4, 0.4, 1.0],
            // warm orange-yellow
            light_color: [1.0, 0.8, 0.2],
            light_intensity: 3.5,
        }
    }
}

impl SceneLighting {
    pub fn light_at(&self, position: [f32; 3]) -> Light {
        Light {
            position,
            color: self.light_color,
            intensity: self.light_intensity,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    position: [f32; 3],
    // Uniforms require 16 byte (4 float) spacing; the shader reads this as w = 1
    _w: f32,
    color: [f32; 3],
    intensity: f32,
}

/// The light block read by the fragment shader.
///
/// Byte 0: ambient rgba. Byte 16: light count. Byte 32 onwards: one
/// `{position, 1.0, color, intensity}` record per light.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    ambient: [f32; 4],
    count: u32,
    _padding: [u32; 3],
    lights: [LightRaw; MAX_LIGHTS],
}

impl LightsUniform {
    pub fn new(ambient: [f32; 4], lights: &[Light]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights extracted but only {} fit the light buffer; the rest are dropped",
                lights.len(),
                MAX_LIGHTS
            );
        }
        let mut uniform = Self {
            ambient,
            count: 0,
            _padding: [0; 3],
            lights: [bytemuck::Zeroable::zeroed(); MAX_LIGHTS],
        };
        for (slot, light) in uniform.lights.iter_mut().zip(lights) {
            *slot = LightRaw {
                position: light.position,
                _w: 1.0,
                color: light.color,
                intensity: light.intensity,
            };
            uniform.count += 1;
        }
        uniform
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
