//! Scene assembly: light extraction and grouping of loose batches into
//! actuated entities.
//!
//! Source assets only encode structure through object names such as
//! `door.004_Left`, `cannon.002` or `LightLocation.003`. [`classify`] turns a
//! name into a closed [`BatchKind`], and [`Scene::assemble`] builds the light
//! list and the [`CannonGroup`]s from those tags.

use std::collections::{BTreeMap, BTreeSet};

use instant::Duration;

use crate::{
    animation::{GroupState, Side},
    data_structures::{
        instance::Instance,
        light::{Light, SceneLighting},
        model::{DEFAULT_NAME, GeometryBatch, Material, MeshDocument, ModelVertex},
    },
    resources::material::MaterialLibrary,
};

/// Identifier used when an entity name carries no `.NNN` suffix.
pub const DEFAULT_GROUP_ID: &str = "000";

/// Base color of effect batches, deliberately far above 1 so they glow.
pub const EFFECT_TINT: [f32; 4] = [10.0, 3.0, 0.0, 1.0];

/// What a batch is, judged from its object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// Placeholder whose centroid becomes a light; never rendered.
    LightMarker,
    Door,
    Actuator,
    Effect,
    /// Anything else: rendered, never animated.
    Scenery,
}

/// Case-insensitive substring classification. Light markers are recognised
/// first, then door, actuator and effect in that order.
pub fn classify(object_name: &str) -> BatchKind {
    let name = object_name.to_ascii_lowercase();
    if name.contains("lightlocation") {
        BatchKind::LightMarker
    } else if name.contains("door") {
        BatchKind::Door
    } else if name.contains("cannon") {
        BatchKind::Actuator
    } else if name.contains("explosion") {
        BatchKind::Effect
    } else {
        BatchKind::Scenery
    }
}

/// The first three digits directly after a `.`, e.g. `004` in `door.004_Left`.
pub fn group_id(object_name: &str) -> Option<&str> {
    object_name
        .as_bytes()
        .windows(4)
        .position(|w| w[0] == b'.' && w[1..].iter().all(u8::is_ascii_digit))
        .map(|at| &object_name[at + 1..at + 4])
}

/// An actuated entity assembled from every batch sharing its identifier.
///
/// Batch fields hold indices into [`Scene::batches`] / [`Scene::poses`].
#[derive(Clone, Debug, PartialEq)]
pub struct CannonGroup {
    pub id: String,
    pub side: Side,
    pub doors: Vec<usize>,
    pub actuators: Vec<usize>,
    pub effect: Option<usize>,
    pub state: GroupState,
    pub timer: Duration,
}

impl CannonGroup {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            side: Side::Right,
            doors: Vec::new(),
            actuators: Vec::new(),
            effect: None,
            state: GroupState::Idle,
            timer: Duration::ZERO,
        }
    }

    /// Adds a batch to the slot matching `kind`. A name containing `left` flips
    /// the group to the left side for good.
    fn attach(&mut self, kind: BatchKind, batch: usize, object_name: &str) {
        if object_name.to_ascii_lowercase().contains("left") {
            self.side = Side::Left;
        }
        match kind {
            BatchKind::Door => self.doors.push(batch),
            BatchKind::Actuator => self.actuators.push(batch),
            BatchKind::Effect => {
                if let Some(previous) = self.effect.replace(batch) {
                    log::warn!(
                        "group {} has more than one effect batch; batch {} replaces {}",
                        self.id,
                        batch,
                        previous
                    );
                }
            }
            BatchKind::LightMarker | BatchKind::Scenery => {}
        }
    }
}

/// Axis-aligned bounds of the vertex pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn of(vertices: &[ModelVertex]) -> Self {
        let Some(first) = vertices.first() else {
            return Self {
                min: [0.0; 3],
                max: [0.0; 3],
            };
        };
        vertices.iter().fold(
            Self {
                min: first.position,
                max: first.position,
            },
            |mut bounds, v| {
                for axis in 0..3 {
                    bounds.min[axis] = bounds.min[axis].min(v.position[axis]);
                    bounds.max[axis] = bounds.max[axis].max(v.position[axis]);
                }
                bounds
            },
        )
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Largest edge length.
    pub fn extent(&self) -> f32 {
        (0..3)
            .map(|axis| self.max[axis] - self.min[axis])
            .fold(0.0, f32::max)
    }
}

/// Everything the renderer and the sequencer need after loading.
///
/// `batches`, `kinds` and `poses` are parallel: entry `i` of each describes
/// renderable batch `i`. Light markers are not among them.
#[derive(Clone, Debug)]
pub struct Scene {
    pub vertices: Vec<ModelVertex>,
    pub batches: Vec<GeometryBatch>,
    pub kinds: Vec<BatchKind>,
    pub poses: Vec<Instance>,
    pub materials: MaterialLibrary,
    pub lights: Vec<Light>,
    pub groups: BTreeMap<String, CannonGroup>,
    pub lighting: SceneLighting,
    pub bounds: Bounds,
}

impl Scene {
    /// Splits the parsed batches into lights, renderable batches and groups.
    ///
    /// Batches without indices are dropped.
    pub fn assemble(
        document: MeshDocument,
        materials: MaterialLibrary,
        lighting: SceneLighting,
    ) -> Self {
        let MeshDocument {
            vertices, batches, ..
        } = document;

        let mut scene = Self {
            bounds: Bounds::of(&vertices),
            vertices,
            batches: Vec::with_capacity(batches.len()),
            kinds: Vec::with_capacity(batches.len()),
            poses: Vec::with_capacity(batches.len()),
            materials,
            lights: Vec::new(),
            groups: BTreeMap::new(),
            lighting,
        };

        for batch in batches.into_iter().filter(|b| !b.indices.is_empty()) {
            let kind = classify(&batch.object_name);
            if kind == BatchKind::LightMarker {
                let centroid = centroid(&scene.vertices, &batch.indices);
                scene.lights.push(scene.lighting.light_at(centroid));
                continue;
            }

            let idx = scene.batches.len();
            if kind != BatchKind::Scenery {
                let id = group_id(&batch.object_name).unwrap_or(DEFAULT_GROUP_ID);
                scene
                    .groups
                    .entry(id.to_string())
                    .or_insert_with(|| CannonGroup::new(id))
                    .attach(kind, idx, &batch.object_name);
            }
            scene.kinds.push(kind);
            scene.poses.push(Instance::new());
            scene.batches.push(batch);
        }

        scene.report();
        scene
    }

    /// Material names used by batches but defined in no library. Batches that
    /// never named a material are not listed.
    pub fn unresolved_materials(&self) -> BTreeSet<&str> {
        self.batches
            .iter()
            .map(|b| b.material.as_str())
            .filter(|name| *name != DEFAULT_NAME && !self.materials.contains_key(*name))
            .collect()
    }

    fn report(&self) {
        for name in self.unresolved_materials() {
            log::warn!("material {name} is not defined in any library; using white");
        }

        let center = self.bounds.center();
        log::info!(
            "scene: {} vertices, {} batches, {} lights, center [{:.2}, {:.2}, {:.2}], size {:.2}",
            self.vertices.len(),
            self.batches.len(),
            self.lights.len(),
            center[0],
            center[1],
            center[2],
            self.bounds.extent()
        );
        for group in self.groups.values() {
            log::info!(
                "group {}: side={}, actuators={}, doors={}, effect={}",
                group.id,
                group.side.as_str(),
                group.actuators.len(),
                group.doors.len(),
                if group.effect.is_some() { "yes" } else { "no" }
            );
        }
    }

    pub fn material(&self, batch: usize) -> Option<&Material> {
        self.batches
            .get(batch)
            .and_then(|b| self.materials.get(&b.material))
    }

    /// RGBA the renderer multiplies the batch with.
    pub fn base_color(&self, batch: usize) -> [f32; 4] {
        if self.kinds.get(batch) == Some(&BatchKind::Effect) {
            return EFFECT_TINT;
        }
        self.material(batch)
            .map(|m| [m.diffuse[0], m.diffuse[1], m.diffuse[2], 1.0])
            .unwrap_or([1.0; 4])
    }

    /// Diffuse texture to bind, `None` meaning the plain white texture.
    pub fn diffuse_map(&self, batch: usize) -> Option<&str> {
        if self.kinds.get(batch) == Some(&BatchKind::Effect) {
            return None;
        }
        self.material(batch).and_then(|m| m.diffuse_map.as_deref())
    }

    /// The vertex pool as the flat interleaved `f32` stream the GPU expects.
    pub fn vertex_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

fn centroid(vertices: &[ModelVertex], indices: &[u32]) -> [f32; 3] {
    let mut sum = [0.0f32; 3];
    for &idx in indices {
        let p = vertices[idx as usize].position;
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }
    let n = indices.len() as f32;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}
