//! Scene data: what the parsers produce and what the sequencer and renderer read.
//!
//! - `model` holds vertices, batches, materials and the parsed mesh document
//! - `instance` holds the per-batch pose and its GPU layout
//! - `light` holds extracted lights and the light uniform block
//! - `scene` classifies batches and assembles lights and cannon groups

pub mod instance;
pub mod light;
pub mod model;
pub mod scene;
