//! broadside
//!
//! Loads a mesh + material scene, splits it into lights, static scenery and
//! actuated cannon groups, and drives a timed firing sequence over those groups
//! with a free-flying camera. Runs natively and on wasm32.
//!
//! High-level modules
//! - `resources`: async loading plus the mesh and material text parsers
//! - `data_structures`: vertices, batches, materials, lights, poses, scene assembly
//! - `animation`: the per-group transition function
//! - `sequencer`: staggered firing of all groups
//! - `camera`: fly camera, controller, projection and uniform
//! - `input`: named actions and the keyboard mapping behind them
//! - `audio`: cue requests and the player boundary
//! - `render`: GPU buffers for a loaded scene
//! - `context`: one session value that ticks everything above
//!

pub mod animation;
pub mod audio;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod input;
pub mod render;
pub mod resources;
pub mod sequencer;

pub use context::Context;
pub use error::ParseError;
pub use resources::load_scene;

/// Installs the platform logger. Calling it twice is harmless.
pub fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Info);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env).try_init();
    }
}
