//! The running session: one loaded scene plus everything that ticks over it.

use instant::Duration;

use crate::{
    audio::CuePlayer,
    camera::{Camera, CameraController, CameraUniform, Projection},
    data_structures::scene::Scene,
    input::{Action, InputIntent},
    render::FrameParams,
    sequencer::Sequencer,
};

/// What the fragment shader outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugView {
    #[default]
    Shaded,
    Normals,
    Uv,
}

impl DebugView {
    pub fn mode(self) -> u32 {
        match self {
            DebugView::Shaded => 0,
            DebugView::Normals => 1,
            DebugView::Uv => 2,
        }
    }
}

pub struct Context {
    pub scene: Scene,
    pub sequencer: Sequencer,
    pub camera: Camera,
    pub controller: CameraController,
    pub projection: Projection,
    pub camera_uniform: CameraUniform,
    debug_view: DebugView,
    fire_held: bool,
    time: Duration,
}

impl Context {
    /// Puts the scene at rest and frames the camera around it.
    pub fn new(mut scene: Scene, width: u32, height: u32) -> Self {
        let sequencer = Sequencer::default();
        sequencer.rest(&mut scene);

        let mut camera = Camera::new((0.0, 0.0, 0.0), cgmath::Rad(0.0), cgmath::Rad(0.0));
        camera.frame(&scene.bounds);
        let mut controller = CameraController::new(10.0, 2.0);
        controller.scale_to(&scene.bounds);
        let projection = Projection::new(
            width,
            height,
            cgmath::Rad(std::f32::consts::FRAC_PI_4),
            0.1,
            1000.0,
        );
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        Self {
            scene,
            sequencer,
            camera,
            controller,
            projection,
            camera_uniform,
            debug_view: DebugView::default(),
            fire_held: false,
            time: Duration::ZERO,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.camera_uniform
            .update_view_proj(&self.camera, &self.projection);
    }

    /// One frame: camera, fire trigger, debug view, then the sequence.
    pub fn update(&mut self, dt: Duration, input: &impl InputIntent, audio: &mut impl CuePlayer) {
        self.time += dt;
        self.controller.update_camera(&mut self.camera, input, dt);

        let fire = input.is_action_active(Action::Fire);
        if fire && !self.fire_held {
            self.sequencer.fire(&mut self.scene);
        }
        self.fire_held = fire;

        for (action, view) in [
            (Action::ViewShaded, DebugView::Shaded),
            (Action::ViewNormals, DebugView::Normals),
            (Action::ViewUv, DebugView::Uv),
        ] {
            if input.is_action_active(action) && self.debug_view != view {
                log::info!("debug view: {view:?}");
                self.debug_view = view;
            }
        }

        for cue in self.sequencer.update(&mut self.scene, dt) {
            audio.play_cue(cue.volume, cue.pitch);
        }

        self.camera_uniform
            .update_view_proj(&self.camera, &self.projection);
    }

    pub fn debug_view(&self) -> DebugView {
        self.debug_view
    }

    /// Session time since creation.
    pub fn time(&self) -> Duration {
        self.time
    }

    pub fn frame_params(&self) -> FrameParams {
        FrameParams::new(self.time.as_secs_f32(), self.debug_view.mode())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, ops::RangeInclusive};

    use super::*;
    use crate::{
        data_structures::light::SceneLighting,
        resources::{material::MaterialLibrary, mesh::parse_obj},
        sequencer::SequenceState,
    };

    #[derive(Default)]
    struct Recorder(Vec<(RangeInclusive<f32>, RangeInclusive<f32>)>);

    impl CuePlayer for Recorder {
        fn play_cue(&mut self, volume: RangeInclusive<f32>, pitch: RangeInclusive<f32>) {
            self.0.push((volume, pitch));
        }
    }

    fn context() -> Context {
        let obj = "v 0 0 0\nv 4 0 0\nv 0 2 0\nv 0 0 4
o cannon.000\nf 1 2 3
o explosion.000\nf 1 2 4
o door.004_Left\nf 1 3 4
o cannon.004_Left\nf 2 3 4
";
        let scene = Scene::assemble(
            parse_obj(obj).unwrap(),
            MaterialLibrary::new(),
            SceneLighting::default(),
        );
        Context::new(scene, 800, 600)
    }

    fn held(actions: &[Action]) -> HashSet<Action> {
        actions.iter().copied().collect()
    }

    #[test]
    fn starts_at_rest_and_framed() {
        let ctx = context();
        assert_eq!(ctx.scene.poses[0].position.z, 2.0);
        assert!(!ctx.scene.poses[1].is_visible());
        assert_eq!(ctx.scene.poses[3].position.z, -2.0);
        assert_eq!(ctx.controller.move_speed, 2.0);
        assert_eq!(ctx.camera.position, cgmath::Point3::new(2.0, 3.0, 8.0));
    }

    #[test]
    fn fire_triggers_on_press_edge_only() {
        let mut ctx = context();
        let mut audio = Recorder::default();
        let fire = held(&[Action::Fire]);

        ctx.update(Duration::from_millis(100), &fire, &mut audio);
        assert_eq!(ctx.sequencer.state(), SequenceState::Firing);
        ctx.update(Duration::from_millis(100), &fire, &mut audio);
        assert_eq!(ctx.sequencer.elapsed(), Duration::from_millis(200));

        // a fresh press during the run is ignored as well
        ctx.update(Duration::from_millis(100), &held(&[]), &mut audio);
        ctx.update(Duration::from_millis(100), &fire, &mut audio);
        assert_eq!(ctx.sequencer.elapsed(), Duration::from_millis(400));
    }

    #[test]
    fn cues_reach_the_player() {
        let mut ctx = context();
        let mut audio = Recorder::default();
        ctx.update(Duration::ZERO, &held(&[Action::Fire]), &mut audio);
        ctx.update(Duration::from_secs(5), &held(&[]), &mut audio);

        assert_eq!(audio.0.len(), 2);
        assert_eq!(audio.0[0], (0.5..=1.0, 0.8..=1.2));
        assert_eq!(ctx.sequencer.state(), SequenceState::Idle);
    }

    #[test]
    fn debug_view_follows_actions() {
        let mut ctx = context();
        let mut audio = Recorder::default();
        assert_eq!(ctx.frame_params().debug_mode(), 0);

        let normals = held(&[Action::ViewNormals]);
        ctx.update(Duration::from_millis(250), &normals, &mut audio);
        assert_eq!(ctx.debug_view(), DebugView::Normals);
        ctx.update(Duration::from_millis(250), &held(&[]), &mut audio);
        assert_eq!(ctx.debug_view(), DebugView::Normals);

        let params = ctx.frame_params();
        assert_eq!(params.debug_mode(), 1);
        assert_eq!(params.time(), 0.5);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut ctx = context();
        ctx.resize(1000, 500);
        assert_eq!(ctx.projection.aspect(), 2.0);
    }
}
