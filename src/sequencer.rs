//! The global firing sequence.
//!
//! One [`Sequencer`] drives every [`CannonGroup`] of a scene: it staggers the
//! start of each group along the configured order, steps the started groups
//! through [`animation::advance`] and writes the resulting poses back into the
//! scene. Cues are not played here; [`Sequencer::update`] returns them.

use instant::Duration;

use crate::{
    animation::{self, GroupState, SequencerConfig, SideEffect},
    audio::CueRequest,
    data_structures::{
        instance::Instance,
        scene::{CannonGroup, Scene},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    Firing,
}

pub struct Sequencer {
    state: SequenceState,
    elapsed: Duration,
    config: SequencerConfig,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            state: SequenceState::Idle,
            elapsed: Duration::ZERO,
            config,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Time since the current sequence was triggered.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Starts a sequence. Ignored while one is running; returns whether it started.
    pub fn fire(&mut self, scene: &mut Scene) -> bool {
        if self.state == SequenceState::Firing {
            log::debug!("fire ignored: sequence already running");
            return false;
        }
        self.state = SequenceState::Firing;
        self.elapsed = Duration::ZERO;
        for group in scene.groups.values_mut() {
            group.state = GroupState::Waiting;
            group.timer = Duration::ZERO;
        }
        log::info!("firing sequence started for {} groups", scene.groups.len());
        true
    }

    /// Advances the sequence by `dt` and returns the cues to play.
    pub fn update(&mut self, scene: &mut Scene, dt: Duration) -> Vec<CueRequest> {
        let mut cues = Vec::new();
        let previous = self.elapsed;

        let mut started = Vec::new();
        if self.state == SequenceState::Firing {
            self.elapsed += dt;
            for (position, id) in self.config.order.iter().enumerate() {
                let start = self.config.gap * position as u32;
                let Some(group) = scene.groups.get_mut(id) else {
                    continue;
                };
                if group.state == GroupState::Waiting && self.elapsed >= start {
                    group.state = GroupState::Extending;
                    group.timer = Duration::ZERO;
                    log::debug!("group {id} extending");
                    // only the part of the tick after its start belongs to it
                    started.push((id.clone(), self.elapsed - start.max(previous)));
                }
            }
        }

        for group in scene.groups.values_mut() {
            let share = started
                .iter()
                .find(|(id, _)| *id == group.id)
                .map_or(dt, |(_, share)| *share);
            step_group(group, &mut scene.poses, share, &self.config, &mut cues);
        }

        if self.state == SequenceState::Firing && self.is_complete(scene) {
            log::info!("firing sequence finished after {:?}", self.elapsed);
            self.state = SequenceState::Idle;
            self.elapsed = Duration::ZERO;
            self.rest(scene);
        }

        cues
    }

    fn is_complete(&self, scene: &Scene) -> bool {
        self.config.order.iter().all(|id| {
            scene
                .groups
                .get(id)
                .is_none_or(|g| matches!(g.state, GroupState::Done | GroupState::Idle))
        })
    }

    /// Puts every group in its rest pose: actuators at the signed rest offset,
    /// doors at identity, effects hidden, state idle.
    pub fn rest(&self, scene: &mut Scene) {
        for group in scene.groups.values_mut() {
            let offset = self.config.rest_offset_for(group.side);
            set_actuators(group, &mut scene.poses, &self.config, offset);
            if let Some(pose) = group.effect.and_then(|idx| scene.poses.get_mut(idx)) {
                *pose = Instance::hidden();
            }
            group.state = GroupState::Idle;
            group.timer = Duration::ZERO;
        }
    }
}

/// Runs transition rules for one group until the tick's time is used up.
fn step_group(
    group: &mut CannonGroup,
    poses: &mut [Instance],
    dt: Duration,
    config: &SequencerConfig,
    cues: &mut Vec<CueRequest>,
) {
    let mut remaining = dt;
    while group.state.is_active() {
        let step = animation::advance(group.state, group.timer, remaining, group.side, config);
        if let Some(offset) = step.actuator_offset {
            set_actuators(group, poses, config, offset);
        }
        for effect in step.effects {
            match effect {
                SideEffect::ShowEffect => set_effect(group, poses, Instance::new()),
                SideEffect::HideEffect => set_effect(group, poses, Instance::hidden()),
                SideEffect::PlayCue(cue) => cues.push(cue),
            }
        }
        if step.state != group.state {
            log::debug!("group {}: {:?} -> {:?}", group.id, group.state, step.state);
        }
        group.state = step.state;
        group.timer = step.timer;

        if step.carry.is_zero() {
            break;
        }
        remaining = step.carry;
    }
}

fn set_actuators(
    group: &CannonGroup,
    poses: &mut [Instance],
    config: &SequencerConfig,
    offset: f32,
) {
    for &idx in &group.actuators {
        if let Some(pose) = poses.get_mut(idx) {
            *pose = Instance::offset_along(config.lateral_axis, offset);
        }
    }
    for &idx in &group.doors {
        if let Some(pose) = poses.get_mut(idx) {
            *pose = Instance::new();
        }
    }
}

fn set_effect(group: &CannonGroup, poses: &mut [Instance], pose: Instance) {
    if let Some(slot) = group.effect.and_then(|idx| poses.get_mut(idx)) {
        *slot = pose;
    }
}
