//! Per-group firing animation as a pure transition function.
//!
//! [`advance`] takes a group's phase, its timer, the elapsed delta and the
//! group's side and returns the next phase together with the actuator offset
//! to apply and any side effects. It touches no scene, GPU or audio state, so
//! the [`Sequencer`](crate::sequencer::Sequencer) can apply the result however
//! it likes and tests can drive it directly.

use instant::Duration;

use crate::audio::CueRequest;

/// Phase of a single actuated group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupState {
    Idle,
    Waiting,
    Extending,
    Wait,
    Exploding,
    Retracting,
    Done,
}

impl GroupState {
    /// States whose timer advances on every tick.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            GroupState::Idle | GroupState::Waiting | GroupState::Done
        )
    }
}

/// Which side of the scene a group sits on; decides the sign of its offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Durations, distances and firing order for the sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequencerConfig {
    pub extend: Duration,
    pub wait: Duration,
    pub explode: Duration,
    pub retract: Duration,
    /// Delay between consecutive entries of [`order`](Self::order).
    pub gap: Duration,
    /// Distance of a retracted actuator from its firing position.
    pub rest_offset: f32,
    /// Unit axis the actuators slide along.
    pub lateral_axis: cgmath::Vector3<f32>,
    /// Group identifiers in firing order.
    pub order: Vec<String>,
    pub cue: CueRequest,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            extend: Duration::from_millis(2000),
            wait: Duration::from_millis(200),
            explode: Duration::from_millis(200),
            retract: Duration::from_millis(300),
            gap: Duration::from_millis(300),
            rest_offset: 2.0,
            lateral_axis: cgmath::Vector3::unit_z(),
            // alternate right (000-003) and left (004-007)
            order: ["000", "004", "001", "005", "002", "006", "003", "007"]
                .into_iter()
                .map(String::from)
                .collect(),
            cue: CueRequest::default(),
        }
    }
}

impl SequencerConfig {
    /// Time from the trigger until the last group in the order is done.
    pub fn total_duration(&self) -> Duration {
        let last = self.order.len().saturating_sub(1) as u32;
        self.gap * last + self.extend + self.wait + self.explode + self.retract
    }

    /// Signed actuator offset of the rest pose.
    pub fn rest_offset_for(&self, side: Side) -> f32 {
        side.sign() * self.rest_offset
    }
}

/// Something a transition asks the outside world to do.
#[derive(Clone, Debug, PartialEq)]
pub enum SideEffect {
    ShowEffect,
    HideEffect,
    PlayCue(CueRequest),
}

/// Outcome of evaluating one transition rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub state: GroupState,
    pub timer: Duration,
    /// Time past the threshold that belongs to the next state.
    pub carry: Duration,
    /// Signed actuator offset along the lateral axis, if this state moves them.
    pub actuator_offset: Option<f32>,
    pub effects: Vec<SideEffect>,
}

impl Step {
    fn stay(state: GroupState, timer: Duration) -> Self {
        Self {
            state,
            timer,
            carry: Duration::ZERO,
            actuator_offset: None,
            effects: Vec::new(),
        }
    }

    fn enter(state: GroupState, carry: Duration) -> Self {
        Self {
            state,
            timer: Duration::ZERO,
            carry,
            actuator_offset: None,
            effects: Vec::new(),
        }
    }
}

/// `3p² - 2p³`: zero velocity at both ends.
pub fn smoothstep(p: f32) -> f32 {
    p * p * (3.0 - 2.0 * p)
}

fn progress(timer: Duration, span: Duration) -> f32 {
    if span.is_zero() {
        return 1.0;
    }
    (timer.as_secs_f32() / span.as_secs_f32()).min(1.0)
}

/// Evaluates exactly one transition rule for a group.
///
/// Idle, waiting and done groups are returned unchanged. For the others the
/// timer is advanced by `dt` first; when a threshold is crossed the new state
/// starts at zero and the overshoot is reported as [`Step::carry`].
pub fn advance(
    state: GroupState,
    timer: Duration,
    dt: Duration,
    side: Side,
    config: &SequencerConfig,
) -> Step {
    if !state.is_active() {
        return Step::stay(state, timer);
    }
    let timer = timer + dt;
    let rest = config.rest_offset_for(side);

    match state {
        GroupState::Extending => {
            let eased = smoothstep(progress(timer, config.extend));
            let offset = rest * (1.0 - eased);
            let mut step = match timer.checked_sub(config.extend) {
                Some(carry) => Step::enter(GroupState::Wait, carry),
                None => Step::stay(state, timer),
            };
            step.actuator_offset = Some(offset);
            step
        }
        GroupState::Wait => match timer.checked_sub(config.wait) {
            Some(carry) => {
                let mut step = Step::enter(GroupState::Exploding, carry);
                step.effects.push(SideEffect::ShowEffect);
                step.effects.push(SideEffect::PlayCue(config.cue.clone()));
                step
            }
            None => Step::stay(state, timer),
        },
        GroupState::Exploding => match timer.checked_sub(config.explode) {
            Some(carry) => {
                let mut step = Step::enter(GroupState::Retracting, carry);
                step.effects.push(SideEffect::HideEffect);
                step
            }
            None => Step::stay(state, timer),
        },
        GroupState::Retracting => {
            let eased = smoothstep(progress(timer, config.retract));
            let mut step = if timer >= config.retract {
                // terminal: nothing to carry into
                Step::stay(GroupState::Done, timer)
            } else {
                Step::stay(state, timer)
            };
            step.actuator_offset = Some(rest * eased);
            step
        }
        GroupState::Idle | GroupState::Waiting | GroupState::Done => Step::stay(state, timer),
    }
}
