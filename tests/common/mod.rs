use std::{collections::HashSet, ops::RangeInclusive};

use broadside::{audio::CuePlayer, input::Action};

/// Cue player that only remembers what it was asked to play.
#[derive(Default)]
pub struct RecordingCuePlayer {
    pub cues: Vec<(RangeInclusive<f32>, RangeInclusive<f32>)>,
}

impl CuePlayer for RecordingCuePlayer {
    fn play_cue(&mut self, volume: RangeInclusive<f32>, pitch: RangeInclusive<f32>) {
        self.cues.push((volume, pitch));
    }
}

pub fn held(actions: &[Action]) -> HashSet<Action> {
    actions.iter().copied().collect()
}
