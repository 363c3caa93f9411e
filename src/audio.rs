//! Boundary to the audio collaborator.
//!
//! The sequencer never plays sound itself. It emits [`CueRequest`]s and the
//! owner of the session hands them to a [`CuePlayer`].

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Ask for the firing cue with volume and pitch drawn from the given ranges.
#[derive(Clone, Debug, PartialEq)]
pub struct CueRequest {
    pub volume: RangeInclusive<f32>,
    pub pitch: RangeInclusive<f32>,
}

impl Default for CueRequest {
    fn default() -> Self {
        Self {
            volume: 0.5..=1.0,
            pitch: 0.8..=1.2,
        }
    }
}

impl CueRequest {
    /// Draws a concrete `(volume, pitch)` pair.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        (
            rng.random_range(self.volume.clone()),
            rng.random_range(self.pitch.clone()),
        )
    }
}

/// Fire-and-forget sink for cues. Implementations must not block.
pub trait CuePlayer {
    fn play_cue(&mut self, volume: RangeInclusive<f32>, pitch: RangeInclusive<f32>);
}

/// Stand-in player for headless runs: picks the randomized values and logs them.
pub struct LoggingCuePlayer {
    rng: SmallRng,
    played: usize,
}

impl LoggingCuePlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            played: 0,
        }
    }

    pub fn played(&self) -> usize {
        self.played
    }
}

impl Default for LoggingCuePlayer {
    fn default() -> Self {
        // wall clock is only used to vary the sequence between runs
        Self::new(instant::now().to_bits())
    }
}

impl CuePlayer for LoggingCuePlayer {
    fn play_cue(&mut self, volume: RangeInclusive<f32>, pitch: RangeInclusive<f32>) {
        let (volume, pitch) = CueRequest { volume, pitch }.sample(&mut self.rng);
        self.played += 1;
        log::info!("cue #{}: volume {volume:.2}, pitch {pitch:.2}", self.played);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let request = CueRequest::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let (volume, pitch) = request.sample(&mut rng);
            assert!(request.volume.contains(&volume));
            assert!(request.pitch.contains(&pitch));
        }
    }

    #[test]
    fn logging_player_counts_cues() {
        let mut player = LoggingCuePlayer::new(1);
        let request = CueRequest::default();
        player.play_cue(request.volume.clone(), request.pitch.clone());
        player.play_cue(request.volume, request.pitch);
        assert_eq!(player.played(), 2);
    }
}
