//! Loads the bundled scene, fires one broadside and ticks it to completion
//! without opening a window. Run with `RUST_LOG=debug` to see every transition.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::collections::HashSet;

    use broadside::{Context, audio::LoggingCuePlayer, input::Action, sequencer::SequenceState};
    use instant::Duration;

    broadside::init_logger();

    let file_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "broadside.obj".to_string());
    let scene = broadside::load_scene(&file_name).await?;
    let mut ctx = Context::new(scene, 1280, 720);
    let mut audio = LoggingCuePlayer::default();

    let tick = Duration::from_micros(16_667);
    let budget = ctx.sequencer.config().total_duration() + Duration::from_secs(1);
    let fire = HashSet::from([Action::Fire]);
    let idle: HashSet<Action> = HashSet::new();

    ctx.update(tick, &fire, &mut audio);
    while ctx.sequencer.state() == SequenceState::Firing && ctx.time() < budget {
        ctx.update(tick, &idle, &mut audio);
    }

    log::info!(
        "sequence {:?} after {:.2}s, {} cues played",
        ctx.sequencer.state(),
        ctx.time().as_secs_f32(),
        audio.played()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
