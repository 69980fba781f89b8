//! Star Swarm headless runner
//!
//! Plays one autopiloted session at a fixed step, logging phase changes,
//! then records the result in the score table.
//!
//! Usage: `star-swarm [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use star_swarm::sim::{GameEvent, GameState, TickInput, tick};
    use star_swarm::{ScoreTable, Settings};

    /// Fixed step, roughly 60 Hz
    const DT_MS: u32 = 16;
    /// Hard stop for a session the autopilot never loses
    const MAX_TICKS: u64 = 60 * 60 * 30;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Star Swarm (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&PathBuf::from(path)),
        None => Settings::default(),
    };
    let mut scores = ScoreTable::load(&settings.score_file, settings.num_tracked_scores);
    let high_score = scores.top_score().unwrap_or(0);

    let mut state = GameState::new(&settings, high_score);
    let input = TickInput {
        dt_ms: DT_MS,
        autopilot: true,
        ..Default::default()
    };

    while !state.is_finished() && state.time_ticks < MAX_TICKS {
        for event in tick(&mut state, &input) {
            match event {
                GameEvent::LivesChanged { lives } => log::info!("Lives: {lives}"),
                GameEvent::SessionFinished { score, high_score } => {
                    log::info!("Final score {score} (high score {high_score})")
                }
                other => log::trace!("{other:?}"),
            }
        }
    }

    let session = &state.session;
    println!(
        "Reached stage {} with {} points ({} hits / {} shots, {:.1}% accuracy)",
        session.stage_number,
        session.score,
        session.hits,
        session.shots_fired,
        session.hit_ratio() * 100.0
    );

    if let Some(rank) = scores.add_score("YOU", session.score) {
        println!("New high score entry at rank {rank}");
        if let Err(err) = scores.save(&settings.score_file) {
            log::error!("{err}");
        }
    }
    for record in scores.records() {
        println!("{} {}", record.name, record.score);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library has no wasm front end; nothing to run
}
