//! Arcade headless runner
//!
//! Plays one round of a game with no keyboard and prints the final snapshot.
//! Useful for watching the AI opponents and the round lifecycle in the log:
//!
//! ```text
//! RUST_LOG=info cargo run -- pong single
//! ```
//!
//! In the browser the library's `WebArcade` class is the entry point.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use arcade::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, SIM_HZ};
    use arcade::host::LogSink;
    use arcade::sim::RoundState;
    use arcade::{GameKind, PlayerMode, Session, Settings};

    // Longest round is a 15 s countdown plus a 60 s clock
    const MAX_SECONDS: u32 = 120;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next() {
        Some(name) => GameKind::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown game '{}', playing pong", name);
            GameKind::Pong
        }),
        None => GameKind::Pong,
    };
    let player_mode = match args.next() {
        Some(name) => PlayerMode::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown mode '{}', playing single", name);
            PlayerMode::Single
        }),
        None => PlayerMode::Single,
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);

    log::info!(
        "Arcade (native) {} {} seed {}",
        kind.as_str(),
        player_mode.as_str(),
        seed
    );

    let settings = Settings {
        player_mode,
        ..Default::default()
    };
    let mut session = Session::new(kind.build(DEFAULT_WIDTH, DEFAULT_HEIGHT), settings, seed);
    let mut sink = LogSink;
    session.context_mut().restart();

    for _ in 0..MAX_SECONDS {
        session.run_ticks(SIM_HZ, &mut sink);
        if matches!(session.context().round().state(), RoundState::RoundOver(_)) {
            break;
        }
    }

    let snapshot = session.context().snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Snapshot not serializable: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the WebArcade class, this is just to satisfy the compiler
}
