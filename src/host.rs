//! Host boundaries and the per-frame driver
//!
//! A host (browser page, headless runner, test) owns a [`Session`] and calls
//! [`Session::frame`] from its frame scheduler with a timestamp. The session
//! turns wall time into fixed ticks, then hands round notifications to a
//! [`ScoreSink`] and the current [`Snapshot`] to a [`Renderer`].

use crate::clock::{Clock, FixedStep};
use crate::input::KeyEvent;
use crate::settings::Settings;
use crate::sim::{Game, RoundContext, RoundEvent, Snapshot};

/// Draws one frame from a read-only snapshot
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot);
}

/// Receives score and round notifications
pub trait ScoreSink {
    fn on_event(&mut self, event: &RoundEvent);
}

/// Renderer that draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _snapshot: &Snapshot) {}
}

/// Keeps the latest snapshot as JSON for hosts that render outside Rust
#[derive(Debug, Default)]
pub struct JsonRenderer {
    last: String,
}

impl JsonRenderer {
    pub fn last(&self) -> &str {
        &self.last
    }
}

impl Renderer for JsonRenderer {
    fn draw(&mut self, snapshot: &Snapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.last = json,
            Err(e) => log::warn!("Snapshot not serializable: {}", e),
        }
    }
}

/// Collects every event (scoreboards that redraw from history, tests)
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<RoundEvent>,
}

impl ScoreSink for EventLog {
    fn on_event(&mut self, event: &RoundEvent) {
        self.events.push(*event);
    }
}

/// Writes events to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl ScoreSink for LogSink {
    fn on_event(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::ScoreChanged { player, score } => {
                log::info!("{:?}: {}", player, score)
            }
            RoundEvent::RoundEnded { cause, winner } => match winner {
                Some(p) => log::info!("Round over ({}), {:?} wins", cause.as_str(), p),
                None => log::info!("Round over ({})", cause.as_str()),
            },
            other => log::debug!("{:?}", other),
        }
    }
}

/// Clock + fixed-step accumulator + one round
pub struct Session<G: Game> {
    clock: Clock,
    stepper: FixedStep,
    context: RoundContext<G>,
    ticks: u64,
}

impl<G: Game> Session<G> {
    pub fn new(game: G, settings: Settings, seed: u64) -> Self {
        Self {
            clock: Clock::default(),
            stepper: FixedStep::default(),
            context: RoundContext::new(game, settings, seed),
            ticks: 0,
        }
    }

    pub fn context(&self) -> &RoundContext<G> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RoundContext<G> {
        &mut self.context
    }

    /// Simulation ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Interpolation factor for the frame just drawn
    pub fn alpha(&self) -> f32 {
        self.stepper.alpha()
    }

    pub fn key_down(&mut self, key: &str, timestamp: f64) {
        let event = KeyEvent {
            timestamp,
            ..KeyEvent::down(key)
        };
        self.context.key_event(&event);
    }

    pub fn key_up(&mut self, key: &str, timestamp: f64) {
        let event = KeyEvent {
            timestamp,
            ..KeyEvent::up(key)
        };
        self.context.key_event(&event);
    }

    /// Page hidden/shown: the next frame starts a fresh delta
    pub fn suspend(&mut self) {
        self.clock.reset();
    }

    /// One display frame at host time `now` (seconds). Returns ticks run.
    pub fn frame(
        &mut self,
        now: f64,
        renderer: &mut dyn Renderer,
        sink: &mut dyn ScoreSink,
    ) -> u32 {
        let dt = self.clock.tick(now);
        let steps = self.stepper.advance(dt);
        self.run_ticks(steps, sink);
        renderer.draw(&self.context.snapshot());
        steps
    }

    /// Run ticks without a clock (headless hosts)
    pub fn run_ticks(&mut self, ticks: u32, sink: &mut dyn ScoreSink) {
        for _ in 0..ticks {
            self.context.step();
            self.ticks += 1;
            log::trace!("tick {}", self.ticks);
        }
        for event in self.context.drain_events() {
            sink.on_event(&event);
        }
    }
}
