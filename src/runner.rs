//! Headless match driver
//!
//! Owns the clock: polls the input source, advances the controller once per
//! tick and writes outcomes as JSON lines. Rounds are chained until the
//! configured count is reached, the input asks to quit, or the tick limit hits.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::snapshot::SnapshotBuilder;
use crate::game::{FrameOutcome, MatchController, MatchPhase, Winner};
use crate::input::InputSource;
use crate::util::time::{FrameRateMeter, TickRate};

/// Ticks run between cooperative yields when not pacing against the clock
const YIELD_EVERY: u64 = 1024;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    RoundsComplete,
    Quit,
    TickLimit,
}

/// Runner settings, usually taken from `Config`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tick_rate: TickRate,
    pub realtime: bool,
    pub max_ticks: Option<u64>,
    pub rounds: u32,
    pub snapshot_interval: u32,
}

/// Final report of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub rounds_played: u32,
    pub winners: Vec<Winner>,
    pub reason: StopReason,
    pub last: Option<FrameOutcome>,
}

/// Drive `controller` until a stop condition is met
///
/// The controller must already have a human side selected; a controller left
/// in the menu only ever reports idle outcomes.
pub async fn run<W: Write>(
    controller: &mut MatchController,
    input: &mut dyn InputSource,
    options: &RunOptions,
    out: &mut W,
) -> anyhow::Result<RunSummary> {
    let dt = options.tick_rate.delta_secs();
    let mut tick_interval = interval(options.tick_rate.duration());
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut rate_meter = FrameRateMeter::new(Duration::from_secs(1));
    let mut snapshots = SnapshotBuilder::new(options.snapshot_interval);
    let mut winners = Vec::new();
    let mut last = None;
    let rounds = options.rounds.max(1);

    info!(
        match_id = %controller.id(),
        tick_rate = options.tick_rate.ticks_per_second(),
        realtime = options.realtime,
        rounds,
        "Run started"
    );

    let reason = loop {
        if options.realtime {
            tick_interval.tick().await;
        } else if controller.tick() % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }

        let intent = input.poll(controller.tick());
        let outcome = controller.advance(&intent, dt);

        if let Some(rate) = rate_meter.record() {
            debug!(rate, tick = outcome.tick, "Tick rate");
        }

        if snapshots.should_send(&outcome) {
            serde_json::to_writer(&mut *out, &outcome)?;
            out.write_all(b"\n")?;
        }

        let quit = outcome.quit;
        let round_over = outcome.phase == MatchPhase::RoundOver;
        let winner = outcome.winner;
        last = Some(outcome);

        if quit {
            break StopReason::Quit;
        }

        if round_over {
            if let Some(winner) = winner {
                winners.push(winner);
            }
            if winners.len() as u32 >= rounds {
                break StopReason::RoundsComplete;
            }
            controller.reset(MatchPhase::Playing);
        }

        if let Some(max) = options.max_ticks {
            if controller.tick() >= max {
                warn!(match_id = %controller.id(), max, "Tick limit reached");
                break StopReason::TickLimit;
            }
        }
    };

    out.flush()?;

    info!(
        match_id = %controller.id(),
        ticks = controller.tick(),
        rounds_played = winners.len(),
        ?reason,
        "Run finished"
    );

    Ok(RunSummary {
        ticks: controller.tick(),
        rounds_played: winners.len() as u32,
        winners,
        reason,
        last,
    })
}
