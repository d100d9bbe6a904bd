#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Lane Defence scenario headlessly.

mod scenario;

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use lane_defence_core::{Notification, Outcome};
use lane_defence_simulation::{SeededChance, Simulation};
use lane_defence_world::query;
use scenario::Scenario;
use tokio::{
    runtime::{Builder, Handle},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulated time between progress log lines.
const REPORT_EVERY: Duration = Duration::from_secs(10);

/// Runs a tower-defence scenario until it is won, lost or times out.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", version, about, long_about = None)]
struct Args {
    /// Scenario file in TOML; the built-in scenario is played when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Seed for flak hit rolls and special-event rolls.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Simulation steps per second.
    #[arg(long, default_value_t = 20)]
    tick_hz: u32,
    /// Simulated seconds after which an undecided match is abandoned.
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f64,
    /// Pace the simulation in wall-clock time instead of running flat out.
    #[arg(long)]
    realtime: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Final state printed once the run ends.
struct Summary {
    outcome: Option<Outcome>,
    wave: u32,
    total_waves: u32,
    money: u64,
    leak_ratio: f64,
    elapsed: Duration,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(Outcome::Victory) => "victory",
            Some(Outcome::Defeat) => "defeat",
            None => "undecided",
        };
        write!(
            f,
            "outcome={outcome} wave={}/{} money={} leak_ratio={:.3} elapsed={:.1}s",
            self.wave,
            self.total_waves,
            self.money,
            self.leak_ratio,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args.log_level)?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    if args.tick_hz == 0 {
        bail!("--tick-hz must be at least 1");
    }
    let limit = Duration::try_from_secs_f64(args.max_seconds)
        .with_context(|| format!("--max-seconds {} is not a valid duration", args.max_seconds))?;

    // Flat-out runs use a paused clock that jumps straight to the next timer.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .start_paused(!args.realtime)
        .build()
        .context("failed to build tokio runtime")?;
    let summary = runtime.block_on(run(&args, scenario, limit))?;
    println!("{summary}");
    Ok(())
}

fn init_logging(level: &str) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter `{level}`"))?;
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(guard)
}

async fn run(args: &Args, scenario: Scenario, limit: Duration) -> Result<Summary> {
    let Scenario { setup, builds } = scenario;
    let mut simulation = Simulation::new(
        setup,
        Handle::current(),
        Box::new(SeededChance::new(args.seed)),
    )
    .context("failed to set up the match")?;
    println!("{}", query::welcome_banner(simulation.world()));

    let _ = simulation
        .notifications()
        .subscribe(|notification| match notification {
            Notification::MoneyChanged { balance } => debug!(balance, "money changed"),
            Notification::EnemyLeaked { power, leak_ratio } => {
                info!(power, leak_ratio, "enemy leaked");
            }
            Notification::WaveStarted { .. } | Notification::GameOver { .. } => {}
        });

    for order in builds {
        match simulation.build(order) {
            Ok(cost) => {
                info!(option = ?order.option, cell = ?order.cell, cost, "opening build placed");
            }
            Err(error) => {
                warn!(option = ?order.option, cell = ?order.cell, %error, "opening build skipped");
            }
        }
    }

    let step = Duration::from_secs(1) / args.tick_hz;
    let mut ticker = time::interval(step);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut next_report = REPORT_EVERY;

    simulation.start();
    while simulation.outcome().is_none() && simulation.elapsed() < limit {
        let _ = ticker.tick().await;
        let _ = simulation.advance_frame();
        if simulation.elapsed() >= next_report {
            info!(
                elapsed = simulation.elapsed().as_secs(),
                wave = simulation.current_wave(),
                money = simulation.money(),
                leak_ratio = simulation.leak_ratio(),
                enemies = simulation.enemies().alive_count(),
                "progress"
            );
            next_report += REPORT_EVERY;
        }
    }
    if simulation.outcome().is_none() {
        warn!(
            limit = limit.as_secs_f64(),
            "time limit reached before the match was decided"
        );
    }
    simulation.stop();

    Ok(Summary {
        outcome: simulation.outcome(),
        wave: simulation.current_wave(),
        total_waves: simulation.total_waves(),
        money: simulation.money(),
        leak_ratio: simulation.leak_ratio(),
        elapsed: simulation.elapsed(),
    })
}
