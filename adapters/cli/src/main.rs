#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Outpost round headlessly.

use std::{cell::Cell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use outpost_core::Event;
use outpost_persistence::{FileStore, KeyValueStore, MemoryStore, ProgressStore, UpgradeCatalog};
use outpost_simulation::{ScenarioConfig, Simulation, Topic};
use outpost_world::query;
use tracing::{info, warn};

/// Ticks played when neither the flags nor the scenario script name a length.
const DEFAULT_TICKS: u64 = 600;

/// Plays a scenario for a number of fixed-length ticks and saves the earned coins.
#[derive(Debug, Parser)]
#[command(name = "outpost", version)]
struct Cli {
    /// Scenario file describing the yard and the scripted joystick input.
    #[arg(long, default_value = "assets/scenario.toml")]
    scenario: PathBuf,

    /// Number of ticks to simulate (defaults to the length of the input script).
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,

    /// JSON file holding player progress; progress is discarded when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Coins awarded for every enemy destroyed during the round.
    #[arg(long, default_value_t = 1)]
    coins_per_kill: u64,

    /// Upgrade price list used by `--buy`.
    #[arg(long, default_value = "assets/upgrades.toml")]
    upgrades: PathBuf,

    /// Buys the next level of the named upgrade after the round.
    #[arg(long)]
    buy: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.data {
        Some(path) => {
            let store = FileStore::open(path)
                .with_context(|| format!("failed to open progress file {}", path.display()))?;
            run(&cli, store)
        }
        None => run(&cli, MemoryStore::new()),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run<S: KeyValueStore>(cli: &Cli, store: S) -> Result<()> {
    let scenario = ScenarioConfig::load(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let mut simulation =
        Simulation::from_scenario(&scenario).context("failed to populate the yard")?;
    let mut progress = ProgressStore::open(store).context("failed to load progress")?;

    let kills = Rc::new(Cell::new(0_u64));
    subscribe_logging(&mut simulation, Rc::clone(&kills));

    let ticks = cli.ticks.unwrap_or_else(|| match scenario.scripted_ticks() {
        0 => DEFAULT_TICKS,
        scripted => scripted,
    });
    let dt = Duration::from_millis(cli.dt_ms);
    info!(ticks, dt_ms = cli.dt_ms, "round started");

    for tick in 0..ticks {
        simulation.tick(dt, scenario.input_at(tick));
    }

    let earned = kills.get().saturating_mul(cli.coins_per_kill);
    let user = progress.user_mut();
    user.coins = user.coins.saturating_add(earned);

    if let Some(name) = &cli.buy {
        let catalog = UpgradeCatalog::load(&cli.upgrades)
            .with_context(|| format!("failed to load upgrades {}", cli.upgrades.display()))?;
        match progress.user_mut().purchase(&catalog, name) {
            Ok(level) => info!(
                upgrade = %name,
                value = level.value,
                cost = level.cost,
                "upgrade bought"
            ),
            Err(error) => warn!(upgrade = %name, %error, "upgrade not bought"),
        }
    }

    progress.save().context("failed to save progress")?;

    let world = simulation.world();
    let player = query::player(world);
    let inventory = query::inventory_view(world);
    info!(
        ticks = simulation.ticks(),
        position = ?player.position,
        holding = inventory.has_turret(),
        backpack = inventory.backpack.len(),
        interact_progress = simulation.interact_progress(),
        kills = kills.get(),
        coins = progress.user().coins,
        "round finished"
    );
    Ok(())
}

fn subscribe_logging(simulation: &mut Simulation, kills: Rc<Cell<u64>>) {
    let _ = simulation.subscribe(&[Topic::Turrets, Topic::Abilities], |event| match event {
        Event::TurretTaken { turret, from } => {
            info!(turret = turret.get(), slot = from.get(), "turret taken");
        }
        Event::TurretPlaced { turret, slot } => {
            info!(turret = turret.get(), slot = slot.get(), "turret placed");
        }
        Event::TurretUpgraded {
            turret,
            grade,
            slot,
            ..
        } => {
            info!(
                turret = turret.get(),
                grade = grade.get(),
                slot = slot.get(),
                "turret upgraded"
            );
        }
        Event::AbilityCollected { pickup, index } => {
            info!(pickup = pickup.get(), index, "ability collected");
        }
        _ => {}
    });

    let _ = simulation.subscribe(&[Topic::Combat], move |event| {
        if let Event::EnemyDied { enemy } = event {
            kills.set(kills.get() + 1);
            info!(enemy = enemy.get(), "enemy destroyed");
        }
    });
}
