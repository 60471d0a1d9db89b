//! Colonies - headless runner
//!
//! Loads a map, optionally sends warriors after the nearest enemy, runs a
//! fixed number of ticks and prints what happened.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use colonies::battle::BattleReport;
use colonies::core::config::SimConfig;
use colonies::core::error::{ColoniesError, Result};
use colonies::core::types::{EntityId, Owner};
use colonies::objects::ObjectKind;
use colonies::units::UnitVariant;
use colonies::world::{MapFile, World, WorldEvent};

/// Headless Colonies runner
#[derive(Parser, Debug)]
#[command(name = "colonies")]
#[command(about = "Run an ant colony map without a display and summarise the outcome")]
struct Args {
    /// Map file to load
    #[arg(long, default_value = "data/maps/meadow.toml")]
    map: PathBuf,

    /// Optional simulation config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Random seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Explicit attack orders as `attacker:target` entity ids
    #[arg(long = "attack")]
    attacks: Vec<String>,

    /// Send every idle warrior after the nearest enemy
    #[arg(long)]
    auto_attack: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct OwnerTally {
    owner: Owner,
    units: usize,
    anthills: usize,
    food_points: u32,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    seconds: f32,
    battles: Vec<BattleReport>,
    units_destroyed: usize,
    colonies_founded: usize,
    food_spawned: usize,
    food_on_map: usize,
    owners: Vec<OwnerTally>,
}

fn parse_attack(order: &str) -> Result<(EntityId, EntityId)> {
    let invalid = || ColoniesError::InvalidConfig(format!("attack order '{}' is not attacker:target", order));
    let (attacker, target) = order.split_once(':').ok_or_else(invalid)?;
    let attacker = attacker.trim().parse().map_err(|_| invalid())?;
    let target = target.trim().parse().map_err(|_| invalid())?;
    Ok((EntityId(attacker), EntityId(target)))
}

/// Nearest enemy unit or anthill, by hex steps
fn nearest_enemy(world: &World, warrior: EntityId) -> Option<EntityId> {
    let unit = world.board.unit(warrior)?;
    let from = unit.current_tile;
    let owner = unit.owner;

    let units = world
        .board
        .units
        .values()
        .filter(|u| u.owner != owner && u.owner != Owner::Neutral)
        .map(|u| (u.id, u.current_tile));
    let anthills = world
        .board
        .objects
        .iter()
        .filter(|o| o.is_anthill() && o.owner != owner)
        .filter_map(|o| o.tile.map(|t| (o.id, t)));

    units
        .chain(anthills)
        .min_by_key(|(id, tile)| (from.steps_to(tile), *id))
        .map(|(id, _)| id)
}

fn auto_attack(world: &mut World) {
    let idle: Vec<EntityId> = world
        .board
        .units
        .values()
        .filter(|u| u.variant() == UnitVariant::Warrior && u.attack_target().is_none() && !u.in_battle)
        .map(|u| u.id)
        .filter(|id| !world.battles.leads_battle(*id))
        .collect();
    for warrior in idle {
        if let Some(target) = nearest_enemy(world, warrior) {
            world.issue_attack_order(warrior, target);
        }
    }
}

fn tally_for(owners: &mut Vec<OwnerTally>, owner: Owner) -> &mut OwnerTally {
    let index = match owners.iter().position(|t| t.owner == owner) {
        Some(index) => index,
        None => {
            owners.push(OwnerTally {
                owner,
                units: 0,
                anthills: 0,
                food_points: 0,
            });
            owners.len() - 1
        }
    };
    &mut owners[index]
}

fn summarise(world: &World, seed: u64, events: &[WorldEvent]) -> RunSummary {
    let mut owners = Vec::new();
    for unit in world.board.units.values() {
        tally_for(&mut owners, unit.owner).units += 1;
    }
    for object in world.board.objects.iter() {
        if let Some(anthill) = object.as_anthill() {
            let tally = tally_for(&mut owners, object.owner);
            tally.anthills += 1;
            tally.food_points += anthill.food_points;
        }
    }

    RunSummary {
        seed,
        ticks: world.current_tick(),
        seconds: world.clock(),
        battles: world.battles.history().to_vec(),
        units_destroyed: events
            .iter()
            .filter(|e| matches!(e, WorldEvent::UnitDestroyed { .. }))
            .count(),
        colonies_founded: events
            .iter()
            .filter(|e| matches!(e, WorldEvent::ColonyFounded { .. }))
            .count(),
        food_spawned: events
            .iter()
            .filter(|e| matches!(e, WorldEvent::FoodSpawned { .. }))
            .count(),
        food_on_map: world
            .board
            .objects
            .iter()
            .filter(|o| matches!(o.kind, ObjectKind::Food { .. }) && o.tile.is_some())
            .count(),
        owners,
    }
}

fn main() -> Result<()> {
    // Stdout carries the summary only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    tracing::info!("Loading map {}", args.map.display());
    let mut world = MapFile::load(&args.map)?.into_world(config)?;

    for order in &args.attacks {
        let (attacker, target) = parse_attack(order)?;
        let outcome = world.issue_attack_order(attacker, target);
        tracing::info!("Attack order {} -> {}: {:?}", attacker, target, outcome);
    }

    let mut events = Vec::new();
    for _ in 0..args.ticks {
        if args.auto_attack {
            auto_attack(&mut world);
        }
        events.extend(world.tick(args.dt));
    }

    let summary = summarise(&world, seed, &events);
    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== Colonies run (seed {}) ===", summary.seed);
        println!("Ticks: {} ({:.1}s)", summary.ticks, summary.seconds);
        println!("Battles fought: {}", summary.battles.len());
        for report in &summary.battles {
            println!(
                "  {:?} {} vs {}: {:?} after {} exchanges",
                report.kind, report.attacker, report.defender, report.outcome, report.exchanges
            );
        }
        println!("Units destroyed: {}", summary.units_destroyed);
        println!("Colonies founded: {}", summary.colonies_founded);
        println!("Food spawned: {} (on map: {})", summary.food_spawned, summary.food_on_map);
        for tally in &summary.owners {
            println!(
                "  {:?}: {} units, {} anthills, {} food points",
                tally.owner, tally.units, tally.anthills, tally.food_points
            );
        }
    }

    Ok(())
}
