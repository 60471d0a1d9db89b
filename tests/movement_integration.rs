//! Movement integration tests

use colonies::core::config::SimConfig;
use colonies::core::types::{EntityId, Owner, PlayerId};
use colonies::grid::{GridGeometry, GridIndex, Terrain, TileCoord};
use colonies::units::{advance, begin_search, can_walk_to, step_search, Unit, UnitVariant};
use colonies::world::{Board, CommandOutcome, DropReason, World, WorldEvent};

fn world() -> World {
    World::new(
        SimConfig::default(),
        GridIndex::filled(GridGeometry::default(), 8, 8, Terrain::Soil),
    )
}

fn spawn(world: &mut World, variant: UnitVariant, tile: TileCoord) -> EntityId {
    spawn_for(world, variant, tile, PlayerId::RED)
}

fn spawn_for(world: &mut World, variant: UnitVariant, tile: TileCoord, player: PlayerId) -> EntityId {
    let id = world.allocate_id();
    let position = world.board.grid.geometry().center(tile);
    world
        .board
        .add_unit(Unit::new(id, Owner::Player(player), variant, tile, position));
    id
}

fn order(world: &mut World, unit: EntityId, goal: TileCoord) -> CommandOutcome {
    let position = world.board.grid.geometry().center(goal);
    world.issue_move_order(unit, position)
}

fn run(world: &mut World, ticks: usize) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(world.tick(0.1));
    }
    events
}

#[test]
fn test_unit_walks_to_ordered_tile() {
    let mut world = world();
    let start = TileCoord::new(0, 0);
    let goal = TileCoord::new(4, 3);
    let ant = spawn(&mut world, UnitVariant::Worker, start);

    assert_eq!(order(&mut world, ant, goal), CommandOutcome::Accepted);
    let events = run(&mut world, 200);

    let arrivals: Vec<TileCoord> = events
        .iter()
        .filter_map(|e| match e {
            WorldEvent::Arrived { unit, tile } if *unit == ant => Some(*tile),
            _ => None,
        })
        .collect();

    // One tile at a time, ending on the goal
    assert_eq!(arrivals.last(), Some(&goal));
    assert!(start.is_adjacent(&arrivals[0]));
    for pair in arrivals.windows(2) {
        assert!(pair[0].is_adjacent(&pair[1]));
    }
    assert_eq!(arrivals.len() as u32, start.steps_to(&goal));

    let unit = world.board.unit(ant).unwrap();
    assert!(unit.is_at_rest());
    assert_eq!(unit.position, world.board.grid.geometry().center(goal));
    assert_eq!(world.board.grid.occupant(goal), Some(ant));
    assert_eq!(world.board.grid.occupant(start), None);
}

#[test]
fn test_orders_while_searching_are_dropped() {
    let mut world = world();
    let ant = spawn(&mut world, UnitVariant::Gatherer, TileCoord::new(0, 0));
    let first = TileCoord::new(7, 7);
    let second = TileCoord::new(7, 0);

    assert!(order(&mut world, ant, first).is_accepted());
    // Same tick, before any search step
    assert_eq!(
        order(&mut world, ant, second),
        CommandOutcome::Dropped(DropReason::SearchInFlight)
    );

    // One expansion per tick is not enough to cross the map
    world.tick(0.1);
    assert!(world.board.unit(ant).unwrap().is_calculating_path());
    assert_eq!(
        order(&mut world, ant, second),
        CommandOutcome::Dropped(DropReason::SearchInFlight)
    );

    run(&mut world, 300);
    let unit = world.board.unit(ant).unwrap();
    assert_eq!(unit.current_tile, first);

    // With the search finished a new order goes through
    assert!(order(&mut world, ant, second).is_accepted());
    run(&mut world, 300);
    assert_eq!(world.board.unit(ant).unwrap().current_tile, second);
}

#[test]
fn test_two_units_never_share_a_tile() {
    let mut world = world();
    let a = spawn(&mut world, UnitVariant::Worker, TileCoord::new(0, 3));
    let b = spawn(&mut world, UnitVariant::Worker, TileCoord::new(6, 3));
    let goal = TileCoord::new(3, 3);

    assert!(order(&mut world, a, goal).is_accepted());
    assert!(order(&mut world, b, goal).is_accepted());

    for _ in 0..200 {
        world.tick(0.1);
        for id in [a, b] {
            let unit = world.board.unit(id).unwrap();
            assert_eq!(world.board.grid.occupant(unit.current_tile), Some(id));
            assert_eq!(world.board.grid.occupant(unit.target_tile), Some(id));
        }
    }

    let holder = world.board.grid.occupant(goal).unwrap();
    assert!(holder == a || holder == b);
    let ua = world.board.unit(a).unwrap();
    let ub = world.board.unit(b).unwrap();
    assert_ne!(ua.current_tile, ub.current_tile);

    // The loser gave up next to the goal
    let loser = if holder == a { ub } else { ua };
    assert!(loser.is_at_rest());
    assert!(!loser.is_calculating_path());
    assert!(loser.current_tile.is_adjacent(&goal));
}

#[test]
fn test_walkability_query_has_no_side_effects() {
    let mut world = world();
    let walker = spawn(&mut world, UnitVariant::Gatherer, TileCoord::new(2, 2));
    let blocker = spawn(&mut world, UnitVariant::Worker, TileCoord::new(3, 2));
    let board = &world.board;
    let unit = board.unit(walker).unwrap();

    for tile in [TileCoord::new(3, 2), TileCoord::new(2, 3), TileCoord::new(9, 9)] {
        let first = can_walk_to(unit, tile, &board.grid, &board.objects);
        let second = can_walk_to(unit, tile, &board.grid, &board.objects);
        assert_eq!(first, second);
    }

    assert!(!can_walk_to(unit, TileCoord::new(3, 2), &board.grid, &board.objects));
    assert!(can_walk_to(unit, TileCoord::new(2, 3), &board.grid, &board.objects));
    assert!(!can_walk_to(unit, TileCoord::new(9, 9), &board.grid, &board.objects));
    assert_eq!(board.grid.occupant(TileCoord::new(3, 2)), Some(blocker));
    assert_eq!(board.grid.occupant(TileCoord::new(2, 3)), None);
}

/// Ticks between the path being installed and arriving on the goal
fn travel_ticks(world: &mut World, ant: EntityId, goal: TileCoord) -> usize {
    assert!(order(world, ant, goal).is_accepted());
    let mut installed_at = None;
    for tick in 0..200 {
        let events = world.tick(0.1);
        let unit = world.board.unit(ant).unwrap();
        if installed_at.is_none() && !unit.is_calculating_path() {
            installed_at = Some(tick);
        }
        let arrived = events
            .iter()
            .any(|e| matches!(e, WorldEvent::Arrived { unit, tile } if *unit == ant && *tile == goal));
        if arrived {
            return tick - installed_at.unwrap();
        }
    }
    panic!("unit {} never reached {:?}", ant, goal);
}

#[test]
fn test_heavy_terrain_takes_longer_to_cross() {
    let mut world = world();
    world.board.grid.set_terrain(TileCoord::new(1, 4), Terrain::Mud);
    let on_soil = spawn(&mut world, UnitVariant::Worker, TileCoord::new(0, 0));
    let into_mud = spawn(&mut world, UnitVariant::Worker, TileCoord::new(0, 4));

    let soil_ticks = travel_ticks(&mut world, on_soil, TileCoord::new(1, 0));
    let mud_ticks = travel_ticks(&mut world, into_mud, TileCoord::new(1, 4));

    // Soil to soil takes 0.4s at default speed, soil to mud 0.8s
    assert!(mud_ticks > soil_ticks);
}

#[test]
fn test_enclosed_goal_fails_and_clears_intent() {
    let mut world = world();
    let start = TileCoord::new(0, 0);
    let goal = TileCoord::new(5, 5);
    let ant = spawn(&mut world, UnitVariant::Worker, start);
    for wall in goal.neighbors() {
        spawn(&mut world, UnitVariant::Worker, wall);
    }

    assert!(order(&mut world, ant, goal).is_accepted());
    let events = run(&mut world, 200);

    assert!(events
        .iter()
        .any(|e| matches!(e, WorldEvent::PathFailed { unit } if *unit == ant)));
    let unit = world.board.unit(ant).unwrap();
    assert!(!unit.is_calculating_path());
    assert!(unit.is_at_rest());
    assert_eq!(unit.current_tile, start);
}

/// Units outside a skirmish never stand on the same tile
fn assert_no_shared_tiles(world: &World) {
    let units: Vec<&Unit> = world.board.units.values().collect();
    for (i, a) in units.iter().enumerate() {
        for b in &units[i + 1..] {
            if a.current_tile == b.current_tile {
                assert!(
                    a.in_battle && b.in_battle,
                    "units {} and {} share {:?} outside a battle",
                    a.id,
                    b.id,
                    a.current_tile
                );
            }
        }
    }
}

#[test]
fn test_warrior_backs_off_when_its_targets_tile_is_taken() {
    let mut world = world();
    let start = TileCoord::new(1, 2);
    let target_tile = TileCoord::new(2, 2);
    let refuge = TileCoord::new(3, 2);
    let warrior = spawn(&mut world, UnitVariant::Warrior, start);
    let target = spawn_for(&mut world, UnitVariant::Worker, target_tile, PlayerId::BLUE);
    let side = target_tile
        .neighbors()
        .into_iter()
        .find(|t| *t != start && *t != refuge)
        .unwrap();
    let bystander = spawn(&mut world, UnitVariant::Worker, side);
    assert!(world.issue_attack_order(warrior, target).is_accepted());

    let Board { grid, units, objects } = &mut world.board;
    let objects = &*objects;
    let walk = |unit: &mut Unit, grid: &mut GridIndex, goal: TileCoord| {
        assert!(begin_search(unit, grid, goal));
        step_search(unit, grid, objects, 100);
    };

    // The warrior sets off into its target's tile
    let chaser = units.get_mut(&warrior).unwrap();
    walk(chaser, grid, target_tile);
    assert_eq!(advance(chaser, grid, objects, 0.1).stepped_towards, Some(target_tile));

    // The target walks off, then a third unit heads for the empty tile
    let fleeing = units.get_mut(&target).unwrap();
    walk(fleeing, grid, refuge);
    for _ in 0..10 {
        advance(fleeing, grid, objects, 0.1);
    }
    assert_eq!(fleeing.current_tile, refuge);
    let passer = units.get_mut(&bystander).unwrap();
    walk(passer, grid, target_tile);
    assert_eq!(advance(passer, grid, objects, 0.1).stepped_towards, Some(target_tile));

    for _ in 0..50 {
        for id in [warrior, bystander] {
            advance(units.get_mut(&id).unwrap(), grid, objects, 0.1);
        }
    }

    assert_eq!(units[&warrior].current_tile, start);
    assert_eq!(units[&bystander].current_tile, target_tile);
    assert_eq!(grid.occupant(start), Some(warrior));
    assert_eq!(grid.occupant(target_tile), Some(bystander));
    assert_no_shared_tiles(&world);
}

#[test]
fn test_chasing_a_fleeing_target_keeps_tiles_exclusive() {
    let mut world = world();
    let warrior = spawn(&mut world, UnitVariant::Warrior, TileCoord::new(0, 3));
    let target = spawn_for(&mut world, UnitVariant::Worker, TileCoord::new(3, 3), PlayerId::BLUE);
    let bystander = spawn(&mut world, UnitVariant::Worker, TileCoord::new(3, 0));
    assert!(world.issue_attack_order(warrior, target).is_accepted());

    let mut events = Vec::new();
    for tick in 0..400 {
        // The target runs, then a third unit crosses where it stood
        if tick == 3 {
            assert!(order(&mut world, target, TileCoord::new(7, 7)).is_accepted());
        }
        if tick == 20 {
            assert!(order(&mut world, bystander, TileCoord::new(3, 3)).is_accepted());
        }
        events.extend(world.tick(0.1));
        assert_no_shared_tiles(&world);
        for unit in world.board.units.values().filter(|u| !u.in_battle) {
            assert_eq!(world.board.grid.occupant(unit.current_tile), Some(unit.id));
        }
    }

    // The chase still ends in a fight
    assert!(events.iter().any(
        |e| matches!(e, WorldEvent::BattleStarted { attacker, defender } if *attacker == warrior && *defender == target)
    ));
}
