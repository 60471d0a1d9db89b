//! Which tiles a unit may step onto
//!
//! Decided per unit variant from the tile's occupant and the tags of the
//! objects lying on it:
//!
//! | tag \ variant      | Worker | Gatherer          | Warrior            | Queen |
//! |--------------------|--------|-------------------|--------------------|-------|
//! | free tile          | yes    | yes               | yes                | yes   |
//! | tile held by other | no     | no                | only attack target | no    |
//! | Scentpath          | no     | yes               | yes                | yes   |
//! | Food               | no     | unless carrying   | only attack target | no    |
//! | Anthill            | no     | no                | only attack target | no    |
//! | AnthillRuin        | no     | no                | no                 | yes   |
//! | FoodSpawner        | no     | no                | no                 | no    |

use crate::grid::{GridIndex, TileCoord};
use crate::objects::{MapObject, MapObjects, ObjectTag};
use crate::units::unit::{Unit, UnitVariant};

/// Can `unit` share a tile with `object`?
pub fn can_walk_on(unit: &Unit, object: &MapObject) -> bool {
    let is_target = unit.attack_target() == Some(object.id);

    match (unit.variant(), object.tag()) {
        (UnitVariant::Worker, _) => false,

        (_, ObjectTag::Scentpath) => true,

        (UnitVariant::Gatherer, ObjectTag::Food) => !unit.is_carrying_food(),
        (UnitVariant::Warrior, ObjectTag::Food) => is_target,

        (UnitVariant::Warrior, ObjectTag::Anthill) => is_target,

        (UnitVariant::Queen, ObjectTag::AnthillRuin) => true,

        _ => false,
    }
}

/// Can `unit` step onto `tile` right now?
pub fn can_walk_to(unit: &Unit, tile: TileCoord, grid: &GridIndex, objects: &MapObjects) -> bool {
    if !grid.contains(tile) {
        return false;
    }

    if let Some(holder) = grid.occupant(tile) {
        let allowed = holder == unit.id
            || (unit.variant() == UnitVariant::Warrior && unit.attack_target() == Some(holder));
        if !allowed {
            return false;
        }
    }

    objects.at(tile).all(|object| can_walk_on(unit, object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntityId, Owner, PlayerId};
    use crate::grid::{GridGeometry, Terrain};
    use crate::objects::ObjectKind;
    use glam::Vec2;

    const HERE: TileCoord = TileCoord::new(1, 1);

    fn grid() -> GridIndex {
        GridIndex::filled(GridGeometry::default(), 4, 4, Terrain::Soil)
    }

    fn unit(variant: UnitVariant) -> Unit {
        Unit::new(
            EntityId(1),
            Owner::Player(PlayerId::RED),
            variant,
            TileCoord::new(0, 0),
            Vec2::ZERO,
        )
    }

    fn with_object(kind: ObjectKind) -> MapObjects {
        let mut objects = MapObjects::new();
        objects.insert(MapObject::new(EntityId(50), Owner::Neutral, kind, HERE));
        objects
    }

    const ALL: [UnitVariant; 4] = [
        UnitVariant::Worker,
        UnitVariant::Gatherer,
        UnitVariant::Warrior,
        UnitVariant::Queen,
    ];

    #[test]
    fn test_free_tile_is_walkable_for_everyone() {
        let grid = grid();
        let objects = MapObjects::new();
        for variant in ALL {
            assert!(can_walk_to(&unit(variant), HERE, &grid, &objects));
        }
    }

    #[test]
    fn test_missing_tile_is_not_walkable() {
        let grid = grid();
        let objects = MapObjects::new();
        assert!(!can_walk_to(&unit(UnitVariant::Queen), TileCoord::new(40, 0), &grid, &objects));
    }

    #[test]
    fn test_held_tile() {
        let mut grid = grid();
        grid.try_claim(HERE, EntityId(7));
        let objects = MapObjects::new();

        for variant in ALL {
            assert!(!can_walk_to(&unit(variant), HERE, &grid, &objects));
        }

        let mut warrior = unit(UnitVariant::Warrior);
        warrior.warrior_mut().unwrap().attack_target = Some(EntityId(7));
        assert!(can_walk_to(&warrior, HERE, &grid, &objects));
    }

    #[test]
    fn test_own_tile_is_walkable() {
        let mut grid = grid();
        grid.try_claim(HERE, EntityId(1));
        let objects = MapObjects::new();
        assert!(can_walk_to(&unit(UnitVariant::Worker), HERE, &grid, &objects));
    }

    #[test]
    fn test_scentpath() {
        let grid = grid();
        let objects = with_object(ObjectKind::Scentpath);
        assert!(!can_walk_to(&unit(UnitVariant::Worker), HERE, &grid, &objects));
        assert!(can_walk_to(&unit(UnitVariant::Gatherer), HERE, &grid, &objects));
        assert!(can_walk_to(&unit(UnitVariant::Warrior), HERE, &grid, &objects));
        assert!(can_walk_to(&unit(UnitVariant::Queen), HERE, &grid, &objects));
    }

    #[test]
    fn test_food() {
        let grid = grid();
        let objects = with_object(ObjectKind::Food { value: 1 });
        assert!(can_walk_to(&unit(UnitVariant::Gatherer), HERE, &grid, &objects));
        assert!(!can_walk_to(&unit(UnitVariant::Warrior), HERE, &grid, &objects));
        assert!(!can_walk_to(&unit(UnitVariant::Queen), HERE, &grid, &objects));

        let mut loaded = unit(UnitVariant::Gatherer);
        loaded.gatherer_mut().unwrap().carried_food = Some(EntityId(99));
        assert!(!can_walk_to(&loaded, HERE, &grid, &objects));
    }

    #[test]
    fn test_anthill_only_for_attacking_warrior() {
        let grid = grid();
        let objects = with_object(ObjectKind::anthill());
        for variant in ALL {
            assert!(!can_walk_to(&unit(variant), HERE, &grid, &objects));
        }

        let mut warrior = unit(UnitVariant::Warrior);
        warrior.warrior_mut().unwrap().attack_target = Some(EntityId(50));
        assert!(can_walk_to(&warrior, HERE, &grid, &objects));
    }

    #[test]
    fn test_ruin_only_for_queen() {
        let grid = grid();
        let objects = with_object(ObjectKind::AnthillRuin);
        assert!(can_walk_to(&unit(UnitVariant::Queen), HERE, &grid, &objects));
        assert!(!can_walk_to(&unit(UnitVariant::Warrior), HERE, &grid, &objects));
        assert!(!can_walk_to(&unit(UnitVariant::Gatherer), HERE, &grid, &objects));
    }

    #[test]
    fn test_spawner_blocks_everyone() {
        let grid = grid();
        let objects = with_object(ObjectKind::FoodSpawner {
            rarity: 1.0,
            name: String::new(),
            description: String::new(),
        });
        for variant in ALL {
            assert!(!can_walk_to(&unit(variant), HERE, &grid, &objects));
        }
    }

    #[test]
    fn test_repeated_checks_agree() {
        let mut grid = grid();
        grid.try_claim(TileCoord::new(2, 2), EntityId(3));
        let objects = with_object(ObjectKind::Food { value: 1 });
        let gatherer = unit(UnitVariant::Gatherer);

        for tile in [HERE, TileCoord::new(2, 2), TileCoord::new(0, 3)] {
            let first = can_walk_to(&gatherer, tile, &grid, &objects);
            for _ in 0..5 {
                assert_eq!(can_walk_to(&gatherer, tile, &grid, &objects), first);
            }
        }
    }
}
