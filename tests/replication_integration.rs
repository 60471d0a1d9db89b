//! Host/peer replication integration tests

use colonies::core::config::SimConfig;
use colonies::core::types::{EntityId, Owner, PlayerId};
use colonies::net::{channel, NetworkRole, ReplicationMessage};
use colonies::objects::ObjectKind;
use colonies::world::{MapFile, World, WorldEvent};

// Ids follow file order: spawner 1, red warrior 2, blue warrior 3
const DUEL: &str = r#"
    [grid]
    cols = 8
    rows = 6

    [[objects]]
    kind = "spawner"
    tile = [6, 5]
    rarity = 20.0
    name = "Berry Bush"

    [[units]]
    variant = "warrior"
    owner = 1
    tile = [1, 2]
    stats = { max_hp = 10.0, attack = 6.0, defense = 0.0 }

    [[units]]
    variant = "warrior"
    owner = 2
    tile = [3, 2]
    stats = { max_hp = 10.0, attack = 6.0, defense = 0.0 }
"#;

const RED: EntityId = EntityId(2);
const BLUE: EntityId = EntityId(3);

fn load(role: NetworkRole, player: PlayerId) -> World {
    let mut config = SimConfig::default();
    config.seed = 99;
    config.network.role = role;
    config.network.local_player = player;
    MapFile::from_toml_str(DUEL).unwrap().into_world(config).unwrap()
}

fn hp(world: &World, id: EntityId) -> Option<f32> {
    world.board.unit(id).map(|u| u.stats.current_hp)
}

#[test]
fn test_peer_mirrors_host_battle() {
    let mut host = load(NetworkRole::Host, PlayerId::RED);
    let mut peer = load(NetworkRole::Peer, PlayerId::BLUE);
    let (tx, rx) = channel();

    // Orders are issued on both sides
    assert!(host.issue_attack_order(RED, BLUE).is_accepted());
    assert!(peer.issue_attack_order(RED, BLUE).is_accepted());

    let mut sent = 0;
    let mut host_events = Vec::new();
    let mut peer_events = Vec::new();
    for _ in 0..300 {
        host_events.extend(host.tick(0.1));
        sent += host.flush(&tx).unwrap();
        peer_events.extend(peer.tick(0.1));
        peer.receive(&rx).unwrap();

        // Hit points agree whenever both sides still have the unit
        for id in [RED, BLUE] {
            if let (Some(h), Some(p)) = (hp(&host, id), hp(&peer, id)) {
                assert_eq!(h, p);
            }
        }

        // The peer never has anything to say
        assert!(peer.drain_outbox().is_empty());
    }

    assert!(sent >= 2);

    // One cloud came over the wire, red heads on the left
    let clouds = peer.take_remote_clouds();
    assert_eq!(clouds.len(), 1);
    assert_eq!(clouds[0].participants.len(), 2);
    assert_eq!(clouds[0].participants[0].owner, Owner::Player(PlayerId::RED));

    // Both sides saw the same ending
    let host_report = &host.battles.history()[0];
    let peer_report = &peer.battles.history()[0];
    assert_eq!(host_report.outcome, peer_report.outcome);
    assert_eq!(host_report.destroyed, peer_report.destroyed);
    assert!(host_report.exchanges >= 1);
    assert_eq!(peer_report.exchanges, 0);
    for id in [RED, BLUE] {
        assert_eq!(host.board.unit(id).is_some(), peer.board.unit(id).is_some());
    }
    assert_eq!(
        host_events.iter().filter(|e| matches!(e, WorldEvent::UnitDestroyed { .. })).count(),
        peer_events.iter().filter(|e| matches!(e, WorldEvent::UnitDestroyed { .. })).count()
    );
}

#[test]
fn test_authoritative_sides_reject_deltas() {
    for role in [NetworkRole::Host, NetworkRole::Offline] {
        let mut world = load(role, PlayerId::RED);
        let accepted = world.apply_remote(ReplicationMessage::HpDelta {
            unit_a: RED,
            unit_b: BLUE,
            delta_a: 4.0,
            delta_b: 4.0,
        });
        assert!(!accepted);
        assert_eq!(hp(&world, RED), Some(10.0));
        assert_eq!(hp(&world, BLUE), Some(10.0));
    }

    let mut peer = load(NetworkRole::Peer, PlayerId::BLUE);
    assert!(peer.apply_remote(ReplicationMessage::HpDelta {
        unit_a: RED,
        unit_b: BLUE,
        delta_a: 4.0,
        delta_b: 0.5,
    }));
    assert_eq!(hp(&peer, RED), Some(6.0));
    assert_eq!(hp(&peer, BLUE), Some(9.5));
}

#[test]
fn test_peer_mirrors_host_food() {
    let mut host = load(NetworkRole::Host, PlayerId::RED);
    let mut peer = load(NetworkRole::Peer, PlayerId::BLUE);
    let (tx, rx) = channel();

    let mut host_spawns = 0;
    let mut peer_spawns = 0;
    for _ in 0..300 {
        host_spawns += host
            .tick(0.1)
            .iter()
            .filter(|e| matches!(e, WorldEvent::FoodSpawned { .. }))
            .count();
        host.flush(&tx).unwrap();
        peer_spawns += peer
            .tick(0.1)
            .iter()
            .filter(|e| matches!(e, WorldEvent::FoodSpawned { .. }))
            .count();
        peer.receive(&rx).unwrap();
    }

    // Only the host rolls; the peer's food all came over the wire
    assert!(host_spawns > 0);
    assert_eq!(peer_spawns, 0);

    let food_on = |world: &World| {
        let mut food = world
            .board
            .objects
            .iter()
            .filter(|o| matches!(o.kind, ObjectKind::Food { .. }))
            .map(|o| (o.id, o.tile, o.kind.clone(), o.owner))
            .collect::<Vec<_>>();
        food.sort_by_key(|(id, ..)| *id);
        food
    };
    let host_food = food_on(&host);
    assert_eq!(host_food.len(), host_spawns);
    assert_eq!(food_on(&peer), host_food);
    assert!(host_food.iter().all(|(_, _, _, owner)| *owner == Owner::Neutral));

    // Both sides hand out the same id next
    assert_eq!(host.allocate_id(), peer.allocate_id());
}

#[test]
fn test_garbage_on_the_wire_is_an_error() {
    let mut peer = load(NetworkRole::Peer, PlayerId::BLUE);
    let (tx, rx) = channel();
    assert!(tx.try_send(b"not a message".to_vec()));
    assert!(peer.receive(&rx).is_err());
}
