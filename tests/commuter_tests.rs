//! Commuter planning, movement, arrival and collision tests

mod common;

use common::{approx_eq, quiet_world};
use traffic_manager::simulation::{Command, CommandOutcome, CommuterState, SimError};

#[test]
fn test_commuter_drives_and_arrives() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let road = world.build_road(a, b).unwrap();
    let commuter = world.spawn_commuter(a, b, 25.0).unwrap();

    let report = world.tick(1.0);
    assert_eq!(report.departed, vec![commuter]);
    let state = &world.commuters.get(commuter).unwrap().state;
    assert!(matches!(state, CommuterState::Traveling { road: r, distance, .. }
        if *r == road && approx_eq(*distance, 25.0)));

    world.tick(1.0);
    world.tick(1.0);
    let report = world.tick(1.0);

    assert_eq!(report.arrivals.len(), 1);
    let arrival = &report.arrivals[0];
    assert_eq!(arrival.commuter, commuter);
    assert_eq!(arrival.city, b);
    assert!(approx_eq(arrival.traveled_length, arrival.planned_length));
    assert!(world.commuters.is_empty());
    assert!(world.road_network.commuters_on_road(road).is_empty());
    assert_eq!(world.stats.total_commuters_arrived, 1);
}

#[test]
fn test_leftover_distance_carries_onto_next_road() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let c = world.build_city(200.0, 0.0).unwrap();
    world.build_road(a, b).unwrap();
    let bc = world.build_road(b, c).unwrap();
    let commuter = world.spawn_commuter(a, c, 30.0).unwrap();

    for _ in 0..4 {
        world.tick(1.0);
    }

    // 120 units driven: 100 on the first road, 20 on the second
    let (road, distance) = world
        .commuters
        .get(commuter)
        .unwrap()
        .road_position()
        .unwrap();
    assert_eq!(road, bc);
    assert!(approx_eq(distance, 20.0));

    let mut arrivals = Vec::new();
    for _ in 0..10 {
        arrivals.extend(world.tick(1.0).arrivals);
    }
    assert_eq!(arrivals.len(), 1);
    assert!(approx_eq(arrivals[0].planned_length, 200.0));
    assert!(approx_eq(arrivals[0].traveled_length, 200.0));
}

#[test]
fn test_commuter_waits_until_a_road_is_built() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let commuter = world.spawn_commuter(a, b, 20.0).unwrap();

    for _ in 0..5 {
        let report = world.tick(1.0);
        assert!(report.departed.is_empty());
    }
    assert_eq!(world.commuters.get(commuter).unwrap().waiting_at(), Some(a));

    world.queue(Command::BuildRoad {
        from: a,
        to: b,
        speed_limit: None,
    });
    let report = world.tick(1.0);

    let Ok(CommandOutcome::RoadBuilt(road)) = &report.commands[0].outcome else {
        panic!("road was not built: {:?}", report.commands[0].outcome);
    };
    assert_eq!(report.departed, vec![commuter]);
    assert_eq!(world.commuters.get(commuter).unwrap().current_road(), Some(*road));
}

#[test]
fn test_failed_route_is_not_retried_until_the_network_changes() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let commuter = world.spawn_commuter(a, b, 20.0).unwrap();

    world.tick(1.0);
    let revision = world.road_network.revision();
    let state = world.commuters.get(commuter).unwrap().state.clone();
    assert_eq!(
        state,
        CommuterState::Idle {
            at: a,
            last_attempt: Some(revision)
        }
    );

    // An unrelated city still counts as a change
    world.build_city(300.0, 300.0).unwrap();
    world.tick(1.0);
    let state = world.commuters.get(commuter).unwrap().state.clone();
    assert_eq!(
        state,
        CommuterState::Idle {
            at: a,
            last_attempt: Some(world.road_network.revision())
        }
    );
}

#[test]
fn test_departure_waits_for_clear_road_entry() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(1000.0, 0.0).unwrap();
    world.build_road(a, b).unwrap();
    let first = world.spawn_commuter(a, b, 10.0).unwrap();
    let second = world.spawn_commuter(a, b, 10.0).unwrap();

    let report = world.tick(1.0);
    assert_eq!(report.departed, vec![first]);
    assert!(report.collisions.is_empty());
    assert!(world.commuters.get(second).unwrap().is_idle());

    let report = world.tick(1.0);
    assert_eq!(report.departed, vec![second]);
    assert!(report.collisions.is_empty());
    assert_eq!(world.commuters.len(), 2);
}

#[test]
fn test_close_commuters_collide() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(1000.0, 0.0).unwrap();
    let road = world.build_road(a, b).unwrap();

    let slow = world.spawn_commuter(a, b, 10.0).unwrap();
    world.tick(1.0);
    let fast = world.spawn_commuter(a, b, 18.0).unwrap();

    // slow ends at 20, fast at 18
    let report = world.tick(1.0);
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.crash_cues(), 1);
    let collision = &report.collisions[0];
    assert_eq!(collision.road, road);
    assert_eq!(collision.first, fast);
    assert_eq!(collision.second, slow);

    assert!(world.commuters.is_empty());
    assert!(world.road_network.commuters_on_road(road).is_empty());
    assert_eq!(world.stats.total_collisions, 1);
    assert_eq!(world.stats.total_commuters_collided, 2);
}

#[test]
fn test_commuter_in_at_most_one_collision() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(1000.0, 0.0).unwrap();
    world.build_road(a, b).unwrap();

    world.spawn_commuter(a, b, 20.0).unwrap();
    world.tick(1.0);
    world.spawn_commuter(a, b, 19.0).unwrap();
    world.tick(1.0);
    // First at 40, second at 19; the third lands level with the second
    world.spawn_commuter(a, b, 38.0).unwrap();
    let report = world.tick(1.0);

    // Positions 38, 38 and 60: one pair crashes, the third drives on
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(world.commuters.len(), 1);
}

#[test]
fn test_removed_road_strands_commuter_at_last_city() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let c = world.build_city(200.0, 0.0).unwrap();
    world.build_road(a, b).unwrap();
    let bc = world.build_road(b, c).unwrap();
    let commuter = world.spawn_commuter(a, c, 10.0).unwrap();

    world.tick(1.0);
    world.remove_road(bc).unwrap();

    let mut stranded = Vec::new();
    for _ in 0..9 {
        stranded.extend(world.tick(1.0).stranded);
    }
    assert_eq!(stranded, vec![(commuter, b)]);
    assert_eq!(world.commuters.get(commuter).unwrap().waiting_at(), Some(b));

    // Reconnecting lets it finish the trip
    let bc = world.build_road(b, c).unwrap();
    let report = world.tick(1.0);
    assert_eq!(report.departed, vec![commuter]);
    assert_eq!(world.commuters.get(commuter).unwrap().current_road(), Some(bc));
}

#[test]
fn test_removing_occupied_road_releases_commuters() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    let road = world.build_road(a, b).unwrap();
    let commuter = world.spawn_commuter(a, b, 10.0).unwrap();
    world.tick(1.0);

    let released = world.remove_road(road).unwrap();
    assert_eq!(released, vec![commuter]);
    assert!(world.commuters.get(commuter).is_none());
    assert_eq!(world.stats.total_commuters_removed, 1);
}

#[test]
fn test_spawn_commuter_validates_cities() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();

    assert_eq!(
        world.spawn_commuter(a, a, 10.0).unwrap_err(),
        SimError::NoPath { from: a, to: a }
    );
    assert!(world.commuters.is_empty());
    assert_eq!(world.stats.total_commuters_spawned, 0);
}

#[test]
fn test_commuter_position_follows_road() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(100.0, 0.0).unwrap();
    world.build_road(a, b).unwrap();
    let commuter = world.spawn_commuter(a, b, 25.0).unwrap();

    let at_start = world
        .commuters
        .get(commuter)
        .unwrap()
        .position(&world.road_network)
        .unwrap();
    assert!(approx_eq(at_start.x, 0.0));

    world.tick(1.0);
    let moving = world
        .commuters
        .get(commuter)
        .unwrap()
        .position(&world.road_network)
        .unwrap();
    assert!(approx_eq(moving.x, 25.0));
    assert!(approx_eq(moving.y, 0.0));
}

#[test]
fn test_despawn_releases_only_the_commuters_own_road_slot() {
    let mut world = quiet_world();
    let a = world.build_city(0.0, 0.0).unwrap();
    let b = world.build_city(1000.0, 0.0).unwrap();
    let road = world.build_road(a, b).unwrap();
    let traveling = world.spawn_commuter(a, b, 10.0).unwrap();
    let waiting = world.spawn_commuter(a, b, 10.0).unwrap();
    world.tick(1.0);

    // The waiting commuter sits in its city and holds no road slot
    let removed = world.commuters.despawn(waiting, &mut world.road_network);
    assert!(removed.unwrap().is_idle());
    let occupants = world.road_network.commuters_on_road(road);
    assert_eq!(occupants.len(), 1);
    assert_eq!(occupants[0].1, traveling);

    world.commuters.despawn(traveling, &mut world.road_network);
    assert!(world.road_network.commuters_on_road(road).is_empty());
    assert!(world.commuters.is_empty());
    assert!(world.commuters.despawn(traveling, &mut world.road_network).is_none());
}
