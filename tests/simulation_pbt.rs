//! Property-based tests for the simulation invariants

mod common;

use common::quiet_config;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use traffic_manager::simulation::{
    CityId, Command, CommuterId, EconomyConfig, ErrorKind, FinePolicy, LevelData, RoadId,
    SimConfig, SimWorld,
};

fn free_building_world() -> SimWorld {
    SimWorld::with_config(SimConfig {
        economy: EconomyConfig {
            road_cost: 0,
            camera_cost: 0,
            ..EconomyConfig::default()
        },
        ..quiet_config()
    })
}

fn ring_world(config: SimConfig) -> (SimWorld, Vec<RoadId>) {
    let level = LevelData::default_level().unwrap();
    let mut world = SimWorld::from_level(&level, config);
    let cities: Vec<CityId> = world.road_network.cities().map(|c| c.id).collect();
    let mut roads = Vec::new();
    for (index, &from) in cities.iter().enumerate() {
        let to = cities[(index + 1) % cities.len()];
        if let Ok((forward, backward)) = world.build_two_way_road(from, to) {
            roads.push(forward);
            roads.push(backward);
        }
    }
    (world, roads)
}

/// All-pairs shortest road distances, computed without the route finder
fn shortest_distances(world: &SimWorld) -> HashMap<(CityId, CityId), f64> {
    let cities: Vec<CityId> = world.road_network.cities().map(|c| c.id).collect();
    let mut dist = HashMap::new();
    for &from in &cities {
        for &to in &cities {
            dist.insert((from, to), if from == to { 0.0 } else { f64::INFINITY });
        }
    }
    for road in world.road_network.roads() {
        let key = (road.start_city, road.end_city);
        let length = f64::from(road.length);
        if length < dist[&key] {
            dist.insert(key, length);
        }
    }
    for &via in &cities {
        for &from in &cities {
            for &to in &cities {
                let through = dist[&(from, via)] + dist[&(via, to)];
                if through < dist[&(from, to)] {
                    dist.insert((from, to), through);
                }
            }
        }
    }
    dist
}

prop_compose! {
    fn arb_economy()(
        starting_balance in 0i64..2000,
        road_cost in 0i64..200,
        camera_cost in 0i64..100,
        road_upkeep in 0i64..40,
        camera_upkeep in 0i64..20,
        arrival_revenue in 0i64..30,
        fine_base in 0i64..200,
    ) -> EconomyConfig {
        EconomyConfig {
            starting_balance,
            road_cost,
            camera_cost,
            road_upkeep,
            camera_upkeep,
            arrival_revenue,
            fine: FinePolicy {
                base: fine_base,
                per_unit_over: 0,
            },
            ..EconomyConfig::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_no_duplicate_directed_roads(
        pairs in proptest::collection::vec((0usize..5, 0usize..5), 0..40)
    ) {
        let mut world = free_building_world();
        let cities: Vec<CityId> = (0..5)
            .map(|i| world.build_city(i as f32 * 100.0, 0.0).unwrap())
            .collect();

        let mut expected = HashSet::new();
        for (from, to) in pairs {
            let result = world.build_road(cities[from], cities[to]);
            if from == to {
                prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::SelfLoop);
            } else if !expected.insert((from, to)) {
                prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::DuplicateRoad);
            } else {
                prop_assert!(result.is_ok());
            }
        }

        let built: HashSet<(CityId, CityId)> = world
            .road_network
            .roads()
            .map(|road| (road.start_city, road.end_city))
            .collect();
        prop_assert_eq!(built.len(), world.road_network.road_count());
        prop_assert_eq!(built.len(), expected.len());
    }

    #[test]
    fn test_rejected_city_leaves_world_unchanged(
        x in -500.0f32..500.0,
        y in -500.0f32..500.0,
    ) {
        let mut world = free_building_world();
        world.build_city(x, y).unwrap();
        let balance = world.treasury().balance();

        for _ in 0..3 {
            prop_assert_eq!(world.build_city(x, y).unwrap_err().kind(), ErrorKind::Overlap);
        }
        prop_assert_eq!(world.road_network.city_count(), 1);
        prop_assert_eq!(world.treasury().balance(), balance);
    }

    #[test]
    fn test_treasury_follows_tick_settlement(
        seed in any::<u64>(),
        economy in arb_economy(),
        billing_interval in 1u64..30,
        camera_ticks in proptest::collection::vec(any::<bool>(), 200),
    ) {
        let floor = economy.floor;
        let (mut world, roads) = ring_world(SimConfig {
            seed,
            billing_interval,
            spawn_interval: 10,
            economy,
            ..SimConfig::default()
        });

        for (index, place_camera) in camera_ticks.into_iter().enumerate() {
            if place_camera && !roads.is_empty() {
                world.queue(Command::BuildSpeedCamera {
                    road: roads[index % roads.len()],
                    threshold: Some(25.0),
                });
            }

            let report = world.tick(0.1);
            let settlement = &report.settlement;
            let expected =
                (report.balance_before + settlement.credits() - settlement.costs()).max(floor);
            prop_assert_eq!(report.balance_after, expected);
            if settlement.shortfall.is_some() {
                prop_assert_eq!(report.balance_after, floor);
            }
        }
    }

    #[test]
    fn test_arrivals_drive_the_shortest_route(seed in any::<u64>()) {
        let (mut world, _) = ring_world(SimConfig {
            seed,
            spawn_interval: 5,
            ..SimConfig::default()
        });
        let shortest = shortest_distances(&world);

        let mut expected: HashMap<CommuterId, f64> = HashMap::new();
        let mut arrived = 0;
        for _ in 0..600 {
            let report = world.tick(0.1);
            for &id in &report.departed {
                // Crashed on the way out; nothing to compare
                let Some(commuter) = world.commuters.get(id) else {
                    continue;
                };
                let length = shortest[&(commuter.origin, commuter.destination)];
                prop_assert!(length.is_finite());
                prop_assert!((f64::from(commuter.planned_length) - length).abs() < 1e-2);
                expected.insert(id, length);
            }
            for arrival in &report.arrivals {
                let length = expected[&arrival.commuter];
                prop_assert!((f64::from(arrival.planned_length) - length).abs() < 1e-2);
                prop_assert!((f64::from(arrival.traveled_length) - length).abs() < 1e-2);
                arrived += 1;
            }
            for collision in &report.collisions {
                prop_assert_ne!(collision.first, collision.second);
                prop_assert!(world.commuters.get(collision.first).is_none());
                prop_assert!(world.commuters.get(collision.second).is_none());
            }
        }
        prop_assert_eq!(world.stats.total_commuters_arrived, arrived);
    }
}
