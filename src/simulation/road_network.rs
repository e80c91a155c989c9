//! Road network graph for pathfinding
//!
//! Cities are graph nodes, roads are directed edges. The network also
//! tracks which commuters currently occupy each road, ordered by how far
//! along the road they are.

use ordered_float::OrderedFloat;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

use super::error::{SimError, SimResult};
use super::types::{CityId, CommuterId, Position, RoadId, SimCity, SimRoad};

/// Edge data for the road network graph
#[derive(Debug, Clone, Copy)]
pub struct RoadEdge {
    pub road_id: RoadId,
    pub weight: u64, // Road length scaled for integer weights
}

impl RoadEdge {
    pub fn from_road(road: &SimRoad) -> Self {
        // Scaled by 100 to preserve precision; ties compare exactly
        let weight = (road.length * 100.0).round() as u64;
        Self {
            road_id: road.id,
            weight: weight.max(1),
        }
    }
}

/// A shortest route between two cities
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Cities visited after the start, ending with the destination
    pub cities: Vec<CityId>,
    /// Roads to drive, in order
    pub roads: Vec<RoadId>,
    /// Sum of the lengths of `roads`
    pub length: f32,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }
}

#[derive(Default)]
pub struct SimRoadNetwork {
    /// The underlying petgraph directed graph (one-way roads)
    graph: DiGraph<CityId, RoadEdge>,

    /// Maps city IDs to their node indices in the graph
    city_to_node: HashMap<CityId, NodeIndex>,

    cities: BTreeMap<CityId, SimCity>,

    roads: BTreeMap<RoadId, SimRoad>,

    /// Cached route results, cleared on every mutation
    route_cache: HashMap<(CityId, CityId), Route>,

    /// Commuters on each road keyed by (distance along road, id)
    commuters_on_roads: HashMap<RoadId, BTreeSet<(OrderedFloat<f32>, CommuterId)>>,

    /// Bumped on every structural change
    revision: u64,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter of structural changes (cities or roads added/removed)
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn mark_changed(&mut self) {
        self.route_cache.clear();
        self.revision += 1;
    }

    /// Adds a city to the network graph
    pub fn add_city(&mut self, city: SimCity) {
        if self.city_to_node.contains_key(&city.id) {
            return;
        }

        let node_index = self.graph.add_node(city.id);
        self.city_to_node.insert(city.id, node_index);
        self.cities.insert(city.id, city);
        self.mark_changed();
    }

    pub fn city(&self, city_id: CityId) -> Option<&SimCity> {
        self.cities.get(&city_id)
    }

    pub fn city_position(&self, city_id: CityId) -> Option<&Position> {
        self.cities.get(&city_id).map(|city| &city.position)
    }

    pub fn contains_city(&self, city_id: CityId) -> bool {
        self.cities.contains_key(&city_id)
    }

    /// All cities in creation order
    pub fn cities(&self) -> impl Iterator<Item = &SimCity> {
        self.cities.values()
    }

    /// Adds a road to the network and updates the graph adjacency
    ///
    /// Endpoint and duplicate validation happen in the road builder; this
    /// only refuses edges whose endpoints are missing.
    pub fn add_road(&mut self, road: SimRoad) -> SimResult<()> {
        let start_node = *self
            .city_to_node
            .get(&road.start_city)
            .ok_or(SimError::UnknownCity(road.start_city))?;
        let end_node = *self
            .city_to_node
            .get(&road.end_city)
            .ok_or(SimError::UnknownCity(road.end_city))?;

        self.graph
            .add_edge(start_node, end_node, RoadEdge::from_road(&road));
        self.roads.insert(road.id, road);
        self.mark_changed();
        Ok(())
    }

    pub fn road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.roads.get(&road_id)
    }

    /// All roads in creation order
    pub fn roads(&self) -> impl Iterator<Item = &SimRoad> {
        self.roads.values()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Finds the road leading from one city to another, if any
    pub fn find_road_between(&self, from_city: CityId, to_city: CityId) -> Option<RoadId> {
        let from_node = self.city_to_node.get(&from_city)?;
        let to_node = self.city_to_node.get(&to_city)?;

        self.graph
            .edges(*from_node)
            .find(|edge| edge.target() == *to_node)
            .map(|edge| edge.weight().road_id)
    }

    /// Roads leaving a city with the city each one leads to, by road id
    pub fn outgoing_roads(&self, city_id: CityId) -> Option<Vec<(RoadId, CityId)>> {
        let node_index = self.city_to_node.get(&city_id)?;

        let mut connections: Vec<_> = self
            .graph
            .edges(*node_index)
            .map(|edge| (edge.weight().road_id, self.graph[edge.target()]))
            .collect();
        connections.sort();

        Some(connections)
    }

    /// All roads starting or ending at a city
    pub fn incident_roads(&self, city_id: CityId) -> Vec<RoadId> {
        self.roads
            .values()
            .filter(|road| road.start_city == city_id || road.end_city == city_id)
            .map(|road| road.id)
            .collect()
    }

    /// Finds the shortest route between two cities (Dijkstra over scaled lengths)
    ///
    /// On equal cost the predecessor with the lowest city id wins, so the
    /// result does not depend on the order roads were added.
    pub fn find_route(&mut self, start: CityId, end: CityId) -> Option<Route> {
        if !self.contains_city(start) || !self.contains_city(end) {
            return None;
        }
        if start == end {
            return Some(Route {
                cities: Vec::new(),
                roads: Vec::new(),
                length: 0.0,
            });
        }

        if let Some(route) = self.route_cache.get(&(start, end)) {
            return Some(route.clone());
        }

        let start_node = *self.city_to_node.get(&start)?;
        let end_node = *self.city_to_node.get(&end)?;

        let mut best: HashMap<NodeIndex, u64> = HashMap::new();
        let mut previous: HashMap<NodeIndex, (NodeIndex, RoadId)> = HashMap::new();
        let mut heap: BinaryHeap<Reverse<(u64, CityId)>> = BinaryHeap::new();

        best.insert(start_node, 0);
        heap.push(Reverse((0, start)));

        while let Some(Reverse((cost, city))) = heap.pop() {
            let node = *self.city_to_node.get(&city)?;
            if best.get(&node).is_some_and(|known| cost > *known) {
                continue;
            }
            if node == end_node {
                break;
            }

            for edge in self.graph.edges(node) {
                let next = edge.target();
                let next_cost = cost + edge.weight().weight;
                match best.get(&next) {
                    Some(known) if next_cost > *known => {}
                    Some(known) if next_cost == *known => {
                        let replace = previous
                            .get(&next)
                            .is_some_and(|(prev_node, _)| city < self.graph[*prev_node]);
                        if replace {
                            previous.insert(next, (node, edge.weight().road_id));
                        }
                    }
                    _ => {
                        best.insert(next, next_cost);
                        previous.insert(next, (node, edge.weight().road_id));
                        heap.push(Reverse((next_cost, self.graph[next])));
                    }
                }
            }
        }

        if !previous.contains_key(&end_node) {
            return None;
        }

        let mut cities = Vec::new();
        let mut roads = Vec::new();
        let mut cursor = end_node;
        while cursor != start_node {
            let (prev_node, road_id) = *previous.get(&cursor)?;
            cities.push(self.graph[cursor]);
            roads.push(road_id);
            cursor = prev_node;
        }
        cities.reverse();
        roads.reverse();

        let length = roads
            .iter()
            .filter_map(|road_id| self.roads.get(road_id))
            .map(|road| road.length)
            .sum();

        let route = Route {
            cities,
            roads,
            length,
        };
        self.route_cache.insert((start, end), route.clone());
        Some(route)
    }

    /// Remove a road from the network
    /// Returns the commuters that were on the road
    pub fn remove_road(&mut self, road_id: RoadId) -> SimResult<Vec<CommuterId>> {
        let road = self
            .roads
            .remove(&road_id)
            .ok_or(SimError::UnknownRoad(road_id))?;

        if let Some(start_node) = self.city_to_node.get(&road.start_city) {
            let edge_to_remove = self
                .graph
                .edges(*start_node)
                .find(|edge| edge.weight().road_id == road_id)
                .map(|edge| edge.id());

            if let Some(edge_id) = edge_to_remove {
                self.graph.remove_edge(edge_id);
            }
        }

        let commuters = self
            .commuters_on_roads
            .remove(&road_id)
            .map(|occupants| occupants.into_iter().map(|(_, id)| id).collect())
            .unwrap_or_default();

        self.mark_changed();

        Ok(commuters)
    }

    /// Register a commuter at a distance along a road
    pub fn track_commuter(&mut self, commuter_id: CommuterId, road_id: RoadId, distance: f32) {
        self.commuters_on_roads
            .entry(road_id)
            .or_default()
            .insert((OrderedFloat(distance), commuter_id));
    }

    /// Drop a commuter's entry at a known position
    pub fn untrack_commuter(&mut self, commuter_id: CommuterId, road_id: RoadId, distance: f32) {
        if let Some(occupants) = self.commuters_on_roads.get_mut(&road_id) {
            occupants.remove(&(OrderedFloat(distance), commuter_id));
            if occupants.is_empty() {
                self.commuters_on_roads.remove(&road_id);
            }
        }
    }

    /// Commuters on a road ordered from the road's start to its end
    pub fn commuters_on_road(&self, road_id: RoadId) -> Vec<(f32, CommuterId)> {
        self.commuters_on_roads
            .get(&road_id)
            .map(|occupants| {
                occupants
                    .iter()
                    .map(|(distance, id)| (distance.into_inner(), *id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Roads that currently carry at least one commuter, by road id
    pub fn occupied_roads(&self) -> Vec<RoadId> {
        let mut roads: Vec<RoadId> = self.commuters_on_roads.keys().copied().collect();
        roads.sort();
        roads
    }
}
