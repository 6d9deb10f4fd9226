use std::error::Error;
use std::time::{Duration as WallTime, Instant};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use route_engine::config::{LandmarkStrategy, RoutingConfig, RoutingModelMode};
use route_engine::model::{
    CoreEdge, CoreNode, Graph, ModeSet, MutableGraph, RoadEdge, RoadGraph, RoadNode,
    TransportationMode, distance_equirect,
};
use route_engine::shortest_path::{ShortestPathComputation, ShortestPathComputationFactory};
use route_engine::timetable::{Connection, Stop, Timetable, Trip};

/// Nodes per side of the synthetic road grid.
const GRID_SIZE: u32 = 40;

/// Degrees between neighbouring grid nodes, roughly 110 to 150 m.
const GRID_SPACING: f32 = 0.001_5;

const ORIGIN: (f32, f32) = (48.0, 7.8);

/// Every tram line serves every n-th node of its row.
const STOP_EVERY: u32 = 4;

const LINE_EVERY: u32 = 8;

type RoadNetwork = RoadGraph<CoreNode, CoreEdge>;

fn grid_coordinates(row: u32, column: u32) -> (f32, f32) {
    (
        ORIGIN.0 + row as f32 * GRID_SPACING,
        ORIGIN.1 + column as f32 * GRID_SPACING,
    )
}

fn build_road_grid() -> Result<(RoadNetwork, Vec<CoreNode>), Box<dyn Error>> {
    let mut graph = RoadNetwork::new();
    let mut nodes = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            let (latitude, longitude) = grid_coordinates(row, column);
            let id = graph.generate_unique_node_id()?;
            nodes.push(RoadNode::new(id, latitude, longitude));
        }
    }

    let streets = ModeSet::all();
    let footways = ModeSet::of(&[TransportationMode::Foot, TransportationMode::Bike]);
    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            let here = nodes[(row * GRID_SIZE + column) as usize];
            let mut neighbours = Vec::new();
            if column + 1 < GRID_SIZE {
                neighbours.push(nodes[(row * GRID_SIZE + column + 1) as usize]);
            }
            if row + 1 < GRID_SIZE {
                neighbours.push(nodes[((row + 1) * GRID_SIZE + column) as usize]);
            }
            for there in neighbours {
                // Every third street is closed to cars
                let modes = if (row + column) % 3 == 0 { footways } else { streets };
                let length = distance_equirect(here.coordinates, there.coordinates);
                for (from, to) in [(here, there), (there, here)] {
                    let id = graph.generate_unique_edge_id()?;
                    let edge = RoadEdge::new(id, from, to, length, 50.0, modes);
                    graph.add_edge(CoreEdge::Road(edge));
                }
            }
        }
    }

    Ok((graph, nodes.into_iter().map(CoreNode::Road).collect()))
}

/// Tram lines along every few rows, running every ten minutes from 06:00
/// to 22:00 in both directions.
fn build_timetable(config: &RoutingConfig) -> Result<Timetable, Box<dyn Error>> {
    let mut timetable = Timetable::new();
    for row in (0..GRID_SIZE).step_by(LINE_EVERY as usize) {
        let mut line = Vec::new();
        for column in (0..GRID_SIZE).step_by(STOP_EVERY as usize) {
            let (latitude, longitude) = grid_coordinates(row, column);
            let id = timetable.generate_unique_stop_id()?;
            timetable.add_stop(Stop::new(id, latitude, longitude))?;
            line.push(id);
        }

        let reversed: Vec<u32> = line.iter().rev().copied().collect();
        for stops in [&line, &reversed] {
            for departure in (6 * 3_600..22 * 3_600).step_by(600) {
                let trip = timetable.generate_unique_trip_id()?;
                timetable.add_trip(Trip::new(trip))?;
                let connections = stops.windows(2).enumerate().map(|(index, pair)| {
                    let leaves = departure + index as u32 * 90;
                    Connection::new(trip, index as u32, pair[0], pair[1], leaves, leaves + 75)
                });
                timetable.add_connections(connections)?;
            }
        }
    }

    timetable.correct_footpaths(config.transfer_delay_secs, config.footpath_reachability_m);
    Ok(timetable)
}

fn report(name: &str, elapsed: WallTime, queries: usize, found: usize, settled: usize) {
    let per_query = elapsed.as_secs_f64() * 1_000.0 / queries.max(1) as f64;
    info!(
        algorithm = name,
        queries,
        found,
        settled,
        per_query_ms = per_query,
        "benchmark finished"
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let queries: usize = args.next().map(|arg| arg.parse()).transpose()?.unwrap_or(200);
    let seed: u64 = args.next().map(|arg| arg.parse()).transpose()?.unwrap_or(42);

    let config = RoutingConfig {
        amount_of_landmarks: 8,
        landmark_strategy: LandmarkStrategy::GreedyFarthest,
        landmark_seed: Some(seed),
        routing_model_mode: RoutingModelMode::GraphWithTimetable,
        ..RoutingConfig::default()
    };

    let (graph, nodes) = build_road_grid()?;
    let timetable = build_timetable(&config)?;
    info!(
        graph = %graph.size_information(),
        timetable = %timetable.size_information(),
        "network built"
    );

    let started = Instant::now();
    let factory = ShortestPathComputationFactory::initialize(&graph, Some(&timetable), config)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "factory initialized");

    let midnight: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or("invalid benchmark date")?;
    let mut rng = StdRng::seed_from_u64(seed);
    let pairs: Vec<(CoreNode, CoreNode, NaiveDateTime)> = (0..queries)
        .map(|_| {
            let source = nodes[rng.random_range(0..nodes.len())];
            let destination = nodes[rng.random_range(0..nodes.len())];
            let departure = midnight + Duration::seconds(rng.random_range(6 * 3_600..20 * 3_600));
            (source, destination, departure)
        })
        .collect();

    let dijkstra = factory.create_algorithm_dijkstra();
    let alt = factory.create_default_algorithm();
    for (name, algorithm) in [("dijkstra", &dijkstra), ("alt", &alt)] {
        let started = Instant::now();
        let mut found = 0;
        let mut settled = 0;
        for (source, destination, _) in &pairs {
            if algorithm.compute_shortest_path_from(*source, *destination).is_some() {
                found += 1;
            }
            settled += algorithm.compute_search_space(&[*source], Some(*destination)).len();
        }
        report(name, started.elapsed(), pairs.len(), found, settled);
    }

    let walk_and_ride = ModeSet::of(&[TransportationMode::Foot, TransportationMode::Tram]);
    let started = Instant::now();
    let mut found = 0;
    let mut rides = 0;
    for (source, destination, departure) in &pairs {
        let algorithm = factory.create_algorithm(*departure, walk_and_ride);
        if let Some(path) = algorithm.compute_shortest_path_from(*source, *destination) {
            found += 1;
            if path.edges().any(|entry| matches!(entry.edge, CoreEdge::Transit(_))) {
                rides += 1;
            }
        }
    }
    report("hybrid", started.elapsed(), pairs.len(), found, 0);
    info!(rides, "journeys using trams");

    let csa = factory.create_algorithm_csa()?;
    let stops = timetable.stop_count() as u32;
    let started = Instant::now();
    let mut found = 0;
    let mut scanned = 0;
    for (_, _, departure) in &pairs {
        let source = rng.random_range(0..stops);
        let target = rng.random_range(0..stops);
        let secs = (*departure - midnight).num_seconds() as u32;
        let result = csa.scan(&[(source, secs)], Some(target));
        scanned += result.scanned();
        if result.arrival_at(target).is_some() {
            found += 1;
        }
    }
    report("csa", started.elapsed(), pairs.len(), found, scanned);

    Ok(())
}
