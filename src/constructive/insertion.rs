//! Solomon I1 insertion construction, multi-trip variant.
//!
//! # Algorithm
//!
//! Routes are built one vehicle at a time. A seed customer starts the
//! route; remaining customers are scored by the I1 criterion and the best
//! one is inserted at its cheapest feasible position. When no unrouted
//! customer fits anywhere, a trailing trip boundary is appended and
//! insertion is retried (the same vehicle goes out again); only when even
//! a fresh trip helps nobody is the route closed.
//!
//! The multi-start driver runs every (seed ordering x weight tuple)
//! combination in parallel and keeps the best result, then tries to shrink
//! the fleet with a parallel fleet-limited insertion using one vehicle
//! fewer until customers are left over.
//!
//! # Complexity
//!
//! One sequential construction is O(n^2 * L) for route length L (each
//! selection scans all unrouted customers against all positions, each
//! position check amortized O(1) by push-forward).
//!
//! # Reference
//!
//! Solomon, M.M. (1987), insertion heuristic I1.

use rayon::prelude::*;
use tracing::debug;

use crate::config::{InsertionWeights, SearchConfig};
use crate::models::{ProblemData, Route, Solution};

/// Order in which seed customers are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrdering {
    /// Farthest from the depot first (geographic spread).
    FarthestFromDepot,
    /// Earliest due time first (temporal urgency).
    EarliestDueDate,
}

impl SeedOrdering {
    pub const BOTH: [SeedOrdering; 2] =
        [SeedOrdering::FarthestFromDepot, SeedOrdering::EarliestDueDate];

    /// Sorts the given customers by this ordering.
    pub fn order(&self, data: &ProblemData, customers: &[usize]) -> Vec<usize> {
        let mut ordered = customers.to_vec();
        match self {
            SeedOrdering::FarthestFromDepot => ordered.sort_by(|a, b| {
                data.distance_from_depot(*b)
                    .total_cmp(&data.distance_from_depot(*a))
            }),
            SeedOrdering::EarliestDueDate => ordered
                .sort_by(|a, b| data.node(*a).due_time().total_cmp(&data.node(*b).due_time())),
        }
        ordered
    }
}

/// I1 position score: weighted detour plus weighted push-forward. Lower
/// is better.
fn c1(data: &ProblemData, route: &Route, w: &InsertionWeights, p: usize, u: usize) -> f64 {
    let i = route.node_at(p - 1);
    let j = route.node_at(p);
    let detour = data.distance(i, u) + data.distance(u, j) - w.mu * data.distance(i, j);
    w.alpha1 * detour + w.alpha2 * route.push_forward_at(data, u, p)
}

/// Cheapest feasible insertion position for `u` in `route`, with its c1
/// score.
fn best_position(
    data: &ProblemData,
    route: &Route,
    u: usize,
    w: &InsertionWeights,
) -> Option<(usize, f64)> {
    (1..route.len())
        .filter(|&p| route.can_insert_at(data, p, u))
        .map(|p| (p, c1(data, route, w, p, u)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Sequential multi-trip I1 over the given customers, all vehicles leaving
/// at `departure`.
///
/// Returns the routes built plus any customers that could not be routed at
/// that departure time (possible when `departure` exceeds a customer's
/// latest feasible departure).
pub fn solomon_i1(
    data: &ProblemData,
    customers: &[usize],
    ordering: SeedOrdering,
    weights: InsertionWeights,
    departure: f64,
) -> (Vec<Route>, Vec<usize>) {
    let mut queue = ordering.order(data, customers);
    let mut routes = Vec::new();
    let mut unrouted = Vec::new();

    while !queue.is_empty() {
        let seed = queue.remove(0);
        if departure > data.latest_departure(seed) {
            unrouted.push(seed);
            continue;
        }
        let mut route = Route::new(data, seed, departure);
        while !queue.is_empty() {
            let best = queue
                .iter()
                .enumerate()
                .filter_map(|(idx, &u)| {
                    best_position(data, &route, u, &weights).map(|(p, c1)| {
                        let c2 = weights.lambda * data.distance_from_depot(u) - c1;
                        (idx, u, p, c2)
                    })
                })
                .max_by(|a, b| a.3.total_cmp(&b.3));
            match best {
                Some((idx, u, p, _)) => {
                    route.insert_at(data, p, u);
                    queue.remove(idx);
                }
                None => {
                    let n = route.len();
                    if route.node_at(n - 1) == 0 && route.node_at(n - 2) == 0 {
                        // a fresh trip helped nobody: close the route
                        route.remove_dummy_depot();
                        break;
                    }
                    route.add_dummy_depot();
                }
            }
        }
        routes.push(route);
    }
    (routes, unrouted)
}

/// Parallel fleet-limited insertion: seed exactly `m` routes from the `m`
/// farthest customers, then repeatedly place the customer with the highest
/// c2 urgency at its best position across all routes (trailing new trips
/// included).
///
/// Returns a partial result: routes plus the customers that found no
/// feasible place under the fleet limit.
pub fn fleet_limited(
    data: &ProblemData,
    customers: &[usize],
    weights: InsertionWeights,
    m: usize,
    departure: f64,
) -> (Vec<Route>, Vec<usize>) {
    let mut queue = SeedOrdering::FarthestFromDepot.order(data, customers);
    let mut routes = Vec::with_capacity(m);
    let mut unrouted = Vec::new();

    while routes.len() < m && !queue.is_empty() {
        let seed = queue.remove(0);
        if departure > data.latest_departure(seed) {
            unrouted.push(seed);
        } else {
            routes.push(Route::new(data, seed, departure));
        }
    }

    while !queue.is_empty() {
        // (queue index, route index, position or new trip, c2)
        let mut best: Option<(usize, usize, Placement, f64)> = None;
        for (idx, &u) in queue.iter().enumerate() {
            let Some((ri, placement, c1)) = best_placement(data, &routes, u, &weights) else {
                continue;
            };
            let c2 = weights.lambda * data.distance_from_depot(u) - c1;
            if best.as_ref().map_or(true, |b| c2 > b.3) {
                best = Some((idx, ri, placement, c2));
            }
        }
        match best {
            Some((idx, ri, Placement::At(p), _)) => {
                routes[ri].insert_at(data, p, queue.remove(idx));
            }
            Some((idx, ri, Placement::NewTrip, _)) => {
                routes[ri].append_new_trip(data, queue.remove(idx));
            }
            None => {
                unrouted.append(&mut queue);
            }
        }
    }
    (routes, unrouted)
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    At(usize),
    NewTrip,
}

fn best_placement(
    data: &ProblemData,
    routes: &[Route],
    u: usize,
    w: &InsertionWeights,
) -> Option<(usize, Placement, f64)> {
    let mut best: Option<(usize, Placement, f64)> = None;
    for (ri, route) in routes.iter().enumerate() {
        if let Some((p, c1)) = best_position(data, route, u, w) {
            if best.as_ref().map_or(true, |b| c1 < b.2) {
                best = Some((ri, Placement::At(p), c1));
            }
        }
        if route.can_append_new_trip(data, u) {
            let detour = data.distance_from_depot(u) + data.distance(u, 0);
            let c1 = w.alpha1 * detour + w.alpha2 * route.new_trip_extension(data, u);
            if best.as_ref().map_or(true, |b| c1 < b.2) {
                best = Some((ri, Placement::NewTrip, c1));
            }
        }
    }
    best
}

/// Construction-stage comparison: fewest vehicles, ties by distance.
pub(crate) fn better_construction(a: Solution, b: Solution, data: &ProblemData) -> Solution {
    if a.num_vehicles() != b.num_vehicles() {
        if a.num_vehicles() < b.num_vehicles() {
            return a;
        }
        return b;
    }
    if a.total_distance(data) <= b.total_distance(data) {
        a
    } else {
        b
    }
}

/// Multi-start I1 over every (seed ordering x weight tuple) combination,
/// followed by a fleet-reduction loop.
pub fn multi_start(data: &ProblemData, config: &SearchConfig) -> Solution {
    let weights: &[InsertionWeights] = if config.insertion_weights.is_empty() {
        &InsertionWeights::STANDARD
    } else {
        &config.insertion_weights
    };
    let customers = data.customer_ids();

    let combos: Vec<(SeedOrdering, InsertionWeights)> = SeedOrdering::BOTH
        .iter()
        .flat_map(|&o| weights.iter().map(move |&w| (o, w)))
        .collect();

    let mut best = combos
        .into_par_iter()
        .map(|(ordering, w)| {
            let (routes, unrouted) = solomon_i1(data, &customers, ordering, w, 0.0);
            debug_assert!(unrouted.is_empty(), "departure 0 routes every customer");
            Solution::new(routes)
        })
        .reduce_with(|a, b| better_construction(a, b, data))
        .unwrap_or_else(|| Solution::new(Vec::new()));

    debug!(
        vehicles = best.num_vehicles(),
        distance = best.total_distance(data),
        "multi-start construction complete"
    );

    // shrink the fleet one vehicle at a time until customers are left over
    while best.num_vehicles() > 1 {
        let m = best.num_vehicles() - 1;
        let reduced = weights
            .par_iter()
            .filter_map(|&w| {
                let (routes, unrouted) = fleet_limited(data, &customers, w, m, 0.0);
                unrouted.is_empty().then(|| Solution::new(routes))
            })
            .reduce_with(|a, b| better_construction(a, b, data));
        match reduced {
            Some(solution) => {
                debug!(vehicles = m, "fleet reduction succeeded");
                best = solution;
            }
            None => break,
        }
    }
    best
}
