//! Exchange operator: swap two customers between routes.
//!
//! Feasibility of a swap is checked both ways without mutating either
//! route: each incoming customer must fit its new slot under trip capacity
//! and its own due time, and the service-start delay at the slot's
//! successor must survive the push-forward scan. The swap itself is
//! applied by path rebuild.
//!
//! The improving mode drives the distance-only post-pass; the random mode
//! is the weak perturbation of the iterated search.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::{ProblemData, Route, Solution, EPS};

/// Repeatedly applies the first exchange improving total distance by more
/// than `min_gain`, until none exists. Vehicle count and route sizes are
/// unchanged by construction.
pub fn run(data: &ProblemData, mut solution: Solution, min_gain: f64) -> Solution {
    while let Some((ri, rj, a, b)) = first_improving(data, &solution, min_gain) {
        solution.routes_mut()[ri] = a;
        solution.routes_mut()[rj] = b;
    }
    solution
}

/// Applies up to `attempts` random feasible exchanges, ignoring cost.
/// Escapes local optima without ever touching the vehicle count.
pub fn random_exchanges<R: Rng>(
    data: &ProblemData,
    mut solution: Solution,
    attempts: usize,
    rng: &mut R,
) -> Solution {
    if solution.routes().len() < 2 {
        return solution;
    }
    for _ in 0..attempts {
        let ri = rng.random_range(0..solution.routes().len());
        let rj = rng.random_range(0..solution.routes().len());
        if ri == rj {
            continue;
        }
        let Some(p1) = random_customer_position(&solution.routes()[ri], rng) else {
            continue;
        };
        let Some(p2) = random_customer_position(&solution.routes()[rj], rng) else {
            continue;
        };
        if !check_exchange(data, &solution.routes()[ri], &solution.routes()[rj], p1, p2) {
            continue;
        }
        if let Some((a, b)) = swapped_pair(
            data,
            &solution.routes()[ri],
            &solution.routes()[rj],
            p1,
            p2,
        ) {
            solution.routes_mut()[ri] = a;
            solution.routes_mut()[rj] = b;
        }
    }
    solution
}

fn random_customer_position<R: Rng>(route: &Route, rng: &mut R) -> Option<usize> {
    let positions: Vec<usize> = (1..route.len().saturating_sub(1))
        .filter(|&p| !route.is_depot_at(p))
        .collect();
    positions.choose(rng).copied()
}

fn first_improving(
    data: &ProblemData,
    solution: &Solution,
    min_gain: f64,
) -> Option<(usize, usize, Route, Route)> {
    let routes = solution.routes();
    for ri in 0..routes.len() {
        for rj in (ri + 1)..routes.len() {
            for p1 in 1..routes[ri].len() - 1 {
                if routes[ri].is_depot_at(p1) {
                    continue;
                }
                for p2 in 1..routes[rj].len() - 1 {
                    if routes[rj].is_depot_at(p2) {
                        continue;
                    }
                    if distance_gain(data, &routes[ri], &routes[rj], p1, p2) <= min_gain {
                        continue;
                    }
                    if !check_exchange(data, &routes[ri], &routes[rj], p1, p2) {
                        continue;
                    }
                    if let Some((a, b)) =
                        swapped_pair(data, &routes[ri], &routes[rj], p1, p2)
                    {
                        return Some((ri, rj, a, b));
                    }
                }
            }
        }
    }
    None
}

/// Distance saved by swapping the customers at `p1`/`p2` (positive is an
/// improvement).
fn distance_gain(data: &ProblemData, r1: &Route, r2: &Route, p1: usize, p2: usize) -> f64 {
    let detour = |r: &Route, p: usize, id: usize| {
        let prev = r.node_at(p - 1);
        let next = r.node_at(p + 1);
        data.distance(prev, id) + data.distance(id, next)
    };
    let x = r1.node_at(p1);
    let y = r2.node_at(p2);
    (detour(r1, p1, x) + detour(r2, p2, y)) - (detour(r1, p1, y) + detour(r2, p2, x))
}

/// Checks both directions of a swap without mutating either route.
pub fn check_exchange(
    data: &ProblemData,
    r1: &Route,
    r2: &Route,
    p1: usize,
    p2: usize,
) -> bool {
    fits(data, r1, p1, r2.node_at(p2)) && fits(data, r2, p2, r1.node_at(p1))
}

/// Would `incoming` be feasible in place of the customer at position `p`?
fn fits(data: &ProblemData, route: &Route, p: usize, incoming: usize) -> bool {
    let outgoing = data.node(route.node_at(p));
    let node_in = data.node(incoming);
    let load = route.load_at(p) - outgoing.demand() + node_in.demand();
    if load > data.capacity() {
        return false;
    }

    let prev = route.node_at(p - 1);
    let arrival = route.service_start(data, p - 1)
        + data.node(prev).service_time()
        + data.travel_time(prev, incoming);
    if arrival > node_in.due_time() + EPS {
        return false;
    }

    let next = route.node_at(p + 1);
    let new_arrival_next = arrival.max(node_in.ready_time())
        + node_in.service_time()
        + data.travel_time(incoming, next);
    let new_service_next = new_arrival_next.max(data.node(next).ready_time());
    let delta = new_service_next - route.service_start(data, p + 1);
    route.check_push_forward(data, delta, p + 1)
}

/// Rebuilds both routes with the customers at `p1`/`p2` swapped.
fn swapped_pair(
    data: &ProblemData,
    r1: &Route,
    r2: &Route,
    p1: usize,
    p2: usize,
) -> Option<(Route, Route)> {
    let mut path1 = r1.path().to_vec();
    let mut path2 = r2.path().to_vec();
    std::mem::swap(&mut path1[p1], &mut path2[p2]);
    let a = Route::from_path(data, path1, r1.departure())?;
    let b = Route::from_path(data, path2, r2.departure())?;
    Some((a, b))
}
