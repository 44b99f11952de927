//! Full-simulation solution validation.
//!
//! The validator deliberately shares no code with [`Route`]'s incremental
//! caches: it re-simulates every route from scratch, so a bug in the
//! push-forward bookkeeping cannot hide a constraint violation.

use std::collections::HashSet;

use crate::models::{ProblemData, Route, Solution};

/// A single constraint violation found in a candidate solution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("customer {0} is not served by any route")]
    UnservedCustomer(usize),
    #[error("customer {0} is served more than once")]
    DuplicateCustomer(usize),
    #[error("route {route} references unknown node {id}")]
    UnknownNode { route: usize, id: usize },
    #[error("route {route} is not depot-bounded")]
    MalformedPath { route: usize },
    #[error(
        "route {route} arrives at node {node} (position {position}) at {arrival:.3}, after its due time {due:.3}"
    )]
    LateArrival {
        route: usize,
        position: usize,
        node: usize,
        arrival: f64,
        due: f64,
    },
    #[error("route {route}, trip {trip}: load {load} exceeds capacity {capacity}")]
    TripOverload {
        route: usize,
        trip: usize,
        load: u32,
        capacity: u32,
    },
}

/// Checks a solution against every hard constraint and returns all
/// violations found (empty means feasible).
///
/// Coverage: each customer exactly once across all routes. Per route:
/// depot-bounded path, every arrival within its node's due time when
/// simulated from the route's departure, and every trip load within the
/// vehicle capacity.
pub fn validate(data: &ProblemData, solution: &Solution) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for (ri, route) in solution.routes().iter().enumerate() {
        validate_route(data, ri, route, &mut violations);
        for &id in route.path() {
            if id == 0 {
                continue;
            }
            if id >= data.nodes().len() {
                continue; // already reported as UnknownNode
            }
            if !seen.insert(id) {
                violations.push(Violation::DuplicateCustomer(id));
            }
        }
    }

    for id in data.customer_ids() {
        if !seen.contains(&id) {
            violations.push(Violation::UnservedCustomer(id));
        }
    }

    violations
}

/// Returns `true` if the solution satisfies every hard constraint.
pub fn is_feasible(data: &ProblemData, solution: &Solution) -> bool {
    validate(data, solution).is_empty()
}

fn validate_route(
    data: &ProblemData,
    ri: usize,
    route: &Route,
    violations: &mut Vec<Violation>,
) {
    let path = route.path();
    if path.len() < 2 || path[0] != 0 || path[path.len() - 1] != 0 {
        violations.push(Violation::MalformedPath { route: ri });
        return;
    }
    for &id in path {
        if id >= data.nodes().len() {
            violations.push(Violation::UnknownNode { route: ri, id });
            return;
        }
    }

    // arrival simulation from scratch
    let mut service_start = route.departure().max(data.depot().ready_time());
    for i in 1..path.len() {
        let prev = data.node(path[i - 1]);
        let arrival =
            service_start + prev.service_time() + data.travel_time(path[i - 1], path[i]);
        let node = data.node(path[i]);
        if arrival > node.due_time() + crate::models::EPS {
            violations.push(Violation::LateArrival {
                route: ri,
                position: i,
                node: path[i],
                arrival,
                due: node.due_time(),
            });
        }
        service_start = arrival.max(node.ready_time());
    }

    // per-trip loads
    let mut trip = 0;
    let mut load = 0u32;
    for &id in &path[1..] {
        if id == 0 {
            if load > data.capacity() {
                violations.push(Violation::TripOverload {
                    route: ri,
                    trip,
                    load,
                    capacity: data.capacity(),
                });
            }
            trip += 1;
            load = 0;
        } else {
            load += data.node(id).demand();
        }
    }
}
