//! Or-opt operator: relocate a short customer segment within its route.
//!
//! Segments of 1 to 3 consecutive customers (never spanning a trip
//! boundary) are tried at every other non-overlapping position in the same
//! route. A cheap distance-delta pre-filter rejects non-improving
//! candidates before the full path rebuild validates feasibility.

use crate::models::{ProblemData, Route, Solution, EPS};

const MAX_SEGMENT: usize = 3;

/// Applies first-improving segment relocations per route until no route
/// improves. Vehicle count and route membership are unchanged.
pub fn run(data: &ProblemData, mut solution: Solution) -> Solution {
    for route in solution.routes_mut() {
        while let Some(better) = improve_route(data, route) {
            *route = better;
        }
    }
    solution
}

fn improve_route(data: &ProblemData, route: &Route) -> Option<Route> {
    let n = route.len();
    for seg_len in 1..=MAX_SEGMENT {
        for start in 1..n.saturating_sub(seg_len) {
            let end = start + seg_len; // exclusive
            if (start..end).any(|p| route.is_depot_at(p)) {
                continue;
            }
            for target in 1..n {
                // non-overlapping and not a no-op reinsertion at the same spot
                if target >= start && target <= end {
                    continue;
                }
                if distance_delta(data, route, start, end, target) >= -EPS {
                    continue;
                }
                let path = rebuilt_path(route, start, end, target);
                if let Some(better) = Route::from_path(data, path, route.departure()) {
                    return Some(better);
                }
            }
        }
    }
    None
}

/// Distance change of moving `[start, end)` in front of `target`
/// (negative is an improvement).
fn distance_delta(
    data: &ProblemData,
    route: &Route,
    start: usize,
    end: usize,
    target: usize,
) -> f64 {
    let a = route.node_at(start - 1);
    let first = route.node_at(start);
    let last = route.node_at(end - 1);
    let b = route.node_at(end);
    let c = route.node_at(target - 1);
    let d = route.node_at(target);

    let removal_gain =
        data.distance(a, first) + data.distance(last, b) - data.distance(a, b);
    let insertion_cost =
        data.distance(c, first) + data.distance(last, d) - data.distance(c, d);
    insertion_cost - removal_gain
}

fn rebuilt_path(route: &Route, start: usize, end: usize, target: usize) -> Vec<usize> {
    let path = route.path();
    let segment = &path[start..end];
    let mut rebuilt = Vec::with_capacity(path.len());
    for (p, &id) in path.iter().enumerate() {
        if p == target {
            rebuilt.extend_from_slice(segment);
        }
        if p < start || p >= end {
            rebuilt.push(id);
        }
    }
    rebuilt
}
