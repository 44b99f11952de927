//! 2-opt* operator: swap route tails between two vehicles.
//!
//! Cutting route 1 after position `p1` and route 2 after `p2`, vehicle 1
//! keeps its head plus vehicle 2's tail and vice versa. Candidate cuts are
//! scored by the summed push-forward at the two new junctions and the
//! lowest-delay feasible swap per route pair is applied. Unlike the pure
//! improvement operators this is primarily a diversifying perturbation:
//! it reshapes route structure without ever increasing the vehicle count.

use crate::models::{ProblemData, Route, Solution};

/// Sweeps all route pairs once, applying each pair's minimum-delay
/// feasible tail swap. Routes emptied by a swap are dropped.
pub fn sweep(data: &ProblemData, mut solution: Solution) -> Solution {
    let n = solution.routes().len();
    for ri in 0..n {
        for rj in (ri + 1)..n {
            if let Some((a, b)) =
                best_tail_swap(data, &solution.routes()[ri], &solution.routes()[rj])
            {
                solution.routes_mut()[ri] = a;
                solution.routes_mut()[rj] = b;
            }
        }
    }
    for route in solution.routes_mut() {
        route.remove_empty_trips(data);
    }
    solution.drop_empty_routes();
    solution
}

/// Minimum push-forward-sum feasible tail swap between two routes, if any.
fn best_tail_swap(data: &ProblemData, r1: &Route, r2: &Route) -> Option<(Route, Route)> {
    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for p1 in 1..r1.len().saturating_sub(1) {
        for p2 in 1..r2.len().saturating_sub(1) {
            let d1 = junction_delay(data, r1, p1, r2, p2);
            let d2 = junction_delay(data, r2, p2, r1, p1);
            let (Some(d1), Some(d2)) = (d1, d2) else { continue };
            candidates.push((d1 + d2, p1, p2));
        }
    }
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    // capacity across the new junction is settled by the rebuild
    for (_, p1, p2) in candidates {
        let mut path_a = r1.path()[..=p1].to_vec();
        path_a.extend_from_slice(&r2.path()[p2 + 1..]);
        let mut path_b = r2.path()[..=p2].to_vec();
        path_b.extend_from_slice(&r1.path()[p1 + 1..]);
        let a = Route::from_path(data, path_a, r1.departure());
        let b = Route::from_path(data, path_b, r2.departure());
        if let (Some(a), Some(b)) = (a, b) {
            return Some((a, b));
        }
    }
    None
}

/// Service-start delay imposed on `tail`'s position `p_tail + 1` when it
/// is reattached after `head`'s position `p_head`; `None` if the delay
/// breaks a downstream window.
fn junction_delay(
    data: &ProblemData,
    head: &Route,
    p_head: usize,
    tail: &Route,
    p_tail: usize,
) -> Option<f64> {
    let from = head.node_at(p_head);
    let to = tail.node_at(p_tail + 1);
    let arrival = head.service_start(data, p_head)
        + data.node(from).service_time()
        + data.travel_time(from, to);
    let new_service = arrival.max(data.node(to).ready_time());
    let delta = new_service - tail.service_start(data, p_tail + 1);
    tail.check_push_forward(data, delta, p_tail + 1)
        .then_some(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::is_feasible;
    use crate::models::Node;

    fn sample_data() -> ProblemData {
        let nodes = vec![
            Node::depot(0.0, 0.0, 10_000.0),
            Node::new(1, 10.0, 2.0, 3, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(2, 20.0, -2.0, 3, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(3, 10.0, -2.0, 3, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(4, 20.0, 2.0, 3, 0.0, 9000.0, 1.0).expect("valid"),
        ];
        ProblemData::new(nodes, 12).expect("valid instance")
    }

    #[test]
    fn test_tail_swap_preserves_coverage() {
        let data = sample_data();
        let solution = Solution::new(vec![
            Route::from_path(&data, vec![0, 1, 2, 0], 0.0).expect("feasible"),
            Route::from_path(&data, vec![0, 3, 4, 0], 0.0).expect("feasible"),
        ]);
        let swept = sweep(&data, solution);
        assert!(is_feasible(&data, &swept));
        assert_eq!(swept.num_customers(), 4);
        assert!(swept.num_vehicles() <= 2);
    }

    #[test]
    fn test_swap_respects_capacity() {
        // tails cannot swap without overloading a trip; sweep must leave
        // a feasible configuration
        let nodes = vec![
            Node::depot(0.0, 0.0, 10_000.0),
            Node::new(1, 10.0, 0.0, 2, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(2, 20.0, 0.0, 8, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(3, -10.0, 0.0, 2, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(4, -20.0, 0.0, 8, 0.0, 9000.0, 1.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let solution = Solution::new(vec![
            Route::from_path(&data, vec![0, 1, 2, 0], 0.0).expect("feasible"),
            Route::from_path(&data, vec![0, 3, 4, 0], 0.0).expect("feasible"),
        ]);
        let swept = sweep(&data, solution);
        assert!(is_feasible(&data, &swept));
        assert_eq!(swept.num_customers(), 4);
    }

    #[test]
    fn test_single_route_untouched() {
        let data = sample_data();
        let route = Route::from_path(&data, vec![0, 1, 2, 3, 4, 0], 0.0);
        // capacity 12, total demand 12: single trip holds everyone
        let solution = Solution::new(vec![route.expect("feasible")]);
        let before = solution.clone();
        let swept = sweep(&data, solution);
        assert_eq!(swept, before);
    }

    #[test]
    fn test_junction_delay_detects_violation() {
        let nodes = vec![
            Node::depot(0.0, 0.0, 10_000.0),
            Node::new(1, 50.0, 0.0, 2, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(2, 60.0, 0.0, 2, 0.0, 9000.0, 1.0).expect("valid"),
            Node::new(3, -10.0, 0.0, 2, 0.0, 9000.0, 1.0).expect("valid"),
            // due long before route 1's vehicle could swing by
            Node::new(4, -20.0, 0.0, 2, 0.0, 25.0, 1.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let r1 = Route::from_path(&data, vec![0, 1, 2, 0], 0.0).expect("feasible");
        let r2 = Route::from_path(&data, vec![0, 3, 4, 0], 0.0).expect("feasible");
        // attaching r2's tail (customer 4) after r1's customer 1 arrives
        // far too late
        assert!(junction_delay(&data, &r1, 1, &r2, 1).is_none());
    }
}
