//! Relocate operator: move one customer to another route.
//!
//! The primary win condition is emptying a route entirely, which retires a
//! vehicle. Shorter routes are therefore tried as donors first; a move is
//! accepted only when the resulting solution is better under the
//! lexicographic acceptance rule, so the loop terminates.

use crate::models::{ProblemData, Route, Solution};

/// Repeatedly applies the first improving relocation until none exists.
/// Routes emptied by a move are dropped.
pub fn run(data: &ProblemData, mut solution: Solution) -> Solution {
    while let Some(improved) = first_improving(data, &solution) {
        solution = improved;
    }
    solution
}

fn first_improving(data: &ProblemData, solution: &Solution) -> Option<Solution> {
    // donors in ascending size: the short routes are the ones worth emptying
    let mut donor_order: Vec<usize> = (0..solution.routes().len()).collect();
    donor_order.sort_by_key(|&ri| solution.routes()[ri].num_customers());

    for &ri in &donor_order {
        let donor = &solution.routes()[ri];
        for p in 1..donor.len().saturating_sub(1) {
            if donor.is_depot_at(p) {
                continue;
            }
            let u = donor.node_at(p);
            for rj in 0..solution.routes().len() {
                if rj == ri {
                    continue;
                }
                let Some(target) = cheapest_insertion(data, &solution.routes()[rj], u) else {
                    continue;
                };
                let trial = apply(data, solution, ri, p, rj, target);
                if trial.is_better_than(solution, data) {
                    return Some(trial);
                }
            }
        }
    }
    None
}

/// Cheapest feasible landing spot for `u` in `route` by push-forward cost,
/// with a trailing new trip as fallback candidate.
fn cheapest_insertion(data: &ProblemData, route: &Route, u: usize) -> Option<Target> {
    let best_position = (1..route.len())
        .filter(|&q| route.can_insert_at(data, q, u))
        .map(|q| (q, route.push_forward_at(data, u, q)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let new_trip = route
        .can_append_new_trip(data, u)
        .then(|| route.new_trip_extension(data, u));

    match (best_position, new_trip) {
        (Some((q, cost)), Some(extension)) => {
            if extension < cost {
                Some(Target::NewTrip)
            } else {
                Some(Target::At(q))
            }
        }
        (Some((q, _)), None) => Some(Target::At(q)),
        (None, Some(_)) => Some(Target::NewTrip),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    At(usize),
    NewTrip,
}

fn apply(
    data: &ProblemData,
    solution: &Solution,
    ri: usize,
    p: usize,
    rj: usize,
    target: Target,
) -> Solution {
    let mut trial = solution.clone();
    let u = trial.routes_mut()[ri].remove_at(data, p);
    match target {
        Target::At(q) => trial.routes_mut()[rj].insert_at(data, q, u),
        Target::NewTrip => trial.routes_mut()[rj].append_new_trip(data, u),
    }
    // a drained trip leaves a dangling boundary behind
    trial.routes_mut()[ri].remove_empty_trips(data);
    trial.drop_empty_routes();
    trial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::is_feasible;
    use crate::models::Node;

    #[test]
    fn test_merges_two_singleton_routes() {
        // b's window opens after a's due time plus service and travel, so
        // one vehicle can serve both in sequence
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 5, 0.0, 30.0, 5.0).expect("valid"),
            Node::new(2, 20.0, 0.0, 5, 60.0, 200.0, 5.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 20).expect("valid instance");
        let solution = Solution::new(vec![
            Route::new(&data, 1, 0.0),
            Route::new(&data, 2, 0.0),
        ]);
        let improved = run(&data, solution);
        assert_eq!(improved.num_vehicles(), 1);
        assert_eq!(improved.num_customers(), 2);
        assert!(is_feasible(&data, &improved));
    }

    #[test]
    fn test_no_move_when_windows_conflict() {
        // both customers due early in opposite directions: no single
        // vehicle can serve both
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 5, 0.0, 12.0, 5.0).expect("valid"),
            Node::new(2, -10.0, 0.0, 5, 0.0, 12.0, 5.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 20).expect("valid instance");
        let solution = Solution::new(vec![
            Route::new(&data, 1, 0.0),
            Route::new(&data, 2, 0.0),
        ]);
        let before = solution.clone();
        let improved = run(&data, solution);
        assert_eq!(improved, before);
    }

    #[test]
    fn test_relocation_into_new_trip() {
        // capacity blocks sharing a trip, but the second customer's late
        // window lets the same vehicle go out again
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 8, 0.0, 30.0, 5.0).expect("valid"),
            Node::new(2, 12.0, 0.0, 8, 60.0, 500.0, 5.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let solution = Solution::new(vec![
            Route::new(&data, 1, 0.0),
            Route::new(&data, 2, 0.0),
        ]);
        let improved = run(&data, solution);
        assert_eq!(improved.num_vehicles(), 1);
        let boundaries = improved.routes()[0]
            .path()
            .iter()
            .filter(|&&id| id == 0)
            .count();
        assert_eq!(boundaries, 3, "two trips on one vehicle");
        assert!(is_feasible(&data, &improved));
    }

    #[test]
    fn test_never_increases_vehicles() {
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 5.0, 4, 0.0, 400.0, 5.0).expect("valid"),
            Node::new(2, 20.0, -5.0, 4, 0.0, 500.0, 5.0).expect("valid"),
            Node::new(3, 15.0, 10.0, 4, 0.0, 600.0, 5.0).expect("valid"),
            Node::new(4, 25.0, 0.0, 4, 0.0, 700.0, 5.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let solution = Solution::new(vec![
            Route::from_path(&data, vec![0, 1, 3, 0], 0.0).expect("feasible"),
            Route::from_path(&data, vec![0, 2, 4, 0], 0.0).expect("feasible"),
        ]);
        let before = solution.num_vehicles();
        let improved = run(&data, solution);
        assert!(improved.num_vehicles() <= before);
        assert!(is_feasible(&data, &improved));
        assert_eq!(improved.num_customers(), 4);
    }
}
