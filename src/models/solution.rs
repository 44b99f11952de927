//! Solution container and acceptance ordering.

use crate::models::{ProblemData, Route};

/// A complete set of vehicle routes covering every customer.
///
/// Solutions are compared lexicographically: fewer vehicles first, then (on
/// a vehicle-count tie) a larger minimum route length, then a smaller total
/// distance. The minimum-route-length tie-break steers the search toward
/// balanced solutions whose shortest route is easy to empty out on a later
/// vehicle-reduction attempt.
///
/// # Examples
///
/// ```
/// use multitrip::models::{Node, ProblemData, Route, Solution};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0, 1000.0),
///     Node::new(1, 10.0, 0.0, 5, 0.0, 100.0, 10.0).unwrap(),
/// ];
/// let data = ProblemData::new(nodes, 50).unwrap();
/// let solution = Solution::new(vec![Route::new(&data, 1, 0.0)]);
/// assert_eq!(solution.num_vehicles(), 1);
/// assert_eq!(solution.num_customers(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// Wraps a set of routes as a solution.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The routes, one per vehicle.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mutable access for operators that rewrite routes in place.
    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    /// Consumes the solution, returning its routes.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    /// Number of vehicles used (the primary objective).
    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    /// Total number of customers served across all routes.
    pub fn num_customers(&self) -> usize {
        self.routes.iter().map(Route::num_customers).sum()
    }

    /// Customer count of the shortest route, or 0 with no routes.
    pub fn min_route_len(&self) -> usize {
        self.routes
            .iter()
            .map(Route::num_customers)
            .min()
            .unwrap_or(0)
    }

    /// Sum of travel distances over all routes (the secondary objective).
    pub fn total_distance(&self, data: &ProblemData) -> f64 {
        self.routes.iter().map(|r| r.total_distance(data)).sum()
    }

    /// Acceptance rule: fewer vehicles wins; on a tie a larger minimum
    /// route length wins; on a further tie a smaller distance wins.
    pub fn is_better_than(&self, other: &Solution, data: &ProblemData) -> bool {
        if self.num_vehicles() != other.num_vehicles() {
            return self.num_vehicles() < other.num_vehicles();
        }
        if self.min_route_len() != other.min_route_len() {
            return self.min_route_len() > other.min_route_len();
        }
        self.total_distance(data) < other.total_distance(data)
    }

    /// Drops routes that no longer serve any customer.
    pub fn drop_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;

    fn sample_data() -> ProblemData {
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 4, 0.0, 500.0, 10.0).expect("valid"),
            Node::new(2, 20.0, 0.0, 2, 0.0, 500.0, 10.0).expect("valid"),
            Node::new(3, 30.0, 0.0, 1, 0.0, 500.0, 10.0).expect("valid"),
        ];
        ProblemData::new(nodes, 10).expect("valid instance")
    }

    fn solution_from_paths(data: &ProblemData, paths: &[&[usize]]) -> Solution {
        Solution::new(
            paths
                .iter()
                .map(|p| Route::from_path(data, p.to_vec(), 0.0).expect("feasible path"))
                .collect(),
        )
    }

    #[test]
    fn test_counts() {
        let data = sample_data();
        let s = solution_from_paths(&data, &[&[0, 1, 2, 0], &[0, 3, 0]]);
        assert_eq!(s.num_vehicles(), 2);
        assert_eq!(s.num_customers(), 3);
        assert_eq!(s.min_route_len(), 1);
    }

    #[test]
    fn test_fewer_vehicles_wins() {
        let data = sample_data();
        let one = solution_from_paths(&data, &[&[0, 1, 2, 3, 0]]);
        let two = solution_from_paths(&data, &[&[0, 1, 2, 0], &[0, 3, 0]]);
        assert!(one.is_better_than(&two, &data));
        assert!(!two.is_better_than(&one, &data));
    }

    #[test]
    fn test_larger_min_route_wins_on_vehicle_tie() {
        let data = sample_data();
        let balanced = solution_from_paths(&data, &[&[0, 1, 3, 0], &[0, 2, 0]]);
        let lopsided = solution_from_paths(&data, &[&[0, 1, 2, 0], &[0, 3, 0]]);
        // both use 2 vehicles with min route length 1; make them differ
        let balanced2 = solution_from_paths(&data, &[&[0, 1, 0], &[0, 2, 3, 0]]);
        assert_eq!(balanced.min_route_len(), lopsided.min_route_len());
        assert_eq!(balanced2.min_route_len(), 1);

        let even = solution_from_paths(&data, &[&[0, 1, 2, 0], &[0, 3, 0]]);
        let more_even = solution_from_paths(&data, &[&[0, 1, 0], &[0, 2, 0], &[0, 3, 0]]);
        assert!(even.is_better_than(&more_even, &data), "fewer vehicles first");
    }

    #[test]
    fn test_smaller_distance_wins_on_full_tie() {
        let data = sample_data();
        // same vehicle count and min length, different distance
        let short = solution_from_paths(&data, &[&[0, 1, 2, 3, 0]]);
        let long = solution_from_paths(&data, &[&[0, 3, 1, 2, 0]]);
        assert!(short.total_distance(&data) < long.total_distance(&data));
        assert!(short.is_better_than(&long, &data));
        assert!(!long.is_better_than(&short, &data));
    }

    #[test]
    fn test_min_route_tie_break() {
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 1, 0.0, 900.0, 0.0).expect("valid"),
            Node::new(2, 20.0, 0.0, 1, 0.0, 900.0, 0.0).expect("valid"),
            Node::new(3, 30.0, 0.0, 1, 0.0, 900.0, 0.0).expect("valid"),
            Node::new(4, 40.0, 0.0, 1, 0.0, 900.0, 0.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let lopsided = solution_from_paths(&data, &[&[0, 1, 2, 3, 0], &[0, 4, 0]]);
        let balanced = solution_from_paths(&data, &[&[0, 1, 2, 0], &[0, 3, 4, 0]]);
        assert!(balanced.is_better_than(&lopsided, &data));
    }

    #[test]
    fn test_drop_empty_routes() {
        let data = sample_data();
        let mut s = Solution::new(vec![
            Route::from_path(&data, vec![0, 1, 0], 0.0).expect("feasible"),
            Route::from_path(&data, vec![0, 0], 0.0).expect("feasible"),
        ]);
        s.drop_empty_routes();
        assert_eq!(s.num_vehicles(), 1);
    }
}
