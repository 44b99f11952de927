//! Multi-trip route with incremental push-forward feasibility.
//!
//! # Algorithm
//!
//! A route is a depot-bounded sequence of node ids in which interior depot
//! occurrences mark trip boundaries (the vehicle reloads and departs again).
//! Arrival times and per-trip loads are cached per position and maintained
//! incrementally on every mutation.
//!
//! Feasibility of a candidate insertion is decided with Solomon's
//! push-forward lemma (Solomon 1987, lemma 1.1): the delay introduced at
//! the insertion point propagates forward, shrinking by the waiting-time
//! slack at each later position; once it reaches zero every later window
//! stays satisfied and the scan stops. This turns a full route
//! re-simulation into a short forward scan bounded by existing slack.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2),
//! 254-265.

use crate::models::ProblemData;

/// Comparison slop for arrival-time arithmetic.
pub(crate) const EPS: f64 = 1e-9;

/// An ordered depot-bounded visit sequence with cached arrival times and
/// per-trip loads.
///
/// Positions are 0-based; position 0 and the last position are always the
/// depot. `trip_loads[p]` holds the total demand of the trip containing
/// position `p` (a depot position belongs to the trip it closes; position 0
/// carries 0).
///
/// Mutations never partially apply: callers confirm feasibility with
/// [`Route::can_insert_at`] first, and the mutators debug-assert the
/// invariants they were promised.
///
/// # Examples
///
/// ```
/// use multitrip::models::{Node, ProblemData, Route};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0, 1000.0),
///     Node::new(1, 10.0, 0.0, 5, 0.0, 100.0, 10.0).unwrap(),
///     Node::new(2, 20.0, 0.0, 5, 0.0, 200.0, 10.0).unwrap(),
/// ];
/// let data = ProblemData::new(nodes, 50).unwrap();
///
/// let mut route = Route::new(&data, 1, 0.0);
/// assert_eq!(route.len(), 3);
/// assert!(route.can_insert_at(&data, 2, 2));
/// route.insert_at(&data, 2, 2);
/// assert_eq!(route.customer_ids(), vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    path: Vec<usize>,
    arrivals: Vec<f64>,
    trip_loads: Vec<u32>,
    departure: f64,
}

impl Route {
    /// Creates the route `[depot, seed, depot]` leaving the depot at
    /// `departure`.
    ///
    /// Callers are responsible for picking a departure no later than the
    /// seed's latest feasible departure.
    pub fn new(data: &ProblemData, seed: usize, departure: f64) -> Self {
        debug_assert!(seed != 0, "seed must be a customer");
        debug_assert!(departure <= data.latest_departure(seed) + EPS);
        let node = data.node(seed);
        let arrival_seed =
            departure + data.depot().service_time() + data.travel_time(0, seed);
        let back = arrival_seed.max(node.ready_time())
            + node.service_time()
            + data.travel_time(seed, 0);
        let demand = node.demand();
        Self {
            path: vec![0, seed, 0],
            arrivals: vec![departure, arrival_seed, back],
            trip_loads: vec![0, demand, demand],
            departure,
        }
    }

    /// Rebuilds a route from a full path, validating feasibility.
    ///
    /// Returns `None` if the path violates a due time or a trip exceeds the
    /// vehicle capacity. Used by operators that reconstruct a whole
    /// sub-path (Or-opt, 2-opt*, merge) and rebuild caches once.
    pub fn from_path(data: &ProblemData, path: Vec<usize>, departure: f64) -> Option<Self> {
        if path.len() < 2 || path[0] != 0 || *path.last()? != 0 {
            return None;
        }
        let arrivals = simulate_arrivals(data, &path, departure)?;
        let trip_loads = compute_trip_loads(data, &path)?;
        Some(Self {
            path,
            arrivals,
            trip_loads,
            departure,
        })
    }

    /// Splices two routes into one multi-trip route (`l` then `m`, keeping
    /// `l`'s departure time).
    ///
    /// Returns `None` if the combined path is infeasible; callers normally
    /// confirm compatibility with [`Route::check_push_forward`] first.
    pub fn merged(data: &ProblemData, l: &Route, m: &Route) -> Option<Self> {
        debug_assert!(l.num_customers() > 0 && m.num_customers() > 0);
        let mut path = l.path.clone();
        path.extend_from_slice(&m.path[1..]);
        Self::from_path(data, path, l.departure)
    }

    /// Number of positions, including both depot endpoints.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns `true` if the route serves no customer.
    pub fn is_empty(&self) -> bool {
        self.num_customers() == 0
    }

    /// Node id at position `p`.
    pub fn node_at(&self, p: usize) -> usize {
        self.path[p]
    }

    /// Returns `true` if position `p` is a depot occurrence.
    pub fn is_depot_at(&self, p: usize) -> bool {
        self.path[p] == 0
    }

    /// The full path, depot boundaries included.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Customer ids in visit order, trip boundaries filtered out.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.path.iter().copied().filter(|&id| id != 0).collect()
    }

    /// Number of customers served by this route.
    pub fn num_customers(&self) -> usize {
        self.path.iter().filter(|&&id| id != 0).count()
    }

    /// Departure time from the depot.
    pub fn departure(&self) -> f64 {
        self.departure
    }

    /// Arrival time at position `p`.
    pub fn arrival_time(&self, p: usize) -> f64 {
        self.arrivals[p]
    }

    /// Service start at position `p`: `max(arrival, ready)`.
    pub fn service_start(&self, data: &ProblemData, p: usize) -> f64 {
        self.arrivals[p].max(data.node(self.path[p]).ready_time())
    }

    /// Total demand of the trip containing position `p`.
    pub fn load_at(&self, p: usize) -> u32 {
        self.trip_loads[p]
    }

    /// Arrival time at the final depot (objective and merge input).
    pub fn latest_depot_arrival(&self) -> f64 {
        self.arrivals[self.arrivals.len() - 1]
    }

    /// Total travel distance over the path.
    pub fn total_distance(&self, data: &ProblemData) -> f64 {
        self.path
            .windows(2)
            .map(|w| data.distance(w[0], w[1]))
            .sum()
    }

    /// Checks whether customer `u` can be inserted at position `p`
    /// (`1 <= p < len`): trip capacity, `u`'s own due time, and the
    /// push-forward of every downstream position.
    pub fn can_insert_at(&self, data: &ProblemData, p: usize, u: usize) -> bool {
        debug_assert!(p >= 1 && p < self.path.len());
        if self.trip_loads[p] + data.node(u).demand() > data.capacity() {
            return false;
        }
        let arrival_u = self.arrival_of_inserted(data, p, u);
        if arrival_u > data.node(u).due_time() + EPS {
            return false;
        }
        let delta = self.push_forward_at(data, u, p);
        self.check_push_forward(data, delta, p)
    }

    /// Service-start delay at position `p` caused by inserting `u` there.
    ///
    /// May be negative when the detour is absorbed by waiting time.
    pub fn push_forward_at(&self, data: &ProblemData, u: usize, p: usize) -> f64 {
        let node_u = data.node(u);
        let arrival_u = self.arrival_of_inserted(data, p, u);
        let service_u = arrival_u.max(node_u.ready_time());
        let next = self.path[p];
        let new_arrival_next =
            service_u + node_u.service_time() + data.travel_time(u, next);
        let new_service_next = new_arrival_next.max(data.node(next).ready_time());
        new_service_next - self.service_start(data, p)
    }

    /// Propagates a service-start delay `delta` at position `from` through
    /// the rest of the route.
    ///
    /// At each later position the delay shrinks by the pre-existing waiting
    /// slack; once it reaches zero all remaining windows stay satisfied and
    /// the scan stops early.
    pub fn check_push_forward(&self, data: &ProblemData, delta: f64, from: usize) -> bool {
        let mut delta = delta;
        if self.service_start(data, from) + delta > self.due_at(data, from) + EPS {
            return false;
        }
        for r in (from + 1)..self.path.len() {
            let ready = data.node(self.path[r]).ready_time();
            let waiting = (ready - self.arrivals[r]).max(0.0);
            delta = (delta - waiting).max(0.0);
            if delta <= EPS {
                return true;
            }
            if self.service_start(data, r) + delta > self.due_at(data, r) + EPS {
                return false;
            }
        }
        true
    }

    /// Inserts customer `u` at position `p`, updating trip loads out to the
    /// nearest depot boundaries and arrival times forward until an update is
    /// a no-op.
    ///
    /// Callers must have confirmed [`Route::can_insert_at`].
    pub fn insert_at(&mut self, data: &ProblemData, p: usize, u: usize) {
        debug_assert!(p >= 1 && p < self.path.len());
        debug_assert!(u != 0, "trip boundaries are added with add_dummy_depot");
        let new_total = self.trip_loads[p] + data.node(u).demand();
        debug_assert!(new_total <= data.capacity());

        let arrival_u = self.arrival_of_inserted(data, p, u);
        self.path.insert(p, u);
        self.arrivals.insert(p, arrival_u);
        self.trip_loads.insert(p, new_total);
        self.update_trip_loads_around(p, new_total);
        self.propagate_from(data, p + 1);
    }

    /// Removes and returns the customer at position `p`; inverse of
    /// [`Route::insert_at`] with the same incremental update discipline.
    pub fn remove_at(&mut self, data: &ProblemData, p: usize) -> usize {
        debug_assert!(p >= 1 && p < self.path.len() - 1);
        debug_assert!(self.path[p] != 0, "cannot remove a trip boundary");
        let u = self.path[p];
        let new_total = self.trip_loads[p] - data.node(u).demand();

        self.path.remove(p);
        self.arrivals.remove(p);
        self.trip_loads.remove(p);
        // Position p now holds the removed node's successor, possibly the
        // depot closing the shrunk trip.
        self.update_trip_loads_around(p, new_total);
        self.propagate_from(data, p);
        u
    }

    /// Appends a trip boundary at the tail, letting the vehicle begin a
    /// fresh trip.
    pub fn add_dummy_depot(&mut self) {
        self.path.push(0);
        self.arrivals.push(self.latest_depot_arrival());
        self.trip_loads.push(0);
    }

    /// Removes the trailing trip boundary if the tail is two consecutive
    /// depot entries; idempotent no-op otherwise.
    pub fn remove_dummy_depot(&mut self) {
        let n = self.path.len();
        if n >= 2 && self.path[n - 1] == 0 && self.path[n - 2] == 0 {
            self.path.pop();
            self.arrivals.pop();
            self.trip_loads.pop();
        }
    }

    /// Collapses empty trips (consecutive depot entries) anywhere in the
    /// path, rebuilding the caches once. Dropping a zero-length depot stop
    /// only moves arrivals earlier, so feasibility is preserved.
    pub fn remove_empty_trips(&mut self, data: &ProblemData) {
        if !self.path.windows(2).any(|w| w == [0, 0]) {
            return;
        }
        let mut path = self.path.clone();
        path.dedup_by(|a, b| *a == 0 && *b == 0);
        if let Some(clean) = Route::from_path(data, path, self.departure) {
            *self = clean;
        }
    }

    /// Checks whether customer `u` can start a brand-new trailing trip
    /// (`..., depot, u, depot`).
    pub fn can_append_new_trip(&self, data: &ProblemData, u: usize) -> bool {
        let node_u = data.node(u);
        if node_u.demand() > data.capacity() {
            return false;
        }
        let arrival_u = self.new_trip_arrival(data, u);
        if arrival_u > node_u.due_time() + EPS {
            return false;
        }
        let back = arrival_u.max(node_u.ready_time())
            + node_u.service_time()
            + data.travel_time(u, 0);
        back <= data.depot().due_time() + EPS
    }

    /// Appends `u` as a new trailing trip. Callers must have confirmed
    /// [`Route::can_append_new_trip`].
    pub fn append_new_trip(&mut self, data: &ProblemData, u: usize) {
        let node_u = data.node(u);
        let arrival_u = self.new_trip_arrival(data, u);
        let back = arrival_u.max(node_u.ready_time())
            + node_u.service_time()
            + data.travel_time(u, 0);
        self.path.push(u);
        self.arrivals.push(arrival_u);
        self.trip_loads.push(node_u.demand());
        self.path.push(0);
        self.arrivals.push(back);
        self.trip_loads.push(node_u.demand());
    }

    /// Duration cost of opening a new trailing trip for `u`: how far the
    /// final depot arrival moves out.
    pub fn new_trip_extension(&self, data: &ProblemData, u: usize) -> f64 {
        let node_u = data.node(u);
        let arrival_u = self.new_trip_arrival(data, u);
        let back = arrival_u.max(node_u.ready_time())
            + node_u.service_time()
            + data.travel_time(u, 0);
        back - self.latest_depot_arrival()
    }

    fn new_trip_arrival(&self, data: &ProblemData, u: usize) -> f64 {
        let last = self.path.len() - 1;
        self.service_start(data, last) + data.depot().service_time() + data.travel_time(0, u)
    }

    /// Arrival time at `u` if it were inserted at position `p`.
    fn arrival_of_inserted(&self, data: &ProblemData, p: usize, u: usize) -> f64 {
        let prev = self.path[p - 1];
        self.service_start(data, p - 1)
            + data.node(prev).service_time()
            + data.travel_time(prev, u)
    }

    /// Recomputes arrival times from position `start` forward, stopping as
    /// soon as a recomputation leaves the cached value unchanged.
    fn propagate_from(&mut self, data: &ProblemData, start: usize) {
        for i in start..self.path.len() {
            let prev = self.path[i - 1];
            let arrival = self.service_start(data, i - 1)
                + data.node(prev).service_time()
                + data.travel_time(prev, self.path[i]);
            if (arrival - self.arrivals[i]).abs() <= EPS {
                break;
            }
            debug_assert!(
                arrival <= self.due_at(data, i) + EPS,
                "mutation violated a due time that was feasibility-checked"
            );
            self.arrivals[i] = arrival;
        }
    }

    /// Spreads a trip's new total load backward and forward from position
    /// `p` to its depot boundaries (exclusive backward, inclusive of `p`
    /// and the closing depot; `p` itself may be that closing depot).
    fn update_trip_loads_around(&mut self, p: usize, new_total: u32) {
        let mut i = p;
        while i > 0 {
            i -= 1;
            if self.path[i] == 0 {
                break;
            }
            self.trip_loads[i] = new_total;
        }
        let mut i = p;
        while i < self.path.len() {
            self.trip_loads[i] = new_total;
            if self.path[i] == 0 {
                break;
            }
            i += 1;
        }
    }

    fn due_at(&self, data: &ProblemData, p: usize) -> f64 {
        data.node(self.path[p]).due_time()
    }
}

fn simulate_arrivals(data: &ProblemData, path: &[usize], departure: f64) -> Option<Vec<f64>> {
    if departure > data.node(path[0]).due_time() + EPS {
        return None;
    }
    let mut arrivals = Vec::with_capacity(path.len());
    arrivals.push(departure);
    for i in 1..path.len() {
        let prev = data.node(path[i - 1]);
        let service_prev = arrivals[i - 1].max(prev.ready_time()) + prev.service_time();
        let arrival = service_prev + data.travel_time(path[i - 1], path[i]);
        if arrival > data.node(path[i]).due_time() + EPS {
            return None;
        }
        arrivals.push(arrival);
    }
    Some(arrivals)
}

fn compute_trip_loads(data: &ProblemData, path: &[usize]) -> Option<Vec<u32>> {
    let mut loads = vec![0u32; path.len()];
    let mut last_depot = 0;
    let mut sum = 0u32;
    for cur in 1..path.len() {
        if path[cur] == 0 {
            if sum > data.capacity() {
                return None;
            }
            for load in &mut loads[last_depot + 1..=cur] {
                *load = sum;
            }
            last_depot = cur;
            sum = 0;
        } else {
            sum += data.node(path[cur]).demand();
        }
    }
    Some(loads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use proptest::prelude::*;

    fn line_instance() -> ProblemData {
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 4, 0.0, 200.0, 10.0).expect("valid"),
            Node::new(2, 20.0, 0.0, 2, 50.0, 300.0, 10.0).expect("valid"),
            Node::new(3, 30.0, 0.0, 1, 0.0, 400.0, 10.0).expect("valid"),
            Node::new(4, 5.0, 0.0, 2, 0.0, 500.0, 10.0).expect("valid"),
            Node::new(5, 15.0, 0.0, 3, 0.0, 600.0, 10.0).expect("valid"),
        ];
        ProblemData::new(nodes, 7).expect("valid instance")
    }

    #[test]
    fn test_new_route_arithmetic() {
        let data = line_instance();
        let r = Route::new(&data, 1, 0.0);
        assert_eq!(r.path(), &[0, 1, 0]);
        assert!((r.arrival_time(1) - 10.0).abs() < 1e-10);
        // service ends at 20, back at depot at 30
        assert!((r.latest_depot_arrival() - 30.0).abs() < 1e-10);
        assert_eq!(r.load_at(1), 4);
        assert_eq!(r.load_at(2), 4);
        assert_eq!(r.load_at(0), 0);
    }

    #[test]
    fn test_waiting_at_ready_time() {
        let data = line_instance();
        let r = Route::new(&data, 2, 0.0);
        // arrive at 20, wait until ready 50
        assert!((r.arrival_time(1) - 20.0).abs() < 1e-10);
        assert!((r.service_start(&data, 1) - 50.0).abs() < 1e-10);
        // leave at 60, back at 80
        assert!((r.latest_depot_arrival() - 80.0).abs() < 1e-10);
    }

    #[test]
    fn test_insert_matches_rebuild() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        assert!(r.can_insert_at(&data, 2, 2));
        r.insert_at(&data, 2, 2);
        assert!(r.can_insert_at(&data, 3, 3));
        r.insert_at(&data, 3, 3);

        let rebuilt =
            Route::from_path(&data, vec![0, 1, 2, 3, 0], 0.0).expect("feasible path");
        assert_eq!(r.path(), rebuilt.path());
        for p in 0..r.len() {
            assert!((r.arrival_time(p) - rebuilt.arrival_time(p)).abs() < 1e-9);
            assert_eq!(r.load_at(p), rebuilt.load_at(p));
        }
    }

    #[test]
    fn test_insert_rejected_by_capacity() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        r.insert_at(&data, 2, 2);
        // trip load 6, capacity 7: customer 5 (demand 3) does not fit
        assert!(!r.can_insert_at(&data, 2, 5));
        // but customer 3 (demand 1) does
        assert!(r.can_insert_at(&data, 3, 3));
    }

    #[test]
    fn test_insert_rejected_by_due_time() {
        let nodes = vec![
            Node::depot(0.0, 0.0, 1000.0),
            Node::new(1, 10.0, 0.0, 1, 0.0, 15.0, 5.0).expect("valid"),
            Node::new(2, 50.0, 0.0, 1, 0.0, 20.0, 5.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 10).expect("valid instance");
        let r = Route::new(&data, 1, 0.0);
        // reaching customer 2 after serving 1 means arriving at 55 > due 20
        assert!(!r.can_insert_at(&data, 2, 2));
    }

    #[test]
    fn test_push_forward_absorbed_by_waiting() {
        let data = line_instance();
        // Route 0 -> 2 -> 0 waits 30 units at customer 2; the detour via
        // customer 4 is absorbed entirely by that slack.
        let r = Route::new(&data, 2, 0.0);
        let delta = r.push_forward_at(&data, 4, 1);
        assert!(delta.abs() < 1e-10, "detour fits inside the waiting slack");
        assert!(r.can_insert_at(&data, 1, 4));
    }

    #[test]
    fn test_remove_inverts_insert() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        let baseline = r.clone();
        r.insert_at(&data, 2, 3);
        let removed = r.remove_at(&data, 2);
        assert_eq!(removed, 3);
        assert_eq!(r.path(), baseline.path());
        for p in 0..r.len() {
            assert!((r.arrival_time(p) - baseline.arrival_time(p)).abs() < 1e-9);
            assert_eq!(r.load_at(p), baseline.load_at(p));
        }
    }

    #[test]
    fn test_remove_sole_customer_of_first_trip() {
        let data = line_instance();
        let mut r = Route::from_path(&data, vec![0, 1, 0, 4, 0], 0.0).expect("feasible path");
        let removed = r.remove_at(&data, 1);
        assert_eq!(removed, 1);
        assert_eq!(r.path(), &[0, 0, 4, 0]);
        // shrunk first trip is empty; the second trip keeps its own load
        assert_eq!(r.load_at(1), 0);
        assert_eq!(r.load_at(2), 2);
        assert_eq!(r.load_at(3), 2);
        r.remove_empty_trips(&data);
        assert_eq!(r.path(), &[0, 4, 0]);
        let rebuilt = Route::from_path(&data, vec![0, 4, 0], 0.0).expect("feasible path");
        for p in 0..r.len() {
            assert!((r.arrival_time(p) - rebuilt.arrival_time(p)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_trip_loads_multi_trip() {
        let nodes = vec![
            Node::depot(0.0, 0.0, 10_000.0),
            Node::new(1, 1.0, 0.0, 1, 0.0, 10_000.0, 0.0).expect("valid"),
            Node::new(2, 2.0, 0.0, 2, 0.0, 10_000.0, 0.0).expect("valid"),
            Node::new(3, 3.0, 0.0, 1, 0.0, 10_000.0, 0.0).expect("valid"),
            Node::new(4, 4.0, 0.0, 2, 0.0, 10_000.0, 0.0).expect("valid"),
            Node::new(5, 5.0, 0.0, 3, 0.0, 10_000.0, 0.0).expect("valid"),
        ];
        let data = ProblemData::new(nodes, 5).expect("valid instance");
        let r = Route::from_path(&data, vec![0, 1, 2, 3, 0, 4, 5, 0], 0.0)
            .expect("feasible path");
        let loads: Vec<u32> = (0..r.len()).map(|p| r.load_at(p)).collect();
        assert_eq!(loads, vec![0, 4, 4, 4, 4, 5, 5, 5]);
    }

    #[test]
    fn test_from_path_rejects_overloaded_trip() {
        let data = line_instance();
        // demands 4 + 2 + 2 = 8 > capacity 7 in a single trip
        assert!(Route::from_path(&data, vec![0, 1, 2, 4, 0], 0.0).is_none());
        // split across two trips it fits
        assert!(Route::from_path(&data, vec![0, 1, 2, 0, 4, 0], 0.0).is_some());
    }

    #[test]
    fn test_dummy_depot_round_trip() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        let baseline = r.clone();
        r.add_dummy_depot();
        assert_eq!(r.path(), &[0, 1, 0, 0]);
        assert_eq!(r.load_at(3), 0);
        r.remove_dummy_depot();
        assert_eq!(r, baseline);
        // removing again is a no-op
        r.remove_dummy_depot();
        assert_eq!(r, baseline);
    }

    #[test]
    fn test_insert_after_dummy_depot_starts_fresh_trip() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        r.insert_at(&data, 2, 2);
        r.add_dummy_depot();
        // new trip has zero load, so capacity is fresh
        assert_eq!(r.load_at(4), 0);
        assert!(r.can_insert_at(&data, 4, 5));
        r.insert_at(&data, 4, 5);
        assert_eq!(r.path(), &[0, 1, 2, 0, 5, 0]);
        assert_eq!(r.load_at(2), 6);
        assert_eq!(r.load_at(4), 3);
    }

    #[test]
    fn test_append_new_trip() {
        let data = line_instance();
        let mut r = Route::new(&data, 1, 0.0);
        assert!(r.can_append_new_trip(&data, 4));
        r.append_new_trip(&data, 4);
        assert_eq!(r.path(), &[0, 1, 0, 4, 0]);
        assert_eq!(r.load_at(3), 2);
        let rebuilt =
            Route::from_path(&data, vec![0, 1, 0, 4, 0], 0.0).expect("feasible path");
        assert!((r.latest_depot_arrival() - rebuilt.latest_depot_arrival()).abs() < 1e-9);
    }

    #[test]
    fn test_merged_routes() {
        let data = line_instance();
        let l = Route::new(&data, 1, 0.0);
        let m = Route::new(&data, 4, 40.0);
        let merged = Route::merged(&data, &l, &m).expect("compatible routes");
        assert_eq!(merged.path(), &[0, 1, 0, 4, 0]);
        assert!((merged.departure() - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_total_distance() {
        let data = line_instance();
        let r = Route::from_path(&data, vec![0, 1, 2, 0], 0.0).expect("feasible path");
        // 0->10->20->0 on a line
        assert!((r.total_distance(&data) - 40.0).abs() < 1e-10);
    }

    fn arb_instance() -> impl Strategy<Value = (ProblemData, Vec<usize>)> {
        (4usize..9)
            .prop_flat_map(|n| {
                let customers = proptest::collection::vec(
                    (1.0f64..60.0, 1.0f64..60.0, 1u32..6, 0.0f64..300.0, 5.0f64..120.0),
                    n,
                );
                (Just(n), customers)
            })
            .prop_map(|(n, customers)| {
                let mut nodes = vec![Node::depot(0.0, 0.0, 2000.0)];
                for (i, (x, y, demand, ready, width)) in
                    customers.into_iter().enumerate()
                {
                    nodes.push(
                        Node::new(i + 1, x, y, demand, ready, ready + width + 200.0, 5.0)
                            .expect("valid window"),
                    );
                }
                let data = ProblemData::new(nodes, 12).expect("valid instance");
                let ids = (1..=n).collect::<Vec<_>>();
                (data, ids)
            })
    }

    proptest! {
        /// The incremental insertion check must agree with a full
        /// rebuild-and-simulate oracle on the hypothetical path.
        #[test]
        fn prop_push_forward_matches_full_simulation((data, ids) in arb_instance()) {
            let mut route = Route::new(&data, ids[0], 0.0);
            for &u in &ids[1..] {
                for p in 1..route.len() {
                    let fast = route.can_insert_at(&data, p, u);
                    let mut hypothetical = route.path().to_vec();
                    hypothetical.insert(p, u);
                    let oracle =
                        Route::from_path(&data, hypothetical, route.departure()).is_some();
                    prop_assert_eq!(fast, oracle, "position {} customer {}", p, u);
                }
                // grow by first feasible position, opening a new trip if none
                if let Some(p) = (1..route.len()).find(|&p| route.can_insert_at(&data, p, u)) {
                    route.insert_at(&data, p, u);
                } else if route.can_append_new_trip(&data, u) {
                    route.append_new_trip(&data, u);
                }
            }
            // cached arrivals must match a from-scratch rebuild
            let rebuilt = Route::from_path(&data, route.path().to_vec(), route.departure())
                .expect("grown route stays feasible");
            for p in 0..route.len() {
                prop_assert!((route.arrival_time(p) - rebuilt.arrival_time(p)).abs() < 1e-6);
                prop_assert_eq!(route.load_at(p), rebuilt.load_at(p));
            }
        }
    }
}
