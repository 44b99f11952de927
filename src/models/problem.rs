//! Problem instance data.

use crate::distance::TravelMatrix;
use crate::error::ModelError;
use crate::models::Node;

/// Read-only MTVRPTW instance data: the node table, travel matrix, vehicle
/// capacity, and precomputed latest depot departure times.
///
/// Built once and passed by reference everywhere; routes refer to nodes by
/// index into this table, so deep-copied solutions never alias each other.
///
/// # Examples
///
/// ```
/// use multitrip::models::{Node, ProblemData};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0, 1000.0),
///     Node::new(1, 3.0, 4.0, 10, 0.0, 100.0, 5.0).unwrap(),
///     Node::new(2, 6.0, 8.0, 20, 0.0, 200.0, 5.0).unwrap(),
/// ];
/// let data = ProblemData::new(nodes, 50).unwrap();
/// assert_eq!(data.num_customers(), 2);
/// assert!((data.distance(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(data.travel_time(0, 1), data.distance(0, 1));
/// ```
#[derive(Debug, Clone)]
pub struct ProblemData {
    nodes: Vec<Node>,
    travel: TravelMatrix,
    capacity: u32,
    latest_departures: Vec<f64>,
}

impl ProblemData {
    /// Builds a validated instance from a node table (index 0 = depot) and
    /// the homogeneous vehicle capacity.
    ///
    /// Validation: at least depot + one customer, ids sequential, depot has
    /// zero demand, and no single demand exceeds the capacity.
    pub fn new(nodes: Vec<Node>, capacity: u32) -> Result<Self, ModelError> {
        if nodes.len() < 2 {
            return Err(ModelError::TooFewNodes);
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.id() != index {
                return Err(ModelError::NonSequentialId {
                    index,
                    found: node.id(),
                });
            }
            if node.demand() > capacity {
                return Err(ModelError::DemandExceedsCapacity {
                    id: node.id(),
                    demand: node.demand(),
                    capacity,
                });
            }
        }
        if nodes[0].demand() != 0 {
            return Err(ModelError::DepotDemand(nodes[0].demand()));
        }

        let travel = TravelMatrix::from_nodes(&nodes);
        let latest_departures = Self::compute_latest_departures(&nodes, &travel);
        Ok(Self {
            nodes,
            travel,
            capacity,
            latest_departures,
        })
    }

    /// Like [`ProblemData::new`] but with an explicit travel matrix instead
    /// of Euclidean distances.
    pub fn with_matrix(
        nodes: Vec<Node>,
        travel: TravelMatrix,
        capacity: u32,
    ) -> Result<Self, ModelError> {
        if travel.size() != nodes.len() {
            return Err(ModelError::MatrixSizeMismatch {
                matrix: travel.size(),
                nodes: nodes.len(),
            });
        }
        let mut data = Self::new(nodes, capacity)?;
        data.latest_departures = Self::compute_latest_departures(&data.nodes, &travel);
        data.travel = travel;
        Ok(data)
    }

    /// Latest time a vehicle can leave the depot and still serve node `i`
    /// within its window and return before the depot closes.
    fn compute_latest_departures(nodes: &[Node], travel: &TravelMatrix) -> Vec<f64> {
        let horizon = nodes[0].due_time();
        nodes
            .iter()
            .map(|n| {
                let t = travel.get(0, n.id());
                (n.due_time() - t).min(horizon - 2.0 * t - n.service_time())
            })
            .collect()
    }

    /// The depot node.
    pub fn depot(&self) -> &Node {
        &self.nodes[0]
    }

    /// The node with the given id.
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// All nodes, depot first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of customers (excluding the depot).
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Ids of all demand nodes (every node except the depot).
    pub fn customer_ids(&self) -> Vec<usize> {
        (1..self.nodes.len()).collect()
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> u32 {
        self.nodes.iter().map(Node::demand).sum()
    }

    /// Homogeneous vehicle capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Travel distance between two nodes.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.travel.get(from, to)
    }

    /// Travel time between two nodes (same metric as distance).
    pub fn travel_time(&self, from: usize, to: usize) -> f64 {
        self.travel.get(from, to)
    }

    /// Distance from the depot to the given node.
    pub fn distance_from_depot(&self, id: usize) -> f64 {
        self.travel.get(0, id)
    }

    /// Latest depot departure that still serves node `id` feasibly.
    pub fn latest_departure(&self, id: usize) -> f64 {
        self.latest_departures[id]
    }

    /// Latest depot departure that still serves every node in `ids`.
    ///
    /// An empty set imposes no constraint and yields `f64::INFINITY`.
    pub fn latest_departure_over(&self, ids: impl IntoIterator<Item = usize>) -> f64 {
        ids.into_iter()
            .map(|id| self.latest_departures[id])
            .fold(f64::INFINITY, f64::min)
    }
}
