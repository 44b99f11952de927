//! Dense travel-time matrix.

use crate::models::Node;

/// A dense n×n travel matrix stored in row-major order.
///
/// In this domain distance and travel time are the same metric, so a single
/// matrix serves both lookups.
///
/// # Examples
///
/// ```
/// use multitrip::models::Node;
/// use multitrip::distance::TravelMatrix;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0, 1000.0),
///     Node::new(1, 3.0, 4.0, 10, 0.0, 100.0, 5.0).unwrap(),
///     Node::new(2, 6.0, 8.0, 20, 0.0, 100.0, 5.0).unwrap(),
/// ];
/// let tm = TravelMatrix::from_nodes(&nodes);
/// assert!((tm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(tm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    data: Vec<f64>,
    size: usize,
}

impl TravelMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean travel matrix from node coordinates.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let n = nodes.len();
        let mut tm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = nodes[i].distance_to(&nodes[j]);
                tm.set(i, j, d);
                tm.set(j, i, d);
            }
        }
        tm
    }

    /// Creates a matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Travel time (== distance) from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the entry from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, value: f64) {
        self.data[from * self.size + to] = value;
    }

    /// Number of nodes covered by this matrix.
    pub fn size(&self) -> usize {
        self.size
    }
}
