//! Instance validation errors.

/// Errors raised while building a [`ProblemData`](crate::models::ProblemData)
/// instance.
///
/// Search-time failures (no feasible insertion, no improving move) are never
/// errors; operators signal them with `Option` or partial results.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An instance needs the depot plus at least one customer.
    #[error("instance must contain a depot and at least one customer")]
    TooFewNodes,

    /// Node ids must equal their index in the node table.
    #[error("node ids must be sequential from 0, found id {found} at index {index}")]
    NonSequentialId {
        /// Index in the node slice.
        index: usize,
        /// The id found there.
        found: usize,
    },

    /// The depot (id 0) must have zero demand.
    #[error("depot must have zero demand, found {0}")]
    DepotDemand(u32),

    /// A single customer's demand can never fit in a vehicle.
    #[error("customer {id} demand {demand} exceeds vehicle capacity {capacity}")]
    DemandExceedsCapacity {
        /// Customer id.
        id: usize,
        /// Customer demand.
        demand: u32,
        /// Vehicle capacity.
        capacity: u32,
    },

    /// An explicit travel matrix whose size does not match the node table.
    #[error("travel matrix covers {matrix} nodes but the instance has {nodes}")]
    MatrixSizeMismatch {
        /// Matrix dimension.
        matrix: usize,
        /// Node count.
        nodes: usize,
    },
}
