//! Multi-trip vehicle routing with time windows (MTVRPTW).
//!
//! A heuristic solver for the vehicle routing problem in which every
//! customer has a hard service time window and each vehicle may run
//! several depot-to-depot trips. The primary objective is the number of
//! vehicles; total travel distance breaks ties.
//!
//! The engine has three layers:
//!
//! - **Construction** ([`constructive`]): multi-trip Solomon I1 insertion
//!   with a (seed ordering x weight tuple) multi-start, and a
//!   cluster-route-merge scheme that partitions customers by due time,
//!   routes each partition, and splices compatible routes into multi-trip
//!   routes via a bounded depth-first search over departure times.
//! - **Local search** ([`local_search`]): Relocate, Exchange, Or-opt, and
//!   2-opt* operators built on the push-forward feasibility machinery of
//!   [`models::Route`].
//! - **Iterated search** ([`search`]): intensify / weak perturb / strong
//!   perturb cycles with restart credit on every vehicle retired.
//!
//! # Examples
//!
//! ```
//! use multitrip::{construct, improve, validate};
//! use multitrip::config::{Budget, SearchConfig};
//! use multitrip::models::{Node, ProblemData};
//!
//! let nodes = vec![
//!     Node::depot(35.0, 35.0, 1000.0),
//!     Node::new(1, 41.0, 49.0, 10, 0.0, 900.0, 10.0).unwrap(),
//!     Node::new(2, 22.0, 75.0, 7, 100.0, 400.0, 10.0).unwrap(),
//!     Node::new(3, 55.0, 20.0, 13, 0.0, 200.0, 10.0).unwrap(),
//! ];
//! let data = ProblemData::new(nodes, 40).unwrap();
//! let config = SearchConfig::default();
//!
//! let solution = construct(&data, &config);
//! assert!(validate(&solution, &data));
//!
//! let budget = Budget { iterations: 10, intensification: 3 };
//! let improved = improve(solution, &data, &budget, &config);
//! assert!(validate(&improved, &data));
//! ```

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod search;

pub use config::{Budget, InsertionWeights, SearchConfig};
pub use error::ModelError;
pub use models::{Node, ProblemData, Route, Solution, TimeWindow};

/// Builds an initial solution: the better of the multi-start insertion
/// construction and the cluster-route-merge construction under the
/// acceptance rule.
pub fn construct(data: &ProblemData, config: &SearchConfig) -> Solution {
    let insertion = constructive::multi_start(data, config);
    let clustered = constructive::cluster_route_merge(data, config);
    if clustered.is_better_than(&insertion, data) {
        clustered
    } else {
        insertion
    }
}

/// Runs the iterated-search improvement stage on an existing solution.
pub fn improve(
    solution: Solution,
    data: &ProblemData,
    budget: &Budget,
    config: &SearchConfig,
) -> Solution {
    search::improve(solution, data, budget, config)
}

/// Checks coverage and per-route feasibility by full re-simulation.
pub fn validate(solution: &Solution, data: &ProblemData) -> bool {
    evaluation::is_feasible(data, solution)
}

/// Convenience entry point: construct, then improve.
pub fn solve(data: &ProblemData, config: &SearchConfig, budget: &Budget) -> Solution {
    improve(construct(data, config), data, budget, config)
}
