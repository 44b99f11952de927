//! Construction heuristics: Solomon I1 insertion and cluster-route-merge.

pub mod cluster;
pub mod insertion;

pub use cluster::cluster_route_merge;
pub use insertion::{fleet_limited, multi_start, solomon_i1, SeedOrdering};
