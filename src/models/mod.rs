//! Core data model: nodes, instance data, routes, and solutions.

mod node;
mod problem;
mod route;
mod solution;

pub use node::{Node, TimeWindow};
pub use problem::ProblemData;
pub use route::Route;
pub use solution::Solution;

pub(crate) use route::EPS;
