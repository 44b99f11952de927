//! Solution feasibility checking.

mod validate;

pub use validate::{is_feasible, validate, Violation};
