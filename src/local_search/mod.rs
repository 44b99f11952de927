//! Neighborhood operators over the push-forward machinery.

pub mod exchange;
pub mod or_opt;
pub mod relocate;
pub mod two_opt_star;
