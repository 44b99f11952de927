//! Search orchestration.

pub mod ils;

pub use ils::improve;
