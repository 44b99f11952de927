//! Travel-time matrix shared by all routing components.

mod matrix;

pub use matrix::TravelMatrix;
