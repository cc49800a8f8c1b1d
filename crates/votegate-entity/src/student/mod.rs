//! Eligible-requester registry entities.

pub mod model;

pub use model::Student;
