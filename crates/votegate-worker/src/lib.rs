//! Background promotion for VoteGate.
//!
//! The runner drives [`PromotionCycle`](votegate_admission::PromotionCycle)
//! on a fixed interval, optionally waking early when a slot is released.
//! Polling is what keeps the queue moving; release events only shorten
//! the wait.

pub mod runner;
pub mod wake;

pub use runner::PromotionRunner;
