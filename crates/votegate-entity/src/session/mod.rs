//! Voting session entities.

pub mod model;
pub mod status;

pub use model::VotingSession;
pub use status::SessionStatus;
