//! Collaborator traits the admission core depends on.

pub mod identity;

pub use identity::IdentityStore;
