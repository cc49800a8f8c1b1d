//! Identity store implementations that live outside the database crate.

pub mod memory;

pub use memory::MemoryIdentityStore;
