//! # votegate-client
//!
//! Client side of the VoteGate queue: a thin HTTP client for the join,
//! heartbeat, and leave endpoints, and a poller that heartbeats on a fixed
//! cadence and publishes the last-known standing through a watch channel.

pub mod error;
pub mod http;
pub mod poller;
pub mod status;

pub use error::{ClientError, ClientResult};
pub use http::QueueClient;
pub use poller::QueuePoller;
pub use status::ClientStatus;
