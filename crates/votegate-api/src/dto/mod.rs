//! Data transfer objects for request/response serialization.

pub mod request;
pub mod response;

pub use request::{JoinQueueRequest, TokenRequest};
pub use response::{
    ApiResponse, HealthResponse, HeartbeatResponse, JoinQueueResponse, LeaveResponse,
    ManageResponse, SessionStatusResponse, StatusResponse,
};
