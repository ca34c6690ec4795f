//! Values exchanged with a mock API.

mod recorded;
mod response;

pub use recorded::{RecordedHeaders, RecordedRequests};
pub use response::Response;
