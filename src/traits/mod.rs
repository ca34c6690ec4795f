//! Trait definitions for conductor operations.
//!
//! Requests, responses and mock API clients implement these traits so
//! that the harness can swap implementations behind them.

mod api_mock;
mod configurable;
mod send;

pub use api_mock::ApiMock;
pub use configurable::ConfigurableHttpEntity;
pub use send::SendRequest;
