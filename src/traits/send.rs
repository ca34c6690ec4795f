//! SendRequest trait for executing built requests.

use async_trait::async_trait;

use crate::error::Result;

/// Send a fully configured request.
///
/// Implemented by [`RestRequest`](crate::RestRequest) and
/// [`SoapRequest`](crate::SoapRequest). The request is borrowed, so the
/// same builder can be sent again.
#[async_trait]
pub trait SendRequest {
    /// What the server answered with.
    type Output;

    /// Send the request and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is incomplete or the transport fails.
    async fn send_request(&self) -> Result<Self::Output>;
}
