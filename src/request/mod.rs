//! Outbound request builders.

mod rest;
mod soap;

pub use rest::{HttpMethod, RestRequest, DEFAULT_CONTENT_TYPE};
pub use soap::{SoapMessage, SoapRequest, SoapVersion};
