//! REST API client module for the Vikmo backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! dealer/order management API. Requests carry a JWT bearer access
//! token when one is stored; a 401 response triggers a single refresh
//! of the access token followed by one retry of the original request.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiOutcome};
pub use error::RefreshError;
