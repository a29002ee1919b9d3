//! Client library for the Vikmo dealer sales backend.
//!
//! This crate provides the authenticated API client used by Vikmo
//! frontends: bearer credentials are attached to every request, a 401
//! is recovered transparently through a one-shot refresh-and-retry
//! protocol, and a background keepalive loop renews the session and
//! reports when it can no longer be sustained.
//!
//! The client is resource-agnostic: generic `get`/`post`/`put`
//! operations return a uniform [`ApiOutcome`] value and pass response
//! bodies through untouched, with typed models available for the
//! backend's records.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiOutcome, RefreshError};
pub use auth::{
    CredentialStore, KeepaliveHandle, KeyringTokenStorage, MemoryTokenStorage, TokenStorage,
};
pub use config::Config;
