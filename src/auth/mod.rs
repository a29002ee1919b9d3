//! Authentication module for credential storage and session keepalive.
//!
//! This module provides:
//! - `CredentialStore`: access/refresh token persistence with pluggable
//!   backing storage (OS keychain in production, in-memory for tests)
//! - `KeepaliveHandle`: control over the background session refresh loop
//!
//! Tokens survive restarts until explicit logout or a failed refresh.

pub mod credentials;
pub mod keepalive;

pub use credentials::{CredentialStore, KeyringTokenStorage, MemoryTokenStorage, TokenStorage};
pub use keepalive::KeepaliveHandle;
