//! # Authentication Module
//!
//! Login and logout over a host-provided OAuth 2.0 / OpenID Connect client.
//!
//! ## Overview
//!
//! The provider client (token cache, popup UI, protocol exchanges) lives
//! behind [`bridge_traits::IdentityClient`]. This crate decides how it is
//! configured and in which order it is called:
//!
//! - [`SessionContextFactory`] derives the authority and redirect URI,
//!   pins the cache to durable storage and initializes the client.
//! - [`TokenAcquisitionOrchestrator`] runs silent acquisition, falls back to
//!   the interactive flow once, and guards logout.
//! - [`AuthManager`] ties both together per call for host glue.
//!
//! ## Features
//!
//! - Silent-then-interactive login with a single fallback step
//! - Injectable cached-account selection
//! - Per-operation correlation ids on every provider request and event
//! - Auth event emission for observers

pub mod context;
pub mod error;
pub mod manager;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod test_support;

pub use context::{SessionContext, SessionContextFactory};
pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use orchestrator::TokenAcquisitionOrchestrator;
pub use types::{
    AccountSelection, AuthResult, LoginMode, LoginOptions, LoginRequest, SessionConfig,
};
