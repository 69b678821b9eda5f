//! Workspace placeholder crate.
//!
//! Host glue (plugin registration, CLI bindings) can depend on
//! `msauth-workspace` alone and reach every member crate through the
//! re-exports below instead of wiring each crate individually.

pub use bridge_traits;
pub use core_auth;
pub use core_runtime;

pub use core_auth::{AuthError, AuthManager, AuthResult, LoginOptions, LoginRequest, SessionConfig};
