//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure for the authentication core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Auth event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that `core-auth` depends on.
//! It establishes the logging conventions, the fail-fast configuration
//! builder, and the event broadcasting used to observe login and logout
//! outcomes without coupling observers to error propagation.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
