//! # Host Bridge Traits
//!
//! Capability traits that the host application implements on behalf of the
//! authentication core.
//!
//! ## Overview
//!
//! The core never talks to an identity provider, a browser window, or a log
//! pipeline directly. Each of those is a capability injected by the host
//! through one of the traits below, which keeps the core deterministic under
//! test and lets every platform plug in its own provider SDK.
//!
//! ## Traits
//!
//! ### Identity
//! - [`IdentityClient`](identity::IdentityClient) - Opaque provider client
//!   (token cache, popup UI, network calls to the authorization server)
//! - [`IdentityClientFactory`](identity::IdentityClientFactory) - Builds a
//!   client from a [`ClientConfiguration`](identity::ClientConfiguration)
//!
//! ### Environment
//! - [`LocationProvider`](location::LocationProvider) - Current page URL, used
//!   to derive the default redirect URI
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Provider failures are reported as [`IdentityError`](identity::IdentityError),
//! a tagged variant that the core preserves verbatim as the cause of its own
//! errors. Log sink failures use [`BridgeError`](error::BridgeError).
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync`. On `wasm32` the
//! bounds are dropped (see [`platform`]) because browser objects are not
//! thread-safe.
//!
//! ## Examples
//!
//! ### Implementing LocationProvider
//!
//! ```
//! use bridge_traits::location::LocationProvider;
//!
//! struct WindowLocation {
//!     href: String,
//! }
//!
//! impl LocationProvider for WindowLocation {
//!     fn current_url(&self) -> Option<String> {
//!         Some(self.href.clone())
//!     }
//! }
//! ```

pub mod error;
pub mod identity;
pub mod location;
pub mod log;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use identity::{
    Account, CacheLocation, ClientConfiguration, IdentityClient, IdentityClientFactory,
    IdentityError, PopupTokenRequest, Prompt, SilentTokenRequest, TokenResponse,
};
pub use location::{LocationProvider, StaticLocation};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
