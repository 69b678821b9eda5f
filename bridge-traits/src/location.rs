//! Current Location Abstraction
//!
//! The default redirect URI is derived from the page the host is running on.
//! Hosts expose that ambient state through [`LocationProvider`] so the core
//! has no global dependency on a browser window.

use crate::platform::PlatformSendSync;

/// Source of the current page URL.
pub trait LocationProvider: PlatformSendSync {
    /// Full current URL including any query string or fragment, if known
    fn current_url(&self) -> Option<String>;
}

/// Location provider returning a fixed URL.
///
/// Useful for desktop hosts with a registered loopback redirect and for tests.
///
/// # Example
///
/// ```
/// use bridge_traits::location::{LocationProvider, StaticLocation};
///
/// let location = StaticLocation::new("http://localhost:3000/app?tab=1");
/// assert_eq!(
///     location.current_url().as_deref(),
///     Some("http://localhost:3000/app?tab=1")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocation {
    url: String,
}

impl StaticLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl LocationProvider for StaticLocation {
    fn current_url(&self) -> Option<String> {
        Some(self.url.clone())
    }
}
