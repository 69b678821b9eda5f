//! # Auth Event Bus
//!
//! Broadcasts login and logout outcomes using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The orchestrator reports what happened (a login started, a silent attempt
//! fell back, a stage failed) by emitting [`AuthEvent`]s. Emission is
//! fire-and-forget: it never changes the value or error an operation returns,
//! so observers and callers can be tested independently.
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, EventBus};
//!
//! let event_bus = EventBus::new(100);
//! let event = AuthEvent::SignedIn {
//!     mode: "silent".to_string(),
//!     correlation_id: "6f1c...".to_string(),
//! };
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, RecvError};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match receiver.recv().await {
//!             Ok(event) => println!("{}: {:?}", event.description(), event),
//!             Err(RecvError::Lagged(n)) => eprintln!("Missed {} events", n),
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n`
//!   events. Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped. Treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

/// Events describing login and logout progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A login operation started.
    SigningIn {
        /// Login mode (`fallback`, `interactive`, `silent`).
        mode: String,
        /// Correlation id shared by every provider call of the operation.
        correlation_id: String,
    },
    /// Silent acquisition failed. Inside a fallback login this is followed
    /// by an interactive attempt regardless of `kind`.
    SilentAcquisitionFailed {
        correlation_id: String,
        /// Provider failure tag (e.g. `no_account`, `interaction_required`).
        kind: String,
        /// Human-readable failure message.
        message: String,
    },
    /// Tokens were acquired.
    SignedIn { mode: String, correlation_id: String },
    /// A provider logout flow was started.
    SigningOut { correlation_id: String },
    /// The provider logout flow completed.
    SignedOut { correlation_id: String },
    /// An operation failed and the error was returned to the caller.
    AuthError {
        /// Operation name (`login`, `login_silently`, `logout`, ...).
        operation: String,
        correlation_id: Option<String>,
        /// Failure tag of the underlying cause, or the core's own condition.
        kind: String,
        /// Human-readable error message.
        message: String,
        /// Whether retrying (possibly interactively) could succeed.
        recoverable: bool,
    },
}

impl AuthEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn { .. } => "Authentication in progress",
            AuthEvent::SilentAcquisitionFailed { .. } => "Silent token acquisition failed",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SigningOut { .. } => "Sign-out in progress",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            AuthEvent::AuthError { .. } => EventSeverity::Error,
            AuthEvent::SilentAcquisitionFailed { .. } => EventSeverity::Warning,
            AuthEvent::SignedIn { .. } | AuthEvent::SignedOut { .. } => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// Correlation id of the operation that produced the event, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            AuthEvent::SigningIn { correlation_id, .. }
            | AuthEvent::SilentAcquisitionFailed { correlation_id, .. }
            | AuthEvent::SignedIn { correlation_id, .. }
            | AuthEvent::SigningOut { correlation_id }
            | AuthEvent::SignedOut { correlation_id } => Some(correlation_id),
            AuthEvent::AuthError { correlation_id, .. } => correlation_id.as_deref(),
        }
    }
}

/// Central event bus for broadcasting auth events.
///
/// Cloning the bus is cheap; all clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. [`CoreConfig`](crate::config::CoreConfig)
    /// rejects a zero buffer size before a bus is built from it.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: AuthEvent) -> Result<usize, SendError<AuthEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&AuthEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventSeverity, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let errors = EventStream::new(event_bus.subscribe())
///     .filter(|event| event.severity() == EventSeverity::Error);
/// ```
pub struct EventStream {
    receiver: Receiver<AuthEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<AuthEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AuthEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    pub async fn recv(&mut self) -> Result<AuthEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<AuthEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn matches(&self, event: &AuthEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}
