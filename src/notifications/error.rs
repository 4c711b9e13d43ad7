//! Event Bus Error Types

use std::fmt;

/// Result type for event bus operations
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur on the event bus
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Subscriber already exists
    SubscriberAlreadyExists(String),

    /// Subscriber not found
    SubscriberNotFound(String),

    /// A subscriber returned an error for an event
    DeliveryFailed {
        subscriber_id: String,
        error: String,
    },

    /// Bus is shutting down
    SystemShutdown,

    /// Generic error
    Generic(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::SubscriberAlreadyExists(id) => {
                write!(f, "Subscriber '{}' already exists", id)
            }
            NotificationError::SubscriberNotFound(id) => {
                write!(f, "Subscriber '{}' not found", id)
            }
            NotificationError::DeliveryFailed { subscriber_id, error } => {
                write!(f, "Failed to deliver event to '{}': {}", subscriber_id, error)
            }
            NotificationError::SystemShutdown => {
                write!(f, "Event bus is shutting down")
            }
            NotificationError::Generic(msg) => {
                write!(f, "Notification error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl NotificationError {
    pub fn subscriber_already_exists<S: Into<String>>(id: S) -> Self {
        Self::SubscriberAlreadyExists(id.into())
    }

    pub fn subscriber_not_found<S: Into<String>>(id: S) -> Self {
        Self::SubscriberNotFound(id.into())
    }

    pub fn delivery_failed<S: Into<String>>(subscriber_id: S, error: S) -> Self {
        Self::DeliveryFailed {
            subscriber_id: subscriber_id.into(),
            error: error.into(),
        }
    }

    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}
