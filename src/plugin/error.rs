//! Plugin Error Types

use thiserror::Error;
use crate::mailer::MailError;
use crate::notifications::NotificationError;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration rejected or missing
    #[error("Plugin configuration error: {message}")]
    ConfigurationError { message: String },

    /// The host provides no email sender
    #[error("Email sender is not available")]
    SenderUnavailable,

    /// The email sender failed
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(#[from] MailError),

    /// Event bus refused a (un)subscription
    #[error("Event subscription error: {0}")]
    Subscription(#[from] NotificationError),

    /// Report generation aborted unexpectedly
    #[error("Report generation failed: {message}")]
    ReportFailed { message: String },
}

impl PluginError {
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    pub fn report_failed<S: Into<String>>(message: S) -> Self {
        Self::ReportFailed { message: message.into() }
    }
}
