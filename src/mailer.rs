//! Email Delivery
//!
//! The host owns actual mail transport. Reports hand an [`Email`] to whatever
//! [`EmailSender`] the host provides; two local senders are included for the
//! command line tool.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use log::{debug, info};

/// Errors raised while delivering a message
#[derive(Error, Debug)]
pub enum MailError {
    #[error("message has no recipients")]
    NoRecipients,

    #[error("failed to write message to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mail transport error: {message}")]
    Transport { message: String },
}

impl MailError {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport { message: message.into() }
    }
}

/// Outbound message with a markdown body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub subject: String,
    pub markdown: String,
}

impl Email {
    /// Render headers and body as a plain text message
    pub fn to_message_text(&self) -> String {
        format!(
            "To: {}\nSubject: {}\n\n{}\n",
            self.to.join(", "),
            self.subject,
            self.markdown
        )
    }
}

/// Sends email on behalf of plugins
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailError>;
}

/// Writes each message to standard output
#[derive(Debug, Default)]
pub struct StdoutMailer;

#[async_trait]
impl EmailSender for StdoutMailer {
    async fn send_email(&self, email: Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        println!("{}", email.to_message_text());
        Ok(())
    }
}

/// Stores each message as a file in an outbox directory
#[derive(Debug)]
pub struct OutboxMailer {
    directory: PathBuf,
    sequence: AtomicU64,
}

impl OutboxMailer {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    fn next_path(&self) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        self.directory.join(format!("{}-{:04}.md", stamp, sequence))
    }
}

#[async_trait]
impl EmailSender for OutboxMailer {
    async fn send_email(&self, email: Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| MailError::Io { path: self.directory.clone(), source })?;

        let path = self.next_path();
        debug!("Writing message '{}' to {}", email.subject, path.display());
        tokio::fs::write(&path, email.to_message_text())
            .await
            .map_err(|source| MailError::Io { path: path.clone(), source })?;

        info!("Queued message for {} in {}", email.to.join(", "), path.display());
        Ok(())
    }
}
