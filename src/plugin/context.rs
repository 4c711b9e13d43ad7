//! Plugin Context
//!
//! Server facilities handed to a plugin when it is created.

use std::sync::Arc;
use crate::mailer::EmailSender;
use crate::notifications::{NotificationManager, XoEvent};
use crate::registry::ObjectRegistry;

/// Host services available to plugins
#[derive(Clone)]
pub struct PluginContext {
    /// Server event source
    pub events: Arc<dyn NotificationManager<XoEvent>>,

    /// Object lookups
    pub registry: Arc<dyn ObjectRegistry>,

    /// Email transport; absent when no mail plugin is loaded
    pub mailer: Option<Arc<dyn EmailSender>>,
}

impl PluginContext {
    pub fn new(
        events: Arc<dyn NotificationManager<XoEvent>>,
        registry: Arc<dyn ObjectRegistry>,
    ) -> Self {
        Self {
            events,
            registry,
            mailer: None,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn EmailSender>) -> Self {
        self.mailer = Some(mailer);
        self
    }
}
