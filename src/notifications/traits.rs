//! Subscriber and Event Bus Traits
//!
//! Core traits that decouple event producers (the server) from consumers
//! (plugins).

use std::sync::Arc;
use async_trait::async_trait;
use crate::notifications::error::NotificationResult;
use crate::notifications::events::NotificationEvent;

/// Component that handles events
#[async_trait]
pub trait Subscriber<T>: Send + Sync
where
    T: NotificationEvent
{
    /// Handle an incoming event
    async fn handle_event(&self, event: T) -> NotificationResult<()>;

    /// Get the subscriber identifier (must be unique)
    fn subscriber_id(&self) -> &str;

    /// Get event filter preferences
    fn event_filter(&self) -> EventFilter {
        EventFilter::AcceptAll
    }

    /// Check if this subscriber should receive the event
    fn should_receive(&self, event: &T) -> bool {
        self.event_filter().should_accept(event)
    }
}

/// Event source that subscribers attach to
#[async_trait]
pub trait NotificationManager<T>: Send + Sync
where
    T: NotificationEvent
{
    /// Subscribe a component to receive events
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()>;

    /// Unsubscribe a component from receiving events
    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()>;

    /// Publish an event to all interested subscribers
    async fn publish(&self, event: T) -> NotificationResult<()>;

    /// Get the number of active subscribers
    async fn subscriber_count(&self) -> usize;

    /// Check if a subscriber exists
    async fn has_subscriber(&self, subscriber_id: &str) -> bool;

    /// Shutdown the event bus
    async fn shutdown(&self) -> NotificationResult<()>;

    /// Get delivery statistics
    async fn get_stats(&self) -> DeliveryStats;
}

/// Event filtering options for subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum EventFilter {
    /// Accept all events
    AcceptAll,

    /// Accept only events with one of these names
    EventNames(Vec<String>),
}

impl EventFilter {
    pub fn named<S: Into<String>>(name: S) -> Self {
        EventFilter::EventNames(vec![name.into()])
    }

    /// Check if an event should be accepted
    pub fn should_accept<T: NotificationEvent>(&self, event: &T) -> bool {
        match self {
            EventFilter::AcceptAll => true,
            EventFilter::EventNames(names) => names.iter().any(|name| name == event.event_name()),
        }
    }
}

/// Statistics about event delivery
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryStats {
    /// Total events published
    pub events_published: u64,

    /// Total events delivered successfully
    pub events_delivered: u64,

    /// Total delivery failures
    pub delivery_failures: u64,
}
