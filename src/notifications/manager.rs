//! Async Event Bus
//!
//! In-process stand-in for the server's event emitter. Manages subscriber
//! registration, routes each event to every subscriber whose filter accepts
//! it, and keeps delivery statistics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use futures::future::join_all;
use tokio::sync::RwLock;
use log::{debug, warn, error};

use crate::notifications::traits::{NotificationManager, Subscriber, DeliveryStats};
use crate::notifications::events::NotificationEvent;
use crate::notifications::error::{NotificationError, NotificationResult};

/// Subscriber registration with its statistics
struct SubscriberInfo<T>
where
    T: NotificationEvent
{
    subscriber: Arc<dyn Subscriber<T>>,
    stats: SubscriberStats,
}

/// Statistics for individual subscribers
#[derive(Debug, Clone, Default)]
pub struct SubscriberStats {
    pub events_received: u64,
    pub events_processed: u64,
    pub processing_failures: u64,
    pub total_processing_time_us: u64,
    pub last_event_at: Option<SystemTime>,
}

/// Generic async event bus
pub struct AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    subscribers: Arc<RwLock<HashMap<String, SubscriberInfo<T>>>>,
    global_stats: Arc<RwLock<DeliveryStats>>,
    shutdown: Arc<RwLock<bool>>,
    max_subscribers: Option<usize>,
}

impl<T> AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_max_subscribers(Some(1000))
    }

    /// Create a new event bus with a custom subscriber limit
    pub fn with_max_subscribers(max_subscribers: Option<usize>) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            global_stats: Arc::new(RwLock::new(DeliveryStats::default())),
            shutdown: Arc::new(RwLock::new(false)),
            max_subscribers,
        }
    }

    async fn is_shutting_down(&self) -> bool {
        *self.shutdown.read().await
    }

    /// Get subscriber-specific statistics
    pub async fn get_subscriber_stats(&self, subscriber_id: &str) -> Option<SubscriberStats> {
        let subscribers = self.subscribers.read().await;
        subscribers.get(subscriber_id).map(|info| info.stats.clone())
    }

    /// List all subscriber IDs
    pub async fn list_subscribers(&self) -> Vec<String> {
        let subscribers = self.subscribers.read().await;
        subscribers.keys().cloned().collect()
    }

    async fn deliver(subscriber: Arc<dyn Subscriber<T>>, event: T) -> (String, u64, NotificationResult<()>) {
        let subscriber_id = subscriber.subscriber_id().to_string();
        let start_time = Instant::now();

        let result = subscriber.handle_event(event).await;
        let elapsed_us = start_time.elapsed().as_micros() as u64;

        let result = result.map_err(|e| {
            error!("Subscriber '{}' failed to process event: {}", subscriber_id, e);
            NotificationError::delivery_failed(subscriber_id.clone(), e.to_string())
        });
        (subscriber_id, elapsed_us, result)
    }
}

#[async_trait::async_trait]
impl<T> NotificationManager<T> for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        let subscriber_id = subscriber.subscriber_id().to_string();
        let mut subscribers = self.subscribers.write().await;

        if let Some(max) = self.max_subscribers {
            if subscribers.len() >= max {
                return Err(NotificationError::generic(
                    format!("Maximum number of subscribers ({}) reached", max)
                ));
            }
        }

        if subscribers.contains_key(&subscriber_id) {
            return Err(NotificationError::subscriber_already_exists(subscriber_id));
        }

        subscribers.insert(subscriber_id.clone(), SubscriberInfo {
            subscriber,
            stats: SubscriberStats::default(),
        });
        debug!("Subscribed '{}' to events", subscriber_id);

        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()> {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(subscriber_id).is_some() {
            debug!("Unsubscribed '{}' from events", subscriber_id);
            Ok(())
        } else {
            Err(NotificationError::subscriber_not_found(subscriber_id))
        }
    }

    async fn publish(&self, event: T) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        // Handlers run without the registry lock held so they may (un)subscribe
        let targets: Vec<Arc<dyn Subscriber<T>>> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .values()
                .filter(|info| info.subscriber.should_receive(&event))
                .map(|info| Arc::clone(&info.subscriber))
                .collect()
        };

        debug!("Publishing '{}' to {} subscribers", event.event_name(), targets.len());

        let outcomes = join_all(
            targets
                .into_iter()
                .map(|subscriber| Self::deliver(subscriber, event.clone()))
        ).await;

        let mut delivery_count = 0;
        let mut failure_count = 0;
        {
            let mut subscribers = self.subscribers.write().await;
            for (subscriber_id, elapsed_us, result) in &outcomes {
                match result {
                    Ok(()) => delivery_count += 1,
                    Err(e) => {
                        failure_count += 1;
                        warn!("{}", e);
                    }
                }

                // A handler may have unsubscribed itself while running
                if let Some(info) = subscribers.get_mut(subscriber_id) {
                    info.stats.events_received += 1;
                    info.stats.total_processing_time_us += elapsed_us;
                    info.stats.last_event_at = Some(SystemTime::now());
                    if result.is_ok() {
                        info.stats.events_processed += 1;
                    } else {
                        info.stats.processing_failures += 1;
                    }
                }
            }
        }

        let mut global_stats = self.global_stats.write().await;
        global_stats.events_published += 1;
        global_stats.events_delivered += delivery_count;
        global_stats.delivery_failures += failure_count;

        debug!("Delivered '{}' ({} successful, {} failed)", event.event_name(), delivery_count, failure_count);

        Ok(())
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.read().await.contains_key(subscriber_id)
    }

    async fn shutdown(&self) -> NotificationResult<()> {
        debug!("Shutting down event bus");

        *self.shutdown.write().await = true;

        let mut subscribers = self.subscribers.write().await;
        let subscriber_count = subscribers.len();
        subscribers.clear();

        debug!("Event bus shutdown complete ({} subscribers removed)", subscriber_count);
        Ok(())
    }

    async fn get_stats(&self) -> DeliveryStats {
        self.global_stats.read().await.clone()
    }
}

impl<T> Default for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            global_stats: Arc::clone(&self.global_stats),
            shutdown: Arc::clone(&self.shutdown),
            max_subscribers: self.max_subscribers,
        }
    }
}
