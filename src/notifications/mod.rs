//! Event Bus
//!
//! Pub/sub routing of server events to plugins.
//!
//! # Architecture
//!
//! - **Events**: [`XoEvent`] values, each with a stable name such as `job:terminated`
//! - **Subscribers**: components that handle events, optionally filtered by name
//! - **AsyncNotificationManager**: central coordinator for event routing
//!
//! # Example Usage
//!
//! ```no_run
//! use backup_reports::notifications::{AsyncNotificationManager, NotificationManager, XoEvent};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = AsyncNotificationManager::<XoEvent>::new();
//! manager.publish(XoEvent::other("vm:started", serde_json::Value::Null)).await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod events;
pub mod error;


pub use manager::{AsyncNotificationManager, SubscriberStats};
pub use events::{NotificationEvent, XoEvent, JOB_TERMINATED};
pub use error::{NotificationError, NotificationResult};
pub use traits::{DeliveryStats, EventFilter, NotificationManager, Subscriber};
