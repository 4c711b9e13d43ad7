//! Plugin Traits
//!
//! Lifecycle contract shared by server plugins: configure, then load to start
//! reacting to events, and unload to stop.

use std::fmt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::plugin::error::PluginResult;

/// Base plugin trait
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin metadata
    fn plugin_info(&self) -> &PluginInfo;

    /// JSON schema the host validates configuration against
    fn configuration_schema(&self) -> serde_json::Value;

    /// Apply configuration; replaces any previous configuration
    async fn configure(&self, configuration: serde_json::Value) -> PluginResult<()>;

    /// Start reacting to server events
    async fn load(&self) -> PluginResult<()>;

    /// Stop reacting to server events
    async fn unload(&self) -> PluginResult<()>;

    /// Get current plugin state
    async fn plugin_state(&self) -> PluginState;
}

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl PluginInfo {
    pub fn new<S: Into<String>>(name: S, version: S, description: S) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

/// Plugin lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginState {
    Unloaded,
    Loaded,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginState::Unloaded => write!(f, "unloaded"),
            PluginState::Loaded => write!(f, "loaded"),
        }
    }
}
