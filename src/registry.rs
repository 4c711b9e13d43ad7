//! Object Registry
//!
//! Lookup of host objects (virtual machines) by identifier. Reports only need
//! the display name and UUID of the object a call targeted.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use log::debug;

/// Errors raised by object lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No object with the requested identifier
    #[error("no such object: {id}")]
    ObjectNotFound { id: String },

    /// Registry data could not be read or parsed
    #[error("invalid registry data: {message}")]
    InvalidData { message: String },
}

impl RegistryError {
    pub fn object_not_found<S: Into<String>>(id: S) -> Self {
        Self::ObjectNotFound { id: id.into() }
    }

    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData { message: message.into() }
    }
}

/// Display attributes of a host object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XoObject {
    pub id: String,
    pub name_label: String,
    pub uuid: String,
}

impl XoObject {
    pub fn new<S: Into<String>>(id: S, name_label: S, uuid: S) -> Self {
        Self {
            id: id.into(),
            name_label: name_label.into(),
            uuid: uuid.into(),
        }
    }
}

/// Source of host objects
pub trait ObjectRegistry: Send + Sync {
    /// Fetch an object by identifier
    fn get_object(&self, id: &str) -> Result<XoObject, RegistryError>;
}

/// Registry backed by a map, populated up front
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    objects: HashMap<String, XoObject>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: XoObject) -> Self {
        self.insert(object);
        self
    }

    pub fn insert(&mut self, object: XoObject) {
        self.objects.insert(object.id.clone(), object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Parse a JSON array of `{ id, name_label, uuid }` objects
    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        let objects: Vec<XoObject> = serde_json::from_str(content)
            .map_err(|e| RegistryError::invalid_data(e.to_string()))?;

        let mut registry = Self::new();
        for object in objects {
            registry.insert(object);
        }
        debug!("Loaded {} objects into registry", registry.len());
        Ok(registry)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path)
            .map_err(|e| RegistryError::invalid_data(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}

impl ObjectRegistry for InMemoryRegistry {
    fn get_object(&self, id: &str) -> Result<XoObject, RegistryError> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::object_not_found(id))
    }
}
