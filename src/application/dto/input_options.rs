//! Input options DTO

use crate::core::{InputError, Result};
use crate::domain::entities::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options controlling backend selection and open-time behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputOptions {
    /// Backend to bind the driver to
    pub backend: BackendKind,
    /// Authenticate during open and refuse media without a security module
    pub require_authentication: bool,
    /// Probe vendor configuration and adapt the device mode on open
    pub adapt_device_mode: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            backend: BackendKind::Auto,
            require_authentication: false,
            adapt_device_mode: true,
        }
    }
}

impl InputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| InputError::InvalidConfig(e.to_string()))
    }

    /// Loads options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InputError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Sets the backend
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Requires authentication during open
    pub fn require_authentication(mut self, required: bool) -> Self {
        self.require_authentication = required;
        self
    }

    /// Enables or disables device mode adaptation
    pub fn adapt_device_mode(mut self, enabled: bool) -> Self {
        self.adapt_device_mode = enabled;
        self
    }
}
