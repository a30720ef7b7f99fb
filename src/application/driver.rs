//! Input driver
//!
//! The backend selector. A driver is built once from configuration, binds
//! every input operation to one backend, and is handed to whoever needs to
//! open media. It never changes after construction.

use super::dto::InputOptions;
use crate::core::{InputError, Result};
use crate::domain::entities::BackendKind;
use crate::domain::repositories::{SectorInput, SecurityModule, StorageDevice};
use crate::infrastructure::input::{DeviceInput, FileInput, InputHandle};
use crate::infrastructure::storage::{ioctl, BlockStorage};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Builds the storage adapter for a device target
pub type StorageFactory = Arc<dyn Fn(&str) -> Box<dyn StorageDevice> + Send + Sync>;

/// Builds a fresh security module for each opened handle
pub type SecurityModuleFactory = Arc<dyn Fn() -> Box<dyn SecurityModule> + Send + Sync>;

#[derive(Clone)]
pub struct InputDriver {
    backend: BackendKind,
    options: InputOptions,
    storage: StorageFactory,
    security: Option<SecurityModuleFactory>,
}

impl InputDriver {
    /// Binds a driver for `target` according to `options`.
    ///
    /// `BackendKind::Auto` resolves to `Device` for device nodes and `File`
    /// otherwise. The target is only inspected, never opened.
    pub fn setup(target: &str, options: &InputOptions) -> Result<Self> {
        let backend = match options.backend {
            BackendKind::Auto if ioctl::path_is_device(target) => BackendKind::Device,
            BackendKind::Auto => BackendKind::File,
            explicit => explicit,
        };

        info!("Input backend for {}: {}", target, backend);

        Ok(Self {
            backend,
            options: options.clone(),
            storage: Arc::new(|target: &str| -> Box<dyn StorageDevice> {
                Box::new(BlockStorage::new(target))
            }),
            security: None,
        })
    }

    /// Replaces the storage adapter used by the device backend
    pub fn with_storage<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn StorageDevice> + Send + Sync + 'static,
    {
        self.storage = Arc::new(factory);
        self
    }

    /// Gates device handles behind a hardware security module
    pub fn with_security_module<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SecurityModule> + Send + Sync + 'static,
    {
        self.security = Some(Arc::new(factory));
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    /// Opens `target` with the bound backend.
    ///
    /// With `require_authentication` set, the handle is authenticated before
    /// it is returned; a handle that cannot be authenticated is closed and the
    /// open fails.
    pub fn open(&self, target: &str) -> Result<InputHandle> {
        debug!("Opening {} with {} backend", target, self.backend);

        let mut handle = match self.backend {
            BackendKind::Device => {
                let storage = (self.storage)(target);
                let security = self.security.as_ref().map(|factory| factory());
                InputHandle::Device(DeviceInput::open(
                    storage,
                    security,
                    self.options.adapt_device_mode,
                )?)
            }
            BackendKind::File | BackendKind::Auto => InputHandle::File(FileInput::open(target)?),
        };

        if self.options.require_authentication {
            if let Err(e) = Self::authenticate_on_open(&mut handle) {
                if let Err(close_err) = handle.close() {
                    error!("Closing {} after failed authentication: {}", target, close_err);
                }
                return Err(e);
            }
        }

        Ok(handle)
    }

    fn authenticate_on_open(handle: &mut InputHandle) -> Result<()> {
        if !handle.is_protected() {
            return Err(InputError::InvalidConfig(format!(
                "authentication required but the {} backend has no security module",
                handle.backend()
            )));
        }
        handle.authenticate()
    }
}

impl fmt::Debug for InputDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDriver")
            .field("backend", &self.backend)
            .field("options", &self.options)
            .field("protected", &self.security.is_some())
            .finish()
    }
}
