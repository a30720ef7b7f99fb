//! Security module trait
//!
//! Narrow capability over the hardware component that gates encrypted
//! content. Every call is opaque; only success or a status code is observable.

use crate::core::StatusCode;

/// Largest number of sectors a single [`SecurityModule::decrypt`] call accepts.
pub const MAX_DECRYPT_SECTORS: u32 = 3;

/// Hardware security module driven by a protected input.
///
/// Calls arrive in a fixed order: `create_accessor`, `initialize`,
/// `key_exchange`, then any number of `decrypt`, then `exit` and
/// `destroy_accessor` on teardown.
pub trait SecurityModule: Send {
    /// Acquires the exclusive accessor.
    fn create_accessor(&mut self) -> Result<(), StatusCode>;

    /// Brings up the execution environment.
    fn initialize(&mut self) -> Result<(), StatusCode>;

    /// Performs the key exchange bound to the device `descriptor`.
    fn key_exchange(&mut self, descriptor: i32) -> Result<(), StatusCode>;

    /// Decrypts `data` in place. `data` never exceeds
    /// `MAX_DECRYPT_SECTORS` sectors.
    fn decrypt(&mut self, data: &mut [u8]) -> Result<(), StatusCode>;

    /// Shuts down the execution environment.
    fn exit(&mut self) -> Result<(), StatusCode>;

    /// Releases the accessor.
    fn destroy_accessor(&mut self) -> Result<(), StatusCode>;
}
