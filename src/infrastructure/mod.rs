//! Infrastructure layer
//!
//! Concrete backends and platform-specific storage access.

pub mod input;
pub mod storage;
