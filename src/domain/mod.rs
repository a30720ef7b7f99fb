//! Domain layer
//!
//! Entities describing a medium and the traits every backend and external
//! collaborator implements. Nothing here touches the operating system.

pub mod entities;
pub mod repositories;
