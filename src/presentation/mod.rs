//! Presentation layer
//!
//! Command-line front end over the application layer.

pub mod cli;
