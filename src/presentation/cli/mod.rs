//! CLI module

mod actions;
mod commands;
mod progress;

pub use actions::run;
pub use commands::{Cli, Commands, HashAlgorithm};
pub use progress::ProgressReporter;
