//! Data transfer objects

mod input_options;

pub use input_options::InputOptions;
