//! Command line interface for rtik

pub mod args;
pub mod output;

pub use args::*;
pub use output::*;
