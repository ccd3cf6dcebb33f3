//! Utility functions for rtik

pub mod filename;
pub mod url;

pub use filename::*;
pub use url::*;
