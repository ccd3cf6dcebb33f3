//! Media transfer and post-processing

pub mod convert;
pub mod fetcher;

pub use convert::*;
pub use fetcher::*;
