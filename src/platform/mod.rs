//! Metadata API client and request throttling

pub mod client;
pub mod throttle;
pub mod tikwm;

pub use client::*;
pub use throttle::*;
pub use tikwm::*;
