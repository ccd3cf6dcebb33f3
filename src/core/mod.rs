//! Core functionality for rtik

pub mod downloader;
pub mod presence;
pub mod progress;
pub mod sync;
pub mod video_info;

pub use downloader::*;
pub use presence::*;
pub use progress::*;
pub use sync::*;
pub use video_info::*;
