//! Podcast episode rendering.
//!
//! Turns an ordered script into one WAV file by calling the synthesis engine once
//! per segment and appending the results in script order.

mod driver;

pub use driver::{DriverConfig, DriverError, PodcastDriver, Rendering};
