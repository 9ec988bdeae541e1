//! Utility Module
//!
//! - [`Timer`]: per-frame delta/elapsed tracking
//! - [`FpsCounter`]: frame rate measurement for the debug surface

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::Timer;
