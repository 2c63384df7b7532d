//! Audio sources: the capture trait and its implementations.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod noise;
pub mod source;
