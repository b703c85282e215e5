//! Configuration module for the podcast renderer.
//!
//! Provides CLI argument parsing, option enums and the Kokoro voice registry.

#[allow(clippy::module_inception)]
mod config;
pub mod voices;

pub use config::{AppConfig, Precision, Provider, RatePolicy, WavFormat};
