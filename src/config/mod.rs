//! Configuration Module
//!
//! Client settings and how they are loaded.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{ClientConfig, DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL};
