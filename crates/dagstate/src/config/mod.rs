//! Configuration for the status engine.
//!
//! Loaded from environment variables using the `envy` crate for type-safe
//! environment variable parsing.

mod engine;

pub use engine::EngineConfig;
