//! # Core Engine Module
//!
//! Shared configuration types used by the scene, the chain scheduler and the
//! engine loop.

pub mod config;

pub use config::{ChainConfig, EngineConfig, SceneConfig};
pub use crate::config::{Config, ConfigError};
