//! # Engine Configuration
//!
//! Configuration structures for the scene, the chain scheduler and the engine
//! loop. Every struct is serde-friendly with defaults for missing fields, so a
//! config file only has to name what it changes.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// # Chain Configuration
///
/// Limits applied by the chain interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum number of instructions a single chain interprets in one update.
    /// Hitting the limit suspends the chain until the next frame.
    pub max_steps_per_frame: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_steps_per_frame: 10_000,
        }
    }
}

/// # Scene Configuration
///
/// Scene dimensions are expressed in units; `unit_size` converts units to
/// pixels for the render step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene width in units
    pub width: f32,
    /// Scene height in units
    pub height: f32,
    /// Pixels per unit
    pub unit_size: f32,
    /// Chain interpreter limits
    pub chain: ChainConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            unit_size: 100.0,
            chain: ChainConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Set scene dimensions in units
    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of pixels per unit
    pub fn with_unit_size(mut self, unit_size: f32) -> Self {
        self.unit_size = unit_size;
        self
    }

    /// Set the per-frame chain step limit
    pub fn with_chain_step_limit(mut self, limit: u32) -> Self {
        self.chain.max_steps_per_frame = limit;
        self
    }
}

/// # Engine Configuration
///
/// Top-level configuration for the engine loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene configuration
    pub scene: SceneConfig,
    /// Fixed time step in seconds used by `Engine::step`
    pub fixed_time_step: f32,
    /// Stop the run loop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            fixed_time_step: 1.0 / 60.0,
            max_frames: None,
        }
    }
}

impl EngineConfig {
    /// Set the scene configuration
    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scene = scene;
        self
    }

    /// Set the fixed time step
    pub fn with_fixed_time_step(mut self, step: f32) -> Self {
        self.fixed_time_step = step;
        self
    }

    /// Limit the number of frames the run loop executes
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_toml_partial_config_uses_defaults() {
        let text = "fixed_time_step = 0.5\n[scene]\nwidth = 12.0\n";
        let config = EngineConfig::parse("engine.toml", text).unwrap();
        assert_eq!(config.fixed_time_step, 0.5);
        assert_eq!(config.scene.width, 12.0);
        assert_eq!(config.scene.height, SceneConfig::default().height);
        assert_eq!(config.scene.chain, ChainConfig::default());
    }

    #[test]
    fn test_ron_config() {
        let text = "(scene: (unit_size: 32.0, chain: (max_steps_per_frame: 64)), max_frames: Some(10))";
        let config = EngineConfig::parse("engine.ron", text).unwrap();
        assert_eq!(config.scene.unit_size, 32.0);
        assert_eq!(config.scene.chain.max_steps_per_frame, 64);
        assert_eq!(config.max_frames, Some(10));
    }

    #[test]
    fn test_builder_setters() {
        let scene = SceneConfig::default()
            .with_dimensions(16.0, 9.0)
            .with_unit_size(40.0)
            .with_chain_step_limit(5);
        let config = EngineConfig::default().with_scene(scene).with_fixed_time_step(0.1);
        assert_eq!(config.scene.width, 16.0);
        assert_eq!(config.scene.unit_size, 40.0);
        assert_eq!(config.scene.chain.max_steps_per_frame, 5);
        assert_eq!(config.fixed_time_step, 0.1);
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::parse("engine.json", "{}");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let path = std::env::temp_dir().join("comp_engine_config_test.toml");
        let path = path.to_string_lossy().to_string();
        let config = EngineConfig::default().with_max_frames(42);
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
