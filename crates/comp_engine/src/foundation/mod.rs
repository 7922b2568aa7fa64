//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types
//! - Handle types for the scene arenas
//! - Frame clock and stopwatch
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
