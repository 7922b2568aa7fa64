//! Cross-module behavior of the scene, the bus and the chain scheduler
