//! # Comp Engine
//!
//! A component micro-engine built around a retained scene graph.
//!
//! ## Features
//!
//! - **Scene graph**: game objects with attributes, transforms and meshes,
//!   addressed by generation-checked handles
//! - **Components**: behavior units with init/update/message/finish hooks
//! - **Deferred commits**: structural edits made during a traversal apply
//!   when the outermost traversal returns
//! - **Message bus**: tag-based synchronous dispatch with a wildcard tag
//! - **Chain scheduler**: scripted sequences of loops, conditionals, waits
//!   and scene edits interpreted across frames
//!
//! ## Quick Start
//!
//! ```rust
//! use comp_engine::prelude::*;
//!
//! struct Blinker;
//!
//! impl Application for Blinker {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let mut chain = ChainComponent::new();
//!         chain
//!             .begin_interval(0.5)
//!             .try_execute(|step| step.send_message("BLINK"))
//!             .end_interval();
//!         GameObjectBuilder::new("lamp")
//!             .with_component(chain)
//!             .build(engine.scene_mut())?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_max_frames(120);
//!     Engine::run(config, &mut Blinker)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod error;
pub mod foundation;

pub mod components;
pub mod events;
pub mod scene;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application};
pub use engine::Engine;
pub use error::{ChainError, EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        components::{
            chain::{ComponentRef, Target},
            BasicRenderer, ChainComponent, ChainStep, Component, ComponentContext, DebugComponent, DrawContext,
            DrawParams, Interpolation, RenderSurface, RotationAnimation, TranslateAnimation,
        },
        core::{ChainConfig, Config, EngineConfig, SceneConfig},
        events::{Message, MessageTag},
        foundation::collections::{ComponentId, ObjectId},
        scene::{GameObject, GameObjectBuilder, Mesh, ObjectState, Scene, Transform},
        AppError, Application, ChainError, Engine, EngineError, EngineResult,
    };
}
