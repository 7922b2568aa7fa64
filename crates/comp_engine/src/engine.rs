//! Engine loop
//!
//! `Engine` owns the scene and the frame clock. It is the explicit context
//! handed to an [`Application`]; nothing in the crate is process-global.

use crate::application::{AppError, Application};
use crate::components::RenderSurface;
use crate::core::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::foundation::time::FrameClock;
use crate::scene::Scene;

/// Main engine struct
///
/// Drives the scene with a fixed time step.
pub struct Engine {
    scene: Scene,
    clock: FrameClock,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Self {
        log::info!(
            "Initializing engine: scene {}x{} units, step {:.4}s",
            config.scene.width,
            config.scene.height,
            config.fixed_time_step
        );
        Self {
            scene: Scene::new(config.scene.clone()),
            clock: FrameClock::new(config.fixed_time_step),
            config,
            running: true,
        }
    }

    /// Run the engine main loop with the given application
    ///
    /// The loop ends when the application calls [`Engine::quit`] or after
    /// `max_frames` frames.
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> EngineResult<()> {
        let mut engine = Self::new(config);

        app.initialize(&mut engine)
            .map_err(|e| app_error("initialization", e))?;

        log::info!("Starting main loop...");
        while engine.running && !engine.frame_limit_reached() {
            let delta_time = engine.clock.fixed_step();

            app.update(&mut engine, delta_time)
                .map_err(|e| app_error("update", e))?;
            engine.step()?;
            app.render(&mut engine)
                .map_err(|e| app_error("render", e))?;
        }

        app.cleanup(&mut engine);
        log::info!("Engine shutdown complete after {} frames", engine.frame_count());
        Ok(())
    }

    /// Advance the clock by the fixed step and run one scene update
    pub fn step(&mut self) -> EngineResult<()> {
        let (delta, absolute) = self.clock.tick();
        self.scene.update(delta, absolute)
    }

    /// Advance the clock by a measured delta and run one scene update
    pub fn advance(&mut self, delta: f32) -> EngineResult<()> {
        let (delta, absolute) = self.clock.advance(delta);
        self.scene.update(delta, absolute)
    }

    /// Run the draw pass onto a surface
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) -> EngineResult<()> {
        self.scene.draw(surface)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Check whether the loop keeps running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    fn frame_limit_reached(&self) -> bool {
        self.config
            .max_frames
            .is_some_and(|limit| self.clock.frame_count() >= limit)
    }
}

fn app_error(stage: &str, error: AppError) -> EngineError {
    match error {
        AppError::Engine(inner) => inner,
        other => EngineError::Application(format!("App {}: {}", stage, other)),
    }
}
