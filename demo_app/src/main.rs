//! Headless chain demo
//!
//! Builds a small scene driven entirely by chain components: a lamp that
//! blinks on an interval, a ball that plays animations one after another,
//! and a referee that reacts to messages and ends the run.
//!
//! Usage: `chain_demo [config.toml|config.ron]`

use std::f32::consts::PI;

use comp_engine::config::ConfigError;
use comp_engine::foundation::logging;
use comp_engine::foundation::time::Stopwatch;
use comp_engine::prelude::*;
use comp_engine::scene::{SpriteFrame, TextAlign};

const BLINK_PERIOD: f32 = 0.5;
const BLINKS_EXPECTED: u32 = 6;
const FRAME_BACKSTOP: u64 = 1200;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("engine: {0}")]
    Engine(#[from] EngineError),
}

/// Surface that records draw calls in the log instead of painting
#[derive(Default)]
struct LogSurface {
    calls: usize,
}

impl RenderSurface for LogSurface {
    fn fill_rect(&mut self, params: &DrawParams, fill: &str) {
        self.calls += 1;
        log::trace!(
            "rect {} at ({:.0}, {:.0}) {:.0}x{:.0} rot {:.2}",
            fill,
            params.position.x,
            params.position.y,
            params.width,
            params.height,
            params.rotation
        );
    }

    fn fill_text(&mut self, params: &DrawParams, text: &str, _font: &str, _fill: &str, _align: TextAlign) {
        self.calls += 1;
        log::trace!("text '{}' at ({:.0}, {:.0})", text, params.position.x, params.position.y);
    }

    fn draw_image(&mut self, params: &DrawParams, image: &str, _frame: Option<&SpriteFrame>) {
        self.calls += 1;
        log::trace!("image {} at ({:.0}, {:.0})", image, params.position.x, params.position.y);
    }
}

struct ChainDemo {
    surface: LogSurface,
}

impl ChainDemo {
    fn build_lamp(scene: &mut Scene) -> EngineResult<ObjectId> {
        let mut chain = ChainComponent::named("lamp");
        chain
            .begin_interval(BLINK_PERIOD)
            .try_execute(|step| {
                if let Some(blinks) = step.scene_mut().global_attribute_mut::<u32>("blinks") {
                    *blinks += 1;
                }
                step.send_message("BLINK")
            })
            .end_interval();

        GameObjectBuilder::new("lamp")
            .with_position(1.0, 1.0)
            .with_mesh(Mesh::rect("#ffd54f", 1.0, 1.0).with_alpha(0.8))
            .with_component(BasicRenderer::new())
            .with_component(chain)
            .build(scene)
    }

    fn build_ball(scene: &mut Scene) -> EngineResult<ObjectId> {
        let mut chain = ChainComponent::named("ball");
        chain
            .wait_time(1.0)
            .add_component_and_wait(
                TranslateAnimation::new((1.0, 4.0), (12.0, 4.0), 2.0, true, 1)
                    .with_interpolation(Interpolation::EaseInOut),
            )
            .try_execute(|step| step.send_message("ARRIVED"))
            .begin_repeat(2)
            .add_component_and_wait(RotationAnimation::new(0.0, PI, 0.5, false, 1))
            .end_repeat()
            .try_execute(|step| step.send_message("SPUN"));

        GameObjectBuilder::new("ball")
            .with_position(1.0, 4.0)
            .with_mesh(Mesh::rect("#4fc3f7", 1.0, 1.0))
            .with_centered_origin()
            .with_component(BasicRenderer::new())
            .with_component(chain)
            .build(scene)
    }

    fn build_referee(scene: &mut Scene) -> EngineResult<ObjectId> {
        let mut chain = ChainComponent::named("referee");
        chain
            .wait_for_message("ARRIVED")
            .begin_if(|scene| scene.global_attribute::<u32>("blinks").is_some_and(|b| *b >= BLINKS_EXPECTED))
            .execute(|step| log::info!("lamp kept up by t={:.2}", step.scene().absolute_time()))
            .otherwise()
            .execute(|step| log::info!("lamp fell behind by t={:.2}", step.scene().absolute_time()))
            .end_if()
            .wait_for_message("SPUN")
            .remove_game_object_by_tag("lamp")
            .wait_frames(1)
            .execute(|step| step.scene_mut().add_global_attribute("done", true));

        GameObjectBuilder::new("referee").with_component(chain).build(scene)
    }
}

impl Application for ChainDemo {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let scene = engine.scene_mut();
        scene.add_global_attribute("blinks", 0_u32);
        scene.add_global_attribute("done", false);
        scene.add_global_component(DebugComponent::new())?;

        Self::build_lamp(scene)?;
        Self::build_ball(scene)?;
        Self::build_referee(scene)?;

        log::info!("Scene ready with {} objects", scene.object_count());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if engine.scene().global_attribute::<bool>("done") == Some(&true) {
            engine.quit();
        }
        Ok(())
    }

    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.draw(&mut self.surface)?;
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let blinks = engine.scene().global_attribute::<u32>("blinks").copied().unwrap_or(0);
        log::info!(
            "Demo finished at t={:.2}s: {} blinks, {} draw calls",
            engine.scene().absolute_time(),
            blinks,
            self.surface.calls
        );
    }
}

fn load_config() -> Result<EngineConfig, DemoError> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    if config.max_frames.is_none() {
        config.max_frames = Some(FRAME_BACKSTOP);
    }
    Ok(config)
}

fn main() -> Result<(), DemoError> {
    logging::init_with_level(log::LevelFilter::Info);

    let config = load_config()?;
    let mut app = ChainDemo {
        surface: LogSurface::default(),
    };
    let stopwatch = Stopwatch::start_new();
    Engine::run(config, &mut app)?;
    log::info!("Wall time {:.1} ms", stopwatch.elapsed_millis());
    Ok(())
}
