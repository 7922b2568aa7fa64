//! Tweening components
//!
//! Animations move their owner's transform between two values over a fixed
//! duration, optionally playing back in reverse and looping. They finish
//! themselves once the last loop completes, so a chain can attach one with
//! `add_component_and_wait` and resume when it is done.

use crate::components::{Component, ComponentContext};
use crate::error::EngineResult;
use crate::foundation::math::lerp;

/// Easing curve mapping elapsed time onto animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Constant speed
    #[default]
    Linear,
    /// Quadratic ease-in, ease-out
    EaseInOut,
}

impl Interpolation {
    /// Progress in `[0, 1]` at time `current` of a run started at `start`
    pub fn progress(self, current: f32, start: f32, length: f32) -> f32 {
        let linear = if length <= 0.0 {
            1.0
        } else {
            ((current - start) / length).clamp(0.0, 1.0)
        };
        match self {
            Self::Linear => linear,
            Self::EaseInOut => {
                let eased = if linear < 0.5 {
                    2.0 * linear * linear
                } else {
                    -1.0 + (4.0 - 2.0 * linear) * linear
                };
                eased.clamp(0.0, 1.0)
            }
        }
    }
}

/// Playback state shared by the animation components
#[derive(Debug, Clone)]
struct Tween {
    duration: f32,
    go_back: bool,
    loops: u32,
    interpolation: Interpolation,
    going_back: bool,
    completed_loops: u32,
    started_at: Option<f32>,
}

/// Progress of one frame
struct Frame {
    percent: f32,
    inverted: bool,
    done: bool,
}

impl Tween {
    fn new(duration: f32, go_back: bool, loops: u32) -> Self {
        Self {
            duration,
            go_back,
            loops,
            interpolation: Interpolation::Linear,
            going_back: false,
            completed_loops: 0,
            started_at: None,
        }
    }

    fn advance(&mut self, absolute: f32) -> Frame {
        let start = *self.started_at.get_or_insert(absolute);
        let percent = self.interpolation.progress(absolute, start, self.duration);
        let inverted = self.going_back;
        let mut done = false;

        if percent >= 1.0 {
            if self.go_back && !self.going_back {
                self.going_back = true;
            } else {
                self.completed_loops += 1;
                self.going_back = false;
                done = self.loops != 0 && self.completed_loops >= self.loops;
            }
            self.started_at = Some(absolute);
        }

        Frame { percent, inverted, done }
    }
}

/// Moves the owner between two positions
#[derive(Debug, Clone)]
pub struct TranslateAnimation {
    from: (f32, f32),
    to: (f32, f32),
    tween: Tween,
}

impl TranslateAnimation {
    /// Animate from `from` to `to` over `duration` seconds
    ///
    /// With `go_back` each loop also plays in reverse; `loops == 0` repeats
    /// forever.
    pub fn new(from: (f32, f32), to: (f32, f32), duration: f32, go_back: bool, loops: u32) -> Self {
        Self {
            from,
            to,
            tween: Tween::new(duration, go_back, loops),
        }
    }

    /// Use another easing curve
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.tween.interpolation = interpolation;
        self
    }
}

impl Component for TranslateAnimation {
    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        let (x, y) = self.from;
        ctx.owner_mut()?.transform.set_position(x, y);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _delta: f32, absolute: f32) -> EngineResult<()> {
        let frame = self.tween.advance(absolute);
        let (from, to) = if frame.inverted { (self.to, self.from) } else { (self.from, self.to) };
        ctx.owner_mut()?.transform.set_position(
            lerp(from.0, to.0, frame.percent),
            lerp(from.1, to.1, frame.percent),
        );
        if frame.done {
            ctx.finish();
        }
        Ok(())
    }
}

/// Rotates the owner between two angles (radians)
#[derive(Debug, Clone)]
pub struct RotationAnimation {
    from: f32,
    to: f32,
    tween: Tween,
}

impl RotationAnimation {
    /// Animate from `from` to `to` over `duration` seconds
    pub fn new(from: f32, to: f32, duration: f32, go_back: bool, loops: u32) -> Self {
        Self {
            from,
            to,
            tween: Tween::new(duration, go_back, loops),
        }
    }

    /// Use another easing curve
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.tween.interpolation = interpolation;
        self
    }
}

impl Component for RotationAnimation {
    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        ctx.owner_mut()?.transform.rotation = self.from;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _delta: f32, absolute: f32) -> EngineResult<()> {
        let frame = self.tween.advance(absolute);
        let (from, to) = if frame.inverted { (self.to, self.from) } else { (self.from, self.to) };
        ctx.owner_mut()?.transform.rotation = lerp(from, to, frame.percent);
        if frame.done {
            ctx.finish();
        }
        Ok(())
    }
}
