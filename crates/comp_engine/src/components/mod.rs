//! Component contract and the built-in components
//!
//! A component is a unit of behavior attached to exactly one game object.
//! Every hook is optional. Hooks receive a [`ComponentContext`] giving access
//! to the scene, the owning object and the component's own lifecycle.

pub mod animation;
pub mod chain;
pub mod debug;
pub mod renderer;

use std::any::Any;

use crate::error::{EngineError, EngineResult};
use crate::events::{Message, MessageTag};
use crate::foundation::collections::{ComponentId, ObjectId};
use crate::scene::{GameObject, Scene};

pub use animation::{Interpolation, RotationAnimation, TranslateAnimation};
pub use chain::{ChainComponent, ChainStep};
pub use debug::DebugComponent;
pub use renderer::{BasicRenderer, DrawParams, RenderSurface};

/// Downcasting support for trait objects
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to a game object
pub trait Component: AsAny {
    /// Name used by name-based lookup and removal (type name by default)
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once after attachment, before the first `on_update`
    fn on_init(&mut self, _ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called once per frame while attached, enabled and not finished
    fn on_update(&mut self, _ctx: &mut ComponentContext<'_>, _delta: f32, _absolute: f32) -> EngineResult<()> {
        Ok(())
    }

    /// Called synchronously for every message with a subscribed tag
    fn on_message(&mut self, _ctx: &mut ComponentContext<'_>, _message: &Message) -> EngineResult<()> {
        Ok(())
    }

    /// Called exactly once when the component finishes, before it is detached
    fn on_finish(&mut self, _ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called by the draw pass for drawable owners
    fn on_draw(&self, _ctx: &DrawContext<'_>, _surface: &mut dyn RenderSurface) -> EngineResult<()> {
        Ok(())
    }

    /// Checked by `Scene::add_component` before attaching
    fn validate(&self) -> EngineResult<()> {
        Ok(())
    }
}

/// Strip the module path (and generic arguments) from a type name
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Access to the scene from inside a component hook
pub struct ComponentContext<'a> {
    scene: &'a mut Scene,
    id: ComponentId,
    owner: ObjectId,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(scene: &'a mut Scene, id: ComponentId, owner: ObjectId) -> Self {
        Self { scene, id, owner }
    }

    /// Handle of the running component
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Handle of the owning object
    pub fn owner_id(&self) -> ObjectId {
        self.owner
    }

    /// The owning object
    pub fn owner(&self) -> EngineResult<&GameObject> {
        self.scene.object(self.owner).ok_or(EngineError::ObjectNotFound(self.owner))
    }

    /// The owning object, mutably
    pub fn owner_mut(&mut self) -> EngineResult<&mut GameObject> {
        let owner = self.owner;
        self.scene.object_mut(owner).ok_or(EngineError::ObjectNotFound(owner))
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// The scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    /// Mark this component finished; it is detached at its owner's next commit point
    pub fn finish(&mut self) {
        self.scene.mark_finished(self.id);
    }

    /// Check whether this component has finished
    pub fn is_finished(&self) -> bool {
        self.scene.is_finished(self.id)
    }

    /// Subscribe this component to a message tag (`MessageTag::ALL` for every message)
    pub fn subscribe(&mut self, tag: impl Into<MessageTag>) {
        self.scene.subscribe(self.id, tag);
    }

    /// Unsubscribe this component from a message tag
    pub fn unsubscribe(&mut self, tag: impl Into<MessageTag>) -> bool {
        self.scene.unsubscribe(self.id, tag)
    }

    /// Send a message originating from the owning object
    pub fn send_message(&mut self, tag: impl Into<MessageTag>) -> EngineResult<()> {
        self.send(Message::new(tag))
    }

    /// Send a prepared message; the source defaults to the owning object
    pub fn send(&mut self, mut message: Message) -> EngineResult<()> {
        if message.source.is_none() {
            message.source = Some(self.owner);
        }
        self.scene.send_message(message)
    }

    /// Scene time of the current frame
    pub fn absolute_time(&self) -> f32 {
        self.scene.absolute_time()
    }
}

/// Read-only access to the scene for the draw pass
pub struct DrawContext<'a> {
    scene: &'a Scene,
    object: &'a GameObject,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(scene: &'a Scene, object: &'a GameObject) -> Self {
        Self { scene, object }
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// The object being drawn
    pub fn owner(&self) -> &GameObject {
        self.object
    }

    /// Pixels per scene unit
    pub fn unit_size(&self) -> f32 {
        self.scene.config().unit_size
    }
}
