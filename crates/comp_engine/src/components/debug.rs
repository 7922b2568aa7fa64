//! Scene inspection component

use crate::components::{Component, ComponentContext};
use crate::error::{EngineError, EngineResult};
use crate::events::{Message, MessageTag};

/// Logs every message and keeps a textual dump of the scene graph
///
/// Must be attached to the scene root.
#[derive(Debug, Default)]
pub struct DebugComponent {
    dump: String,
    messages_seen: usize,
}

impl DebugComponent {
    /// Create the component
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene graph as of the last update
    pub fn dump(&self) -> &str {
        &self.dump
    }

    /// Number of messages observed so far
    pub fn messages_seen(&self) -> usize {
        self.messages_seen
    }
}

impl Component for DebugComponent {
    fn on_init(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        if ctx.owner()?.parent().is_some() {
            return Err(EngineError::InvariantViolation(
                "DebugComponent must be attached to the scene root".to_string(),
            ));
        }
        ctx.subscribe(MessageTag::ALL);
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut ComponentContext<'_>, message: &Message) -> EngineResult<()> {
        self.messages_seen += 1;
        let source = message
            .source
            .and_then(|id| ctx.scene().object(id))
            .map_or("", |object| object.tag());
        log::info!("{} >> {}", message.tag, source);
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _delta: f32, _absolute: f32) -> EngineResult<()> {
        self.dump = ctx.scene().dump_graph();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GameObject, Scene};

    #[test]
    fn test_rejects_non_root_owner() {
        let mut scene = Scene::default();
        let child = scene.add_global_object(GameObject::new("child")).unwrap();
        let result = scene.add_component(child, DebugComponent::new());
        assert!(matches!(result, Err(EngineError::InvariantViolation(_))));
    }

    #[test]
    fn test_observes_messages_and_dumps_graph() {
        crate::foundation::logging::init_for_tests();
        let mut scene = Scene::default();
        scene.add_global_object(GameObject::new("cannon")).unwrap();
        let id = scene.add_global_component(DebugComponent::new()).unwrap();

        scene.send_tag("FIRE").unwrap();
        scene.send_tag("RELOAD").unwrap();
        scene.step(0.1).unwrap();

        let debug = scene.component::<DebugComponent>(id).unwrap();
        assert_eq!(debug.messages_seen(), 2);
        assert!(debug.dump().contains("'cannon'"));
        assert!(debug.dump().contains("DebugComponent"));
    }
}
