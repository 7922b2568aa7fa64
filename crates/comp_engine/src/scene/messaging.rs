//! Message dispatch through the scene's bus

use std::rc::Rc;

use crate::error::EngineResult;
use crate::events::{Message, MessageTag};
use crate::foundation::collections::ComponentId;
use crate::scene::game_object::{Membership, ObjectState};
use crate::scene::lifecycle::ComponentFlags;
use crate::scene::Scene;

impl Scene {
    /// Subscribe a component to a tag (`MessageTag::ALL` for every message)
    pub fn subscribe(&mut self, component: ComponentId, tag: impl Into<MessageTag>) {
        if self.components.contains_key(component) {
            self.bus.subscribe(tag.into(), component);
        }
    }

    /// Unsubscribe a component from a tag; returns whether it was subscribed
    pub fn unsubscribe(&mut self, component: ComponentId, tag: impl Into<MessageTag>) -> bool {
        self.bus.unsubscribe(&tag.into(), component)
    }

    /// Check whether a component is subscribed to a tag
    pub fn is_subscribed(&self, component: ComponentId, tag: impl Into<MessageTag>) -> bool {
        self.bus.is_subscribed(&tag.into(), component)
    }

    /// Send a message carrying only a tag
    pub fn send_tag(&mut self, tag: impl Into<MessageTag>) -> EngineResult<()> {
        self.send_message(Message::new(tag))
    }

    /// Deliver a message synchronously to every subscriber of its tag and of
    /// the wildcard, in subscription order
    ///
    /// Subscribers are snapshotted when dispatch starts. Components that
    /// finish or whose owner is removed during dispatch receive nothing more.
    pub fn send_message(&mut self, mut message: Message) -> EngineResult<()> {
        message.timestamp = self.absolute_time();
        let message = Rc::new(message);
        let subscribers = self.bus.subscribers(&message.tag);
        log::trace!("dispatching '{}' to {} subscriber(s)", message.tag, subscribers.len());

        self.enter();
        let mut result = Ok(());
        for component in subscribers {
            result = self.deliver(component, &message);
            if result.is_err() {
                break;
            }
        }
        let commit = self.leave();
        result.and(commit)
    }

    /// Hand a message to one component, queuing it if the component is busy
    pub(crate) fn deliver(&mut self, component: ComponentId, message: &Rc<Message>) -> EngineResult<()> {
        let Some(slot) = self.components.get(component) else {
            return Ok(());
        };
        if !slot.flags.contains(ComponentFlags::INITIALIZED) || slot.flags.contains(ComponentFlags::FINISHED) {
            return Ok(());
        }
        let listening = self.objects.get(slot.owner).is_some_and(|owner| {
            owner.membership != Membership::PendingRemoval && owner.has_state(ObjectState::LISTENING)
        });
        if !listening {
            return Ok(());
        }

        if slot.behavior.is_none() {
            if let Some(slot) = self.components.get_mut(component) {
                slot.inbox.push(Rc::clone(message));
            }
            return Ok(());
        }
        self.dispatch(component, |behavior, ctx| behavior.on_message(ctx, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Component, ComponentContext};
    use crate::scene::GameObject;
    use std::cell::RefCell;

    struct Listener {
        tag: MessageTag,
        seen: Rc<RefCell<Vec<String>>>,
        label: &'static str,
    }

    impl Component for Listener {
        fn on_init(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
            ctx.subscribe(self.tag.clone());
            Ok(())
        }

        fn on_message(&mut self, _ctx: &mut ComponentContext<'_>, message: &Message) -> EngineResult<()> {
            self.seen.borrow_mut().push(format!("{}:{}", self.label, message.tag));
            Ok(())
        }
    }

    fn listener(tag: MessageTag, label: &'static str, seen: &Rc<RefCell<Vec<String>>>) -> Listener {
        Listener {
            tag,
            seen: seen.clone(),
            label,
        }
    }

    #[test]
    fn test_tag_and_wildcard_delivery_order() {
        let mut scene = Scene::default();
        let object = scene.add_global_object(GameObject::new("listeners")).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        scene.add_component(object, listener("SHOT".into(), "a", &seen)).unwrap();
        scene.add_component(object, listener(MessageTag::ALL, "b", &seen)).unwrap();
        scene.add_component(object, listener("OTHER".into(), "c", &seen)).unwrap();

        scene.send_tag("SHOT").unwrap();
        scene.send_tag("OTHER").unwrap();
        assert_eq!(*seen.borrow(), vec!["a:SHOT", "b:SHOT", "b:OTHER", "c:OTHER"]);
    }

    #[test]
    fn test_not_listening_objects_are_skipped() {
        let mut scene = Scene::default();
        let object = scene.add_global_object(GameObject::new("deaf")).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        scene.add_component(object, listener("PING".into(), "a", &seen)).unwrap();
        scene.object_mut(object).unwrap().remove_state(ObjectState::LISTENING);

        scene.send_tag("PING").unwrap();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_message_timestamp_is_scene_time() {
        struct Stamp(Rc<RefCell<Vec<f32>>>);
        impl Component for Stamp {
            fn on_init(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
                ctx.subscribe("T");
                Ok(())
            }
            fn on_message(&mut self, _ctx: &mut ComponentContext<'_>, message: &Message) -> EngineResult<()> {
                self.0.borrow_mut().push(message.timestamp);
                Ok(())
            }
        }

        let mut scene = Scene::default();
        let stamps = Rc::new(RefCell::new(Vec::new()));
        scene.add_global_component(Stamp(stamps.clone())).unwrap();
        scene.step(0.5).unwrap();
        scene.send_tag("T").unwrap();
        assert_eq!(*stamps.borrow(), vec![0.5]);
    }
}
