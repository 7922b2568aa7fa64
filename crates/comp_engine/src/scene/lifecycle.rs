//! Component attachment, hook dispatch, finishing and detachment
//!
//! A component's boxed behavior is taken out of its slot while one of its
//! hooks runs, which lets the hook borrow the whole scene mutably. Messages
//! addressed to it meanwhile wait in the slot's inbox and are delivered as
//! soon as the hook returns.

use std::rc::Rc;

use bitflags::bitflags;

use crate::components::{Component, ComponentContext};
use crate::error::{EngineError, EngineResult};
use crate::events::Message;
use crate::foundation::collections::{ComponentId, ObjectId};
use crate::scene::game_object::Membership;
use crate::scene::Scene;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ComponentFlags: u8 {
        const INITIALIZED = 1 << 0;
        const FINISHED = 1 << 1;
        const FINISH_NOTIFIED = 1 << 2;
        const ENABLED = 1 << 3;
    }
}

/// Arena entry of a component
pub(crate) struct ComponentSlot {
    pub(crate) name: String,
    pub(crate) owner: ObjectId,
    pub(crate) behavior: Option<Box<dyn Component>>,
    pub(crate) flags: ComponentFlags,
    pub(crate) inbox: Vec<Rc<Message>>,
}

impl ComponentSlot {
    fn new(owner: ObjectId, behavior: Box<dyn Component>) -> Self {
        Self {
            name: behavior.name().to_string(),
            owner,
            behavior: Some(behavior),
            flags: ComponentFlags::ENABLED,
            inbox: Vec::new(),
        }
    }
}

impl Scene {
    /// Attach a component to an object
    ///
    /// Outside a traversal the component is initialized before this returns;
    /// mid-traversal it joins its owner at the owner's next commit point.
    /// The component is validated first and rejected if invalid.
    pub fn add_component<C: Component>(&mut self, owner: ObjectId, component: C) -> EngineResult<ComponentId> {
        self.add_boxed_component(owner, Box::new(component))
    }

    /// Attach an already boxed component
    pub fn add_boxed_component(&mut self, owner: ObjectId, behavior: Box<dyn Component>) -> EngineResult<ComponentId> {
        behavior.validate()?;
        match self.objects.get(owner) {
            Some(object) if object.membership != Membership::PendingRemoval => {}
            _ => return Err(EngineError::ObjectNotFound(owner)),
        }

        let id = self.components.insert(ComponentSlot::new(owner, behavior));
        self.enter();
        if let Some(object) = self.objects.get_mut(owner) {
            object.pending_components.push(id);
        }
        self.dirty_objects.push(owner);
        self.leave()?;
        Ok(id)
    }

    /// Attach a component to the root object
    pub fn add_global_component<C: Component>(&mut self, component: C) -> EngineResult<ComponentId> {
        self.add_component(self.root(), component)
    }

    /// Finish and detach a component
    ///
    /// Takes effect immediately outside a traversal, otherwise when the
    /// outermost traversal returns.
    pub fn remove_component(&mut self, id: ComponentId) -> EngineResult<()> {
        if !self.components.contains_key(id) {
            return Err(EngineError::ComponentNotFound(id));
        }
        self.enter();
        self.mark_removed(id);
        self.leave()
    }

    /// Remove the first live component of `owner` with the given name
    ///
    /// Returns whether a component was found.
    pub fn remove_component_by_name(&mut self, owner: ObjectId, name: &str) -> EngineResult<bool> {
        if !self.objects.contains_key(owner) {
            return Err(EngineError::ObjectNotFound(owner));
        }
        match self.find_component(owner, name) {
            Some(id) => self.remove_component(id).map(|()| true),
            None => Ok(false),
        }
    }

    /// Mark a component finished and run its finish hook
    ///
    /// The component stays attached until its owner's next commit point. If
    /// the component's own hook is running, the finish hook runs right after
    /// it returns.
    pub fn finish_component(&mut self, id: ComponentId) -> EngineResult<()> {
        if !self.components.contains_key(id) {
            return Err(EngineError::ComponentNotFound(id));
        }
        self.mark_finished(id);
        self.notify_finish(id)
    }

    /// Check whether a component has finished; detached components count as finished
    pub fn is_finished(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .map_or(true, |slot| slot.flags.contains(ComponentFlags::FINISHED))
    }

    /// Enable or disable a component's update hook
    pub fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> EngineResult<()> {
        let slot = self.components.get_mut(id).ok_or(EngineError::ComponentNotFound(id))?;
        slot.flags.set(ComponentFlags::ENABLED, enabled);
        Ok(())
    }

    /// Check whether a component's update hook is enabled
    pub fn is_component_enabled(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|slot| slot.flags.contains(ComponentFlags::ENABLED))
    }

    /// Check whether a component is live: initialized and attached to its owner
    pub fn is_component_attached(&self, id: ComponentId) -> bool {
        self.components
            .get(id)
            .is_some_and(|slot| slot.flags.contains(ComponentFlags::INITIALIZED))
    }

    /// Check whether a handle still refers to a component
    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Number of components in the arena
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Borrow a component as its concrete type
    ///
    /// Returns `None` while one of the component's own hooks is running.
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.components
            .get(id)?
            .behavior
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutably borrow a component as its concrete type
    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.components
            .get_mut(id)?
            .behavior
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Name of a component
    pub fn component_name(&self, id: ComponentId) -> Option<&str> {
        self.components.get(id).map(|slot| slot.name.as_str())
    }

    /// Owner of a component
    pub fn component_owner(&self, id: ComponentId) -> Option<ObjectId> {
        self.components.get(id).map(|slot| slot.owner)
    }

    /// First unfinished component of `owner` with the given name, live before pending
    pub fn find_component(&self, owner: ObjectId, name: &str) -> Option<ComponentId> {
        let object = self.objects.get(owner)?;
        object
            .components
            .iter()
            .chain(&object.pending_components)
            .copied()
            .find(|id| {
                self.components
                    .get(*id)
                    .is_some_and(|slot| slot.name == name && !slot.flags.contains(ComponentFlags::FINISHED))
            })
    }

    // ---- internals ----

    pub(crate) fn mark_finished(&mut self, id: ComponentId) {
        if let Some(slot) = self.components.get_mut(id) {
            slot.flags.insert(ComponentFlags::FINISHED);
        }
    }

    /// Finish a component and queue its owner for a commit
    pub(crate) fn mark_removed(&mut self, id: ComponentId) {
        if let Some(slot) = self.components.get_mut(id) {
            slot.flags.insert(ComponentFlags::FINISHED);
            self.dirty_objects.push(slot.owner);
        }
    }

    pub(crate) fn is_updatable(&self, id: ComponentId) -> bool {
        self.components.get(id).is_some_and(|slot| {
            slot.behavior.is_some()
                && slot.flags.contains(ComponentFlags::INITIALIZED | ComponentFlags::ENABLED)
                && !slot.flags.contains(ComponentFlags::FINISHED)
        })
    }

    /// Run one hook of a component with the behavior taken out of its slot
    pub(crate) fn dispatch<F>(&mut self, id: ComponentId, hook: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Box<dyn Component>, &mut ComponentContext<'_>) -> EngineResult<()>,
    {
        let Some(slot) = self.components.get_mut(id) else {
            return Ok(());
        };
        let Some(mut behavior) = slot.behavior.take() else {
            return Ok(());
        };
        let owner = slot.owner;

        self.enter();
        let result = hook(&mut behavior, &mut ComponentContext::new(self, id, owner));
        if let Some(slot) = self.components.get_mut(id) {
            slot.behavior = Some(behavior);
        }
        let follow_up = if result.is_ok() { self.after_dispatch(id) } else { Ok(()) };
        let commit = self.leave();
        result.and(follow_up).and(commit)
    }

    /// Deliver messages queued while the hook ran, then a pending finish notification
    fn after_dispatch(&mut self, id: ComponentId) -> EngineResult<()> {
        loop {
            let inbox = match self.components.get_mut(id) {
                Some(slot) if !slot.inbox.is_empty() => std::mem::take(&mut slot.inbox),
                _ => break,
            };
            for message in inbox {
                self.deliver(id, &message)?;
            }
        }
        self.notify_finish(id)
    }

    /// Run the finish hook once, if the component is finished and not busy
    pub(crate) fn notify_finish(&mut self, id: ComponentId) -> EngineResult<()> {
        let Some(slot) = self.components.get_mut(id) else {
            return Ok(());
        };
        let ready = slot.flags.contains(ComponentFlags::FINISHED | ComponentFlags::INITIALIZED)
            && !slot.flags.contains(ComponentFlags::FINISH_NOTIFIED)
            && slot.behavior.is_some();
        if !ready {
            return Ok(());
        }
        slot.flags.insert(ComponentFlags::FINISH_NOTIFIED);
        log::debug!("component '{}' finished", slot.name);
        self.dispatch(id, |behavior, ctx| behavior.on_finish(ctx))
    }

    /// Commit an object's component list: detach finished components, then
    /// initialize pending ones
    pub(crate) fn commit_components(&mut self, owner: ObjectId) -> EngineResult<()> {
        loop {
            let Some(object) = self.objects.get_mut(owner) else {
                return Ok(());
            };
            if object.membership != Membership::Attached {
                return Ok(());
            }
            let pending = std::mem::take(&mut object.pending_components);
            let finished: Vec<ComponentId> = object
                .components
                .iter()
                .copied()
                .filter(|id| {
                    self.components.get(*id).is_some_and(|slot| {
                        slot.flags.contains(ComponentFlags::FINISHED) && slot.behavior.is_some()
                    })
                })
                .collect();
            if pending.is_empty() && finished.is_empty() {
                return Ok(());
            }

            for id in finished {
                self.detach_component(id)?;
            }
            for id in pending {
                self.init_component(owner, id)?;
            }
        }
    }

    fn init_component(&mut self, owner: ObjectId, id: ComponentId) -> EngineResult<()> {
        let Some(slot) = self.components.get_mut(id) else {
            return Ok(());
        };
        if slot.flags.contains(ComponentFlags::FINISHED) {
            // removed before it was ever attached
            return self.detach_component(id);
        }
        slot.flags.insert(ComponentFlags::INITIALIZED);
        log::debug!("attached component '{}' to object {:?}", slot.name, owner);
        if let Some(object) = self.objects.get_mut(owner) {
            object.components.push(id);
        }
        self.dispatch(id, |behavior, ctx| behavior.on_init(ctx))
    }

    /// Finish (if needed), unsubscribe and drop a component
    pub(crate) fn detach_component(&mut self, id: ComponentId) -> EngineResult<()> {
        self.mark_finished(id);
        self.notify_finish(id)?;
        self.bus.unsubscribe_all(id);

        if let Some(slot) = self.components.remove(id) {
            if let Some(object) = self.objects.get_mut(slot.owner) {
                object.components.retain(|c| *c != id);
                object.pending_components.retain(|c| *c != id);
            }
            log::debug!("detached component '{}'", slot.name);
        }
        Ok(())
    }
}
