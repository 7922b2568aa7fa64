//! Scene: arenas, graph structure, update pass and commit points

use std::any::Any;

use crate::core::config::SceneConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::MessageBus;
use crate::foundation::collections::{ComponentId, ComponentMap, ObjectId, ObjectMap};
use crate::scene::game_object::{GameObject, Membership, ObjectState};
use crate::scene::invocation::{Invocation, InvocationQueue};
use crate::scene::lifecycle::ComponentSlot;
use crate::scene::transform::Transform;

/// Tag given to the root object
pub const ROOT_TAG: &str = "root";

/// Owner of the whole graph and everything attached to it
///
/// Objects and components are stored in arenas and addressed by
/// [`ObjectId`] / [`ComponentId`] handles. The root object always exists; its
/// children form the reachable graph and it also carries the global
/// attributes and components.
pub struct Scene {
    config: SceneConfig,
    pub(crate) objects: ObjectMap<GameObject>,
    pub(crate) components: ComponentMap<ComponentSlot>,
    root: ObjectId,
    pub(crate) bus: MessageBus,
    invocations: InvocationQueue,
    delta: f32,
    absolute: f32,
    frame: u64,
    next_serial: u64,

    /// Nesting of running traversals and component hooks; edits are queued while > 0
    traversal_depth: u32,
    pending_attach: Vec<ObjectId>,
    pending_removal: Vec<ObjectId>,
    /// Objects whose component lists have uncommitted changes
    pub(crate) dirty_objects: Vec<ObjectId>,
}

impl Scene {
    /// Create an empty scene holding only the root object
    pub fn new(config: SceneConfig) -> Self {
        let mut objects = ObjectMap::with_key();
        let mut root = GameObject::new(ROOT_TAG);
        root.membership = Membership::Attached;
        let root = objects.insert_with_key(|id| {
            root.id = id;
            root
        });

        Self {
            config,
            objects,
            components: ComponentMap::with_key(),
            root,
            bus: MessageBus::new(),
            invocations: InvocationQueue::new(),
            delta: 0.0,
            absolute: 0.0,
            frame: 0,
            next_serial: 1,
            traversal_depth: 0,
            pending_attach: Vec::new(),
            pending_removal: Vec::new(),
            dirty_objects: Vec::new(),
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Scene width in units
    pub fn width(&self) -> f32 {
        self.config.width
    }

    /// Scene height in units
    pub fn height(&self) -> f32 {
        self.config.height
    }

    /// Set the scene width in units
    pub fn set_width(&mut self, width: f32) {
        self.config.width = width;
    }

    /// Set the scene height in units
    pub fn set_height(&mut self, height: f32) {
        self.config.height = height;
    }

    /// Absolute time of the current frame
    pub fn absolute_time(&self) -> f32 {
        self.absolute
    }

    /// Delta time of the current frame
    pub fn delta_time(&self) -> f32 {
        self.delta
    }

    /// Number of update passes run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Check whether a traversal or component hook is running
    pub fn is_traversing(&self) -> bool {
        self.traversal_depth > 0
    }

    // ---- objects ----

    /// Handle of the root object
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Get an object
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Get an object mutably
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Check whether a handle still refers to an object
    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of objects in the arena, root included
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Add an object as a child of the root
    pub fn add_global_object(&mut self, object: GameObject) -> EngineResult<ObjectId> {
        self.add_child_object(self.root, object)
    }

    /// Add an object as the last child of `parent`
    ///
    /// The object is linked into the graph immediately, or at the next graph
    /// commit when called mid-traversal.
    pub fn add_child_object(&mut self, parent: ObjectId, mut object: GameObject) -> EngineResult<ObjectId> {
        match self.objects.get(parent) {
            Some(p) if p.membership != Membership::PendingRemoval => {}
            _ => return Err(EngineError::ObjectNotFound(parent)),
        }

        object.serial = self.next_serial;
        self.next_serial += 1;
        object.parent = Some(parent);
        object.membership = Membership::PendingAttach;
        let id = self.objects.insert_with_key(|id| {
            object.id = id;
            object
        });

        self.enter();
        self.pending_attach.push(id);
        self.leave()?;
        Ok(id)
    }

    /// Remove an object and its whole subtree
    ///
    /// Mid-traversal the subtree stops receiving messages and disappears from
    /// tag lookup at once; destruction happens at the next graph commit.
    pub fn remove_object(&mut self, id: ObjectId) -> EngineResult<()> {
        if id == self.root {
            return Err(EngineError::InvariantViolation(
                "the scene root cannot be removed, use clear_scene".to_string(),
            ));
        }
        match self.objects.get(id) {
            None => return Err(EngineError::ObjectNotFound(id)),
            Some(object) if object.membership == Membership::PendingRemoval => return Ok(()),
            Some(_) => {}
        }

        self.mark_subtree_removed(id);
        self.enter();
        self.pending_removal.push(id);
        self.leave()
    }

    /// Flag a subtree as pending removal and drop its subscriptions
    fn mark_subtree_removed(&mut self, id: ObjectId) {
        for current in self.subtree(id) {
            let Some(object) = self.objects.get_mut(current) else {
                continue;
            };
            object.membership = Membership::PendingRemoval;
            let components: Vec<ComponentId> =
                object.components.iter().chain(&object.pending_components).copied().collect();
            for component in components {
                self.bus.unsubscribe_all(component);
            }
        }
    }

    /// Apply queued graph and component changes now
    ///
    /// Ignored while a traversal is running; the changes are applied when it
    /// returns.
    pub fn submit_changes(&mut self) -> EngineResult<()> {
        if self.is_traversing() {
            log::trace!("submit_changes deferred, traversal in progress");
            return Ok(());
        }
        self.commit_pending()
    }

    /// Remove every object below the root, the root's components and
    /// attributes, pending invocations and subscriptions
    pub fn clear_scene(&mut self) -> EngineResult<()> {
        log::info!("clearing scene ({} objects)", self.objects.len());
        self.invocations.clear();
        let root = self.root;
        let children = self.objects.get(root).map(|r| r.children.clone()).unwrap_or_default();
        let components = self
            .objects
            .get(root)
            .map(|r| r.components.iter().chain(&r.pending_components).copied().collect::<Vec<_>>())
            .unwrap_or_default();

        self.enter();
        for child in children {
            match self.objects.get(child) {
                Some(object) if object.membership != Membership::PendingRemoval => {
                    self.mark_subtree_removed(child);
                    self.pending_removal.push(child);
                }
                _ => {}
            }
        }
        for component in components {
            self.mark_removed(component);
        }
        if let Some(root) = self.objects.get_mut(root) {
            root.attributes_mut().clear();
        }
        self.leave()?;

        if !self.is_traversing() {
            self.bus.clear();
        }
        Ok(())
    }

    // ---- global attributes ----

    /// Insert or overwrite an attribute on the root object
    pub fn add_global_attribute<T: Any>(&mut self, key: impl Into<String>, value: T) {
        let root = self.root;
        if let Some(root) = self.objects.get_mut(root) {
            root.add_attribute(key, value);
        }
    }

    /// Get an attribute of the root object
    pub fn global_attribute<T: Any>(&self, key: &str) -> Option<&T> {
        self.objects.get(self.root)?.attribute(key)
    }

    /// Get an attribute of the root object mutably
    pub fn global_attribute_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        let root = self.root;
        self.objects.get_mut(root)?.attribute_mut(key)
    }

    // ---- queries ----

    /// Reachable objects in depth-first pre-order, root first
    ///
    /// Objects awaiting attachment or removal are not reachable.
    pub fn walk(&self) -> Vec<ObjectId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            if object.membership != Membership::Attached {
                continue;
            }
            order.push(id);
            stack.extend(object.children.iter().rev());
        }
        order
    }

    /// First reachable object with the tag, in depth-first order
    pub fn find_object_by_tag(&self, tag: &str) -> Option<ObjectId> {
        self.walk()
            .into_iter()
            .find(|id| self.objects.get(*id).is_some_and(|o| o.tag() == tag))
    }

    /// Every reachable object with the tag, in depth-first order
    pub fn find_objects_by_tag(&self, tag: &str) -> Vec<ObjectId> {
        self.walk()
            .into_iter()
            .filter(|id| self.objects.get(*id).is_some_and(|o| o.tag() == tag))
            .collect()
    }

    /// `id` and all its attached descendants
    fn subtree(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.get(current) {
                result.push(current);
                stack.extend(object.children.iter().copied());
            }
        }
        result
    }

    // ---- transforms ----

    /// Recompute the absolute transform of an object and its ancestors
    pub fn refresh_transform(&mut self, id: ObjectId) {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(object) = current.and_then(|c| self.objects.get(c)) {
            chain.push(object.id);
            current = object.parent;
        }

        let mut parent: Option<Transform> = None;
        for object_id in chain.into_iter().rev() {
            if let Some(object) = self.objects.get_mut(object_id) {
                object.transform.update_absolute(parent.as_ref());
                parent = Some(object.transform.clone());
            }
        }
    }

    /// Recompute the absolute transforms of every reachable object
    pub fn refresh_transforms(&mut self) {
        let mut stack: Vec<(ObjectId, Option<Transform>)> = vec![(self.root, None)];
        while let Some((id, parent)) = stack.pop() {
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            object.transform.update_absolute(parent.as_ref());
            let transform = object.transform.clone();
            for child in object.children.iter().rev() {
                stack.push((*child, Some(transform.clone())));
            }
        }
    }

    // ---- invocations ----

    /// Schedule a one-shot callback `delay` seconds from now
    ///
    /// A non-positive delay fires on the next update, never synchronously.
    pub fn add_pending_invocation<F>(&mut self, delay: f32, callback: F)
    where
        F: FnOnce(&mut Scene) -> EngineResult<()> + 'static,
    {
        let callback: Invocation = Box::new(callback);
        self.invocations.schedule(self.absolute, delay, callback);
    }

    /// Number of invocations waiting to fire
    pub fn pending_invocations(&self) -> usize {
        self.invocations.len()
    }

    // ---- update pass ----

    /// Run one frame: fire due invocations, then update the whole graph
    pub fn update(&mut self, delta: f32, absolute: f32) -> EngineResult<()> {
        self.delta = delta;
        self.absolute = absolute;
        self.frame += 1;

        let due = self.invocations.take_due(absolute);
        if !due.is_empty() {
            log::debug!("firing {} pending invocation(s) at {:.3}", due.len(), absolute);
        }
        for invocation in due {
            invocation(self)?;
        }

        self.enter();
        let result = self.update_object(self.root, delta, absolute);
        let commit = self.leave();
        result.and(commit)
    }

    /// Advance the scene clock by `delta` and run one frame
    pub fn step(&mut self, delta: f32) -> EngineResult<()> {
        self.update(delta, self.absolute + delta)
    }

    fn update_object(&mut self, id: ObjectId, delta: f32, absolute: f32) -> EngineResult<()> {
        match self.objects.get(id) {
            Some(object) if object.membership == Membership::Attached && object.has_state(ObjectState::UPDATABLE) => {}
            _ => return Ok(()),
        }

        self.commit_components(id)?;

        let components = self.objects.get(id).map(|o| o.components.clone()).unwrap_or_default();
        for component in components {
            if !self.is_removal_pending(id) && self.is_updatable(component) {
                self.dispatch(component, |behavior, ctx| behavior.on_update(ctx, delta, absolute))?;
            }
        }

        let children = self.objects.get(id).map(|o| o.children.clone()).unwrap_or_default();
        for child in children {
            self.update_object(child, delta, absolute)?;
        }

        self.commit_components(id)
    }

    fn is_removal_pending(&self, id: ObjectId) -> bool {
        self.objects
            .get(id)
            .map_or(true, |o| o.membership == Membership::PendingRemoval)
    }

    // ---- commit points ----

    pub(crate) fn enter(&mut self) {
        self.traversal_depth += 1;
    }

    /// Leave a traversal; the outermost one commits everything queued
    pub(crate) fn leave(&mut self) -> EngineResult<()> {
        self.traversal_depth = self.traversal_depth.saturating_sub(1);
        if self.traversal_depth == 0 {
            self.commit_pending()
        } else {
            Ok(())
        }
    }

    fn commit_pending(&mut self) -> EngineResult<()> {
        // hooks fired while committing queue their edits for this same loop
        self.traversal_depth += 1;
        let result = self.drain_pending();
        self.traversal_depth -= 1;
        result
    }

    fn drain_pending(&mut self) -> EngineResult<()> {
        loop {
            let attach = std::mem::take(&mut self.pending_attach);
            let removal = std::mem::take(&mut self.pending_removal);
            let dirty = std::mem::take(&mut self.dirty_objects);
            if attach.is_empty() && removal.is_empty() && dirty.is_empty() {
                return Ok(());
            }

            for id in attach {
                self.attach_object(id)?;
            }
            for id in removal {
                self.destroy_object(id)?;
            }
            for id in dirty {
                self.commit_components(id)?;
            }
        }
    }

    fn attach_object(&mut self, id: ObjectId) -> EngineResult<()> {
        let Some(object) = self.objects.get(id) else {
            return Ok(());
        };
        if object.membership != Membership::PendingAttach {
            return Ok(());
        }
        let parent = object.parent;

        let parent_alive = parent
            .and_then(|p| self.objects.get(p))
            .is_some_and(|p| p.membership != Membership::PendingRemoval);
        if !parent_alive {
            // parent went away before the commit: the object never joins the graph
            log::debug!("dropping object {:?}, parent removed before attach", id);
            if let Some(object) = self.objects.get_mut(id) {
                object.membership = Membership::PendingRemoval;
            }
            return self.destroy_object(id);
        }

        if let Some(parent) = parent.and_then(|p| self.objects.get_mut(p)) {
            parent.children.push(id);
        }
        if let Some(object) = self.objects.get_mut(id) {
            object.membership = Membership::Attached;
            log::debug!("attached object '{}' #{}", object.tag(), object.serial());
        }
        self.refresh_transform(id);
        self.commit_components(id)
    }

    /// Destroy an object: children first, then its components, then the object
    fn destroy_object(&mut self, id: ObjectId) -> EngineResult<()> {
        let Some(object) = self.objects.get(id) else {
            return Ok(());
        };
        let children = object.children.clone();
        for child in children {
            self.destroy_object(child)?;
        }

        let components: Vec<ComponentId> = self
            .objects
            .get(id)
            .map(|o| o.components.iter().chain(&o.pending_components).copied().collect())
            .unwrap_or_default();
        for component in components {
            self.detach_component(component)?;
        }

        if let Some(object) = self.objects.remove(id) {
            if let Some(parent) = object.parent.and_then(|p| self.objects.get_mut(p)) {
                parent.children.retain(|child| *child != id);
            }
            log::debug!("removed object '{}' #{}", object.tag(), object.serial());
        }
        Ok(())
    }

    /// Textual dump of the reachable graph
    pub fn dump_graph(&self) -> String {
        let mut out = String::new();
        self.dump_object(self.root, 0, &mut out);
        out
    }

    fn dump_object(&self, id: ObjectId, depth: usize, out: &mut String) {
        let Some(object) = self.objects.get(id) else {
            return;
        };
        let position = object.transform.position;
        let absolute = object.transform.absolute_position();
        let mut attributes: Vec<&str> = object.attributes().keys().collect();
        attributes.sort_unstable();
        let components: Vec<&str> = object
            .components
            .iter()
            .filter_map(|c| self.components.get(*c).map(|slot| slot.name.as_str()))
            .collect();

        out.push_str(&format!(
            "{:indent$}#{} '{}' rel:[{:.2}, {:.2}] abs:[{:.2}, {:.2}] rot:{:.2} z:{} attrs:{:?} components:{:?}\n",
            "",
            object.serial(),
            object.tag(),
            position.x,
            position.y,
            absolute.x,
            absolute.y,
            object.transform.rotation,
            object.z_index(),
            attributes,
            components,
            indent = depth * 2,
        ));
        for child in &object.children {
            self.dump_object(*child, depth + 1, out);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("components", &self.components.len())
            .field("absolute", &self.absolute)
            .field("frame", &self.frame)
            .field("pending_invocations", &self.invocations.len())
            .finish()
    }
}
