//! Game object: a node of the scene graph
//!
//! A game object owns its attributes, transform and mesh. Components and
//! children live in the scene arenas and are referenced by handle; the parent
//! link is a non-owning handle as well. Structural edits (components,
//! children, removal) go through `Scene` so they can be deferred while a
//! traversal is running.

use std::any::Any;

use bitflags::bitflags;

use crate::foundation::collections::{ComponentId, ObjectId};
use crate::scene::attributes::AttributeStore;
use crate::scene::mesh::Mesh;
use crate::scene::transform::Transform;

bitflags! {
    /// Capability/state flags of a game object
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectState: u32 {
        /// Visited by the draw pass
        const DRAWABLE = 1 << 0;
        /// Visited (with its subtree) by the update pass
        const UPDATABLE = 1 << 1;
        /// Its components receive messages
        const LISTENING = 1 << 2;
    }
}

impl Default for ObjectState {
    fn default() -> Self {
        Self::all()
    }
}

/// Where an object is in its life within the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Membership {
    /// Created mid-traversal, linked into its parent at the next graph commit
    PendingAttach,
    /// Reachable from the root
    Attached,
    /// Removal requested mid-traversal, destroyed at the next graph commit
    PendingRemoval,
}

/// Node of the scene graph
pub struct GameObject {
    pub(crate) id: ObjectId,
    pub(crate) serial: u64,
    tag: String,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) pending_components: Vec<ComponentId>,
    pub(crate) membership: Membership,
    attributes: AttributeStore,
    state: ObjectState,
    z_index: i32,
    /// Parent-relative transform
    pub transform: Transform,
    /// Mesh payload, opaque to the core
    pub mesh: Mesh,
}

impl GameObject {
    /// Create a detached object with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: ObjectId::default(),
            serial: 0,
            tag: tag.into(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            pending_components: Vec::new(),
            membership: Membership::PendingAttach,
            attributes: AttributeStore::new(),
            state: ObjectState::default(),
            z_index: 0,
            transform: Transform::default(),
            mesh: Mesh::default(),
        }
    }

    /// Handle of this object (null until added to a scene)
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Unique creation number within the scene
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Tag of this object
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Parent handle (`None` for the root)
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Children in child order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Live components in attachment order
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Components waiting for the next commit point
    pub fn pending_components(&self) -> &[ComponentId] {
        &self.pending_components
    }

    /// Check whether the object is reachable from the root
    pub fn is_attached(&self) -> bool {
        self.membership == Membership::Attached
    }

    /// Check whether removal of this object has been requested
    pub fn is_removal_pending(&self) -> bool {
        self.membership == Membership::PendingRemoval
    }

    /// Ordering key for the render step
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Set the ordering key for the render step
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    // ---- state flags ----

    /// Current state flags
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Set state flags
    pub fn add_state(&mut self, state: ObjectState) {
        self.state.insert(state);
    }

    /// Clear state flags
    pub fn remove_state(&mut self, state: ObjectState) {
        self.state.remove(state);
    }

    /// Check whether all given flags are set
    pub fn has_state(&self, state: ObjectState) -> bool {
        self.state.contains(state)
    }

    // ---- attributes ----

    /// Insert or overwrite an attribute
    pub fn add_attribute<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.attributes.set(key, value);
    }

    /// Overwrite an attribute; returns whether a previous value existed
    pub fn assign_attribute<T: Any>(&mut self, key: impl Into<String>, value: T) -> bool {
        self.attributes.set(key, value)
    }

    /// Get an attribute of type `T`
    pub fn attribute<T: Any>(&self, key: &str) -> Option<&T> {
        self.attributes.get(key)
    }

    /// Get a mutable attribute of type `T`
    pub fn attribute_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.attributes.get_mut(key)
    }

    /// Remove an attribute of type `T`
    pub fn remove_attribute<T: Any>(&mut self, key: &str) -> Option<T> {
        self.attributes.remove(key)
    }

    /// Attribute store
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Mutable attribute store
    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("serial", &self.serial)
            .field("tag", &self.tag)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("components", &self.components.len())
            .field("state", &self.state)
            .field("z_index", &self.z_index)
            .finish()
    }
}
