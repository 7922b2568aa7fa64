//! Handle types for the scene arenas
//!
//! Game objects, components and chain instructions live in slot maps and are
//! addressed by stable, generation-checked keys. Back-references (parent,
//! owner, previous instruction) are plain keys, never owning pointers.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Handle of a game object in the scene arena
    pub struct ObjectId;

    /// Handle of a component in the scene arena
    pub struct ComponentId;

    /// Handle of an instruction node inside a chain
    pub struct NodeId;
}

/// Handle-based map keyed by object handles
pub type ObjectMap<T> = SlotMap<ObjectId, T>;

/// Handle-based map keyed by component handles
pub type ComponentMap<T> = SlotMap<ComponentId, T>;
