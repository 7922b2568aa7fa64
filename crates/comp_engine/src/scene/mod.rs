//! Scene graph, component lifecycle and messaging
//!
//! ## Architecture
//!
//! ```text
//! Scene (root GameObject, arenas, message bus, invocation queue)
//!      ↓
//! GameObject tree (transform, mesh, attributes)
//!      ↓
//! Components (init / update / message / finish / draw hooks)
//! ```
//!
//! The scene owns every object and component in slot-map arenas; the tree is
//! expressed with handles. Structural edits requested while a traversal or a
//! component hook is running are queued and committed at well-defined points:
//! - an object's component list is committed right before and right after its
//!   own update pass
//! - object attachment and removal are committed when the outermost
//!   traversal or dispatch returns
//!
//! Edits made from outside any traversal take effect immediately.

mod attributes;
mod builder;
mod game_object;
mod invocation;
mod lifecycle;
mod mesh;
mod messaging;
mod render;
mod scene_graph;
mod transform;

pub use attributes::AttributeStore;
pub use builder::GameObjectBuilder;
pub use game_object::{GameObject, ObjectState};
pub use invocation::{Invocation, InvocationQueue};
pub use mesh::{CollectionSprite, Mesh, MeshShape, SpriteFrame, TextAlign};
pub use scene_graph::Scene;
pub use transform::Transform;

pub(crate) use game_object::Membership;
