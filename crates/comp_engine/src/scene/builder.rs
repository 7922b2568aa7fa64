//! Fluent construction of game objects

use std::any::Any;

use crate::components::Component;
use crate::error::EngineResult;
use crate::foundation::collections::ObjectId;
use crate::scene::game_object::{GameObject, ObjectState};
use crate::scene::mesh::Mesh;
use crate::scene::Scene;

type AttributeSetter = Box<dyn FnOnce(&mut GameObject)>;

/// Builder assembling a game object and committing it into a scene
///
/// ```
/// use comp_engine::prelude::*;
///
/// let mut scene = Scene::default();
/// let cannon = GameObjectBuilder::new("cannon")
///     .with_position(3.0, 9.0)
///     .with_mesh(Mesh::rect("#333", 1.0, 2.0))
///     .with_centered_origin()
///     .with_component(BasicRenderer::new())
///     .as_global()
///     .build(&mut scene)
///     .unwrap();
/// assert_eq!(scene.find_object_by_tag("cannon"), Some(cannon));
/// ```
pub struct GameObjectBuilder {
    object: GameObject,
    parent: Option<ObjectId>,
    centered_origin: bool,
    attributes: Vec<AttributeSetter>,
    components: Vec<Box<dyn Component>>,
}

impl GameObjectBuilder {
    /// Start building an object with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            object: GameObject::new(tag),
            parent: None,
            centered_origin: false,
            attributes: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Set the parent-relative position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.object.transform.set_position(x, y);
        self
    }

    /// Set the parent-relative rotation
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.object.transform.rotation = rotation;
        self
    }

    /// Set the rotation pivot
    pub fn with_rotation_offset(mut self, x: f32, y: f32) -> Self {
        self.object.transform = self.object.transform.with_rotation_offset(x, y);
        self.centered_origin = false;
        self
    }

    /// Put the rotation pivot at the center of the mesh (resolved at build time)
    pub fn with_centered_origin(mut self) -> Self {
        self.centered_origin = true;
        self
    }

    /// Set the render ordering key
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.object.set_z_index(z_index);
        self
    }

    /// Set the mesh
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.object.mesh = mesh;
        self
    }

    /// Replace the state flags
    pub fn with_state(mut self, state: ObjectState) -> Self {
        let current = self.object.state();
        self.object.remove_state(current);
        self.object.add_state(state);
        self
    }

    /// Add an attribute
    pub fn with_attribute<T: Any>(mut self, key: impl Into<String>, value: T) -> Self {
        let key = key.into();
        self.attributes.push(Box::new(move |object| object.add_attribute(key, value)));
        self
    }

    /// Add a component; components are attached in call order
    pub fn with_component<C: Component>(mut self, component: C) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Attach under an existing object
    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach directly under the scene root (the default)
    pub fn as_global(mut self) -> Self {
        self.parent = None;
        self
    }

    /// Commit the object into the scene and return its handle
    pub fn build(self, scene: &mut Scene) -> EngineResult<ObjectId> {
        let Self {
            mut object,
            parent,
            centered_origin,
            attributes,
            components,
        } = self;

        if centered_origin {
            let (width, height) = (object.mesh.width, object.mesh.height);
            object.transform = object.transform.with_rotation_offset(width / 2.0, height / 2.0);
        }
        for set in attributes {
            set(&mut object);
        }

        let parent = parent.unwrap_or_else(|| scene.root());
        let id = scene.add_child_object(parent, object)?;
        for component in components {
            scene.add_boxed_component(id, component)?;
        }
        Ok(id)
    }
}
