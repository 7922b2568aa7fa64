//! Instruction parameters: literals or producers evaluated lazily

use crate::components::Component;
use crate::foundation::collections::{ComponentId, ObjectId};
use crate::scene::Scene;

/// Predicate evaluated against the scene
pub type Predicate = Box<dyn FnMut(&Scene) -> bool>;

/// Value computed from the scene when an instruction is visited
pub type Producer<T> = Box<dyn FnMut(&Scene) -> T>;

/// Literal value or producer
pub enum Param<T> {
    /// Fixed value
    Value(T),
    /// Computed on demand
    Producer(Producer<T>),
}

/// Parameter evaluated once per visitation and cached until reset
pub struct Lazy<T> {
    source: Param<T>,
    cached: Option<T>,
}

impl<T: Clone> Lazy<T> {
    /// Lazy literal
    pub fn value(value: T) -> Self {
        Self {
            source: Param::Value(value),
            cached: None,
        }
    }

    /// Lazy producer
    pub fn producer(producer: impl FnMut(&Scene) -> T + 'static) -> Self {
        Self {
            source: Param::Producer(Box::new(producer)),
            cached: None,
        }
    }

    /// Cached value, evaluating the source on first access
    pub fn get(&mut self, scene: &Scene) -> T {
        if let Some(value) = &self.cached {
            return value.clone();
        }
        let value = match &mut self.source {
            Param::Value(value) => value.clone(),
            Param::Producer(producer) => producer(scene),
        };
        self.cached = Some(value.clone());
        value
    }

    /// Cached value without evaluating the source
    pub fn peek(&self) -> Option<T> {
        self.cached.clone()
    }

    /// Overwrite the cached value
    pub fn set(&mut self, value: T) {
        self.cached = Some(value);
    }

    /// Check whether a value is cached
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Drop the cached value; the next access evaluates again
    pub fn reset(&mut self) {
        self.cached = None;
    }
}

/// Object an instruction acts on
pub enum Target {
    /// The chain's own owner
    Owner,
    /// A specific object
    Object(ObjectId),
    /// First object with the tag at the time the instruction runs
    Tagged(String),
    /// Object computed when the instruction runs
    Producer(Producer<Option<ObjectId>>),
}

impl Target {
    /// Target the first object with the tag
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self::Tagged(tag.into())
    }

    /// Target an object computed when the instruction runs
    pub fn with(producer: impl FnMut(&Scene) -> Option<ObjectId> + 'static) -> Self {
        Self::Producer(Box::new(producer))
    }

    /// Resolve to a handle; `None` when no such object exists
    pub(crate) fn resolve(&mut self, scene: &Scene, owner: ObjectId) -> Option<ObjectId> {
        let id = match self {
            Self::Owner => Some(owner),
            Self::Object(id) => Some(*id),
            Self::Tagged(tag) => scene.find_object_by_tag(tag),
            Self::Producer(producer) => producer(scene),
        };
        id.filter(|id| scene.contains_object(*id))
    }
}

impl From<ObjectId> for Target {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

/// Component addressed by handle or by name on a target object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRef {
    /// Specific component
    Id(ComponentId),
    /// First unfinished component with this name
    Name(String),
}

impl ComponentRef {
    pub(crate) fn resolve(&self, scene: &Scene, owner: ObjectId) -> Option<ComponentId> {
        match self {
            Self::Id(id) => scene.contains_component(*id).then_some(*id),
            Self::Name(name) => scene.find_component(owner, name),
        }
    }
}

impl From<ComponentId> for ComponentRef {
    fn from(id: ComponentId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ComponentRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ComponentRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Where an add-component instruction gets its component from
pub(crate) enum ComponentSource {
    /// Instance given at authoring time; can be attached only once
    Instance(Option<Box<dyn Component>>),
    /// Fresh instance built on each visitation
    Factory(Producer<Box<dyn Component>>),
}

impl ComponentSource {
    /// Take the component to attach; `None` once a literal instance is used up
    pub(crate) fn take(&mut self, scene: &Scene) -> Option<Box<dyn Component>> {
        match self {
            Self::Instance(instance) => instance.take(),
            Self::Factory(factory) => Some(factory(scene)),
        }
    }
}
