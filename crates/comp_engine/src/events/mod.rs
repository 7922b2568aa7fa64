//! Message bus
//!
//! Key principles:
//! - Messages are identified by a string tag and carry an opaque payload
//! - Registration system (only notify interested components)
//! - A reserved wildcard tag subscribes to every message
//! - Dispatch works on a snapshot of the subscribers, so handlers may
//!   subscribe or unsubscribe while a message is being delivered

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::foundation::collections::{ComponentId, ObjectId};

/// Message tag identification
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTag(Cow<'static, str>);

impl MessageTag {
    /// Reserved wildcard: subscribers of this tag receive every message
    pub const ALL: Self = Self(Cow::Borrowed("*"));

    /// Create a tag from a static string without allocating
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Get the tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the wildcard tag
    pub fn is_wildcard(&self) -> bool {
        *self == Self::ALL
    }
}

impl From<&'static str> for MessageTag {
    fn from(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }
}

impl From<String> for MessageTag {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message with tag, optional payload and optional originating object
pub struct Message {
    /// Tag the message is dispatched by
    pub tag: MessageTag,
    /// Scene time when the message was sent (seconds)
    pub timestamp: f32,
    /// Object the message originates from
    pub source: Option<ObjectId>,
    payload: Option<Box<dyn Any>>,
}

impl Message {
    /// Create a new message with the given tag
    pub fn new(tag: impl Into<MessageTag>) -> Self {
        Self {
            tag: tag.into(),
            timestamp: 0.0,
            source: None,
            payload: None,
        }
    }

    /// Attach a payload (builder pattern)
    pub fn with_payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Set the originating object (builder pattern)
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    /// Get the payload if it is of type `T`
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    /// Check whether the message carries a payload
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("tag", &self.tag)
            .field("timestamp", &self.timestamp)
            .field("source", &self.source)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscriber {
    component: ComponentId,
    order: u64,
}

/// Subscription table: tag -> interested components, plus the wildcard bucket
#[derive(Debug, Default)]
pub struct MessageBus {
    buckets: HashMap<MessageTag, Vec<Subscriber>>,
    next_order: u64,
}

impl MessageBus {
    /// Create a new empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest of `component` in `tag`
    ///
    /// Subscribing twice to the same tag is a no-op and keeps the first
    /// delivery position.
    pub fn subscribe(&mut self, tag: MessageTag, component: ComponentId) {
        let bucket = self.buckets.entry(tag).or_default();
        if bucket.iter().any(|s| s.component == component) {
            return;
        }
        bucket.push(Subscriber {
            component,
            order: self.next_order,
        });
        self.next_order += 1;
    }

    /// Remove interest of `component` in `tag`; returns whether it was subscribed
    pub fn unsubscribe(&mut self, tag: &MessageTag, component: ComponentId) -> bool {
        let Some(bucket) = self.buckets.get_mut(tag) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|s| s.component != component);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            self.buckets.remove(tag);
        }
        removed
    }

    /// Remove every subscription held by `component`
    pub fn unsubscribe_all(&mut self, component: ComponentId) {
        self.buckets.retain(|_, bucket| {
            bucket.retain(|s| s.component != component);
            !bucket.is_empty()
        });
    }

    /// Check whether `component` is subscribed to `tag` (wildcard not considered)
    pub fn is_subscribed(&self, tag: &MessageTag, component: ComponentId) -> bool {
        self.buckets
            .get(tag)
            .is_some_and(|bucket| bucket.iter().any(|s| s.component == component))
    }

    /// Snapshot of the components a message with `tag` is delivered to
    ///
    /// Subscribers of `tag` and of the wildcard merged in subscription order;
    /// a component subscribed to both is listed once.
    pub fn subscribers(&self, tag: &MessageTag) -> Vec<ComponentId> {
        let mut merged: Vec<Subscriber> = Vec::new();
        if let Some(bucket) = self.buckets.get(tag) {
            merged.extend_from_slice(bucket);
        }
        if !tag.is_wildcard() {
            if let Some(bucket) = self.buckets.get(&MessageTag::ALL) {
                merged.extend_from_slice(bucket);
            }
        }
        merged.sort_by_key(|s| s.order);

        let mut result: Vec<ComponentId> = Vec::with_capacity(merged.len());
        for subscriber in merged {
            if !result.contains(&subscriber.component) {
                result.push(subscriber.component);
            }
        }
        result
    }

    /// Number of distinct tags with at least one subscriber
    pub fn tag_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
