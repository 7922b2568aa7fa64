//! Chain scheduler
//!
//! A [`ChainComponent`] runs a script of instructions across frames. The
//! script is a doubly linked list authored through a fluent API and
//! interpreted incrementally: each update runs instructions until one of them
//! suspends (waits, intervals, message waits) or the list runs out, in which
//! case the component finishes.
//!
//! ```
//! use comp_engine::prelude::*;
//!
//! let mut scene = Scene::default();
//! let holder = scene.add_global_object(GameObject::new("holder")).unwrap();
//!
//! let mut chain = ChainComponent::new();
//! chain
//!     .begin_repeat(3)
//!     .execute(|step| step.scene_mut().add_global_attribute("ticks", 1_u32))
//!     .end_repeat()
//!     .wait_time(0.5)
//!     .execute(|step| step.finish());
//! let id = scene.add_component(holder, chain).unwrap();
//!
//! scene.step(1.0).unwrap();
//! scene.step(1.0).unwrap();
//! assert!(scene.is_finished(id));
//! ```

mod interpreter;
mod node;
mod param;

#[cfg(test)]
mod tests;

use crate::components::{Component, ComponentContext};
use crate::error::{ChainError, EngineError, EngineResult};
use crate::events::{Message, MessageTag};
use crate::foundation::collections::{ComponentId, NodeId, ObjectId, SlotMap};
use crate::scene::{GameObject, Scene};

use node::{Helper, Instruction, InstructionNode, Op};
use param::{ComponentSource, Lazy};

pub use node::ExecuteFn;
pub use param::{ComponentRef, Param, Predicate, Producer, Target};

/// Scope opened while authoring
#[derive(Debug, Clone, Copy)]
struct OpenScope {
    op: Op,
    has_else: bool,
}

/// Component interpreting a linked list of instructions across frames
pub struct ChainComponent {
    name: String,
    nodes: SlotMap<NodeId, InstructionNode>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    cursor: Option<NodeId>,
    started: bool,
    /// Last node inserted at runtime; further inserts follow it
    insertion_point: Option<NodeId>,
    scopes: Vec<NodeId>,
    helper: Helper,
    authoring: Vec<OpenScope>,
    error: Option<ChainError>,
}

impl Default for ChainComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainComponent {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            name: String::from("ChainComponent"),
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            cursor: None,
            started: false,
            insertion_point: None,
            scopes: Vec::new(),
            helper: Helper::default(),
            authoring: Vec::new(),
            error: None,
        }
    }

    /// Create an empty chain with a custom component name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Number of instructions in the list
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the list has no instructions
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether interpretation has started
    pub fn is_running(&self) -> bool {
        self.started && self.cursor.is_some()
    }

    /// Depth of the runtime scope stack
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    // ---- loops ----

    /// Repeat the following block `count` times; 0 repeats forever
    pub fn begin_repeat(&mut self, count: u32) -> &mut Self {
        self.push(Instruction::BeginRepeat {
            count: Lazy::value(count),
            infinite: false,
        })
    }

    /// Repeat the following block a computed number of times; 0 repeats forever
    pub fn begin_repeat_with(&mut self, count: impl FnMut(&Scene) -> u32 + 'static) -> &mut Self {
        self.push(Instruction::BeginRepeat {
            count: Lazy::producer(count),
            infinite: false,
        })
    }

    /// Close a `begin_repeat` block
    pub fn end_repeat(&mut self) -> &mut Self {
        self.push(Instruction::EndRepeat)
    }

    /// Repeat the following block while the predicate holds
    ///
    /// The predicate is checked on entry and again at `end_while`.
    pub fn begin_while(&mut self, predicate: impl FnMut(&Scene) -> bool + 'static) -> &mut Self {
        self.push(Instruction::BeginWhile(Box::new(predicate)))
    }

    /// Close a `begin_while` block
    pub fn end_while(&mut self) -> &mut Self {
        self.push(Instruction::EndWhile)
    }

    /// Run the following block every `seconds`, forever
    pub fn begin_interval(&mut self, seconds: f32) -> &mut Self {
        self.check_duration(seconds);
        self.push(Instruction::BeginInterval(Lazy::value(seconds)))
    }

    /// Run the following block every computed period, forever
    pub fn begin_interval_with(&mut self, seconds: impl FnMut(&Scene) -> f32 + 'static) -> &mut Self {
        self.push(Instruction::BeginInterval(Lazy::producer(seconds)))
    }

    /// Close a `begin_interval` block
    pub fn end_interval(&mut self) -> &mut Self {
        self.push(Instruction::EndInterval)
    }

    // ---- conditionals ----

    /// Run the following branch only if the predicate holds
    pub fn begin_if(&mut self, predicate: impl FnMut(&Scene) -> bool + 'static) -> &mut Self {
        self.push(Instruction::BeginIf(Box::new(predicate)))
    }

    /// Start the alternative branch of the innermost `begin_if`
    pub fn otherwise(&mut self) -> &mut Self {
        self.push(Instruction::Else)
    }

    /// Close a `begin_if` block
    pub fn end_if(&mut self) -> &mut Self {
        self.push(Instruction::EndIf)
    }

    // ---- actions ----

    /// Run a callback
    pub fn execute(&mut self, mut action: impl FnMut(&mut ChainStep<'_, '_>) + 'static) -> &mut Self {
        self.try_execute(move |step| {
            action(step);
            Ok(())
        })
    }

    /// Run a fallible callback; its error is returned from the update that ran it
    pub fn try_execute(&mut self, action: impl FnMut(&mut ChainStep<'_, '_>) -> EngineResult<()> + 'static) -> &mut Self {
        self.push(Instruction::Execute(Some(Box::new(action))))
    }

    /// Attach a component to the chain's owner without waiting
    pub fn add_component<C: Component>(&mut self, component: C) -> &mut Self {
        self.add_component_to(component, Target::Owner)
    }

    /// Attach a component built when the instruction runs
    pub fn add_component_with(&mut self, factory: impl FnMut(&Scene) -> Box<dyn Component> + 'static) -> &mut Self {
        self.push(Instruction::AddComponent {
            source: ComponentSource::Factory(Box::new(factory)),
            target: Target::Owner,
            wait: false,
        })
    }

    /// Attach a component to another object without waiting
    pub fn add_component_to<C: Component>(&mut self, component: C, target: impl Into<Target>) -> &mut Self {
        self.push(Instruction::AddComponent {
            source: ComponentSource::Instance(Some(Box::new(component))),
            target: target.into(),
            wait: false,
        })
    }

    /// Attach a component to the owner and wait until it finishes
    pub fn add_component_and_wait<C: Component>(&mut self, component: C) -> &mut Self {
        self.add_component_and_wait_to(component, Target::Owner)
    }

    /// Attach a component built when the instruction runs and wait until it finishes
    pub fn add_component_and_wait_with(
        &mut self,
        factory: impl FnMut(&Scene) -> Box<dyn Component> + 'static,
    ) -> &mut Self {
        self.push(Instruction::AddComponent {
            source: ComponentSource::Factory(Box::new(factory)),
            target: Target::Owner,
            wait: true,
        })
    }

    /// Attach a component to another object and wait until it finishes
    pub fn add_component_and_wait_to<C: Component>(&mut self, component: C, target: impl Into<Target>) -> &mut Self {
        self.push(Instruction::AddComponent {
            source: ComponentSource::Instance(Some(Box::new(component))),
            target: target.into(),
            wait: true,
        })
    }

    /// Remove a component (by handle, or by name from the owner)
    pub fn remove_component(&mut self, component: impl Into<ComponentRef>) -> &mut Self {
        self.remove_component_from(component, Target::Owner)
    }

    /// Remove a component (by handle, or by name from the target)
    pub fn remove_component_from(&mut self, component: impl Into<ComponentRef>, target: impl Into<Target>) -> &mut Self {
        self.push(Instruction::RemoveComponent {
            component: component.into(),
            target: target.into(),
        })
    }

    /// Remove the first object with the tag, if any
    pub fn remove_game_object_by_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.push(Instruction::RemoveGameObjectByTag(tag.into()))
    }

    /// Remove an object
    pub fn remove_game_object(&mut self, object: ObjectId) -> &mut Self {
        self.push(Instruction::RemoveGameObject(object))
    }

    /// Unlink the instruction right before this one
    pub fn remove_previous(&mut self) -> &mut Self {
        self.push(Instruction::RemovePrevious)
    }

    // ---- waits ----

    /// Wait until strictly more than `seconds` have passed
    pub fn wait_time(&mut self, seconds: f32) -> &mut Self {
        self.check_duration(seconds);
        self.push(Instruction::WaitTime(Lazy::value(seconds)))
    }

    /// Wait for a computed time
    pub fn wait_time_with(&mut self, seconds: impl FnMut(&Scene) -> f32 + 'static) -> &mut Self {
        self.push(Instruction::WaitTime(Lazy::producer(seconds)))
    }

    /// Let `frames` updates pass
    pub fn wait_frames(&mut self, frames: u32) -> &mut Self {
        self.push(Instruction::WaitFrames(frames))
    }

    /// Wait until a component finishes (a detached component counts as finished)
    pub fn wait_for_finish(&mut self, component: impl Into<ComponentRef>) -> &mut Self {
        self.push(Instruction::WaitForFinish(Lazy::value(Some(component.into()))))
    }

    /// Wait until a computed component finishes
    pub fn wait_for_finish_with(
        &mut self,
        mut component: impl FnMut(&Scene) -> Option<ComponentId> + 'static,
    ) -> &mut Self {
        self.push(Instruction::WaitForFinish(Lazy::producer(move |scene: &Scene| {
            component(scene).map(ComponentRef::Id)
        })))
    }

    /// Keep waiting while the predicate holds
    pub fn wait_until(&mut self, predicate: impl FnMut(&Scene) -> bool + 'static) -> &mut Self {
        self.push(Instruction::WaitUntil(Box::new(predicate)))
    }

    /// Wait for a message with the tag
    pub fn wait_for_message(&mut self, tag: impl Into<MessageTag>) -> &mut Self {
        self.push(Instruction::WaitForMessage(tag.into()))
    }

    // ---- list maintenance ----

    fn check_duration(&mut self, seconds: f32) {
        if !seconds.is_finite() || seconds < 0.0 {
            self.record_error(ChainError::InvalidDuration(seconds));
        }
    }

    fn record_error(&mut self, error: ChainError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Track scope balance of an appended instruction
    fn check_scope(&mut self, op: Op) {
        if op.closer().is_some() {
            self.authoring.push(OpenScope { op, has_else: false });
            return;
        }

        if op == Op::Else {
            let result = match self.authoring.last_mut() {
                Some(scope) if scope.op == Op::BeginIf && scope.has_else => Err(ChainError::DuplicateElse),
                Some(scope) if scope.op == Op::BeginIf => {
                    scope.has_else = true;
                    Ok(())
                }
                _ => Err(ChainError::ElseWithoutIf),
            };
            if let Err(error) = result {
                self.record_error(error);
            }
            return;
        }

        if let Some(opener) = op.opener() {
            match self.authoring.pop() {
                Some(scope) if scope.op == opener => {}
                Some(scope) => self.record_error(ChainError::UnbalancedScope {
                    expected: scope.op.closer().map_or("?", Op::name),
                    found: op.name(),
                }),
                None => self.record_error(ChainError::UnopenedScope(op.name())),
            }
        }
    }

    /// Append an instruction: at the tail while authoring, right after the
    /// current instruction once running
    fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.check_scope(instruction.op());
        let id = self.nodes.insert(InstructionNode::new(instruction));

        let after = if self.started { self.insertion_point.or(self.cursor) } else { None };
        match after {
            Some(after) => {
                let next = self.nodes.get(after).and_then(|n| n.next);
                if let Some(node) = self.nodes.get_mut(id) {
                    node.prev = Some(after);
                    node.next = next;
                }
                if let Some(node) = self.nodes.get_mut(after) {
                    node.next = Some(id);
                }
                match next.and_then(|n| self.nodes.get_mut(n)) {
                    Some(node) => node.prev = Some(id),
                    None => self.tail = Some(id),
                }
                self.insertion_point = Some(id);
            }
            None => {
                match self.tail.and_then(|t| self.nodes.get_mut(t)) {
                    Some(tail) => tail.next = Some(id),
                    None => self.head = Some(id),
                }
                if let Some(node) = self.nodes.get_mut(id) {
                    node.prev = self.tail;
                }
                self.tail = Some(id);
            }
        }
        self
    }

    /// Instruction names from head to tail
    pub fn instruction_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(self.nodes.len());
        let mut current = self.head;
        while let Some(node) = current.and_then(|id| self.nodes.get(id)) {
            names.push(node.instruction.op().name());
            current = node.next;
        }
        names
    }
}

impl Component for ChainComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> EngineResult<()> {
        if let Some(error) = &self.error {
            return Err(EngineError::InvalidChain(error.clone()));
        }
        if let Some(scope) = self.authoring.last() {
            return Err(EngineError::InvalidChain(ChainError::UnclosedScope(scope.op.name())));
        }
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>, _delta: f32, _absolute: f32) -> EngineResult<()> {
        self.run(ctx)
    }

    fn on_message(&mut self, _ctx: &mut ComponentContext<'_>, message: &Message) -> EngineResult<()> {
        if self.helper.awaiting.as_ref() == Some(&message.tag) {
            self.helper.message_seen = true;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChainComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainComponent")
            .field("name", &self.name)
            .field("instructions", &self.instruction_names())
            .field("started", &self.started)
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

/// Access handed to `execute` callbacks
pub struct ChainStep<'s, 'a> {
    chain: &'s mut ChainComponent,
    ctx: &'s mut ComponentContext<'a>,
}

impl<'s, 'a> ChainStep<'s, 'a> {
    pub(crate) fn new(chain: &'s mut ChainComponent, ctx: &'s mut ComponentContext<'a>) -> Self {
        Self { chain, ctx }
    }

    /// The running chain; instructions appended through it run next
    pub fn chain(&mut self) -> &mut ChainComponent {
        self.chain
    }

    /// Finish the chain; nothing after the current instruction runs
    pub fn finish(&mut self) {
        self.ctx.finish();
    }

    /// Hook context of the chain component
    pub fn context(&mut self) -> &mut ComponentContext<'a> {
        self.ctx
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        self.ctx.scene()
    }

    /// The scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.ctx.scene_mut()
    }

    /// Handle of the chain's owner
    pub fn owner_id(&self) -> ObjectId {
        self.ctx.owner_id()
    }

    /// The chain's owner
    pub fn owner(&self) -> EngineResult<&GameObject> {
        self.ctx.owner()
    }

    /// The chain's owner, mutably
    pub fn owner_mut(&mut self) -> EngineResult<&mut GameObject> {
        self.ctx.owner_mut()
    }

    /// Send a message from the chain's owner
    pub fn send_message(&mut self, tag: impl Into<MessageTag>) -> EngineResult<()> {
        self.ctx.send_message(tag)
    }
}
