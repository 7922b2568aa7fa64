//! Incremental interpretation of the instruction list

use crate::components::chain::node::{Helper, Instruction, Op};
use crate::components::chain::{ChainComponent, ChainStep};
use crate::components::ComponentContext;
use crate::error::{ChainError, EngineResult};
use crate::foundation::collections::NodeId;

/// What the interpreter does after one instruction
enum Flow {
    /// Continue with the next instruction in the same frame
    Next,
    /// Continue at the given instruction (`None`: past the end) in the same frame
    Jump(Option<NodeId>),
    /// Stay on this instruction until the next update
    Suspend,
}

impl ChainComponent {
    /// Run instructions until one suspends, the list ends or the chain finishes
    pub(crate) fn run(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<()> {
        if let Some(error) = self.error.take() {
            return Err(error.into());
        }
        if !self.started {
            self.started = true;
            self.cursor = self.head;
        }

        let limit = ctx.scene().config().chain.max_steps_per_frame;
        let mut steps = 0_u32;
        loop {
            if ctx.is_finished() {
                return Ok(());
            }
            let Some(node) = self.cursor else {
                log::debug!("chain '{}' completed", self.name);
                ctx.finish();
                return Ok(());
            };
            if steps >= limit {
                log::warn!(
                    "chain '{}' hit the limit of {} instructions per frame, suspending",
                    self.name,
                    limit
                );
                return Ok(());
            }
            steps += 1;

            match self.step(node, ctx)? {
                Flow::Next => {
                    let next = self.nodes.get(node).and_then(|n| n.next);
                    self.move_to(next);
                }
                Flow::Jump(target) => self.move_to(target),
                Flow::Suspend => return Ok(()),
            }

            // instructions appended by a callback are checked before they run
            if let Some(error) = self.error.take() {
                return Err(error.into());
            }
        }
    }

    fn move_to(&mut self, target: Option<NodeId>) {
        self.cursor = target;
        self.helper = Helper::default();
        self.insertion_point = None;
    }

    fn step(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let Some(op) = self.nodes.get(node).map(|n| n.instruction.op()) else {
            return Ok(Flow::Jump(None));
        };
        log::trace!("chain '{}' visits {}", self.name, op.name());

        match op {
            Op::BeginRepeat => self.op_begin_repeat(node, ctx),
            Op::EndRepeat => self.op_end_repeat(),
            Op::Execute => self.op_execute(node, ctx),
            Op::BeginWhile => Ok(self.op_begin_while(node)),
            Op::EndWhile => self.op_end_while(ctx),
            Op::BeginInterval => self.op_begin_interval(node, ctx),
            Op::EndInterval => {
                let begin = self.pop_scope(Op::BeginInterval, op)?;
                Ok(Flow::Jump(Some(begin)))
            }
            Op::BeginIf => self.op_begin_if(node, ctx),
            // reached at the end of a taken "then" branch: skip the alternative
            Op::Else => self.skip_to_end_if(node).map(Flow::Jump),
            Op::EndIf => Ok(Flow::Next),
            Op::WaitTime => self.op_wait_time(node, ctx),
            Op::WaitFrames => Ok(self.op_wait_frames(node)),
            Op::WaitForFinish => Ok(self.op_wait_for_finish(node, ctx)),
            Op::WaitUntil => Ok(self.op_wait_until(node, ctx)),
            Op::WaitForMessage => Ok(self.op_wait_for_message(node, ctx)),
            Op::AddComponent => self.op_add_component(node, ctx),
            Op::RemoveComponent => self.op_remove_component(node, ctx),
            Op::RemoveGameObjectByTag => self.op_remove_game_object_by_tag(node, ctx),
            Op::RemoveGameObject => self.op_remove_game_object(node, ctx),
            Op::RemovePrevious => self.op_remove_previous(node),
        }
    }

    fn instruction(&mut self, node: NodeId) -> Option<&mut Instruction> {
        self.nodes.get_mut(node).map(|n| &mut n.instruction)
    }

    fn pop_scope(&mut self, expected: Op, closing: Op) -> EngineResult<NodeId> {
        let Some(begin) = self.scopes.pop() else {
            return Err(ChainError::UnopenedScope(closing.name()).into());
        };
        match self.nodes.get(begin).map(|n| n.instruction.op()) {
            Some(op) if op == expected => Ok(begin),
            Some(op) => Err(ChainError::UnbalancedScope {
                expected: op.closer().map_or("?", Op::name),
                found: closing.name(),
            }
            .into()),
            None => Err(ChainError::ScopeNodeRemoved.into()),
        }
    }

    // ---- loops ----

    fn op_begin_repeat(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        if let Some(Instruction::BeginRepeat { count, infinite }) = self.instruction(node) {
            if !count.is_cached() {
                *infinite = count.get(ctx.scene()) == 0;
            }
        }
        self.scopes.push(node);
        Ok(Flow::Next)
    }

    fn op_end_repeat(&mut self) -> EngineResult<Flow> {
        let begin = self.pop_scope(Op::BeginRepeat, Op::EndRepeat)?;
        let Some(Instruction::BeginRepeat { count, infinite }) = self.instruction(begin) else {
            return Ok(Flow::Next);
        };
        if *infinite {
            return Ok(Flow::Jump(Some(begin)));
        }

        // the cache holds the iterations left and is always filled at begin_repeat
        let remaining = match count.peek() {
            Some(left) => left.saturating_sub(1),
            None => 0,
        };
        if remaining > 0 {
            count.set(remaining);
            Ok(Flow::Jump(Some(begin)))
        } else {
            count.reset();
            Ok(Flow::Next)
        }
    }

    // the predicate is only consulted at end_while, so the body runs at least once
    fn op_begin_while(&mut self, node: NodeId) -> Flow {
        self.scopes.push(node);
        Flow::Next
    }

    fn op_end_while(&mut self, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let begin = self.pop_scope(Op::BeginWhile, Op::EndWhile)?;
        if self.check_while(begin, ctx) {
            self.scopes.push(begin);
            Ok(Flow::Jump(self.nodes.get(begin).and_then(|n| n.next)))
        } else {
            Ok(Flow::Next)
        }
    }

    fn check_while(&mut self, node: NodeId, ctx: &ComponentContext<'_>) -> bool {
        match self.instruction(node) {
            Some(Instruction::BeginWhile(predicate)) => predicate(ctx.scene()),
            _ => false,
        }
    }

    fn op_begin_interval(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let now = ctx.absolute_time();
        let Some(Instruction::BeginInterval(period)) = self.nodes.get_mut(node).map(|n| &mut n.instruction) else {
            return Ok(Flow::Next);
        };
        let period_value = period.get(ctx.scene());

        match self.helper.started_at {
            None => {
                self.helper.started_at = Some(now);
                Ok(Flow::Suspend)
            }
            Some(start) if now - start >= period_value => {
                period.reset();
                self.scopes.push(node);
                Ok(Flow::Next)
            }
            Some(_) => Ok(Flow::Suspend),
        }
    }

    /// Find the closing instruction matching `node`, skipping nested pairs
    fn find_matching(&self, node: NodeId, open: Op, close: Op) -> EngineResult<NodeId> {
        let mut depth = 0_u32;
        let mut current = self.nodes.get(node).and_then(|n| n.next);
        while let Some(id) = current {
            let Some(entry) = self.nodes.get(id) else {
                break;
            };
            let op = entry.instruction.op();
            if op == open {
                depth += 1;
            } else if op == close {
                if depth == 0 {
                    return Ok(id);
                }
                depth -= 1;
            }
            current = entry.next;
        }
        Err(ChainError::UnclosedScope(open.name()).into())
    }

    // ---- conditionals ----

    fn op_begin_if(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let taken = match self.instruction(node) {
            Some(Instruction::BeginIf(predicate)) => predicate(ctx.scene()),
            _ => false,
        };
        if taken {
            return Ok(Flow::Next);
        }

        // enter the alternative branch, or leave past end_if when there is none
        let mut depth = 0_u32;
        let mut current = self.nodes.get(node).and_then(|n| n.next);
        while let Some(id) = current {
            let Some(entry) = self.nodes.get(id) else {
                break;
            };
            match entry.instruction.op() {
                Op::BeginIf => depth += 1,
                Op::Else if depth == 0 => return Ok(Flow::Jump(entry.next)),
                Op::EndIf if depth == 0 => return Ok(Flow::Jump(entry.next)),
                Op::EndIf => depth -= 1,
                _ => {}
            }
            current = entry.next;
        }
        Err(ChainError::UnclosedScope(Op::BeginIf.name()).into())
    }

    /// Target after the `end_if` closing the conditional an `else` belongs to
    fn skip_to_end_if(&self, else_node: NodeId) -> EngineResult<Option<NodeId>> {
        let end = self.find_matching(else_node, Op::BeginIf, Op::EndIf)?;
        Ok(self.nodes.get(end).and_then(|n| n.next))
    }

    // ---- actions ----

    fn op_execute(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let action = match self.instruction(node) {
            Some(Instruction::Execute(action)) => action.take(),
            _ => None,
        };
        let Some(mut action) = action else {
            return Ok(Flow::Next);
        };

        let result = action(&mut ChainStep::new(self, ctx));

        if let Some(Instruction::Execute(slot)) = self.instruction(node) {
            *slot = Some(action);
        }
        result.map(|()| Flow::Next)
    }

    fn op_add_component(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let Some(Instruction::AddComponent { source, target, wait }) = self.nodes.get_mut(node).map(|n| &mut n.instruction)
        else {
            return Ok(Flow::Next);
        };
        let wait = *wait;

        if !self.helper.armed {
            let Some(owner) = target.resolve(ctx.scene(), ctx.owner_id()) else {
                log::warn!("chain '{}': add_component target not found, skipped", self.name);
                return Ok(Flow::Next);
            };
            let behavior = source.take(ctx.scene()).ok_or(ChainError::ComponentAlreadyConsumed)?;
            let id = ctx.scene_mut().add_boxed_component(owner, behavior)?;
            self.helper.armed = true;
            self.helper.component = Some(id);
        }

        if !wait {
            return Ok(Flow::Next);
        }
        match self.helper.component {
            Some(id) if !ctx.scene().is_finished(id) => Ok(Flow::Suspend),
            _ => Ok(Flow::Next),
        }
    }

    fn op_remove_component(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let Some(Instruction::RemoveComponent { component, target }) = self.nodes.get_mut(node).map(|n| &mut n.instruction)
        else {
            return Ok(Flow::Next);
        };

        let found = target
            .resolve(ctx.scene(), ctx.owner_id())
            .and_then(|owner| component.resolve(ctx.scene(), owner));
        match found {
            Some(id) => ctx.scene_mut().remove_component(id)?,
            None => log::debug!("chain '{}': component {:?} not found for removal", self.name, component),
        }
        Ok(Flow::Next)
    }

    fn op_remove_game_object_by_tag(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let found = match self.instruction(node) {
            Some(Instruction::RemoveGameObjectByTag(tag)) => ctx.scene().find_object_by_tag(tag),
            _ => None,
        };
        if let Some(id) = found {
            ctx.scene_mut().remove_object(id)?;
        }
        Ok(Flow::Next)
    }

    fn op_remove_game_object(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let Some(Instruction::RemoveGameObject(id)) = self.instruction(node) else {
            return Ok(Flow::Next);
        };
        let id = *id;
        if ctx.scene().contains_object(id) {
            ctx.scene_mut().remove_object(id)?;
        } else {
            log::warn!("chain '{}': object {:?} no longer exists, skipped", self.name, id);
        }
        Ok(Flow::Next)
    }

    fn op_remove_previous(&mut self, node: NodeId) -> EngineResult<Flow> {
        let Some(previous) = self.nodes.get(node).and_then(|n| n.prev) else {
            return Ok(Flow::Next);
        };
        if self.scopes.contains(&previous) {
            return Err(ChainError::ScopeNodeRemoved.into());
        }

        let before = self.nodes.get(previous).and_then(|n| n.prev);
        if let Some(current) = self.nodes.get_mut(node) {
            current.prev = before;
        }
        match before.and_then(|b| self.nodes.get_mut(b)) {
            Some(entry) => entry.next = Some(node),
            None => self.head = Some(node),
        }
        self.nodes.remove(previous);
        Ok(Flow::Next)
    }

    // ---- waits ----

    fn op_wait_time(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> EngineResult<Flow> {
        let now = ctx.absolute_time();
        let start = *self.helper.started_at.get_or_insert(now);
        let Some(Instruction::WaitTime(duration)) = self.nodes.get_mut(node).map(|n| &mut n.instruction) else {
            return Ok(Flow::Next);
        };

        if now - start > duration.get(ctx.scene()) {
            duration.reset();
            Ok(Flow::Next)
        } else {
            Ok(Flow::Suspend)
        }
    }

    fn op_wait_frames(&mut self, node: NodeId) -> Flow {
        let frames = match self.instruction(node) {
            Some(Instruction::WaitFrames(frames)) => *frames,
            _ => 0,
        };
        self.helper.frames += 1;
        if self.helper.frames > frames {
            Flow::Next
        } else {
            Flow::Suspend
        }
    }

    fn op_wait_for_finish(&mut self, node: NodeId, ctx: &ComponentContext<'_>) -> Flow {
        if !self.helper.armed {
            self.helper.armed = true;
            let owner = ctx.owner_id();
            self.helper.component = match self.nodes.get_mut(node).map(|n| &mut n.instruction) {
                Some(Instruction::WaitForFinish(component)) => {
                    let resolved = component.get(ctx.scene());
                    component.reset();
                    resolved.and_then(|r| r.resolve(ctx.scene(), owner))
                }
                _ => None,
            };
        }

        match self.helper.component {
            Some(id) if !ctx.scene().is_finished(id) => Flow::Suspend,
            _ => Flow::Next,
        }
    }

    fn op_wait_until(&mut self, node: NodeId, ctx: &ComponentContext<'_>) -> Flow {
        let waiting = match self.instruction(node) {
            Some(Instruction::WaitUntil(predicate)) => predicate(ctx.scene()),
            _ => false,
        };
        if waiting {
            Flow::Suspend
        } else {
            Flow::Next
        }
    }

    fn op_wait_for_message(&mut self, node: NodeId, ctx: &mut ComponentContext<'_>) -> Flow {
        let Some(Instruction::WaitForMessage(tag)) = self.nodes.get(node).map(|n| &n.instruction) else {
            return Flow::Next;
        };
        let tag = tag.clone();

        if self.helper.awaiting.is_none() {
            ctx.subscribe(tag.clone());
            self.helper.awaiting = Some(tag);
            self.helper.message_seen = false;
            return Flow::Suspend;
        }
        if self.helper.message_seen {
            ctx.unsubscribe(tag);
            return Flow::Next;
        }
        Flow::Suspend
    }
}
