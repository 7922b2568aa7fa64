//! Instruction nodes of a chain

use crate::components::chain::param::{ComponentRef, ComponentSource, Lazy, Predicate, Target};
use crate::components::chain::ChainStep;
use crate::error::EngineResult;
use crate::events::MessageTag;
use crate::foundation::collections::{ComponentId, NodeId, ObjectId};

/// Callback run by an `execute` instruction
pub type ExecuteFn = Box<dyn FnMut(&mut ChainStep<'_, '_>) -> EngineResult<()>>;

/// Instruction kind, without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    BeginRepeat,
    EndRepeat,
    Execute,
    BeginWhile,
    EndWhile,
    BeginInterval,
    EndInterval,
    BeginIf,
    Else,
    EndIf,
    WaitTime,
    WaitFrames,
    WaitForFinish,
    WaitUntil,
    WaitForMessage,
    AddComponent,
    RemoveComponent,
    RemoveGameObjectByTag,
    RemoveGameObject,
    RemovePrevious,
}

impl Op {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::BeginRepeat => "begin_repeat",
            Self::EndRepeat => "end_repeat",
            Self::Execute => "execute",
            Self::BeginWhile => "begin_while",
            Self::EndWhile => "end_while",
            Self::BeginInterval => "begin_interval",
            Self::EndInterval => "end_interval",
            Self::BeginIf => "begin_if",
            Self::Else => "otherwise",
            Self::EndIf => "end_if",
            Self::WaitTime => "wait_time",
            Self::WaitFrames => "wait_frames",
            Self::WaitForFinish => "wait_for_finish",
            Self::WaitUntil => "wait_until",
            Self::WaitForMessage => "wait_for_message",
            Self::AddComponent => "add_component",
            Self::RemoveComponent => "remove_component",
            Self::RemoveGameObjectByTag => "remove_game_object_by_tag",
            Self::RemoveGameObject => "remove_game_object",
            Self::RemovePrevious => "remove_previous",
        }
    }

    /// Opening instruction closed by this one
    pub(crate) fn opener(self) -> Option<Op> {
        match self {
            Self::EndRepeat => Some(Self::BeginRepeat),
            Self::EndWhile => Some(Self::BeginWhile),
            Self::EndInterval => Some(Self::BeginInterval),
            Self::EndIf => Some(Self::BeginIf),
            _ => None,
        }
    }

    /// Closing instruction of this opener
    pub(crate) fn closer(self) -> Option<Op> {
        match self {
            Self::BeginRepeat => Some(Self::EndRepeat),
            Self::BeginWhile => Some(Self::EndWhile),
            Self::BeginInterval => Some(Self::EndInterval),
            Self::BeginIf => Some(Self::EndIf),
            _ => None,
        }
    }
}

/// One chain command with its parameters
pub(crate) enum Instruction {
    BeginRepeat {
        /// Cached value is the number of iterations left
        count: Lazy<u32>,
        infinite: bool,
    },
    EndRepeat,
    Execute(Option<ExecuteFn>),
    BeginWhile(Predicate),
    EndWhile,
    BeginInterval(Lazy<f32>),
    EndInterval,
    BeginIf(Predicate),
    Else,
    EndIf,
    WaitTime(Lazy<f32>),
    WaitFrames(u32),
    WaitForFinish(Lazy<Option<ComponentRef>>),
    WaitUntil(Predicate),
    WaitForMessage(MessageTag),
    AddComponent {
        source: ComponentSource,
        target: Target,
        wait: bool,
    },
    RemoveComponent {
        component: ComponentRef,
        target: Target,
    },
    RemoveGameObjectByTag(String),
    RemoveGameObject(ObjectId),
    RemovePrevious,
}

impl Instruction {
    pub(crate) fn op(&self) -> Op {
        match self {
            Self::BeginRepeat { .. } => Op::BeginRepeat,
            Self::EndRepeat => Op::EndRepeat,
            Self::Execute(_) => Op::Execute,
            Self::BeginWhile(_) => Op::BeginWhile,
            Self::EndWhile => Op::EndWhile,
            Self::BeginInterval(_) => Op::BeginInterval,
            Self::EndInterval => Op::EndInterval,
            Self::BeginIf(_) => Op::BeginIf,
            Self::Else => Op::Else,
            Self::EndIf => Op::EndIf,
            Self::WaitTime(_) => Op::WaitTime,
            Self::WaitFrames(_) => Op::WaitFrames,
            Self::WaitForFinish(_) => Op::WaitForFinish,
            Self::WaitUntil(_) => Op::WaitUntil,
            Self::WaitForMessage(_) => Op::WaitForMessage,
            Self::AddComponent { .. } => Op::AddComponent,
            Self::RemoveComponent { .. } => Op::RemoveComponent,
            Self::RemoveGameObjectByTag(_) => Op::RemoveGameObjectByTag,
            Self::RemoveGameObject(_) => Op::RemoveGameObject,
            Self::RemovePrevious => Op::RemovePrevious,
        }
    }
}

/// Element of the doubly linked instruction list
pub(crate) struct InstructionNode {
    pub(crate) instruction: Instruction,
    pub(crate) next: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
}

impl InstructionNode {
    pub(crate) fn new(instruction: Instruction) -> Self {
        Self {
            instruction,
            next: None,
            prev: None,
        }
    }
}

/// Transient state of the instruction under the cursor
///
/// Reset whenever the cursor moves.
#[derive(Debug, Default)]
pub(crate) struct Helper {
    /// Time the current wait or interval started
    pub(crate) started_at: Option<f32>,
    /// Frames counted by `wait_frames`
    pub(crate) frames: u32,
    /// Tag `wait_for_message` subscribed to
    pub(crate) awaiting: Option<MessageTag>,
    /// Awaited message was delivered
    pub(crate) message_seen: bool,
    /// Component attached or resolved by the current instruction
    pub(crate) component: Option<ComponentId>,
    /// Current instruction already did its one-time work
    pub(crate) armed: bool,
}
