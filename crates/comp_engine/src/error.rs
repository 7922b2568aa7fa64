//! Engine error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::foundation::collections::{ComponentId, ObjectId};

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the scene, its components and the engine loop
#[derive(Error, Debug)]
pub enum EngineError {
    /// A handle referred to a game object that no longer exists
    #[error("game object {0:?} not found")]
    ObjectNotFound(ObjectId),

    /// A handle referred to a component that no longer exists
    #[error("component {0:?} not found")]
    ComponentNotFound(ComponentId),

    /// A chain was authored incorrectly
    #[error("invalid chain: {0}")]
    InvalidChain(#[from] ChainError),

    /// A structural rule of the scene was broken by the caller
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The render step met a mesh it cannot draw
    #[error("object '{tag}' has no drawable mesh")]
    UnsupportedMesh {
        /// Tag of the offending object
        tag: String,
    },

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error raised by application code
    #[error("application error: {0}")]
    Application(String),
}

/// Chain authoring errors
///
/// Raised the moment a misused instruction is appended and reported when the
/// chain is attached (or, for instructions appended at runtime, on the next
/// interpreter step).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// A closing instruction does not match the innermost open scope
    #[error("expected {expected} but found {found}")]
    UnbalancedScope {
        /// Closing instruction the open scope needs
        expected: &'static str,
        /// Closing instruction that was appended
        found: &'static str,
    },

    /// A closing instruction was appended with no scope open
    #[error("{0} without a matching opening instruction")]
    UnopenedScope(&'static str),

    /// A scope was still open when the chain was attached
    #[error("{0} is never closed")]
    UnclosedScope(&'static str),

    /// `else` appended outside of a conditional
    #[error("else without beginIf")]
    ElseWithoutIf,

    /// Second `else` in the same conditional
    #[error("conditional already has an else branch")]
    DuplicateElse,

    /// Negative or non-finite duration literal
    #[error("invalid duration {0}")]
    InvalidDuration(f32),

    /// A literal component instance was visited a second time
    #[error("component instance already attached by this instruction")]
    ComponentAlreadyConsumed,

    /// `removePrevious` would unlink the entry node of an open scope
    #[error("removePrevious cannot remove the entry of an open scope")]
    ScopeNodeRemoved,
}
