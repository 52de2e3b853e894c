//! This module defines the core data structures and types shared across the simulation
//! engine, including identifiers, symbol constants, topology and capability tags,
//! configuration values, transition statements, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable slot index of a tape inside an [`Engine`](crate::engine::Engine); never reused.
pub type TapeId = usize;
/// Stable slot index of a machine inside an [`Engine`](crate::engine::Engine); never reused.
pub type MachineId = usize;
/// Opaque integer identifier of a transition node (a machine state). Equality is by value.
pub type NodeId = u32;

/// The implicit symbol of any unstored cell. Blanks are never stored in a tape's
/// cell map; this character is used for blanks both in initial content strings
/// and in rendered content strings.
pub const BLANK_SYMBOL: char = '_';
/// Stored marker for the fixed left end of a bounded tape.
pub const LEFT_END_SYMBOL: char = '>';
/// Stored marker for the fixed right end of a bounded tape.
pub const RIGHT_END_SYMBOL: char = '<';

/// The boundary/topology variant of a tape.
///
/// Topology only affects range checking, head movement folding, and boundary
/// tracking; cell storage and the write queue are shared across all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Unbounded on both sides; boundaries track head excursions for display.
    Infinite,
    /// Fixed left end (sentinel `>`), unbounded right side.
    LeftLimited,
    /// Unbounded left side, fixed right end (sentinel `<`).
    RightLimited,
    /// Fixed ends on both sides.
    LeftRightLimited,
    /// A fixed window whose ends are glued together; movement wraps.
    Circular,
}

/// The read/write capability of a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadCapability {
    /// May read; its transitions must not write real content.
    ReadOnly,
    /// May write; always presents no symbol to the transition lookup.
    WriteOnly,
    /// May read and write.
    ReadWrite,
}

/// A per-position control signal, kept in a side channel parallel to tape content.
///
/// `Pause` acts as a breakpoint: the first head landing on it flips it to
/// `Running` and the engine stops at the end of that tick without halting
/// any machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Stop the engine at the end of the tick in which a head lands here.
    Pause,
    /// A consumed pause marker; inert.
    Running,
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    /// Tapes and machines may be added, deleted, or reset. Initial state.
    #[default]
    Stopped,
    /// Stepping is allowed; membership mutation is not.
    Running,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineStatus::Stopped => write!(f, "stopped"),
            EngineStatus::Running => write!(f, "running"),
        }
    }
}

/// Configuration from which a tape is built.
///
/// The originating config is kept by the engine so `reset` can rebuild the
/// tape bit-identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeConfig {
    /// The boundary/topology variant.
    pub topology: Topology,
    /// Declared content length. Required (`>= 1`) for `Circular` and
    /// `LeftRightLimited`; on one-sided limited tapes `0` means "no declared
    /// limit"; ignored for `Infinite`.
    #[serde(default)]
    pub length: usize,
    /// Initial content, written left-to-right from position 0. `'_'`
    /// characters are blanks and are not stored.
    #[serde(default)]
    pub content: String,
}

/// Per-head slice of a transition statement.
///
/// `read`/`write` use `None` as the no-op control sentinel: a `None` read
/// matches the fixed non-symbol a write-only head presents, and a `None`
/// write leaves the tape untouched. `Some('_')` is an explicit blank write
/// (erases the cell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadTransition {
    /// Symbol expected under this head, or `None` for no read.
    pub read: Option<char>,
    /// Symbol to write under this head, or `None` to not write at all.
    pub write: Option<char>,
    /// Signed head movement applied after the write.
    pub shift: i64,
}

/// One edge of a machine's state graph: source node, target node, and one
/// [`HeadTransition`] per head in head order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStatement {
    /// Node this statement applies in.
    pub source: NodeId,
    /// Node the machine moves to.
    pub target: NodeId,
    /// Per-head reads/writes/shifts, in head order.
    pub heads: Vec<HeadTransition>,
}

/// Configuration from which a machine is built.
///
/// The per-head vectors are parallel arrays of length `head_count`; their
/// order defines the concatenation order of read/write symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Number of heads.
    pub head_count: usize,
    /// Capability of each head.
    pub capabilities: Vec<HeadCapability>,
    /// Initial position of each head.
    pub positions: Vec<i64>,
    /// Tape referenced by each head, by engine tape ID.
    pub tapes: Vec<TapeId>,
    /// Every node of the state graph.
    pub nodes: Vec<NodeId>,
    /// Every transition statement of the state graph.
    pub statements: Vec<TransitionStatement>,
    /// Node the machine starts in.
    pub start_node: NodeId,
}

/// A complete system description: a named set of tapes and machines.
///
/// This is the document format understood by [`SystemLoader`](crate::loader::SystemLoader)
/// and [`Engine::from_config`](crate::engine::Engine::from_config). Tape IDs
/// inside the document are the zero-based indices of the `tapes` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Human-readable name of the system.
    pub name: String,
    /// Tape configurations, added in order.
    pub tapes: Vec<TapeConfig>,
    /// Machine configurations, added in order after the tapes.
    pub machines: Vec<MachineConfig>,
}

/// Represents the errors that can occur during configuration, lifecycle
/// operations, and tape access.
///
/// Tick-time degradations (out-of-range access, write conflicts, permission
/// violations surfaced through a head) never escape the engine as errors;
/// they halt the offending machine instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A configuration value is structurally invalid; the add fails entirely.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A read or write targeted a position outside a bounded tape's window.
    #[error("Position {position} is outside the tape window [{left}, {right}]")]
    OutOfRange {
        /// The offending position.
        position: i64,
        /// Left edge of the addressable window.
        left: i64,
        /// Right edge of the addressable window.
        right: i64,
    },
    /// Two writes were scheduled against the same cell within one tick.
    #[error(
        "Conflicting write at position {position}: machine {second_machine} head {second_head} \
         collides with a write scheduled by machine {first_machine} head {first_head}"
    )]
    ConflictingWrite {
        /// The contended position.
        position: i64,
        /// Machine that scheduled first.
        first_machine: MachineId,
        /// Head index that scheduled first.
        first_head: usize,
        /// Machine whose scheduling failed.
        second_machine: MachineId,
        /// Head index whose scheduling failed.
        second_head: usize,
    },
    /// A head was instructed to act against its capability.
    #[error("Permission violation: {0}")]
    PermissionViolation(String),
    /// A configuration referenced a tape or machine that does not exist.
    #[error("Missing reference: {0}")]
    MissingReference(String),
    /// An operation was attempted in the wrong engine lifecycle state.
    #[error("Lifecycle violation: {0}")]
    LifecycleViolation(String),
    /// A tape cannot be deleted while a live machine references it.
    #[error("Tape {tape} is still referenced by machine {machine}")]
    TapeInUse {
        /// The tape whose deletion was refused.
        tape: TapeId,
        /// A live machine holding a head on it.
        machine: MachineId,
    },
    /// A system document could not be read from the file system.
    #[error("File error: {0}")]
    FileError(String),
    /// A system document could not be parsed.
    #[error("Document parsing error: {0}")]
    ParseError(String),
}
