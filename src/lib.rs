//! This crate provides the core logic for a synchronous multi-machine Turing Machine
//! simulator. One or more multi-head machines share a pool of tapes and advance
//! together one discrete tick at a time; writes are scheduled during a tick and
//! committed atomically at its end, so every machine observes pre-tick tape content.
//! It includes modules for tape topologies, capability-restricted heads, transition
//! graphs, configuration analysis, the stepping engine, state snapshots, and a
//! collection of embedded demonstration systems.

pub mod analyzer;
pub mod engine;
pub mod graph;
pub mod head;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod state;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `Engine` struct and `Tick` outcome from the engine module.
pub use engine::{Engine, Tick};
/// Re-exports the transition lookup types from the graph module.
pub use graph::{TransitionGraph, TransitionKey, TransitionValue};
/// Re-exports the `Head` struct from the head module.
pub use head::Head;
/// Re-exports the `SystemLoader` struct from the loader module.
pub use loader::SystemLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports `SystemInfo`, `SystemManager`, and `SYSTEMS` from the programs module.
pub use programs::{SystemInfo, SystemManager, SYSTEMS};
/// Re-exports the snapshot types from the state module.
pub use state::{HeadState, MachineState, SystemState, TapeState};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the core configuration and error types from the types module.
pub use types::{
    EngineStatus, HeadCapability, HeadTransition, MachineConfig, MachineId, NodeId, Signal,
    SimulationError, SystemConfig, TapeConfig, TapeId, Topology, TransitionStatement,
    BLANK_SYMBOL, LEFT_END_SYMBOL, RIGHT_END_SYMBOL,
};
