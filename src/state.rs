//! This module defines the `SystemState` snapshot: a flat, read-only projection of the
//! entire simulation, recomputed on every request and safe to hand to UI layers.

use crate::types::{EngineStatus, MachineId, NodeId, Signal, TapeId};
use serde::{Deserialize, Serialize};

/// Snapshot of one tape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeState {
    /// The tape's frozen slot ID.
    pub id: TapeId,
    /// The rendered addressable window, sentinels included, blanks as `'_'`.
    pub contents: String,
    /// Left edge of the addressable window.
    pub left_boundary: i64,
    /// Right edge of the addressable window.
    pub right_boundary: i64,
    /// Control signals, ordered by position.
    pub signals: Vec<(i64, Signal)>,
}

/// Snapshot of one head of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadState {
    /// The tape the head is bound to.
    pub tape: TapeId,
    /// The head's current position.
    pub position: i64,
}

/// Snapshot of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    /// The machine's frozen slot ID.
    pub id: MachineId,
    /// The node the machine is currently in.
    pub node: NodeId,
    /// Whether the machine has halted.
    pub halted: bool,
    /// Per-head tape binding and position, in head order.
    pub heads: Vec<HeadState>,
}

/// A full, recomputed-on-request snapshot of the simulation.
///
/// Deleted tapes and machines appear as `None` at their frozen slot index so
/// consumers can correlate entries by original ID. The snapshot is a plain
/// copy: mutating it has no effect on the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// The engine's lifecycle state at snapshot time.
    pub status: EngineStatus,
    /// One entry per tape slot ever allocated.
    pub tapes: Vec<Option<TapeState>>,
    /// One entry per machine slot ever allocated.
    pub machines: Vec<Option<MachineState>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_state_serialization_round_trip() {
        let state = SystemState {
            status: EngineStatus::Stopped,
            tapes: vec![
                Some(TapeState {
                    id: 0,
                    contents: ">ab<".to_string(),
                    left_boundary: -1,
                    right_boundary: 2,
                    signals: vec![(1, Signal::Pause)],
                }),
                None,
            ],
            machines: vec![Some(MachineState {
                id: 0,
                node: 3,
                halted: true,
                heads: vec![HeadState { tape: 0, position: 1 }],
            })],
        };

        let json = serde_json::to_string(&state).unwrap();
        let back: SystemState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
