//! This module defines the `TransitionGraph`, an exact-match lookup table from
//! (current node, per-head read symbols) to (next node, per-head write symbols,
//! per-head moves).

use crate::types::{NodeId, SimulationError, TransitionStatement};
use std::collections::HashMap;

/// Lookup key: source node plus the symbols presented by every head in head
/// order. `None` entries come from write-only heads, which never present a
/// real symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    /// Node the machine is currently in.
    pub source: NodeId,
    /// Per-head read symbols, in head order.
    pub reads: Vec<Option<char>>,
}

/// Lookup value: target node plus the per-head write symbols and moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionValue {
    /// Node the machine moves to.
    pub target: NodeId,
    /// Per-head write symbols, in head order; `None` writes nothing.
    pub writes: Vec<Option<char>>,
    /// Per-head signed moves, in head order.
    pub shifts: Vec<i64>,
}

/// A pure lookup table built once from a list of [`TransitionStatement`]s.
///
/// Matching is exact: there is no partial or wildcard matching here. The
/// wildcard-like behavior of write-only heads comes entirely from the head
/// layer presenting a fixed `None` read.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    table: HashMap<TransitionKey, TransitionValue>,
}

impl TransitionGraph {
    /// Denormalizes `statements` into the lookup table.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionGraph)` on success.
    /// * `Err(SimulationError::InvalidConfiguration)` if two statements
    ///   produce the same (node, reads) key; ambiguous graphs are rejected
    ///   rather than silently letting the last statement win.
    pub fn build(statements: &[TransitionStatement]) -> Result<Self, SimulationError> {
        let mut table = HashMap::with_capacity(statements.len());

        for statement in statements {
            let key = TransitionKey {
                source: statement.source,
                reads: statement.heads.iter().map(|h| h.read).collect(),
            };
            let value = TransitionValue {
                target: statement.target,
                writes: statement.heads.iter().map(|h| h.write).collect(),
                shifts: statement.heads.iter().map(|h| h.shift).collect(),
            };

            if table.contains_key(&key) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "Duplicate transition from node {} on reads {:?}",
                    key.source, key.reads
                )));
            }
            table.insert(key, value);
        }

        Ok(Self { table })
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &TransitionKey) -> Option<&TransitionValue> {
        self.table.get(key)
    }

    /// Returns the number of (key, value) entries in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Checks whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
