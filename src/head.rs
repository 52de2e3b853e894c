//! This module defines the `Head` struct, a per-machine cursor bound to one tape
//! with a read/write capability restriction.

use crate::tape::Tape;
use crate::types::{HeadCapability, MachineId, SimulationError, TapeId};

/// A cursor over one tape.
///
/// Heads reference their tape by ID only; the engine owns all tapes and
/// resolves the reference on every access, so several heads (of the same or
/// of different machines) may share one tape.
#[derive(Debug, Clone)]
pub struct Head {
    tape: TapeId,
    position: i64,
    capability: HeadCapability,
}

impl Head {
    /// Creates a head bound to `tape` at `position`.
    pub fn new(tape: TapeId, position: i64, capability: HeadCapability) -> Self {
        Self {
            tape,
            position,
            capability,
        }
    }

    /// Returns the ID of the tape this head is bound to.
    pub fn tape_id(&self) -> TapeId {
        self.tape
    }

    /// Returns the current position of this head.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Restores the position, used when a machine's tick is rolled back.
    pub fn set_position(&mut self, position: i64) {
        self.position = position;
    }

    /// Returns the capability of this head.
    pub fn capability(&self) -> HeadCapability {
        self.capability
    }

    /// Returns the symbol this head presents to the transition lookup.
    ///
    /// Read-only and read-write heads read the tape at the current position;
    /// a write-only head always presents `None`, regardless of tape content.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(symbol))` or `Ok(None)` on success.
    /// * `Err(SimulationError::OutOfRange)` if the head sits beyond a fixed
    ///   boundary of its tape; the engine degrades this to a machine halt.
    pub fn current_content(&self, tape: &Tape) -> Result<Option<char>, SimulationError> {
        match self.capability {
            HeadCapability::WriteOnly => Ok(None),
            HeadCapability::ReadOnly | HeadCapability::ReadWrite => {
                tape.read(self.position).map(Some)
            }
        }
    }

    /// Schedules `symbol` at the current position, reporting failure instead
    /// of propagating.
    ///
    /// A `None` symbol is the no-op sentinel: nothing is scheduled and the
    /// call succeeds. This is the only write a read-only head accepts. Any
    /// bounds or conflict error from the tape is logged and reported as
    /// `false` so the engine can halt just the offending machine.
    pub fn try_write(
        &self,
        tape: &mut Tape,
        symbol: Option<char>,
        machine: MachineId,
        head: usize,
    ) -> bool {
        let symbol = match symbol {
            None => return true,
            Some(symbol) => symbol,
        };

        if self.capability == HeadCapability::ReadOnly {
            tracing::warn!(
                machine,
                head,
                symbol = %symbol,
                "read-only head instructed to write content"
            );
            return false;
        }

        match tape.schedule_write(self.position, symbol, machine, head) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(machine, head, position = self.position, %error, "write failed");
                false
            }
        }
    }

    /// Moves the head by `delta` cells, folding through the tape's topology.
    pub fn advance(&mut self, tape: &Tape, delta: i64) {
        self.position = tape.moved_position(self.position, delta);
    }

    /// Checks whether this head references the given tape. Used by the
    /// engine to refuse deleting a tape a live machine still uses.
    pub fn uses_tape(&self, tape: TapeId) -> bool {
        self.tape == tape
    }
}
