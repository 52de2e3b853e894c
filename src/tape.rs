//! This module defines the `Tape` struct, an addressable sparse cell store with one of
//! five boundary topologies, a two-phase pending-write queue, and a per-position
//! control-signal side channel.

use crate::types::{
    Signal, SimulationError, TapeConfig, TapeId, Topology, BLANK_SYMBOL, LEFT_END_SYMBOL,
    MachineId, RIGHT_END_SYMBOL,
};
use std::collections::HashMap;

/// A write scheduled during the current tick, not yet visible to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWrite {
    symbol: char,
    machine: MachineId,
    head: usize,
}

/// An addressable one-dimensional cell store.
///
/// Cells are sparse: absence of an entry means the semantically-distinct
/// [`BLANK_SYMBOL`]; blanks are never stored. Writes are collected in a
/// position-keyed pending map and only become visible when the engine calls
/// [`commit_writes`](Tape::commit_writes) at the end of a tick, which is what
/// gives every machine a pre-tick view of shared tape content.
///
/// Topology differences are confined to [`is_out_of_range`](Tape::is_out_of_range),
/// [`moved_position`](Tape::moved_position), and
/// [`update_boundaries`](Tape::update_boundaries); everything else is shared.
#[derive(Debug, Clone)]
pub struct Tape {
    id: TapeId,
    topology: Topology,
    length: usize,
    cells: HashMap<i64, char>,
    left_boundary: i64,
    right_boundary: i64,
    pending: HashMap<i64, PendingWrite>,
    signals: HashMap<i64, Signal>,
}

impl Tape {
    /// Builds a tape from its configuration.
    ///
    /// Bounded topologies store their `>`/`<` end markers as ordinary cells
    /// outside the content range (positions `-1` and `length`). Initial
    /// content is written left-to-right from position 0; `'_'` characters
    /// are blanks and are skipped.
    ///
    /// # Arguments
    ///
    /// * `id` - The engine slot ID this tape will occupy.
    /// * `config` - The originating configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Tape)` on success.
    /// * `Err(SimulationError::InvalidConfiguration)` if the declared length
    ///   is missing where required, or the initial content exceeds it.
    pub fn new(id: TapeId, config: &TapeConfig) -> Result<Self, SimulationError> {
        let length = config.length;

        if length == 0
            && matches!(
                config.topology,
                Topology::Circular | Topology::LeftRightLimited | Topology::RightLimited
            )
        {
            return Err(SimulationError::InvalidConfiguration(format!(
                "{:?} tapes require a declared length of at least 1",
                config.topology
            )));
        }

        let mut cells = HashMap::new();
        let (left_boundary, right_boundary) = match config.topology {
            Topology::Infinite => (0, 0),
            Topology::LeftLimited => {
                cells.insert(-1, LEFT_END_SYMBOL);
                (-1, 0)
            }
            Topology::RightLimited => {
                cells.insert(length as i64, RIGHT_END_SYMBOL);
                (0, length as i64)
            }
            Topology::LeftRightLimited => {
                cells.insert(-1, LEFT_END_SYMBOL);
                cells.insert(length as i64, RIGHT_END_SYMBOL);
                (-1, length as i64)
            }
            Topology::Circular => (0, length as i64 - 1),
        };

        let mut tape = Self {
            id,
            topology: config.topology,
            length,
            cells,
            left_boundary,
            right_boundary,
            pending: HashMap::new(),
            signals: HashMap::new(),
        };
        tape.initialize_content(&config.content)?;
        Ok(tape)
    }

    /// Writes `content` left-to-right starting at position 0. `'_'`
    /// characters are blanks and are not stored. On the open side of an
    /// Infinite or LeftLimited tape the display window extends to cover the
    /// content.
    ///
    /// # Returns
    ///
    /// * `Err(SimulationError::InvalidConfiguration)` if the tape declares a
    ///   length and the content exceeds it; nothing is written.
    pub fn initialize_content(&mut self, content: &str) -> Result<(), SimulationError> {
        let content_len = content.chars().count();

        if self.topology != Topology::Infinite && self.length > 0 && content_len > self.length {
            return Err(SimulationError::InvalidConfiguration(format!(
                "Initial content of {} symbols exceeds the declared tape length {}",
                content_len, self.length
            )));
        }

        for (offset, symbol) in content.chars().enumerate() {
            if symbol != BLANK_SYMBOL {
                self.cells.insert(offset as i64, symbol);
            }
        }
        if content_len > 0 {
            self.update_boundaries(content_len as i64 - 1);
        }
        Ok(())
    }

    /// Returns the engine slot ID of this tape.
    pub fn id(&self) -> TapeId {
        self.id
    }

    /// Returns the topology variant of this tape.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Returns the left edge of the addressable window.
    pub fn left_boundary(&self) -> i64 {
        self.left_boundary
    }

    /// Returns the right edge of the addressable window.
    pub fn right_boundary(&self) -> i64 {
        self.right_boundary
    }

    /// Checks whether `position` lies outside a fixed boundary of this tape.
    ///
    /// Infinite and Circular tapes have no out-of-range positions. One-sided
    /// tapes only reject positions beyond their fixed end; the tracked
    /// display boundary on the open side never rejects anything.
    pub fn is_out_of_range(&self, position: i64) -> bool {
        match self.topology {
            Topology::Infinite | Topology::Circular => false,
            Topology::LeftLimited => position < self.left_boundary,
            Topology::RightLimited => position > self.right_boundary,
            Topology::LeftRightLimited => {
                position < self.left_boundary || position > self.right_boundary
            }
        }
    }

    /// Checks whether `position` is a valid starting position for a head.
    ///
    /// Same as the range check, except that Circular tapes additionally
    /// require the position to lie inside the window (movement folds back
    /// into the window, but an initial position is taken verbatim).
    pub fn is_valid_start_position(&self, position: i64) -> bool {
        match self.topology {
            Topology::Circular => {
                position >= self.left_boundary && position <= self.right_boundary
            }
            _ => !self.is_out_of_range(position),
        }
    }

    /// Reads the committed symbol at `position`.
    ///
    /// # Returns
    ///
    /// * `Ok(symbol)` - the stored symbol, or [`BLANK_SYMBOL`] for an
    ///   unstored cell.
    /// * `Err(SimulationError::OutOfRange)` if `position` lies beyond a
    ///   fixed boundary.
    pub fn read(&self, position: i64) -> Result<char, SimulationError> {
        if self.is_out_of_range(position) {
            return Err(SimulationError::OutOfRange {
                position,
                left: self.left_boundary,
                right: self.right_boundary,
            });
        }
        Ok(self.cells.get(&position).copied().unwrap_or(BLANK_SYMBOL))
    }

    /// Non-failing variant of [`read`](Tape::read).
    ///
    /// Returns `None` only for out-of-range positions on bounded tapes.
    pub fn try_read(&self, position: i64) -> Option<char> {
        self.read(position).ok()
    }

    /// Schedules a write for the end-of-tick commit.
    ///
    /// The pending map holds at most one write per position; a second
    /// schedule against the same cell within one tick fails and names both
    /// contending (machine, head) pairs.
    ///
    /// # Arguments
    ///
    /// * `position` - Target cell.
    /// * `symbol` - Symbol to store; [`BLANK_SYMBOL`] erases the cell.
    /// * `machine` - Scheduling machine, for conflict reporting.
    /// * `head` - Scheduling head index, for conflict reporting.
    pub fn schedule_write(
        &mut self,
        position: i64,
        symbol: char,
        machine: MachineId,
        head: usize,
    ) -> Result<(), SimulationError> {
        if self.is_out_of_range(position) {
            return Err(SimulationError::OutOfRange {
                position,
                left: self.left_boundary,
                right: self.right_boundary,
            });
        }

        if let Some(existing) = self.pending.get(&position) {
            return Err(SimulationError::ConflictingWrite {
                position,
                first_machine: existing.machine,
                first_head: existing.head,
                second_machine: machine,
                second_head: head,
            });
        }

        self.pending.insert(
            position,
            PendingWrite {
                symbol,
                machine,
                head,
            },
        );
        Ok(())
    }

    /// Applies every pending write to the cell map and empties the pending map.
    ///
    /// A scheduled blank removes the cell entry instead of storing a blank.
    /// Application order is irrelevant: scheduling already guarantees at most
    /// one write per position.
    pub fn commit_writes(&mut self) {
        for (position, write) in self.pending.drain() {
            if write.symbol == BLANK_SYMBOL {
                self.cells.remove(&position);
            } else {
                self.cells.insert(position, write.symbol);
            }
        }
    }

    /// Drops every pending write scheduled by `machine`, leaving other
    /// machines' pending writes untouched. Used to roll back a machine's
    /// tick when one of its later heads fails.
    pub fn discard_writes_from(&mut self, machine: MachineId) {
        self.pending.retain(|_, write| write.machine != machine);
    }

    /// Returns the number of writes currently pending.
    pub fn pending_write_count(&self) -> usize {
        self.pending.len()
    }

    /// Computes the position a head lands on after moving `delta` cells.
    ///
    /// Circular tapes fold the result back into the window by Euclidean
    /// modulo; every other topology returns `position + delta` unchecked
    /// (bound enforcement happens on the next read or write, not on
    /// movement).
    pub fn moved_position(&self, position: i64, delta: i64) -> i64 {
        match self.topology {
            Topology::Circular => {
                self.left_boundary
                    + (position - self.left_boundary + delta).rem_euclid(self.length as i64)
            }
            _ => position + delta,
        }
    }

    /// Extends the display window to cover `head_position` on unbounded sides.
    ///
    /// No-op for Circular and fully-bounded tapes.
    pub fn update_boundaries(&mut self, head_position: i64) {
        match self.topology {
            Topology::Infinite => {
                self.left_boundary = self.left_boundary.min(head_position);
                self.right_boundary = self.right_boundary.max(head_position);
            }
            Topology::LeftLimited => {
                self.right_boundary = self.right_boundary.max(head_position);
            }
            Topology::RightLimited => {
                self.left_boundary = self.left_boundary.min(head_position);
            }
            Topology::LeftRightLimited | Topology::Circular => {}
        }
    }

    /// Renders the full addressable window, sentinels included, one character
    /// per cell with blanks as [`BLANK_SYMBOL`].
    pub fn contents_as_string(&self) -> String {
        (self.left_boundary..=self.right_boundary)
            .map(|position| self.cells.get(&position).copied().unwrap_or(BLANK_SYMBOL))
            .collect()
    }

    /// Places a control signal at `position`.
    ///
    /// Signals live in a side channel independent of cell content.
    pub fn set_signal(&mut self, position: i64, signal: Signal) -> Result<(), SimulationError> {
        if self.is_out_of_range(position) {
            return Err(SimulationError::OutOfRange {
                position,
                left: self.left_boundary,
                right: self.right_boundary,
            });
        }
        self.signals.insert(position, signal);
        Ok(())
    }

    /// Removes the signal at `position`, if any.
    pub fn clear_signal(&mut self, position: i64) {
        self.signals.remove(&position);
    }

    /// Returns the signal at `position`, if any.
    pub fn signal_at(&self, position: i64) -> Option<Signal> {
        self.signals.get(&position).copied()
    }

    /// Consumes a `Pause` signal at `position`: flips it to `Running` and
    /// returns `true`. Returns `false` for any other cell.
    pub fn take_pause_signal(&mut self, position: i64) -> bool {
        match self.signals.get(&position) {
            Some(Signal::Pause) => {
                self.signals.insert(position, Signal::Running);
                true
            }
            _ => false,
        }
    }

    /// Returns every signal entry, ordered by position.
    pub fn signal_entries(&self) -> Vec<(i64, Signal)> {
        let mut entries: Vec<(i64, Signal)> = self
            .signals
            .iter()
            .map(|(&position, &signal)| (position, signal))
            .collect();
        entries.sort_by_key(|&(position, _)| position);
        entries
    }
}
