//! This module defines the `Machine` struct: an ordered array of heads, a transition
//! graph, a program counter, and a halted flag, together with the per-machine half of
//! a simulation tick. The commit half of a tick lives in the engine.

use crate::analyzer::analyze;
use crate::graph::{TransitionGraph, TransitionKey};
use crate::head::Head;
use crate::tape::Tape;
use crate::types::{MachineConfig, MachineId, NodeId, SimulationError, TapeId};

/// Outcome of one machine's share of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Whether the machine completed a full read/write/move sequence.
    pub progressed: bool,
    /// Whether one of its heads consumed a `Pause` signal.
    pub pause: bool,
}

impl TickReport {
    /// A report for a machine that did nothing this tick.
    pub fn idle() -> Self {
        Self {
            progressed: false,
            pause: false,
        }
    }
}

/// A single Turing machine: heads, transition graph, current node, halted flag.
///
/// Machines never own tapes; each head stores a tape ID that the engine
/// resolves against its pool on every access.
#[derive(Debug, Clone)]
pub struct Machine {
    id: MachineId,
    heads: Vec<Head>,
    graph: TransitionGraph,
    node: NodeId,
    halted: bool,
}

impl Machine {
    /// Builds a machine from its configuration.
    ///
    /// The configuration is analyzed first and the transition graph is built
    /// from the statement list; either step failing fails the whole
    /// construction. Tape existence and initial head positions are validated
    /// by the engine, which owns the tape pool.
    ///
    /// # Arguments
    ///
    /// * `id` - The engine slot ID this machine will occupy.
    /// * `config` - The originating configuration.
    pub fn new(id: MachineId, config: &MachineConfig) -> Result<Self, SimulationError> {
        analyze(config)?;
        let graph = TransitionGraph::build(&config.statements)?;

        let heads = config
            .capabilities
            .iter()
            .zip(&config.positions)
            .zip(&config.tapes)
            .map(|((&capability, &position), &tape)| Head::new(tape, position, capability))
            .collect();

        Ok(Self {
            id,
            heads,
            graph,
            node: config.start_node,
            halted: false,
        })
    }

    /// Returns the engine slot ID of this machine.
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// Returns the node the machine is currently in.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Checks whether the machine has halted. Halting is terminal: a halted
    /// machine is skipped in every future tick.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns the machine's heads, in symbol-concatenation order.
    pub fn heads(&self) -> &[Head] {
        &self.heads
    }

    /// Checks whether any head of this machine references the given tape.
    pub fn uses_tape(&self, tape: TapeId) -> bool {
        self.heads.iter().any(|head| head.uses_tape(tape))
    }

    /// Executes this machine's share of one tick against the shared tape pool.
    ///
    /// Reads every head, looks up the transition, schedules writes, and moves
    /// heads. Writes become visible only when the engine commits every tape
    /// afterwards, so all machines in a tick observe pre-tick content.
    ///
    /// The tick is atomic per machine: if any head fails to read or to
    /// schedule its write (bounds, conflict, permission), the machine's
    /// pending writes are discarded, its node and head positions are restored
    /// to their pre-tick values, and the machine halts. Other machines'
    /// pending writes are untouched.
    pub fn tick(&mut self, tapes: &mut [Option<Tape>]) -> TickReport {
        if self.halted {
            return TickReport::idle();
        }

        let mut reads = Vec::with_capacity(self.heads.len());
        for (index, head) in self.heads.iter().enumerate() {
            let tape = tapes.get(head.tape_id()).and_then(|slot| slot.as_ref());
            let symbol = match tape {
                Some(tape) => head.current_content(tape),
                None => Err(SimulationError::MissingReference(format!(
                    "head {} references deleted tape {}",
                    index,
                    head.tape_id()
                ))),
            };
            match symbol {
                Ok(symbol) => reads.push(symbol),
                Err(error) => {
                    tracing::warn!(machine = self.id, head = index, %error, "read failed, halting");
                    self.halted = true;
                    return TickReport::idle();
                }
            }
        }

        let key = TransitionKey {
            source: self.node,
            reads,
        };
        let value = match self.graph.get(&key) {
            Some(value) => value.clone(),
            None => {
                tracing::debug!(
                    machine = self.id,
                    node = key.source,
                    "no applicable transition, halting"
                );
                self.halted = true;
                return TickReport::idle();
            }
        };

        let entry_node = self.node;
        let entry_positions: Vec<i64> = self.heads.iter().map(Head::position).collect();
        self.node = value.target;
        let mut pause = false;

        for index in 0..self.heads.len() {
            let tape_id = self.heads[index].tape_id();
            let slot = tapes.get_mut(tape_id).and_then(|slot| slot.as_mut());
            let scheduled = match slot {
                Some(tape) => {
                    if self.heads[index].try_write(tape, value.writes[index], self.id, index) {
                        self.heads[index].advance(tape, value.shifts[index]);
                        let landed = self.heads[index].position();
                        tape.update_boundaries(landed);
                        if tape.take_pause_signal(landed) {
                            pause = true;
                        }
                        true
                    } else {
                        false
                    }
                }
                None => false,
            };

            if !scheduled {
                self.rollback(tapes, entry_node, &entry_positions);
                return TickReport::idle();
            }
        }

        TickReport {
            progressed: true,
            pause,
        }
    }

    /// Restores the pre-tick node and head positions, discards this machine's
    /// pending writes on every tape, and halts the machine.
    fn rollback(&mut self, tapes: &mut [Option<Tape>], node: NodeId, positions: &[i64]) {
        self.node = node;
        for (head, &position) in self.heads.iter_mut().zip(positions) {
            head.set_position(position);
        }
        for tape in tapes.iter_mut().flatten() {
            tape.discard_writes_from(self.id);
        }
        self.halted = true;
        tracing::warn!(machine = self.id, node, "tick rolled back, machine halted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        HeadCapability, HeadTransition, TapeConfig, Topology, TransitionStatement,
    };

    fn pool(configs: &[(&str, Topology, usize)]) -> Vec<Option<Tape>> {
        configs
            .iter()
            .enumerate()
            .map(|(id, &(content, topology, length))| {
                Some(
                    Tape::new(
                        id,
                        &TapeConfig {
                            topology,
                            length,
                            content: content.to_string(),
                        },
                    )
                    .unwrap(),
                )
            })
            .collect()
    }

    fn statement(
        source: NodeId,
        target: NodeId,
        heads: Vec<(Option<char>, Option<char>, i64)>,
    ) -> TransitionStatement {
        TransitionStatement {
            source,
            target,
            heads: heads
                .into_iter()
                .map(|(read, write, shift)| HeadTransition { read, write, shift })
                .collect(),
        }
    }

    fn single_head_config(statements: Vec<TransitionStatement>) -> MachineConfig {
        MachineConfig {
            head_count: 1,
            capabilities: vec![HeadCapability::ReadWrite],
            positions: vec![0],
            tapes: vec![0],
            nodes: vec![0, 1],
            statements,
            start_node: 0,
        }
    }

    #[test]
    fn test_tick_schedules_write_and_moves() {
        let mut tapes = pool(&[("a", Topology::Infinite, 0)]);
        let config = single_head_config(vec![statement(0, 1, vec![(Some('a'), Some('b'), 1)])]);
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(report.progressed);
        assert_eq!(machine.node(), 1);
        assert_eq!(machine.heads()[0].position(), 1);

        // The write is only scheduled; the engine commits at end of tick.
        let tape = tapes[0].as_mut().unwrap();
        assert_eq!(tape.read(0).unwrap(), 'a');
        tape.commit_writes();
        assert_eq!(tape.read(0).unwrap(), 'b');
    }

    #[test]
    fn test_no_transition_halts_machine_only() {
        let mut tapes = pool(&[("z", Topology::Infinite, 0)]);
        let config = single_head_config(vec![statement(0, 1, vec![(Some('a'), None, 1)])]);
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(!report.progressed);
        assert!(machine.is_halted());
        assert_eq!(machine.node(), 0);

        // Halted machines are skipped from then on.
        let report = machine.tick(&mut tapes);
        assert!(!report.progressed);
    }

    #[test]
    fn test_same_cell_double_write_rolls_back_and_halts() {
        let mut tapes = pool(&[("a", Topology::Infinite, 0)]);
        let config = MachineConfig {
            head_count: 2,
            capabilities: vec![HeadCapability::ReadWrite, HeadCapability::ReadWrite],
            positions: vec![0, 0],
            tapes: vec![0, 0],
            nodes: vec![0, 1],
            statements: vec![statement(
                0,
                1,
                vec![(Some('a'), Some('x'), 1), (Some('a'), Some('y'), 1)],
            )],
            start_node: 0,
        };
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(!report.progressed);
        assert!(machine.is_halted());

        // The whole tick rolled back: node, positions, and the first head's
        // already-scheduled write.
        assert_eq!(machine.node(), 0);
        assert_eq!(machine.heads()[0].position(), 0);
        assert_eq!(machine.heads()[1].position(), 0);
        let tape = tapes[0].as_mut().unwrap();
        assert_eq!(tape.pending_write_count(), 0);
        tape.commit_writes();
        assert_eq!(tape.read(0).unwrap(), 'a');
    }

    #[test]
    fn test_out_of_range_read_halts() {
        let mut tapes = pool(&[("ab", Topology::LeftRightLimited, 2)]);
        let mut config = single_head_config(vec![statement(0, 1, vec![(Some('a'), None, 1)])]);
        config.positions = vec![9];
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(!report.progressed);
        assert!(machine.is_halted());
    }

    #[test]
    fn test_write_only_head_matches_none_read() {
        let mut tapes = pool(&[("a", Topology::Infinite, 0), ("", Topology::Infinite, 0)]);
        let config = MachineConfig {
            head_count: 2,
            capabilities: vec![HeadCapability::ReadOnly, HeadCapability::WriteOnly],
            positions: vec![0, 0],
            tapes: vec![0, 1],
            nodes: vec![0, 1],
            statements: vec![statement(0, 1, vec![(Some('a'), None, 1), (None, Some('a'), 1)])],
            start_node: 0,
        };
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(report.progressed);
        assert_eq!(machine.node(), 1);

        let output = tapes[1].as_mut().unwrap();
        output.commit_writes();
        assert_eq!(output.read(0).unwrap(), 'a');
    }

    #[test]
    fn test_pause_signal_reported() {
        let mut tapes = pool(&[("ab", Topology::Infinite, 0)]);
        tapes[0]
            .as_mut()
            .unwrap()
            .set_signal(1, crate::types::Signal::Pause)
            .unwrap();
        let config = single_head_config(vec![statement(0, 1, vec![(Some('a'), None, 1)])]);
        let mut machine = Machine::new(0, &config).unwrap();

        let report = machine.tick(&mut tapes);
        assert!(report.progressed);
        assert!(report.pause);
        assert!(!machine.is_halted());
    }
}
