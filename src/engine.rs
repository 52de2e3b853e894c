//! This module defines the `Engine`, the sole owner of the tape and machine pools.
//! It drives the global tick protocol (read, schedule, move, then commit), enforces
//! the Stopped/Running lifecycle, and produces `SystemState` snapshots on demand.

use crate::machine::Machine;
use crate::state::{HeadState, MachineState, SystemState, TapeState};
use crate::tape::Tape;
use crate::types::{
    EngineStatus, MachineConfig, MachineId, Signal, SimulationError, SystemConfig, TapeConfig,
    TapeId,
};

/// Outcome of one engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// At least one machine completed a full read/write/move sequence.
    Progressed,
    /// No machine made progress; the engine has stopped itself.
    Finished,
}

/// The simulation engine.
///
/// Tapes and machines live in arena-style slot vectors addressed by stable
/// integer IDs: a deleted entry's slot is set to `None` and its ID is never
/// reused while the engine lives. The originating configs are kept so
/// [`reset`](Engine::reset) can rebuild every live entry bit-identically.
///
/// Membership mutation is only allowed while `Stopped`; stepping only while
/// `Running`.
#[derive(Debug, Default)]
pub struct Engine {
    status: EngineStatus,
    tapes: Vec<Option<Tape>>,
    machines: Vec<Option<Machine>>,
    tape_configs: Vec<Option<TapeConfig>>,
    machine_configs: Vec<Option<MachineConfig>>,
}

impl Engine {
    /// Creates an empty engine in the `Stopped` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a populated engine from a system document: every tape is added
    /// in order (so document tape IDs are array indices), then every machine.
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` with all tapes and machines admitted.
    /// * The first configuration error otherwise.
    pub fn from_config(config: &SystemConfig) -> Result<Self, SimulationError> {
        let mut engine = Self::new();
        for tape in &config.tapes {
            engine.add_tape(tape.clone())?;
        }
        for machine in &config.machines {
            engine.add_machine(machine.clone())?;
        }
        Ok(engine)
    }

    /// Returns the engine's lifecycle state.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    fn require_stopped(&self, operation: &str) -> Result<(), SimulationError> {
        if self.status != EngineStatus::Stopped {
            return Err(SimulationError::LifecycleViolation(format!(
                "{} is only available while the simulation is stopped",
                operation
            )));
        }
        Ok(())
    }

    /// Adds a tape built from `config` and returns its ID.
    ///
    /// Only available while `Stopped`. On failure nothing is mutated.
    pub fn add_tape(&mut self, config: TapeConfig) -> Result<TapeId, SimulationError> {
        self.require_stopped("add_tape")?;

        let id = self.tapes.len();
        let tape = Tape::new(id, &config)?;
        self.tapes.push(Some(tape));
        self.tape_configs.push(Some(config));
        Ok(id)
    }

    /// Adds a machine built from `config` and returns its ID.
    ///
    /// Beyond [`analyze`](crate::analyzer::analyze), this validates what only
    /// the engine can: every referenced tape exists, and every initial head
    /// position is valid on its tape. Only available while `Stopped`. On
    /// failure nothing is mutated.
    pub fn add_machine(&mut self, config: MachineConfig) -> Result<MachineId, SimulationError> {
        self.require_stopped("add_machine")?;

        for (index, (&tape_id, &position)) in
            config.tapes.iter().zip(&config.positions).enumerate()
        {
            let tape = match self.tapes.get(tape_id).and_then(|slot| slot.as_ref()) {
                Some(tape) => tape,
                None => {
                    return Err(SimulationError::MissingReference(format!(
                        "head {} references unknown tape {}",
                        index, tape_id
                    )))
                }
            };
            if !tape.is_valid_start_position(position) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "head {} starts at position {} outside tape {}",
                    index, position, tape_id
                )));
            }
        }

        let id = self.machines.len();
        let machine = Machine::new(id, &config)?;
        self.machines.push(Some(machine));
        self.machine_configs.push(Some(config));
        Ok(id)
    }

    /// Deletes a tape: its slot is set to `None` and the ID is never reused.
    ///
    /// Fails without mutation if the tape does not exist or any live
    /// machine's head still references it. Only available while `Stopped`.
    pub fn delete_tape(&mut self, id: TapeId) -> Result<(), SimulationError> {
        self.require_stopped("delete_tape")?;

        if self.tapes.get(id).and_then(|slot| slot.as_ref()).is_none() {
            return Err(SimulationError::MissingReference(format!(
                "no tape with id {}",
                id
            )));
        }
        if let Some(machine) = self
            .machines
            .iter()
            .flatten()
            .find(|machine| machine.uses_tape(id))
        {
            return Err(SimulationError::TapeInUse {
                tape: id,
                machine: machine.id(),
            });
        }

        self.tapes[id] = None;
        self.tape_configs[id] = None;
        Ok(())
    }

    /// Deletes a machine: its slot is set to `None` and the ID is never
    /// reused. Only available while `Stopped`.
    pub fn delete_machine(&mut self, id: MachineId) -> Result<(), SimulationError> {
        self.require_stopped("delete_machine")?;

        if self
            .machines
            .get(id)
            .and_then(|slot| slot.as_ref())
            .is_none()
        {
            return Err(SimulationError::MissingReference(format!(
                "no machine with id {}",
                id
            )));
        }

        self.machines[id] = None;
        self.machine_configs[id] = None;
        Ok(())
    }

    /// Rebuilds every live tape and machine from its stored originating
    /// config, preserving the ID-to-slot mapping. Deleted slots stay `None`.
    /// Only available while `Stopped`.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        self.require_stopped("reset")?;

        for id in 0..self.tape_configs.len() {
            if let Some(config) = &self.tape_configs[id] {
                self.tapes[id] = Some(Tape::new(id, config)?);
            }
        }
        for id in 0..self.machine_configs.len() {
            if let Some(config) = &self.machine_configs[id] {
                self.machines[id] = Some(Machine::new(id, config)?);
            }
        }
        Ok(())
    }

    /// Hard wipe: clears every tape, machine, and stored config, and resets
    /// the ID counters to zero. Distinct from [`reset`](Engine::reset); not
    /// for mid-session restarts. Only available while `Stopped`.
    pub fn initialise(&mut self) -> Result<(), SimulationError> {
        self.require_stopped("initialise")?;

        self.tapes.clear();
        self.machines.clear();
        self.tape_configs.clear();
        self.machine_configs.clear();
        Ok(())
    }

    /// Transitions `Stopped` → `Running`, enabling [`step`](Engine::step)
    /// and freezing membership.
    pub fn start_simulation(&mut self) -> Result<(), SimulationError> {
        self.require_stopped("start_simulation")?;
        self.status = EngineStatus::Running;
        Ok(())
    }

    /// Transitions `Running` → `Stopped`. Does not roll anything back; it
    /// only prevents future steps.
    pub fn stop_simulation(&mut self) -> Result<(), SimulationError> {
        if self.status != EngineStatus::Running {
            return Err(SimulationError::LifecycleViolation(
                "stop_simulation is only available while the simulation is running".to_string(),
            ));
        }
        self.status = EngineStatus::Stopped;
        Ok(())
    }

    /// Executes one global tick.
    ///
    /// Every live, non-halted machine is advanced in ascending ID order:
    /// reads and transition lookups happen against committed (pre-tick)
    /// content, writes are only scheduled. After all machines are processed,
    /// every tape commits its pending writes, the single point where tape
    /// content changes.
    ///
    /// If no machine made progress, the engine stops itself and reports
    /// [`Tick::Finished`]. If a head consumed a `Pause` signal, the engine
    /// stops after the commit but still reports [`Tick::Progressed`].
    ///
    /// # Returns
    ///
    /// * `Ok(Tick)` while running.
    /// * `Err(SimulationError::LifecycleViolation)` if the engine is stopped.
    pub fn step(&mut self) -> Result<Tick, SimulationError> {
        if self.status != EngineStatus::Running {
            return Err(SimulationError::LifecycleViolation(
                "step is only available while the simulation is running".to_string(),
            ));
        }

        let mut progressed = false;
        let mut pause = false;

        for index in 0..self.machines.len() {
            let tapes = &mut self.tapes;
            if let Some(machine) = self.machines[index].as_mut() {
                let report = machine.tick(tapes);
                progressed |= report.progressed;
                pause |= report.pause;
            }
        }

        for tape in self.tapes.iter_mut().flatten() {
            tape.commit_writes();
        }

        if !progressed {
            self.status = EngineStatus::Stopped;
            tracing::debug!("no machine made progress, simulation finished");
            return Ok(Tick::Finished);
        }
        if pause {
            self.status = EngineStatus::Stopped;
            tracing::debug!("pause signal consumed, simulation stopped");
        }
        Ok(Tick::Progressed)
    }

    /// Calls [`step`](Engine::step) up to `ticks` times with no intermediate
    /// snapshotting, for fast headless execution. Stops early when the
    /// engine stops itself (finished or paused).
    pub fn super_hot(&mut self, ticks: usize) -> Result<Tick, SimulationError> {
        if self.status != EngineStatus::Running {
            return Err(SimulationError::LifecycleViolation(
                "super_hot is only available while the simulation is running".to_string(),
            ));
        }

        let mut last = Tick::Progressed;
        for _ in 0..ticks {
            if self.status != EngineStatus::Running {
                break;
            }
            last = self.step()?;
            if last == Tick::Finished {
                break;
            }
        }
        Ok(last)
    }

    fn tape_mut(&mut self, id: TapeId) -> Result<&mut Tape, SimulationError> {
        self.tapes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| SimulationError::MissingReference(format!("no tape with id {}", id)))
    }

    /// Places a control signal on a tape cell. Only available while
    /// `Stopped`.
    pub fn set_signal(
        &mut self,
        tape: TapeId,
        position: i64,
        signal: Signal,
    ) -> Result<(), SimulationError> {
        self.require_stopped("set_signal")?;
        self.tape_mut(tape)?.set_signal(position, signal)
    }

    /// Removes the signal on a tape cell, if any. Only available while
    /// `Stopped`.
    pub fn clear_signal(&mut self, tape: TapeId, position: i64) -> Result<(), SimulationError> {
        self.require_stopped("clear_signal")?;
        self.tape_mut(tape)?.clear_signal(position);
        Ok(())
    }

    /// Recomputes a flat, read-only snapshot of every tape and machine.
    ///
    /// Deleted entries appear as `None` at their frozen slot index. Calling
    /// this twice without stepping in between returns identical snapshots.
    pub fn get_system_state(&self) -> SystemState {
        SystemState {
            status: self.status,
            tapes: self
                .tapes
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|tape| TapeState {
                        id: tape.id(),
                        contents: tape.contents_as_string(),
                        left_boundary: tape.left_boundary(),
                        right_boundary: tape.right_boundary(),
                        signals: tape.signal_entries(),
                    })
                })
                .collect(),
            machines: self
                .machines
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|machine| MachineState {
                        id: machine.id(),
                        node: machine.node(),
                        halted: machine.is_halted(),
                        heads: machine
                            .heads()
                            .iter()
                            .map(|head| HeadState {
                                tape: head.tape_id(),
                                position: head.position(),
                            })
                            .collect(),
                    })
                })
                .collect(),
        }
    }
}
