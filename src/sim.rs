//! Simulating and execution for AQA assembly.
//!
//! This module is focused on executing parsed programs (i.e., `Vec<`[`Stmt`]`>`).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates a program.
//! - [`execute`]: A helper that runs a program to completion.
//! - [`mem`]: The module handling the registers, memory, and comparison flags.
//! - [`config`]: The module handling the configuration of the machine.
//! - [`trace`]: The module handling execution traces.
//!
//! # Usage
//!
//! To simulate a program, instantiate a Simulator with the program and a config:
//!
//! ```
//! use aqa_sim::parse::parse_ast;
//! use aqa_sim::parse::syntax::SyntaxTable;
//! use aqa_sim::sim::Simulator;
//! use aqa_sim::sim::config::SimConfig;
//!
//! let src = "
//!     MOV r1, #5
//!     ADD r2, r1, #3
//!     HALT
//! ";
//! let ast = parse_ast(src, &SyntaxTable::standard()).unwrap();
//!
//! let mut sim = Simulator::new(ast, SimConfig::new(4, 16).unwrap());
//!
//! // Running step by step:
//! sim.step().unwrap();
//! assert_eq!(sim.reg_file.as_slice(), [5, 0, 0, 0]);
//! sim.step().unwrap();
//! assert_eq!(sim.reg_file.as_slice(), [5, 8, 0, 0]);
//!
//! // Running until the end:
//! sim.run().unwrap();
//! assert!(sim.hit_halt());
//! ```
//!
//! ## Execution
//!
//! Beyond the basic [`Simulator::run`] (which runs until halting),
//! there are also:
//! - [`Simulator::step`]: manual step-by-step simulation
//! - [`Simulator::run_while`], [`Simulator::run_with_limit`]: more advanced programmatic execution
//!
//! The simulator stops when:
//! - `HALT` is executed
//! - the program counter moves past the last statement
//! - a runtime error ([`SimErr`]) occurs
//!
//! ## Querying State
//!
//! - The program counter is the `sim.pc` field. This is the index of the next statement to execute.
//! - The register file is the `sim.reg_file` field and the memory is the `sim.mem` field.
//! - The comparison flags are the `sim.flags` field.
//! - The runtime errors which occurred can be accessed with [`Simulator::errors`].

pub mod mem;
pub mod config;
pub mod trace;

use std::borrow::Cow;

use crate::asm::LabelTable;
use crate::ast::{ImmOrReg, Label, Stmt};
use crate::parse::lex::Token;

use self::config::SimConfig;
use self::mem::{Flags, Memory, RegFile};
use self::trace::{Snapshot, Trace};

/// Kinds of errors that can occur during simulation.
///
/// See [`SimErr`] for this error type with the offending token included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SimErrKind {
    /// A register outside of the register file was accessed.
    RegisterOutOfRange,
    /// A memory address past the memory capacity was accessed.
    AddressOutOfRange,
    /// A branch was taken to a label which was never declared.
    InvalidLabel,
    /// A shift was attempted with a negative shift amount.
    InvalidShift,
}
impl std::fmt::Display for SimErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErrKind::RegisterOutOfRange => f.write_str("Register index out of range."),
            SimErrKind::AddressOutOfRange  => f.write_str("Address index out of range"),
            SimErrKind::InvalidLabel       => f.write_str("Invalid label identifier"),
            SimErrKind::InvalidShift       => f.write_str("Shift amount cannot be negative"),
        }
    }
}

/// Errors that can occur during simulation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SimErr {
    /// The kind of error.
    pub kind: SimErrKind,
    /// The operand token which caused the error.
    pub token: Token,
}
impl SimErr {
    /// Creates a new [`SimErr`].
    pub fn new(kind: SimErrKind, token: Token) -> Self {
        SimErr { kind, token }
    }
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}] {} at {:?}", self.token.line, self.kind, self.token.lexeme)
    }
}
impl std::error::Error for SimErr {}
impl crate::err::Error for SimErr {
    fn line(&self) -> Option<usize> {
        Some(self.token.line)
    }

    fn help(&self) -> Option<Cow<str>> {
        match self.kind {
            SimErrKind::RegisterOutOfRange => Some("registers are numbered from r1 up to the configured number of registers".into()),
            SimErrKind::AddressOutOfRange  => Some("addresses are numbered from 0 up to (but not including) the configured memory capacity".into()),
            SimErrKind::InvalidLabel       => Some(format!("declare the label with `{}:`", self.token.lexeme).into()),
            SimErrKind::InvalidShift       => None,
        }
    }
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// `HALT` was executed.
    Halt,
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Executes a program until it stops, with the given machine configuration.
///
/// If a runtime error occurs, the machine stops immediately and the errors are returned.
/// Otherwise, the stopped simulator is returned, holding the final machine state.
///
/// # Example
///
/// ```
/// use aqa_sim::parse::parse_ast;
/// use aqa_sim::parse::syntax::SyntaxTable;
/// use aqa_sim::sim::{execute, SimErrKind};
/// use aqa_sim::sim::config::SimConfig;
///
/// let table = SyntaxTable::standard();
/// let config = SimConfig::new(4, 16).unwrap();
///
/// let ast = parse_ast("MOV r1, #5\nSTR r1, 3\nHALT", &table).unwrap();
/// let sim = execute(ast, config).unwrap();
/// assert_eq!(sim.mem.as_slice()[3], 5);
///
/// let ast = parse_ast("LDR r1, 500", &table).unwrap();
/// let errors = execute(ast, config).unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].kind, SimErrKind::AddressOutOfRange);
/// ```
pub fn execute(program: Vec<Stmt>, config: SimConfig) -> Result<Simulator, Vec<SimErr>> {
    let mut sim = Simulator::new(program, config);
    match sim.run() {
        Ok(()) => Ok(sim),
        Err(_) => Err(sim.errors),
    }
}

/// Executes a parsed AQA assembly program.
#[derive(Debug, Clone)]
pub struct Simulator {
    // ------------------ PROGRAM ------------------
    program: Vec<Stmt>,
    labels: LabelTable,

    // ------------------ SIMULATION STATE ------------------
    // Calling [`Simulator::reset`] resets these values.

    /// The register file.
    pub reg_file: RegFile,

    /// The memory.
    pub mem: Memory,

    /// The comparison flags.
    pub flags: Flags,

    /// The program counter.
    ///
    /// This is the index of the next statement to execute.
    pub pc: usize,

    /// The number of statements successfully run since this `Simulator` was created or reset.
    ///
    /// Label declarations count as statements.
    pub instructions_run: u64,

    /// The recorded execution trace.
    ///
    /// This is only populated if tracing is enabled in [`Simulator::config`].
    /// It holds the most recent snapshots, up to [`Trace::DEFAULT_CAPACITY`] unless replaced
    /// with a trace of another capacity.
    pub trace: Trace,

    hit_halt: bool,
    errors: Vec<SimErr>,

    // ------------------ CONFIG ------------------

    /// The configuration of the machine.
    config: SimConfig,
}

impl Simulator {
    /// Creates a new simulator for the given program, with zeroed registers and memory.
    pub fn new(program: Vec<Stmt>, config: SimConfig) -> Self {
        let labels = LabelTable::new(&program);

        Self {
            program,
            labels,
            reg_file: RegFile::new(config.registers),
            mem: Memory::new(config.memory_capacity),
            flags: Flags::default(),
            pc: 0,
            instructions_run: 0,
            trace: Trace::default(),
            hit_halt: false,
            errors: vec![],
            config,
        }
    }

    /// Resets the simulator back to its starting state.
    ///
    /// The program, configuration, and trace capacity are kept.
    pub fn reset(&mut self) {
        let program = std::mem::take(&mut self.program);
        let capacity = self.trace.capacity();
        *self = Simulator::new(program, self.config);
        self.trace = Trace::with_capacity(capacity);
    }

    /// The program being executed.
    pub fn program(&self) -> &[Stmt] {
        &self.program
    }

    /// The label table for the program.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The configuration of the machine.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The runtime errors which occurred.
    ///
    /// Execution stops at the first runtime error, so this holds at most one error.
    pub fn errors(&self) -> &[SimErr] {
        &self.errors
    }

    /// Whether `HALT` was executed.
    pub fn hit_halt(&self) -> bool {
        self.hit_halt
    }

    /// Whether execution has stopped.
    ///
    /// This occurs after `HALT` is executed, after a runtime error,
    /// or after the program counter moves past the last statement.
    pub fn is_done(&self) -> bool {
        self.hit_halt || !self.errors.is_empty() || self.pc >= self.program.len()
    }

    /// Runs until the tripwire condition returns false (or execution stops).
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<(), SimErr> {
        let result = loop {
            if self.is_done() {
                break Ok(());
            }
            if !tripwire(self) {
                break Ok(());
            }

            if let Err(e) = self.step() {
                break Err(e);
            }
        };

        match &result {
            Ok(()) if self.is_done() => log::debug!("execution stopped after {} statements (halted: {})", self.instructions_run, self.hit_halt),
            Ok(()) => log::debug!("execution paused after {} statements", self.instructions_run),
            Err(e) => log::debug!("execution stopped with runtime error: {e}"),
        }
        result
    }

    /// Execute the program.
    ///
    /// This blocks until the program stops.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self) -> Result<(), SimErr> {
        self.run_while(|_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program stops or until the number of steps to execute has been hit.
    pub fn run_with_limit(&mut self, max_steps: u64) -> Result<(), SimErr> {
        let i = self.instructions_run;
        self.run_while(|sim| sim.instructions_run.wrapping_sub(i) < max_steps)
    }

    /// Simulate one step, executing one statement.
    ///
    /// If execution has already stopped, this does nothing.
    /// If a runtime error occurs, it is recorded in [`Simulator::errors`] and execution stops.
    pub fn step(&mut self) -> Result<(), SimErr> {
        if self.is_done() {
            return Ok(());
        }

        match self._step_inner() {
            Ok(()) | Err(StepBreak::Halt) => Ok(()),
            Err(StepBreak::Err(e)) => {
                self.errors.push(e.clone());
                Err(e)
            }
        }
    }

    fn _step_inner(&mut self) -> Result<(), StepBreak> {
        let pc = self.pc;
        let Some(stmt) = self.program.get(pc) else {
            return Ok(());
        };
        log::trace!("executing {pc}: {stmt}");

        let regs = &mut self.reg_file;
        let mut next_pc = pc + 1;

        match stmt {
            Stmt::Load(rd, addr) => {
                let val = self.mem.get(addr)?;
                regs.set(rd, val)?;
            },
            Stmt::Store(rd, addr) => {
                let val = regs.get(rd)?;
                self.mem.set(addr, val)?;
            },
            Stmt::Add(rd, rn, op) => {
                let val = regs.get(rn)?.wrapping_add(operand(regs, op)?);
                regs.set(rd, val)?;
            },
            Stmt::Subtract(rd, rn, op) => {
                let val = regs.get(rn)?.wrapping_sub(operand(regs, op)?);
                regs.set(rd, val)?;
            },
            Stmt::Move(rd, op) => {
                let val = operand(regs, op)?;
                regs.set(rd, val)?;
            },
            Stmt::Compare(rn, op) => {
                let lhs = regs.get(rn)?;
                let rhs = operand(regs, op)?;
                self.flags = Flags::compare(lhs, rhs);
            },
            Stmt::Branch(label) => next_pc = branch_target(&self.labels, label)?,
            Stmt::BranchEqual(label) if self.flags.eq => next_pc = branch_target(&self.labels, label)?,
            Stmt::BranchNotEqual(label) if self.flags.ne => next_pc = branch_target(&self.labels, label)?,
            Stmt::BranchGreaterThan(label) if self.flags.gt => next_pc = branch_target(&self.labels, label)?,
            Stmt::BranchLessThan(label) if self.flags.lt => next_pc = branch_target(&self.labels, label)?,
            Stmt::BranchEqual(_)
            | Stmt::BranchNotEqual(_)
            | Stmt::BranchGreaterThan(_)
            | Stmt::BranchLessThan(_) => {},
            Stmt::And(rd, rn, op) => {
                let val = regs.get(rn)? & operand(regs, op)?;
                regs.set(rd, val)?;
            },
            Stmt::Or(rd, rn, op) => {
                let val = regs.get(rn)? | operand(regs, op)?;
                regs.set(rd, val)?;
            },
            Stmt::Eor(rd, rn, op) => {
                let val = regs.get(rn)? ^ operand(regs, op)?;
                regs.set(rd, val)?;
            },
            Stmt::Not(rd, op) => {
                let val = !operand(regs, op)?;
                regs.set(rd, val)?;
            },
            Stmt::LeftShift(rd, rn, op) => {
                let val = regs.get(rn)?;
                let amt = shift_amount(regs, op)?;
                // Everything is shifted out past 63 bits.
                regs.set(rd, val.checked_shl(amt).unwrap_or(0))?;
            },
            Stmt::RightShift(rd, rn, op) => {
                let val = regs.get(rn)?;
                let amt = shift_amount(regs, op)?;
                // Arithmetic shift, so only the sign remains past 63 bits.
                regs.set(rd, val.checked_shr(amt).unwrap_or(if val < 0 { -1 } else { 0 }))?;
            },
            Stmt::Halt => self.hit_halt = true,
            Stmt::Label(_) => {},
        }

        self.pc = next_pc;
        self.instructions_run += 1;

        if self.config.trace {
            let snapshot = Snapshot {
                pc,
                next_pc,
                stmt: stmt.to_string(),
                label: match stmt {
                    Stmt::Label(label) => Some(label.name().to_string()),
                    _ => None
                },
                registers: self.reg_file.as_slice().to_vec(),
                flags: self.flags,
                memory: self.mem.as_slice().to_vec(),
            };
            log::trace!("{snapshot}");
            self.trace.push(snapshot);
        }

        match self.hit_halt {
            true  => Err(StepBreak::Halt),
            false => Ok(()),
        }
    }
}

/// Computes the value of operand 2.
fn operand(regs: &RegFile, op: &ImmOrReg) -> Result<i64, SimErr> {
    match op {
        ImmOrReg::Imm(imm) => Ok(imm.get()),
        ImmOrReg::Reg(reg) => regs.get(reg),
    }
}

/// Computes the shift amount from operand 2, which cannot be negative.
fn shift_amount(regs: &RegFile, op: &ImmOrReg) -> Result<u32, SimErr> {
    let amt = operand(regs, op)?;
    if amt < 0 {
        return Err(SimErr::new(SimErrKind::InvalidShift, op.token().clone()));
    }
    Ok(u32::try_from(amt).unwrap_or(u32::MAX))
}

fn branch_target(labels: &LabelTable, label: &Label) -> Result<usize, SimErr> {
    labels.lookup(label.name())
        .ok_or_else(|| SimErr::new(SimErrKind::InvalidLabel, label.token().clone()))
}
