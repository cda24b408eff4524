//! Module handles execution traces,
//! which store the state of the machine after each executed statement.
//!
//! Tracing is enabled with [`SimConfig::trace`]. When enabled, the simulator pushes
//! a [`Snapshot`] to its [`Trace`] (the [`Simulator::trace`] field) after every statement it executes,
//! and logs each snapshot at the `trace` level.
//! The trace only holds the most recent snapshots (see [`Trace::capacity`]).
//!
//! [`SimConfig::trace`]: crate::sim::config::SimConfig::trace
//! [`Simulator::trace`]: crate::sim::Simulator::trace

use std::collections::{vec_deque, VecDeque};

use super::mem::Flags;

/// The state of the machine right after a statement executed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Snapshot {
    /// The program index of the statement that executed.
    pub pc: usize,
    /// The program index of the next statement to execute.
    pub next_pc: usize,
    /// The statement that executed, in canonical form.
    pub stmt: String,
    /// The label which was entered, if the statement was a label declaration.
    pub label: Option<String>,
    /// The values of the registers (starting from `r1`).
    pub registers: Vec<i64>,
    /// The comparison flags.
    pub flags: Flags,
    /// The values of memory (starting from address 0).
    pub memory: Vec<i64>,
}
impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = &self.label {
            writeln!(f, "Entering {label} Label")?;
        }
        writeln!(f, "Current Instruction Register: {}", self.stmt)?;
        writeln!(f, "Program Counter: {}", self.next_pc)?;

        f.write_str("Registers:")?;
        for (i, value) in self.registers.iter().enumerate() {
            write!(f, " r{}={value}", i + 1)?;
        }
        writeln!(f)?;
        writeln!(f, "Comparison Flags: {}", self.flags)?;

        f.write_str("Memory:")?;
        for (addr, value) in self.memory.iter().enumerate() {
            write!(f, " [{addr}]={value}")?;
        }
        Ok(())
    }
}

/// The most recently recorded [`Snapshot`]s, in execution order.
///
/// A trace holds at most [`Trace::capacity`] snapshots.
/// Once it is full, recording a snapshot drops the oldest one.
/// The default capacity is [`Trace::DEFAULT_CAPACITY`].
///
/// ## Example
///
/// ```
/// # use aqa_sim::sim::trace::Trace;
///
/// let trace = Trace::default();
/// assert!(trace.is_empty());
/// assert!(trace.last().is_none());
/// assert_eq!(trace.capacity(), Trace::DEFAULT_CAPACITY);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Trace {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
    dropped: u64,
}
impl Trace {
    /// The number of snapshots a trace holds by default.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates an empty trace which holds at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Trace { snapshots: VecDeque::new(), capacity, dropped: 0 }
    }

    /// Records a snapshot, dropping the oldest one if the trace is full.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
            self.dropped += 1;
        }
        self.snapshots.push_back(snapshot);
    }

    /// The maximum number of snapshots this trace holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of snapshots dropped because the trace was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The number of held snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshots are held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The most recently recorded snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Iterates over the held snapshots, oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    /// Removes all held snapshots and resets the dropped count.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.dropped = 0;
    }
}
impl Default for Trace {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Snapshot;
    type IntoIter = vec_deque::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::mem::Flags;

    use super::{Snapshot, Trace};

    fn snapshot(pc: usize, label: Option<&str>) -> Snapshot {
        Snapshot {
            pc,
            next_pc: pc + 1,
            stmt: match label {
                Some(l) => format!("{l}:"),
                None => String::from("MOV r1, #5"),
            },
            label: label.map(String::from),
            registers: vec![5, 0],
            flags: Flags::compare(1, 1),
            memory: vec![0, 7],
        }
    }

    #[test]
    fn test_snapshot_display() {
        assert_eq!(snapshot(0, None).to_string(), "\
            Current Instruction Register: MOV r1, #5\n\
            Program Counter: 1\n\
            Registers: r1=5 r2=0\n\
            Comparison Flags: EQ=1 NE=0 GT=0 LT=0\n\
            Memory: [0]=0 [1]=7"
        );

        let rendered = snapshot(3, Some("done")).to_string();
        assert!(rendered.starts_with("Entering done Label\nCurrent Instruction Register: done:\n"));
    }

    #[test]
    fn test_trace() {
        let mut trace = Trace::default();
        trace.push(snapshot(0, None));
        trace.push(snapshot(1, Some("loop")));

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.last().map(|s| s.pc), Some(1));

        let pcs: Vec<_> = (&trace).into_iter().map(|s| s.pc).collect();
        assert_eq!(pcs, [0, 1]);

        trace.clear();
        assert!(trace.is_empty());
    }

    #[test]
    fn test_trace_capacity() {
        let mut trace = Trace::with_capacity(3);
        for pc in 0..10 {
            trace.push(snapshot(pc, None));
        }

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.dropped(), 7);
        let pcs: Vec<_> = trace.iter().map(|s| s.pc).collect();
        assert_eq!(pcs, [7, 8, 9]);

        trace.clear();
        assert_eq!(trace.dropped(), 0);

        let mut none = Trace::with_capacity(0);
        none.push(snapshot(0, None));
        assert!(none.is_empty());
        assert_eq!(none.dropped(), 1);
    }
}
