//! Configuration of the simulator's machine.
//!
//! The machine is configured with a [`SimConfig`], which determines
//! the number of registers, the number of addressable memory cells, and
//! whether execution is traced.
//!
//! A config can be created directly with [`SimConfig::new`] or
//! read from a JSON config file with [`SimConfig::from_json`]:
//!
//! ```
//! use aqa_sim::sim::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{"registers": 4, "memory capacity": 16}"#).unwrap();
//! assert_eq!(config, SimConfig::new(4, 16).unwrap());
//! ```

use std::borrow::Cow;

use serde::Deserialize;

/// The largest number of registers a machine can have.
pub const MAX_REGISTERS: usize = 99;
/// The largest number of addressable memory cells a machine can have.
pub const MAX_MEMORY_CAPACITY: usize = 999;

/// Configuration for the simulator's machine.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SimConfig {
    /// The number of registers (`r1` to `rN`).
    ///
    /// This is at most [`MAX_REGISTERS`].
    pub registers: usize,

    /// The number of addressable memory cells (`0` to `N - 1`).
    ///
    /// This is at most [`MAX_MEMORY_CAPACITY`].
    pub memory_capacity: usize,

    /// Whether a [`Snapshot`] of the machine is recorded after each executed statement.
    ///
    /// This is off by default.
    ///
    /// [`Snapshot`]: super::trace::Snapshot
    pub trace: bool,
}
impl SimConfig {
    /// Creates a new config with tracing disabled,
    /// validating that the register count and memory capacity are in range.
    pub fn new(registers: usize, memory_capacity: usize) -> Result<Self, ConfigErr> {
        if registers > MAX_REGISTERS {
            return Err(ConfigErr::InvalidRegisters(registers as u64));
        }
        if memory_capacity > MAX_MEMORY_CAPACITY {
            return Err(ConfigErr::InvalidMemoryCapacity(memory_capacity as u64));
        }

        Ok(SimConfig { registers, memory_capacity, trace: false })
    }

    /// Sets whether tracing is enabled.
    pub fn with_trace(self, trace: bool) -> Self {
        SimConfig { trace, ..self }
    }

    /// Reads a config from its JSON representation.
    ///
    /// The JSON object holds the keys `"registers"` and `"memory capacity"`,
    /// and optionally `"trace"`.
    pub fn from_json(src: &str) -> Result<Self, ConfigErr> {
        #[derive(Deserialize)]
        struct RawConfig {
            registers: u64,
            #[serde(rename = "memory capacity")]
            memory_capacity: u64,
            #[serde(default)]
            trace: bool,
        }

        let raw: RawConfig = serde_json::from_str(src)?;
        let registers = usize::try_from(raw.registers)
            .map_err(|_| ConfigErr::InvalidRegisters(raw.registers))?;
        let memory_capacity = usize::try_from(raw.memory_capacity)
            .map_err(|_| ConfigErr::InvalidMemoryCapacity(raw.memory_capacity))?;

        Ok(Self::new(registers, memory_capacity)?.with_trace(raw.trace))
    }
}
impl Default for SimConfig {
    fn default() -> Self {
        SimConfig { registers: 12, memory_capacity: 100, trace: false }
    }
}

/// Errors from creating or reading a [`SimConfig`].
#[derive(Debug)]
pub enum ConfigErr {
    /// The register count is out of range.
    InvalidRegisters(u64),
    /// The memory capacity is out of range.
    InvalidMemoryCapacity(u64),
    /// The config could not be read from JSON.
    Json(serde_json::Error),
}
impl std::fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErr::InvalidRegisters(n)      => write!(f, "invalid number of registers: {n}"),
            ConfigErr::InvalidMemoryCapacity(n) => write!(f, "invalid number of addressable memory units: {n}"),
            ConfigErr::Json(e)                  => write!(f, "could not read config: {e}"),
        }
    }
}
impl std::error::Error for ConfigErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigErr::Json(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for ConfigErr {
    fn line(&self) -> Option<usize> {
        match self {
            ConfigErr::Json(e) => Some(e.line()),
            _ => None
        }
    }

    fn help(&self) -> Option<Cow<str>> {
        match self {
            ConfigErr::InvalidRegisters(_)      => Some(format!("the number of registers must be between 0 and {MAX_REGISTERS}").into()),
            ConfigErr::InvalidMemoryCapacity(_) => Some(format!("the number of addressable memory units must be between 0 and {MAX_MEMORY_CAPACITY}").into()),
            ConfigErr::Json(_)                  => Some("a config looks like {\"registers\": 12, \"memory capacity\": 100}".into()),
        }
    }
}
impl From<serde_json::Error> for ConfigErr {
    fn from(value: serde_json::Error) -> Self {
        ConfigErr::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigErr, SimConfig};

    #[test]
    fn test_new_bounds() {
        assert!(SimConfig::new(0, 0).is_ok());
        assert!(SimConfig::new(99, 999).is_ok());
        assert!(matches!(SimConfig::new(100, 10), Err(ConfigErr::InvalidRegisters(100))));
        assert!(matches!(SimConfig::new(10, 1000), Err(ConfigErr::InvalidMemoryCapacity(1000))));
    }

    #[test]
    fn test_default() {
        let config = SimConfig::default();
        assert_eq!(config.registers, 12);
        assert_eq!(config.memory_capacity, 100);
        assert!(!config.trace);
        assert!(config.with_trace(true).trace);
    }

    #[test]
    fn test_from_json() {
        let config = SimConfig::from_json(r#"{"memory capacity": 100, "registers": 12}"#).unwrap();
        assert_eq!(config, SimConfig::default());

        let config = SimConfig::from_json(r#"{"registers": 2, "memory capacity": 3, "trace": true}"#).unwrap();
        assert_eq!(config, SimConfig { registers: 2, memory_capacity: 3, trace: true });

        assert!(matches!(
            SimConfig::from_json(r#"{"registers": 250, "memory capacity": 3}"#),
            Err(ConfigErr::InvalidRegisters(250))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{"registers": 2}"#),
            Err(ConfigErr::Json(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{"registers": -1, "memory capacity": 3}"#),
            Err(ConfigErr::Json(_))
        ));
    }
}
