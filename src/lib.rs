//! An AQA assembly scanner, parser, and simulator.
//!
//! This is meant to be a general suite to run programs written in the
//! AQA assembly language instruction set (as taught in AQA A-level Computer Science).
//!
//! # Usage
//!
//! To execute AQA assembly source code, it must be parsed with a syntax table:
//! ```
//! use aqa_sim::parse::parse_ast;
//! use aqa_sim::parse::syntax::SyntaxTable;
//!
//! let code = "
//!     MOV r1, #5
//!     ADD r2, r1, #3
//!     HALT
//! ";
//! let ast = parse_ast(code, &SyntaxTable::standard()).unwrap();
//! ```
//!
//! Once parsed, the program can be executed with the simulator:
//! ```
//! # use aqa_sim::parse::parse_ast;
//! # use aqa_sim::parse::syntax::SyntaxTable;
//! # let ast = parse_ast("MOV r1, #5\nADD r2, r1, #3\nHALT", &SyntaxTable::standard()).unwrap();
//! use aqa_sim::sim::Simulator;
//! use aqa_sim::sim::config::SimConfig;
//!
//! let mut simulator = Simulator::new(ast, SimConfig::default());
//! simulator.run().unwrap(); // <-- Result can be handled accordingly
//! assert_eq!(simulator.reg_file.as_slice()[1], 8);
//! ```
//!
//! Both steps can also be done at once with [`run_source`]:
//! ```
//! use aqa_sim::run_source;
//! use aqa_sim::parse::syntax::SyntaxTable;
//! use aqa_sim::sim::config::SimConfig;
//!
//! let table = SyntaxTable::standard();
//!
//! let sim = run_source("MOV r1, #5\nHALT", &table, SimConfig::default()).unwrap();
//! assert!(sim.hit_halt());
//!
//! let err = run_source("MOV r1 #5", &table, SimConfig::default()).unwrap_err();
//! assert_eq!(err.exit_code(), 65);
//! ```
//!
//! If more granularity is needed for simulation, there are also stepping functions.
//! See the [`sim`] module for more details.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;

use std::borrow::Cow;

use err::Error as _;
use parse::syntax::SyntaxTable;
use parse::StaticErrs;
use sim::config::SimConfig;
use sim::{SimErr, Simulator};

/// Errors from running source code through the whole pipeline with [`run_source`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RunErr {
    /// The source had lexical or syntax errors, so it was not executed.
    Static(StaticErrs),
    /// Runtime errors occurred while executing the program.
    Runtime(Vec<SimErr>),
}
impl RunErr {
    /// The process exit status corresponding to this error.
    ///
    /// This is `65` (data format error) for lexical and syntax errors,
    /// and `70` (internal software error) for runtime errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunErr::Static(_)  => 65,
            RunErr::Runtime(_) => 70,
        }
    }
}
impl std::fmt::Display for RunErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunErr::Static(errs) => std::fmt::Display::fmt(errs, f),
            RunErr::Runtime(errs) => {
                for (i, e) in errs.iter().enumerate() {
                    if i != 0 { writeln!(f)?; }
                    f.write_str(&e.report())?;
                }
                Ok(())
            },
        }
    }
}
impl std::error::Error for RunErr {}
impl err::Error for RunErr {
    fn line(&self) -> Option<usize> {
        match self {
            RunErr::Static(errs) => errs.line(),
            RunErr::Runtime(errs) => errs.first().map(|e| e.token.line),
        }
    }

    fn help(&self) -> Option<Cow<str>> {
        match self {
            RunErr::Static(_) => Some("the program was not executed".into()),
            RunErr::Runtime(_) => None,
        }
    }
}
impl From<StaticErrs> for RunErr {
    fn from(value: StaticErrs) -> Self {
        RunErr::Static(value)
    }
}
impl From<Vec<SimErr>> for RunErr {
    fn from(value: Vec<SimErr>) -> Self {
        RunErr::Runtime(value)
    }
}

/// Scans, parses, and executes source code.
///
/// If the source has any lexical or syntax errors, it is never executed.
pub fn run_source(src: &str, table: &SyntaxTable, config: SimConfig) -> Result<Simulator, RunErr> {
    let ast = parse::parse_ast(src, table)?;
    let sim = sim::execute(ast, config)?;
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use crate::err::Error;
    use crate::parse::syntax::SyntaxTable;
    use crate::sim::config::SimConfig;
    use crate::sim::SimErrKind;

    use super::{run_source, RunErr};

    fn config() -> SimConfig {
        SimConfig::new(4, 16).unwrap()
    }

    #[test]
    fn test_run_source() {
        let sim = run_source("MOV r1, #5\nADD r2, r1, #3\nHALT", &SyntaxTable::standard(), config()).unwrap();
        assert_eq!(sim.reg_file.as_slice(), [5, 8, 0, 0]);
    }

    #[test]
    fn test_static_errors_prevent_execution() {
        let err = run_source("MOV r1, #5\nADD r1 r2, #3\nMOV r9, #1", &SyntaxTable::standard(), config()).unwrap_err();

        // The runtime error on line 3 is never reached.
        let RunErr::Static(errs) = &err else { panic!("expected static errors, got {err:?}") };
        assert!(errs.lex.is_empty());
        assert_eq!(errs.parse.len(), 1);
        assert_eq!(errs.parse[0].message, "Expect comma after register d");
        assert_eq!(err.exit_code(), 65);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_runtime_errors() {
        let err = run_source("LDR r1, 500", &SyntaxTable::standard(), config()).unwrap_err();

        let RunErr::Runtime(errs) = &err else { panic!("expected runtime errors, got {err:?}") };
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, SimErrKind::AddressOutOfRange);
        assert_eq!(err.exit_code(), 70);
        assert!(err.to_string().starts_with("[line 1] Address index out of range at \"500\""));
    }
}
