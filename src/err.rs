//! Error interface for this crate.
//!
//! Every error produced by the pipeline implements the [`Error`] trait,
//! which extends [`std::error::Error`] with the location of the error
//! and an optional help message.
//!
//! This module also re-exports every error type of the crate.

use std::borrow::Cow;

pub use crate::parse::lex::{LexErr, LexErrKind};
pub use crate::parse::syntax::SyntaxTableErr;
pub use crate::parse::{ParseErr, ParseErrKind, StaticErrs};
pub use crate::sim::{SimErr, SimErrKind};
pub use crate::sim::config::ConfigErr;
pub use crate::RunErr;

/// Unified error interface for all errors in this crate.
pub trait Error: std::error::Error {
    /// The source line (starting from 1) where this error occurred, if it is known.
    fn line(&self) -> Option<usize> {
        None
    }

    /// A suggestion on how to fix the error.
    fn help(&self) -> Option<Cow<str>> {
        None
    }

    /// Formats this error as a single report line, including its location and help (if present).
    ///
    /// ```
    /// use aqa_sim::err::{Error, LexErr, LexErrKind};
    ///
    /// let err = LexErr::new(LexErrKind::UnexpectedChar, 3, "@");
    /// assert_eq!(
    ///     err.report(),
    ///     "[line 3] unexpected character at \"@\" (help: this character does not occur in any token of AQA assembly)"
    /// );
    /// ```
    fn report(&self) -> String {
        match self.help() {
            Some(help) => format!("{self} (help: {help})"),
            None => self.to_string(),
        }
    }
}
