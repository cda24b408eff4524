//! The syntax table, which describes the operand grammar of each instruction.
//!
//! The parser does not hardcode the operands of any instruction.
//! Instead, for each mnemonic, the [`SyntaxTable`] holds an ordered list of
//! [`Slot`]s that the parser walks through.
//!
//! The table is plain configuration data, written in JSON:
//!
//! ```json
//! {
//!     "MOV": [
//!         { "kind": "Register", "error": "Expect register d after MOV" },
//!         { "kind": "Comma",    "error": "Expect comma after register d" },
//!         { "kind": "Operand",  "error": "Expect operand 2 (register or immediate value) after comma" }
//!     ],
//!     "HALT": []
//! }
//! ```
//!
//! The standard table for the full instruction set is available through [`SyntaxTable::standard`].

use std::collections::BTreeMap;

use serde::Deserialize;

use super::lex::TokenKind;

const STANDARD_SYNTAX: &str = include_str!("syntax.json");

/// One expected token in an instruction's grammar.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Slot {
    /// The token kind expected at this position.
    ///
    /// - [`TokenKind::Comma`] requires a comma (which is not passed to the instruction).
    /// - [`TokenKind::Operand`] requires either a register or an immediate value.
    /// - Any other kind requires a token of exactly that kind.
    pub kind: TokenKind,
    /// The message of the parse error raised if the expected token is missing.
    pub error: String
}

/// Errors that can occur when loading a syntax table.
#[derive(Debug)]
pub enum SyntaxTableErr {
    /// The table was not valid JSON or did not have the expected shape.
    Json(serde_json::Error),
    /// A key of the table does not name any mnemonic.
    UnknownInstruction(String),
    /// A slot expects a token that can never appear in an instruction.
    InvalidSlot(TokenKind, TokenKind),
}
impl std::fmt::Display for SyntaxTableErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxTableErr::Json(e) => write!(f, "could not read syntax table: {e}"),
            SyntaxTableErr::UnknownInstruction(name) => write!(f, "syntax table entry {name:?} is not an instruction mnemonic"),
            SyntaxTableErr::InvalidSlot(instr, kind) => write!(f, "syntax table entry {instr} cannot expect {kind}"),
        }
    }
}
impl std::error::Error for SyntaxTableErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyntaxTableErr::Json(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for SyntaxTableErr {
    fn line(&self) -> Option<usize> {
        match self {
            SyntaxTableErr::Json(e) => Some(e.line()),
            _ => None
        }
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            SyntaxTableErr::Json(_) => Some("the table should map each mnemonic to a list of {\"kind\", \"error\"} objects".into()),
            SyntaxTableErr::UnknownInstruction(_) => Some("mnemonics are upper case (e.g., ADD, HALT)".into()),
            SyntaxTableErr::InvalidSlot(..) => Some("the end of file cannot be an operand".into()),
        }
    }
}
impl From<serde_json::Error> for SyntaxTableErr {
    fn from(value: serde_json::Error) -> Self {
        SyntaxTableErr::Json(value)
    }
}

/// A mapping from each instruction mnemonic to its ordered list of expected [`Slot`]s.
///
/// # Example
///
/// ```
/// use aqa_sim::parse::lex::TokenKind;
/// use aqa_sim::parse::syntax::SyntaxTable;
///
/// let table = SyntaxTable::from_json(r#"{ "HALT": [] }"#).unwrap();
/// assert_eq!(table.get(TokenKind::HALT), Some(&[][..]));
/// assert_eq!(table.get(TokenKind::ADD), None);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SyntaxTable {
    rules: BTreeMap<TokenKind, Vec<Slot>>
}
impl SyntaxTable {
    /// Creates a syntax table out of the given rules, validating each rule.
    pub fn new(rules: impl IntoIterator<Item=(TokenKind, Vec<Slot>)>) -> Result<Self, SyntaxTableErr> {
        let rules: BTreeMap<_, _> = rules.into_iter().collect();

        for (&instr, slots) in &rules {
            if !instr.is_mnemonic() {
                return Err(SyntaxTableErr::UnknownInstruction(instr.to_string()));
            }
            if let Some(slot) = slots.iter().find(|s| s.kind == TokenKind::Eof) {
                return Err(SyntaxTableErr::InvalidSlot(instr, slot.kind));
            }
        }

        Ok(SyntaxTable { rules })
    }

    /// Reads a syntax table from its JSON representation.
    pub fn from_json(src: &str) -> Result<Self, SyntaxTableErr> {
        let raw: BTreeMap<String, Vec<Slot>> = serde_json::from_str(src)?;

        let rules = raw.into_iter()
            .map(|(name, slots)| match TokenKind::mnemonic(&name) {
                Some(kind) => Ok((kind, slots)),
                None => Err(SyntaxTableErr::UnknownInstruction(name)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(rules)
    }

    /// The syntax table for the complete AQA instruction set.
    pub fn standard() -> Self {
        Self::from_json(STANDARD_SYNTAX)
            .unwrap_or_else(|e| unreachable!("standard syntax table should be valid: {e}"))
    }

    /// Gets the slots expected after the given mnemonic,
    /// or `None` if the table has no rule for it.
    pub fn get(&self, instr: TokenKind) -> Option<&[Slot]> {
        self.rules.get(&instr).map(Vec::as_slice)
    }

    /// Iterates over every mnemonic with a rule in this table.
    pub fn instructions(&self) -> impl Iterator<Item=TokenKind> + '_ {
        self.rules.keys().copied()
    }
}
impl Default for SyntaxTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::lex::TokenKind;

    use super::{Slot, SyntaxTable, SyntaxTableErr};

    #[test]
    fn test_standard_covers_every_mnemonic() {
        let table = SyntaxTable::standard();
        let instrs: Vec<_> = table.instructions().collect();
        assert_eq!(instrs, TokenKind::MNEMONICS);

        let kinds = |k| -> Vec<_> {
            table.get(k).unwrap().iter().map(|s| s.kind).collect()
        };
        assert_eq!(kinds(TokenKind::LDR), [TokenKind::Register, TokenKind::Comma, TokenKind::DirectAddress]);
        assert_eq!(kinds(TokenKind::ADD), [TokenKind::Register, TokenKind::Comma, TokenKind::Register, TokenKind::Comma, TokenKind::Operand]);
        assert_eq!(kinds(TokenKind::MVN), [TokenKind::Register, TokenKind::Comma, TokenKind::Operand]);
        assert_eq!(kinds(TokenKind::BLT), [TokenKind::Identifier]);
        assert!(kinds(TokenKind::HALT).is_empty());
    }

    #[test]
    fn test_from_json() {
        let table = SyntaxTable::from_json(r#"{
            "B": [{ "kind": "Identifier", "error": "Expect label" }]
        }"#).unwrap();

        assert_eq!(table.get(TokenKind::B), Some(&[Slot { kind: TokenKind::Identifier, error: "Expect label".to_string() }][..]));
        assert_eq!(table.get(TokenKind::HALT), None);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            SyntaxTable::from_json(r#"{ "NOP": [] }"#),
            Err(SyntaxTableErr::UnknownInstruction(name)) if name == "NOP"
        ));
        assert!(matches!(
            SyntaxTable::from_json(r#"{ "B": [{ "kind": "Eof", "error": "" }] }"#),
            Err(SyntaxTableErr::InvalidSlot(TokenKind::B, TokenKind::Eof))
        ));
        assert!(matches!(
            SyntaxTable::from_json(r#"{ "B": [{ "kind": "Label" }] }"#),
            Err(SyntaxTableErr::Json(_))
        ));
        assert!(matches!(
            SyntaxTable::new([(TokenKind::Register, vec![])]),
            Err(SyntaxTableErr::UnknownInstruction(_))
        ));
    }
}
