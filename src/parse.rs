//! Parsing AQA assembly source code into an AST.
//!
//! This module is used to convert tokens (from [`lex::scan`]) into a list of statements
//! (`Vec<`[`Stmt`]`>`), with the help of a [`SyntaxTable`] describing the operands of each instruction.
//!
//! The module's key items are:
//! - [`parse`]: parses tokens into statements
//! - [`parse_ast`]: scans and parses source code in one go
//!
//! # Example
//!
//! ```
//! use aqa_sim::parse::parse_ast;
//! use aqa_sim::parse::syntax::SyntaxTable;
//!
//! let src = "
//!     MOV r1, #5
//!     loop:
//!     SUB r1, r1, #1
//!     CMP r1, #0
//!     BNE loop
//!     HALT
//! ";
//! let ast = parse_ast(src, &SyntaxTable::standard()).unwrap();
//! assert_eq!(ast.len(), 6);
//! ```

pub mod lex;
pub mod syntax;

use std::borrow::Cow;

use crate::ast::{Label, Stmt};
use lex::{LexErr, Token, TokenKind};
use syntax::{Slot, SyntaxTable};

/// Kinds of errors that can occur while parsing.
///
/// See [`ParseErr`] for this error type with the offending token included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ParseErrKind {
    /// The token cannot begin a statement.
    UnexpectedToken,
    /// A label identifier was not followed by a colon.
    ExpectedColon,
    /// A token required by the instruction's syntax table entry was missing.
    ExpectedSlot(TokenKind),
    /// The syntax table entry of the instruction does not agree with the instruction's operands.
    MalformedTable(TokenKind),
}

/// Error from parsing tokens into statements.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErr {
    /// The kind of error.
    pub kind: ParseErrKind,
    /// The token where the error occurred.
    pub token: Token,
    /// The error message.
    pub message: String
}
impl ParseErr {
    /// Creates a new [`ParseErr`].
    pub fn new(kind: ParseErrKind, token: Token, message: impl Into<String>) -> Self {
        ParseErr { kind, token, message: message.into() }
    }
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token.kind {
            TokenKind::Eof => write!(f, "[line {}] {} at end of file", self.token.line, self.message),
            _ => write!(f, "[line {}] {} at {:?}", self.token.line, self.message, self.token.lexeme),
        }
    }
}
impl std::error::Error for ParseErr {}
impl crate::err::Error for ParseErr {
    fn line(&self) -> Option<usize> {
        Some(self.token.line)
    }

    fn help(&self) -> Option<Cow<str>> {
        match self.kind {
            ParseErrKind::UnexpectedToken => Some("a statement starts with an instruction mnemonic or a label identifier".into()),
            ParseErrKind::ExpectedColon => Some("label declarations are written as `label:`".into()),
            ParseErrKind::ExpectedSlot(TokenKind::Operand) => Some("operand 2 is a register (e.g., r1) or an immediate value (e.g., #1)".into()),
            ParseErrKind::ExpectedSlot(kind) => Some(format!("expected {kind}, found {}", self.token.kind).into()),
            ParseErrKind::MalformedTable(instr) => Some(format!("the syntax table entry for {instr} does not match the operands of {instr}").into()),
        }
    }
}

/// All of the errors found before execution (while scanning and parsing).
///
/// A program with any of these errors is never executed.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct StaticErrs {
    /// The errors found while scanning.
    pub lex: Vec<LexErr>,
    /// The errors found while parsing.
    pub parse: Vec<ParseErr>,
}
impl StaticErrs {
    /// Whether no errors were found.
    pub fn is_empty(&self) -> bool {
        self.lex.is_empty() && self.parse.is_empty()
    }

    /// The total number of errors.
    pub fn len(&self) -> usize {
        self.lex.len() + self.parse.len()
    }
}
impl std::fmt::Display for StaticErrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::err::Error as _;

        let reports = self.lex.iter().map(LexErr::report)
            .chain(self.parse.iter().map(ParseErr::report));
        for (i, report) in reports.enumerate() {
            if i != 0 { writeln!(f)?; }
            f.write_str(&report)?;
        }
        Ok(())
    }
}
impl std::error::Error for StaticErrs {}
impl crate::err::Error for StaticErrs {
    fn line(&self) -> Option<usize> {
        let lex = self.lex.iter().map(|e| e.line);
        let parse = self.parse.iter().map(|e| e.token.line);
        lex.chain(parse).min()
    }
}

/// A recursive-descent parser over a list of tokens, driven by a syntax table.
struct Parser<'t> {
    tokens: Vec<Token>,
    index: usize,
    table: &'t SyntaxTable,
    errors: Vec<ParseErr>
}
impl<'t> Parser<'t> {
    fn new(mut tokens: Vec<Token>, table: &'t SyntaxTable) -> Self {
        // The cursor relies on the token list being terminated by EOF.
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, at) = tokens.last().map_or((1, 0), |t| (t.line, t.span.end));
            tokens.push(Token::eof(line, at));
        }

        Parser { tokens, index: 0, table, errors: vec![] }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }
    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }
    /// Moves past the current token (unless at the end), returning it.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.index += 1;
        }
        token
    }
    fn error(&self, kind: ParseErrKind, message: impl Into<String>) -> ParseErr {
        ParseErr::new(kind, self.peek().clone(), message)
    }
    /// Consumes the current token if it matches the slot.
    fn expect(&mut self, slot: &Slot) -> Result<Token, ParseErr> {
        let matches = match slot.kind {
            TokenKind::Operand => self.check(TokenKind::Register) || self.check(TokenKind::Immediate),
            kind => self.check(kind),
        };

        match matches {
            true  => Ok(self.advance()),
            false => Err(self.error(ParseErrKind::ExpectedSlot(slot.kind), &*slot.error)),
        }
    }

    fn parse(mut self) -> (Vec<Stmt>, Vec<ParseErr>) {
        let mut stmts = vec![];

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        (stmts, self.errors)
    }

    fn declaration(&mut self) -> Result<Stmt, ParseErr> {
        match self.check(TokenKind::Identifier) {
            true  => self.label_declaration(),
            false => self.statement(),
        }
    }

    fn label_declaration(&mut self) -> Result<Stmt, ParseErr> {
        let ident = self.advance();
        if !self.check(TokenKind::Colon) {
            return Err(self.error(ParseErrKind::ExpectedColon, "Expect colon after label identifier"));
        }
        self.advance();

        let label = Label::try_from(ident)
            .unwrap_or_else(|t| unreachable!("identifier token {t:?} should be a label"));
        Ok(Stmt::Label(label))
    }

    fn statement(&mut self) -> Result<Stmt, ParseErr> {
        let table = self.table;
        let Some(slots) = table.get(self.peek().kind) else {
            return Err(self.error(ParseErrKind::UnexpectedToken, "Unexpected token"));
        };

        let mnemonic = self.advance();
        let mut operands = vec![];
        for slot in slots {
            let token = self.expect(slot)?;
            if slot.kind != TokenKind::Comma {
                operands.push(token);
            }
        }

        Stmt::new(mnemonic.kind, operands)
            .ok_or_else(|| ParseErr::new(ParseErrKind::MalformedTable(mnemonic.kind), mnemonic, "malformed syntax table entry"))
    }

    /// Skips past the erroring token and any operand tokens which trail it,
    /// so that the next declaration can be parsed.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            match self.peek().kind {
                | TokenKind::Register
                | TokenKind::Immediate
                | TokenKind::DirectAddress
                | TokenKind::Operand
                | TokenKind::Colon
                | TokenKind::Comma => { self.advance(); },
                _ => return
            }
        }
    }
}

/// Parses a list of tokens into a list of statements.
///
/// Parsing does not stop at the first error.
/// Each malformed declaration is reported in the returned error list and
/// produces no statement; parsing resumes at the next declaration.
pub fn parse(tokens: Vec<Token>, table: &SyntaxTable) -> (Vec<Stmt>, Vec<ParseErr>) {
    let (stmts, errors) = Parser::new(tokens, table).parse();
    log::debug!("parsed {} statements with {} syntax errors", stmts.len(), errors.len());

    (stmts, errors)
}

/// Scans and parses source code into a list of statements.
///
/// If any lexical or syntax errors occur, no statements are returned
/// and every error is reported in the [`StaticErrs`].
///
/// # Example
///
/// ```
/// use aqa_sim::parse::parse_ast;
/// use aqa_sim::parse::syntax::SyntaxTable;
///
/// let table = SyntaxTable::standard();
/// assert!(parse_ast("MOV r1, #5\nHALT", &table).is_ok());
///
/// let errs = parse_ast("MOV r1 #5\nADD @", &table).unwrap_err();
/// assert_eq!(errs.lex.len(), 1);
/// assert_eq!(errs.parse.len(), 2);
/// ```
pub fn parse_ast(src: &str, table: &SyntaxTable) -> Result<Vec<Stmt>, StaticErrs> {
    let (tokens, lex) = lex::scan(src);
    let (stmts, parse) = self::parse(tokens, table);

    let errs = StaticErrs { lex, parse };
    match errs.is_empty() {
        true  => Ok(stmts),
        false => Err(errs),
    }
}
