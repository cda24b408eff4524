//! Tokenizing AQA assembly.
//!
//! This module holds the tokens that characterize AQA assembly ([`Token`]).
//! This module is used by the parser to facilitate the conversion of
//! assembly source code into an AST.
//!
//! The module's key items are the [`scan`] function and the [`Token`] struct.
//! Scanning never stops at the first error: every malformed unit is reported
//! as a [`LexErr`] and scanning resumes right after it.

use std::borrow::Cow;
use std::num::IntErrorKind;
use std::ops::Range;

use logos::{Lexer, Logos, Skip};
use serde::Deserialize;

/// The units recognized directly by the `logos` lexer.
///
/// These are converted into [`Token`]s by [`scan`].
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(extras = usize)]
#[logos(error = LexErrKind)]
enum RawToken {
    // Note, these regexes span over units that are technically invalid
    // (e.g., `r1x` matches for a register even though it shouldn't).
    // This is intended.
    // These regexes collect what would be considered one discernable unit
    // and validates it using the validator function.

    /// A register reference (e.g., `r1`, `r12`)
    #[regex(r"r[A-Za-z0-9]*", |lx| lex_digits(&lx.slice()[1..]), priority = 3)]
    Register(i64),

    /// An immediate value (e.g., `#5`)
    #[regex(r"#[A-Za-z0-9]*", |lx| lex_digits(&lx.slice()[1..]))]
    Immediate(i64),

    /// A direct memory address (e.g., `100`)
    #[regex(r"[0-9][A-Za-z0-9]*", |lx| lex_digits(lx.slice()))]
    DirectAddress(i64),

    /// A mnemonic or a label identifier.
    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Word,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    /// A comment, which starts with a semicolon and spans the remaining part of the line.
    #[regex(r";[^\n]*", logos::skip)]
    Comment,

    #[token("\n", newline)]
    NewLine,
}

fn newline(lx: &mut Lexer<'_, RawToken>) -> Skip {
    lx.extras += 1;
    Skip
}

macro_rules! token_kinds {
    ($($instr:ident),+) => {
        /// The kind of a [`Token`].
        ///
        /// This includes every mnemonic of the instruction set, as well as:
        /// - the generic identifier (labels)
        /// - the operand kinds (registers, immediates, direct addresses)
        /// - punctuation and the end of the token stream
        ///
        /// [`TokenKind::Operand`] is never produced by the scanner.
        /// It describes a generic operand slot in the [`SyntaxTable`].
        ///
        /// [`SyntaxTable`]: crate::parse::syntax::SyntaxTable
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Deserialize)]
        pub enum TokenKind {
            /// A label identifier (e.g., `loop`, `done`).
            Identifier,
            $(
                #[allow(missing_docs)]
                $instr
            ),+,
            /// A register reference (e.g., `r1`).
            Register,
            /// An immediate value (e.g., `#10`).
            Immediate,
            /// A direct memory address (e.g., `100`).
            DirectAddress,
            /// Either an immediate value or a register.
            Operand,
            #[allow(missing_docs)]
            Colon,
            #[allow(missing_docs)]
            Comma,
            /// The end of the token stream.
            Eof
        }

        impl TokenKind {
            /// All of the mnemonics of the instruction set.
            pub const MNEMONICS: &'static [TokenKind] = &[$(TokenKind::$instr),+];

            /// Looks up the mnemonic with the given name.
            ///
            /// Mnemonics are case-sensitive (`ADD` is a mnemonic, `add` is not).
            pub fn mnemonic(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($instr) => Some(Self::$instr)),*,
                    _ => None
                }
            }

            /// Whether this kind is one of the instruction mnemonics.
            pub fn is_mnemonic(self) -> bool {
                matches!(self, $(Self::$instr)|*)
            }
        }

        impl std::fmt::Display for TokenKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$instr => f.write_str(stringify!($instr))),*,
                    Self::Identifier    => f.write_str("identifier"),
                    Self::Register      => f.write_str("register"),
                    Self::Immediate     => f.write_str("immediate value"),
                    Self::DirectAddress => f.write_str("direct address"),
                    Self::Operand       => f.write_str("operand"),
                    Self::Colon         => f.write_str("':'"),
                    Self::Comma         => f.write_str("','"),
                    Self::Eof           => f.write_str("end of file"),
                }
            }
        }
    };
}
token_kinds! {
    LDR, STR, ADD, SUB, MOV, CMP, B, BEQ, BNE, BGT, BLT,
    AND, ORR, EOR, MVN, LSL, LSR, HALT
}

/// The decoded value of a token.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Literal {
    /// The value of a register index, immediate value, or direct address.
    Int(i64),
    /// The text of an identifier or mnemonic.
    Ident(String)
}

/// A unit of information in AQA assembly source code.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: String,
    /// The decoded value of this token, if it has one.
    pub literal: Option<Literal>,
    /// The line this token appears on (starting from 1).
    pub line: usize,
    /// The span of this token in the source.
    pub span: Range<usize>
}
impl Token {
    /// Gets the integer value of this token, if it holds one.
    pub fn int(&self) -> Option<i64> {
        match self.literal {
            Some(Literal::Int(n)) => Some(n),
            _ => None
        }
    }

    /// Gets the identifier text of this token, if it holds one.
    pub fn ident(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::Ident(s)) => Some(s),
            _ => None
        }
    }

    pub(crate) fn eof(line: usize, at: usize) -> Self {
        Token { kind: TokenKind::Eof, lexeme: String::new(), literal: None, line, span: at..at }
    }
}
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lexeme)
    }
}

/// Kinds of errors that can occur while scanning.
///
/// See [`LexErr`] for this error type with location information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LexErrKind {
    /// The source contained no characters at all.
    EmptySource,
    /// A register, immediate, or direct address had no digits.
    EmptyInteger,
    /// A register, immediate, or direct address contained something other than digits 0-9.
    InvalidInteger,
    /// The numeric value is too large to be represented.
    IntegerTooLarge,
    /// A character was used which does not begin any token.
    #[default]
    UnexpectedChar
}
impl std::fmt::Display for LexErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrKind::EmptySource     => f.write_str("source is empty"),
            LexErrKind::EmptyInteger    => f.write_str("invalid integer format"),
            LexErrKind::InvalidInteger  => f.write_str("invalid integer format"),
            LexErrKind::IntegerTooLarge => f.write_str("integer is too large"),
            LexErrKind::UnexpectedChar  => f.write_str("unexpected character"),
        }
    }
}

/// Error from scanning assembly source code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LexErr {
    /// The kind of error.
    pub kind: LexErrKind,
    /// The line the error occurred on (starting from 1).
    pub line: usize,
    /// The source text that caused the error.
    pub text: String,
}
impl LexErr {
    /// Creates a new [`LexErr`].
    pub fn new(kind: LexErrKind, line: usize, text: impl Into<String>) -> Self {
        LexErr { kind, line, text: text.into() }
    }
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            LexErrKind::EmptySource => write!(f, "[line {}] {}", self.line, self.kind),
            _ => write!(f, "[line {}] {} at {:?}", self.line, self.kind, self.text),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<Cow<str>> {
        match self.kind {
            LexErrKind::EmptySource     => Some("write at least one instruction, such as HALT".into()),
            LexErrKind::EmptyInteger    => Some("there should be digits (0-9) here".into()),
            LexErrKind::InvalidInteger  => Some("an integer only consists of digits 0-9".into()),
            LexErrKind::IntegerTooLarge => Some(format!("integers are limited to at most {}", i64::MAX).into()),
            LexErrKind::UnexpectedChar  => Some("this character does not occur in any token of AQA assembly".into()),
        }
    }
}

/// Validates that the string is a run of decimal digits and decodes it.
fn lex_digits(digits: &str) -> Result<i64, LexErrKind> {
    digits.parse::<i64>()
        .map_err(|e| match e.kind() {
            IntErrorKind::Empty        => LexErrKind::EmptyInteger,
            IntErrorKind::InvalidDigit => LexErrKind::InvalidInteger,
            IntErrorKind::PosOverflow  => LexErrKind::IntegerTooLarge,
            _ => LexErrKind::InvalidInteger,
        })
}

/// Scans the source code into a sequence of tokens.
///
/// The returned token sequence always ends with a single [`TokenKind::Eof`] token.
/// Any malformed units of the source are reported in the returned error list;
/// these produce no token.
///
/// # Example
///
/// ```
/// use aqa_sim::parse::lex::{scan, TokenKind};
///
/// let (tokens, errors) = scan("MOV r1, #5 ; comment");
/// assert!(errors.is_empty());
///
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::MOV, TokenKind::Register, TokenKind::Comma, TokenKind::Immediate, TokenKind::Eof]);
/// ```
pub fn scan(src: &str) -> (Vec<Token>, Vec<LexErr>) {
    let mut tokens = vec![];
    let mut errors = vec![];

    if src.is_empty() {
        errors.push(LexErr::new(LexErrKind::EmptySource, 1, ""));
    }

    let mut lx = RawToken::lexer(src);
    while let Some(result) = lx.next() {
        let line = lx.extras + 1;
        let lexeme = lx.slice();

        let (kind, literal) = match result {
            Ok(RawToken::Register(n))      => (TokenKind::Register, Some(Literal::Int(n))),
            Ok(RawToken::Immediate(n))     => (TokenKind::Immediate, Some(Literal::Int(n))),
            Ok(RawToken::DirectAddress(n)) => (TokenKind::DirectAddress, Some(Literal::Int(n))),
            Ok(RawToken::Word) => {
                let kind = TokenKind::mnemonic(lexeme).unwrap_or(TokenKind::Identifier);
                (kind, Some(Literal::Ident(lexeme.to_string())))
            },
            Ok(RawToken::Comma) => (TokenKind::Comma, None),
            Ok(RawToken::Colon) => (TokenKind::Colon, None),
            // Skipped by their callbacks:
            Ok(RawToken::Comment | RawToken::NewLine) => continue,
            Err(kind) => {
                errors.push(LexErr::new(kind, line, lexeme));
                continue;
            }
        };

        tokens.push(Token { kind, lexeme: lexeme.to_string(), literal, line, span: lx.span() });
    }

    tokens.push(Token::eof(lx.extras + 1, src.len()));
    log::debug!("scanned {} tokens with {} lexical errors", tokens.len(), errors.len());

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::{scan, LexErrKind, Literal, Token, TokenKind};

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operands() {
        let (tokens, errors) = scan("r1 r12 #0 #45 0 256");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), [
            TokenKind::Register, TokenKind::Register,
            TokenKind::Immediate, TokenKind::Immediate,
            TokenKind::DirectAddress, TokenKind::DirectAddress,
            TokenKind::Eof
        ]);

        let values: Vec<_> = tokens.iter().filter_map(Token::int).collect();
        assert_eq!(values, [1, 12, 0, 45, 0, 256]);
        assert_eq!(tokens[1].lexeme, "r12");
        assert_eq!(tokens[3].lexeme, "#45");
    }

    #[test]
    fn test_keywords_labels() {
        let kws = "LDR STR ADD SUB MOV CMP B BEQ BNE BGT BLT AND ORR EOR MVN LSL LSR HALT";
        let (tokens, errors) = scan(kws);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), TokenKind::MNEMONICS.len() + 1);
        for (token, &expected) in tokens.iter().zip(TokenKind::MNEMONICS) {
            assert_eq!(token.kind, expected, "Expected {token:?} to be keyword");
            assert!(token.kind.is_mnemonic());
        }

        // Case sensitivity
        let (tokens, _) = scan("ADD add Add");
        assert_eq!(kinds(&tokens), [TokenKind::ADD, TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);

        // Labels
        let (tokens, errors) = scan("loop done2 BEQX");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), [TokenKind::Identifier, TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(tokens[1].literal, Some(Literal::Ident("done2".to_string())));
        assert_eq!(tokens[1].ident(), Some("done2"));
        assert_eq!(tokens[1].int(), None);
    }

    #[test]
    fn test_punct_and_lines() {
        let (tokens, errors) = scan("loop:\n  B loop, \r\n\tHALT");
        assert!(errors.is_empty());
        assert_eq!(kinds(&tokens), [
            TokenKind::Identifier, TokenKind::Colon,
            TokenKind::B, TokenKind::Identifier, TokenKind::Comma,
            TokenKind::HALT, TokenKind::Eof
        ]);
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, [1, 1, 2, 2, 2, 3, 3]);
    }

    #[test]
    fn test_only_whitespace_and_comments() {
        for src in ["   ", "\n\n", "; just a comment", "  ; one\n\t; two\r\n"] {
            let (tokens, errors) = scan(src);
            assert!(errors.is_empty(), "{src:?} should have no errors");
            assert_eq!(kinds(&tokens), [TokenKind::Eof], "{src:?} should only have EOF");
        }
    }

    #[test]
    fn test_empty_source() {
        let (tokens, errors) = scan("");
        assert_eq!(kinds(&tokens), [TokenKind::Eof]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrKind::EmptySource);
        assert_eq!(errors[0].line, 1);
    }

    #[test]
    fn test_invalid_integers() {
        for (src, kind) in [
            ("r", LexErrKind::EmptyInteger),
            ("rx", LexErrKind::InvalidInteger),
            ("r1a", LexErrKind::InvalidInteger),
            ("#", LexErrKind::EmptyInteger),
            ("#Q", LexErrKind::InvalidInteger),
            ("3Q", LexErrKind::InvalidInteger),
            ("99999999999999999999", LexErrKind::IntegerTooLarge),
        ] {
            let (tokens, errors) = scan(src);
            assert_eq!(kinds(&tokens), [TokenKind::Eof], "{src:?} should not produce a token");
            assert_eq!(errors.len(), 1, "{src:?} should produce exactly one error");
            assert_eq!(errors[0].kind, kind, "{src:?} produced the wrong error");
            assert_eq!(errors[0].text, src);
        }
    }

    #[test]
    fn test_errors_accumulate() {
        let (tokens, errors) = scan("MOV r1, @5\nADD r2, r1, #3x\n$ HALT");
        let found: Vec<_> = errors.iter().map(|e| (e.kind, e.line)).collect();
        assert_eq!(found, [
            (LexErrKind::UnexpectedChar, 1),
            (LexErrKind::InvalidInteger, 2),
            (LexErrKind::UnexpectedChar, 3),
        ]);

        // scanning continued after each error
        assert_eq!(kinds(&tokens), [
            TokenKind::MOV, TokenKind::Register, TokenKind::Comma, TokenKind::DirectAddress,
            TokenKind::ADD, TokenKind::Register, TokenKind::Comma, TokenKind::Register, TokenKind::Comma,
            TokenKind::HALT, TokenKind::Eof
        ]);
    }

    #[test]
    fn test_invalid_symbol() {
        for c in ['@', '$', '%', '.', '-', '+', '[', ']', '_', '"'] {
            let src = c.to_string();
            let (_, errors) = scan(&src);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, LexErrKind::UnexpectedChar, "Expected {c:?} to be an invalid symbol");
        }
    }
}
