//! Components relating to the abstract syntax tree (AST)
//! used in representing AQA assembly instructions.
//!
//! A program is a `Vec<`[`Stmt`]`>`, where each [`Stmt`] is either an instruction or a label declaration.
//! The operands of each instruction are held in typed wrappers
//! ([`Reg`], [`Addr`], [`Imm`], [`ImmOrReg`], [`Label`]), which own the token they were parsed from.

use crate::parse::lex::{Token, TokenKind};

/// A register reference.
///
/// This is only guaranteed to be a well-formed register token.
/// Whether the register exists depends on the register count configured for the simulator.
///
/// ## Examples
///
/// ```text
/// ADD r2, r1, #3
///     ~~  ~~
/// CMP r1, r2
///     ~~  ~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Reg {
    index: i64,
    token: Token
}
impl Reg {
    /// The register index (e.g., `r3` has index 3).
    pub fn index(&self) -> i64 {
        self.index
    }
    /// The token this register was parsed from.
    pub fn token(&self) -> &Token {
        &self.token
    }
}
impl TryFrom<Token> for Reg {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Self::Error> {
        match (token.kind, token.int()) {
            (TokenKind::Register, Some(index)) => Ok(Reg { index, token }),
            _ => Err(token)
        }
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.index)
    }
}

/// A direct memory address.
///
/// ## Examples
///
/// ```text
/// LDR r1, 20
///         ~~
/// STR r1, 100
///         ~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Addr {
    addr: i64,
    token: Token
}
impl Addr {
    /// The memory address.
    pub fn get(&self) -> i64 {
        self.addr
    }
    /// The token this address was parsed from.
    pub fn token(&self) -> &Token {
        &self.token
    }
}
impl TryFrom<Token> for Addr {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Self::Error> {
        match (token.kind, token.int()) {
            (TokenKind::DirectAddress, Some(addr)) => Ok(Addr { addr, token }),
            _ => Err(token)
        }
    }
}
impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr)
    }
}

/// An immediate value.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Imm {
    value: i64,
    token: Token
}
impl Imm {
    /// The value.
    pub fn get(&self) -> i64 {
        self.value
    }
    /// The token this value was parsed from.
    pub fn token(&self) -> &Token {
        &self.token
    }
}
impl TryFrom<Token> for Imm {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Self::Error> {
        match (token.kind, token.int()) {
            (TokenKind::Immediate, Some(value)) => Ok(Imm { value, token }),
            _ => Err(token)
        }
    }
}
impl std::fmt::Display for Imm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.value)
    }
}

/// Either an immediate value or a register.
///
/// This is the "operand 2" of most arithmetic and logical instructions.
///
/// ## Examples
///
/// ```text
/// ADD r2, r1, #3
///             ~~
/// MOV r1, r2
///         ~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ImmOrReg {
    #[allow(missing_docs)]
    Imm(Imm),
    #[allow(missing_docs)]
    Reg(Reg)
}
impl ImmOrReg {
    /// The token this operand was parsed from.
    pub fn token(&self) -> &Token {
        match self {
            ImmOrReg::Imm(imm) => imm.token(),
            ImmOrReg::Reg(reg) => reg.token(),
        }
    }
}
impl TryFrom<Token> for ImmOrReg {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Self::Error> {
        match token.kind {
            TokenKind::Register  => Reg::try_from(token).map(ImmOrReg::Reg),
            TokenKind::Immediate => Imm::try_from(token).map(ImmOrReg::Imm),
            _ => Err(token)
        }
    }
}
impl std::fmt::Display for ImmOrReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImmOrReg::Imm(imm) => std::fmt::Display::fmt(imm, f),
            ImmOrReg::Reg(reg) => std::fmt::Display::fmt(reg, f),
        }
    }
}

/// A label identifier, used either in a label declaration or as a branch target.
///
/// ## Examples
///
/// ```text
/// loop:
/// ~~~~
/// BNE loop
///     ~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Label {
    token: Token
}
impl Label {
    /// The label's name.
    pub fn name(&self) -> &str {
        self.token.ident().unwrap_or(&self.token.lexeme)
    }
    /// The token this label was parsed from.
    pub fn token(&self) -> &Token {
        &self.token
    }
}
impl TryFrom<Token> for Label {
    type Error = Token;

    fn try_from(token: Token) -> Result<Self, Self::Error> {
        match token.kind {
            TokenKind::Identifier => Ok(Label { token }),
            _ => Err(token)
        }
    }
}
impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A statement of an AQA assembly program.
///
/// Each variant holds only the operands relevant to it.
/// The `Display` implementation renders the statement back in its canonical form:
///
/// ```
/// use aqa_sim::parse::parse_ast;
/// use aqa_sim::parse::syntax::SyntaxTable;
///
/// let ast = parse_ast("ADD  r2,r1 , #3\nloop :", &SyntaxTable::standard()).unwrap();
/// assert_eq!(ast[0].to_string(), "ADD r2, r1, #3");
/// assert_eq!(ast[1].to_string(), "loop:");
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Stmt {
    /// Load a value from memory into a register (`LDR Rd, <memory ref>`).
    Load(Reg, Addr),
    /// Store the value of a register into memory (`STR Rd, <memory ref>`).
    Store(Reg, Addr),
    /// Add operand 2 to Rn and store the result in Rd (`ADD Rd, Rn, <operand2>`).
    Add(Reg, Reg, ImmOrReg),
    /// Subtract operand 2 from Rn and store the result in Rd (`SUB Rd, Rn, <operand2>`).
    Subtract(Reg, Reg, ImmOrReg),
    /// Copy operand 2 into Rd (`MOV Rd, <operand2>`).
    Move(Reg, ImmOrReg),
    /// Compare Rn with operand 2, setting the comparison flags (`CMP Rn, <operand2>`).
    Compare(Reg, ImmOrReg),
    /// Always branch to the label (`B <label>`).
    Branch(Label),
    /// Branch to the label if the last comparison was equal (`BEQ <label>`).
    BranchEqual(Label),
    /// Branch to the label if the last comparison was not equal (`BNE <label>`).
    BranchNotEqual(Label),
    /// Branch to the label if the last comparison was greater than (`BGT <label>`).
    BranchGreaterThan(Label),
    /// Branch to the label if the last comparison was less than (`BLT <label>`).
    BranchLessThan(Label),
    /// Bitwise AND (`AND Rd, Rn, <operand2>`).
    And(Reg, Reg, ImmOrReg),
    /// Bitwise OR (`ORR Rd, Rn, <operand2>`).
    Or(Reg, Reg, ImmOrReg),
    /// Bitwise XOR (`EOR Rd, Rn, <operand2>`).
    Eor(Reg, Reg, ImmOrReg),
    /// Bitwise NOT of operand 2, stored in Rd (`MVN Rd, <operand2>`).
    Not(Reg, ImmOrReg),
    /// Shift Rn left by operand 2 bits (`LSL Rd, Rn, <operand2>`).
    LeftShift(Reg, Reg, ImmOrReg),
    /// Shift Rn right by operand 2 bits (`LSR Rd, Rn, <operand2>`).
    RightShift(Reg, Reg, ImmOrReg),
    /// Stop execution (`HALT`).
    Halt,
    /// A label declaration (`<label>:`).
    Label(Label),
}
impl Stmt {
    /// Builds the instruction for the given mnemonic out of its operand tokens.
    ///
    /// The operands must match the shape of the instruction exactly
    /// (in count, order, and kind). If they do not, this returns `None`.
    ///
    /// ```
    /// use aqa_sim::ast::Stmt;
    /// use aqa_sim::parse::lex::{scan, TokenKind};
    ///
    /// let (tokens, _) = scan("r1 #5");
    /// let operands = tokens.into_iter().filter(|t| t.kind != TokenKind::Eof).collect();
    ///
    /// let stmt = Stmt::new(TokenKind::MOV, operands).unwrap();
    /// assert_eq!(stmt.to_string(), "MOV r1, #5");
    /// ```
    pub fn new(mnemonic: TokenKind, operands: Vec<Token>) -> Option<Self> {
        fn next<T: TryFrom<Token>>(ops: &mut std::vec::IntoIter<Token>) -> Option<T> {
            ops.next()?.try_into().ok()
        }

        let mut ops = operands.into_iter();
        let o = &mut ops;
        let stmt = match mnemonic {
            TokenKind::LDR  => Stmt::Load(next(o)?, next(o)?),
            TokenKind::STR  => Stmt::Store(next(o)?, next(o)?),
            TokenKind::ADD  => Stmt::Add(next(o)?, next(o)?, next(o)?),
            TokenKind::SUB  => Stmt::Subtract(next(o)?, next(o)?, next(o)?),
            TokenKind::MOV  => Stmt::Move(next(o)?, next(o)?),
            TokenKind::CMP  => Stmt::Compare(next(o)?, next(o)?),
            TokenKind::B    => Stmt::Branch(next(o)?),
            TokenKind::BEQ  => Stmt::BranchEqual(next(o)?),
            TokenKind::BNE  => Stmt::BranchNotEqual(next(o)?),
            TokenKind::BGT  => Stmt::BranchGreaterThan(next(o)?),
            TokenKind::BLT  => Stmt::BranchLessThan(next(o)?),
            TokenKind::AND  => Stmt::And(next(o)?, next(o)?, next(o)?),
            TokenKind::ORR  => Stmt::Or(next(o)?, next(o)?, next(o)?),
            TokenKind::EOR  => Stmt::Eor(next(o)?, next(o)?, next(o)?),
            TokenKind::MVN  => Stmt::Not(next(o)?, next(o)?),
            TokenKind::LSL  => Stmt::LeftShift(next(o)?, next(o)?, next(o)?),
            TokenKind::LSR  => Stmt::RightShift(next(o)?, next(o)?, next(o)?),
            TokenKind::HALT => Stmt::Halt,
            _ => return None
        };

        ops.next().is_none().then_some(stmt)
    }

    /// The mnemonic of this instruction (or `None` for a label declaration).
    pub fn mnemonic(&self) -> Option<TokenKind> {
        let kind = match self {
            Stmt::Load(..)              => TokenKind::LDR,
            Stmt::Store(..)             => TokenKind::STR,
            Stmt::Add(..)               => TokenKind::ADD,
            Stmt::Subtract(..)          => TokenKind::SUB,
            Stmt::Move(..)              => TokenKind::MOV,
            Stmt::Compare(..)           => TokenKind::CMP,
            Stmt::Branch(_)             => TokenKind::B,
            Stmt::BranchEqual(_)        => TokenKind::BEQ,
            Stmt::BranchNotEqual(_)     => TokenKind::BNE,
            Stmt::BranchGreaterThan(_)  => TokenKind::BGT,
            Stmt::BranchLessThan(_)     => TokenKind::BLT,
            Stmt::And(..)               => TokenKind::AND,
            Stmt::Or(..)                => TokenKind::ORR,
            Stmt::Eor(..)               => TokenKind::EOR,
            Stmt::Not(..)               => TokenKind::MVN,
            Stmt::LeftShift(..)         => TokenKind::LSL,
            Stmt::RightShift(..)        => TokenKind::LSR,
            Stmt::Halt                  => TokenKind::HALT,
            Stmt::Label(_)              => return None,
        };
        Some(kind)
    }

    /// The source line of this statement, if it has any operand to take it from.
    pub fn line(&self) -> Option<usize> {
        let token = match self {
            Stmt::Load(r, _) | Stmt::Store(r, _) => r.token(),
            | Stmt::Add(r, ..) | Stmt::Subtract(r, ..)
            | Stmt::And(r, ..) | Stmt::Or(r, ..) | Stmt::Eor(r, ..)
            | Stmt::LeftShift(r, ..) | Stmt::RightShift(r, ..)
            | Stmt::Move(r, _) | Stmt::Compare(r, _) | Stmt::Not(r, _) => r.token(),
            | Stmt::Branch(l) | Stmt::BranchEqual(l) | Stmt::BranchNotEqual(l)
            | Stmt::BranchGreaterThan(l) | Stmt::BranchLessThan(l)
            | Stmt::Label(l) => l.token(),
            Stmt::Halt => return None,
        };
        Some(token.line)
    }
}
impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(mnemonic) = self.mnemonic() else {
            if let Stmt::Label(label) = self {
                write!(f, "{label}:")?;
            }
            return Ok(());
        };
        write!(f, "{mnemonic}")?;

        match self {
            Stmt::Load(rd, addr) | Stmt::Store(rd, addr) => write!(f, " {rd}, {addr}")?,
            | Stmt::Add(rd, rn, op) | Stmt::Subtract(rd, rn, op)
            | Stmt::And(rd, rn, op) | Stmt::Or(rd, rn, op) | Stmt::Eor(rd, rn, op)
            | Stmt::LeftShift(rd, rn, op) | Stmt::RightShift(rd, rn, op) => write!(f, " {rd}, {rn}, {op}")?,
            Stmt::Move(rd, op) | Stmt::Compare(rd, op) | Stmt::Not(rd, op) => write!(f, " {rd}, {op}")?,
            | Stmt::Branch(label) | Stmt::BranchEqual(label) | Stmt::BranchNotEqual(label)
            | Stmt::BranchGreaterThan(label) | Stmt::BranchLessThan(label) => write!(f, " {label}")?,
            Stmt::Halt | Stmt::Label(_) => {},
        }
        Ok(())
    }
}
