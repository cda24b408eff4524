//! Memory handling for the simulator.
//!
//! This module consists of:
//! - [`RegFile`]: The register file.
//! - [`Memory`]: The main memory.
//! - [`Flags`]: The comparison flags, set by `CMP`.
//!
//! Registers and memory are both bounds-checked.
//! Every access that goes through an operand ([`Reg`] or [`Addr`]) produces a [`SimErr`]
//! carrying the operand's token if it is out of range.

use crate::ast::{Addr, Reg};

use super::{SimErr, SimErrKind};

/// The register file.
///
/// Registers are 1-indexed: a register file of size `n` holds the registers `r1` to `rn`.
/// All registers start at 0.
///
/// ```
/// use aqa_sim::sim::mem::RegFile;
///
/// let mut regs = RegFile::new(4);
/// assert_eq!(regs.len(), 4);
/// assert_eq!(regs.as_slice(), [0, 0, 0, 0]);
///
/// regs.as_mut_slice()[0] = 11; // r1
/// assert_eq!(regs.as_slice(), [11, 0, 0, 0]);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RegFile(Vec<i64>);
impl RegFile {
    /// Creates a register file with `count` registers, all set to 0.
    pub fn new(count: usize) -> Self {
        Self(vec![0; count])
    }

    /// The number of registers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the register file has no registers at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn slot(&self, reg: &Reg) -> Result<usize, SimErr> {
        usize::try_from(reg.index()).ok()
            .filter(|i| (1..=self.len()).contains(i))
            .map(|i| i - 1)
            .ok_or_else(|| SimErr::new(SimErrKind::RegisterOutOfRange, reg.token().clone()))
    }

    /// Reads the value of a register.
    ///
    /// This errors if the register does not exist.
    pub fn get(&self, reg: &Reg) -> Result<i64, SimErr> {
        self.slot(reg).map(|i| self.0[i])
    }

    /// Writes a value into a register.
    ///
    /// This errors if the register does not exist.
    pub fn set(&mut self, reg: &Reg, value: i64) -> Result<(), SimErr> {
        let i = self.slot(reg)?;
        self.0[i] = value;
        Ok(())
    }

    /// The values of all the registers, starting from `r1`.
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Mutable access to all the registers, starting from `r1`.
    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.0
    }
}

/// The main memory.
///
/// Memory is 0-indexed: a memory of capacity `n` holds addresses `0` to `n - 1`.
/// All memory cells start at 0.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Memory(Vec<i64>);
impl Memory {
    /// Creates a memory with `capacity` addressable cells, all set to 0.
    pub fn new(capacity: usize) -> Self {
        Self(vec![0; capacity])
    }

    /// The number of addressable cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the memory has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn slot(&self, addr: &Addr) -> Result<usize, SimErr> {
        usize::try_from(addr.get()).ok()
            .filter(|&i| i < self.len())
            .ok_or_else(|| SimErr::new(SimErrKind::AddressOutOfRange, addr.token().clone()))
    }

    /// Reads the value at an address.
    ///
    /// This errors if the address is past the memory's capacity.
    pub fn get(&self, addr: &Addr) -> Result<i64, SimErr> {
        self.slot(addr).map(|i| self.0[i])
    }

    /// Writes a value at an address.
    ///
    /// This errors if the address is past the memory's capacity.
    pub fn set(&mut self, addr: &Addr, value: i64) -> Result<(), SimErr> {
        let i = self.slot(addr)?;
        self.0[i] = value;
        Ok(())
    }

    /// The values of all memory cells, starting from address 0.
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Mutable access to all memory cells, starting from address 0.
    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.0
    }
}

/// The comparison flags, which are set by `CMP` and read by the conditional branches.
///
/// ```
/// use aqa_sim::sim::mem::Flags;
///
/// let flags = Flags::compare(3, 5);
/// assert_eq!(flags, Flags { eq: false, ne: true, gt: false, lt: true });
/// ```
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Flags {
    /// Set if the operands were equal (`BEQ`).
    pub eq: bool,
    /// Set if the operands were not equal (`BNE`).
    pub ne: bool,
    /// Set if the first operand was greater (`BGT`).
    pub gt: bool,
    /// Set if the first operand was less (`BLT`).
    pub lt: bool,
}
impl Flags {
    /// Computes the flags from comparing `lhs` with `rhs`.
    pub fn compare(lhs: i64, rhs: i64) -> Self {
        Flags {
            eq: lhs == rhs,
            ne: lhs != rhs,
            gt: lhs > rhs,
            lt: lhs < rhs,
        }
    }
}
impl std::fmt::Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EQ={} NE={} GT={} LT={}",
            u8::from(self.eq), u8::from(self.ne), u8::from(self.gt), u8::from(self.lt)
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Addr, Reg};
    use crate::parse::lex::scan;
    use crate::sim::SimErrKind;

    use super::{Flags, Memory, RegFile};

    fn reg(src: &str) -> Reg {
        let (mut tokens, _) = scan(src);
        Reg::try_from(tokens.remove(0)).unwrap()
    }
    fn addr(src: &str) -> Addr {
        let (mut tokens, _) = scan(src);
        Addr::try_from(tokens.remove(0)).unwrap()
    }

    #[test]
    fn test_reg_file_bounds() {
        let mut regs = RegFile::new(4);

        regs.set(&reg("r1"), 10).unwrap();
        regs.set(&reg("r4"), 40).unwrap();
        assert_eq!(regs.get(&reg("r1")).unwrap(), 10);
        assert_eq!(regs.get(&reg("r4")).unwrap(), 40);
        assert_eq!(regs.as_slice(), [10, 0, 0, 40]);

        for r in ["r0", "r5", "r99"] {
            let err = regs.get(&reg(r)).unwrap_err();
            assert_eq!(err.kind, SimErrKind::RegisterOutOfRange);
            assert_eq!(err.token.lexeme, r);

            let err = regs.set(&reg(r), 1).unwrap_err();
            assert_eq!(err.kind, SimErrKind::RegisterOutOfRange);
        }
        assert_eq!(regs.as_slice(), [10, 0, 0, 40]);

        let empty = RegFile::new(0);
        assert!(empty.is_empty());
        assert!(empty.get(&reg("r1")).is_err());
    }

    #[test]
    fn test_memory_bounds() {
        let mut mem = Memory::new(16);

        mem.set(&addr("0"), 1).unwrap();
        mem.set(&addr("15"), 2).unwrap();
        assert_eq!(mem.get(&addr("0")).unwrap(), 1);
        assert_eq!(mem.get(&addr("15")).unwrap(), 2);
        assert_eq!(mem.get(&addr("7")).unwrap(), 0);

        for a in ["16", "500"] {
            let err = mem.get(&addr(a)).unwrap_err();
            assert_eq!(err.kind, SimErrKind::AddressOutOfRange);
            assert_eq!(err.token.lexeme, a);

            let err = mem.set(&addr(a), 1).unwrap_err();
            assert_eq!(err.kind, SimErrKind::AddressOutOfRange);
        }
        assert_eq!(mem.len(), 16);

        mem.as_mut_slice()[7] = -4;
        assert_eq!(mem.get(&addr("7")).unwrap(), -4);
    }

    #[test]
    fn test_flags() {
        assert_eq!(Flags::default(), Flags { eq: false, ne: false, gt: false, lt: false });
        assert_eq!(Flags::compare(5, 5), Flags { eq: true, ne: false, gt: false, lt: false });
        assert_eq!(Flags::compare(6, 5), Flags { eq: false, ne: true, gt: true, lt: false });
        assert_eq!(Flags::compare(-1, 5), Flags { eq: false, ne: true, gt: false, lt: true });
        assert_eq!(Flags::compare(5, 5).to_string(), "EQ=1 NE=0 GT=0 LT=0");
    }
}
