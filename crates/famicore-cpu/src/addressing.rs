//! 6502 addressing modes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Addressing mode of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddrMode {
    /// No operand; one dummy read of the byte after the opcode.
    #[default]
    Implied,
    /// Operates on A; same bus pattern as implied.
    Accumulator,
    /// Operand is the byte after the opcode.
    Immediate,
    /// One-byte address into page zero.
    ZeroPage,
    /// Zero-page address indexed by X, wrapping within page zero.
    ZeroPageX,
    /// Zero-page address indexed by Y, wrapping within page zero.
    ZeroPageY,
    /// Two-byte absolute address.
    Absolute,
    /// Absolute address indexed by X; +1 cycle on page cross for reads.
    AbsoluteX,
    /// Absolute address indexed by Y; +1 cycle on page cross for reads.
    AbsoluteY,
    /// `(zp,X)`: pointer fetched from page zero after indexing by X.
    IndirectX,
    /// `(zp),Y`: pointer fetched from page zero, then indexed by Y.
    IndirectY,
    /// `(abs)`: JMP only, with the page-wrap pointer bug.
    Indirect,
    /// Signed 8-bit branch offset.
    Relative,
}

impl AddrMode {
    /// Number of operand bytes following the opcode.
    #[inline]
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndirectX
            | Self::IndirectY
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// True for the modes whose final cycle can be elided when no page
    /// cross occurs (never applies to stores).
    #[inline]
    #[must_use]
    pub const fn has_page_cross_penalty(self) -> bool {
        matches!(self, Self::AbsoluteX | Self::AbsoluteY | Self::IndirectY)
    }
}
