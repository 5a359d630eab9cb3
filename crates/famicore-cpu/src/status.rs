//! CPU status register (P) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt Disable
//! │  │  │  │  └────────── Decimal (inert on the NES, but toggleable)
//! │  │  │  └───────────── Break (1 when pushed by PHP/BRK, 0 by IRQ/NMI)
//! │  │  └──────────────── Unused (always 1 when pushed)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable. Masks IRQ; NMI is unaffected.
        const I = 1 << 2;
        /// Decimal mode. The 2A03 has no BCD unit, but the bit still latches.
        const D = 1 << 3;
        /// Break. Only exists on the stack: 1 from PHP/BRK, 0 from IRQ/NMI.
        const B = 1 << 4;
        /// Unused, reads back as 1 whenever P lands on the stack.
        const U = 1 << 5;
        /// Overflow (signed).
        const V = 1 << 6;
        /// Negative (bit 7 of the last result).
        const N = 1 << 7;
    }
}

impl Status {
    /// Status after power-on: I and U set ($24).
    pub const POWER_ON: Self = Self::I.union(Self::U);

    /// Creates the power-on status register.
    #[must_use]
    pub const fn new() -> Self {
        Self::POWER_ON
    }

    /// Updates Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// Byte pushed to the stack. U is always set; B depends on the source
    /// (PHP/BRK push 1, IRQ/NMI push 0).
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, brk: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if brk {
            value |= Self::B.bits();
        }
        value
    }

    /// Status restored from a stack byte (PLP/RTI). B is discarded, U forced.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}
