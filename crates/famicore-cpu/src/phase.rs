//! Per-cycle execution phases.
//!
//! The CPU runs a three-phase state machine: FETCH reads the opcode and
//! loads the max-cycle count, DECODE runs once per cycle filling the
//! address latches, and EXECUTE applies the instruction's effect on its
//! final cycle.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Instruction execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Read the opcode at PC and load `instruction_cycles_remaining`.
    /// Interrupts and OAM DMA are only recognised here.
    #[default]
    Fetch,
    /// One addressing-mode decode step per cycle.
    Decode,
    /// Apply the instruction's architectural effect (single cycle).
    Execute,
}

/// Hardware interrupt kind. Reset is handled by [`crate::Cpu::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interrupt {
    /// Non-maskable interrupt, vector at $FFFA/$FFFB.
    #[default]
    Nmi,
    /// Maskable interrupt, vector at $FFFE/$FFFF (shared with BRK).
    Irq,
}

impl Interrupt {
    /// Address of this interrupt's vector.
    #[inline]
    #[must_use]
    pub const fn vector(self) -> u16 {
        match self {
            Self::Nmi => crate::vectors::NMI,
            Self::Irq => crate::vectors::IRQ,
        }
    }
}
