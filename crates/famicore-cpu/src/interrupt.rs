//! Interrupt and DMA pins shared between the CPU and the PPU.
//!
//! These are the CPU-facing control flags of the shared CPU/PPU register
//! block. The integration layer owns one [`InterruptPins`] value and passes
//! it by mutable reference into both tick functions, so neither chip holds
//! a pointer to the other: the PPU raises NMI/DMA state here and the CPU
//! consumes it at instruction boundaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt and DMA request lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(clippy::struct_excessive_bools)] // they are hardware lines
pub struct InterruptPins {
    /// NMI latched by the PPU at the start of vertical blank. Cleared by
    /// the CPU when the interrupt sequence completes, or by the PPU when a
    /// $2002 race suppresses it.
    pub nmi_pending: bool,
    /// Raised by the PPU for the dots surrounding the VBL flag set. A CPU
    /// instruction completing while this is up defers a pending NMI by one
    /// instruction.
    pub nmi_lookahead: bool,
    /// Raised by the PPU when a $2002 read or a $2000 NMI-disable lands in
    /// the suppression window; the CPU drops any pending interrupt once.
    pub ignore_nmi: bool,
    /// One-shot request to defer a pending NMI by one instruction. Raised
    /// when a buffered $2000 write turns NMI generation on mid-VBL.
    pub delay_nmi: bool,
    /// Level-triggered IRQ line, masked by the I flag.
    pub irq_line: bool,
    /// OAM DMA requested by a $4014 write; serviced at the next fetch
    /// boundary.
    pub dma_pending: bool,
    /// Source page for OAM DMA ($HH00-$HHFF).
    pub dma_page: u8,
}

impl InterruptPins {
    /// Pins with nothing asserted.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nmi_pending: false,
            nmi_lookahead: false,
            ignore_nmi: false,
            delay_nmi: false,
            irq_line: false,
            dma_pending: false,
            dma_page: 0,
        }
    }
}
