//! The CPU-visible register block.
//!
//! `PPUCTRL`/`PPUMASK`/`PPUSTATUS` shadows plus the internal flags the two
//! chips share: the $2007 read buffer, the $2002 race flags, and the
//! write-delay buffer that holds a CPU register write until the PPU dot it
//! lands on. The CPU runs first within each CPU-cycle group, so its MMIO
//! writes are staged here and applied two dots later (five for $2001,
//! which gates rendering through an extra delay).

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// $2000 PPUCTRL.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Ctrl: u8 {
        /// Base nametable select, bit 0.
        const NAMETABLE_LO = 1 << 0;
        /// Base nametable select, bit 1.
        const NAMETABLE_HI = 1 << 1;
        /// $2007 address increment: 0 = +1 (across), 1 = +32 (down).
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table for 8x8 sprites.
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table.
        const BG_TABLE = 1 << 4;
        /// Sprite size: 0 = 8x8, 1 = 8x16.
        const SPRITE_SIZE = 1 << 5;
        /// EXT pin direction; unused by this core.
        const MASTER_SLAVE = 1 << 6;
        /// Generate an NMI at the start of vertical blank.
        const NMI_ENABLE = 1 << 7;
    }
}

impl Ctrl {
    /// $2007 increment amount.
    #[inline]
    #[must_use]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) { 32 } else { 1 }
    }

    /// Pattern table base for the background.
    #[inline]
    #[must_use]
    pub fn bg_table_addr(self) -> u16 {
        if self.contains(Self::BG_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Pattern table base for 8x8 sprites. 8x16 sprites pick their table
    /// from tile bit 0 instead.
    #[inline]
    #[must_use]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    /// Sprite height in scanlines.
    #[inline]
    #[must_use]
    pub fn sprite_height(self) -> u16 {
        if self.contains(Self::SPRITE_SIZE) { 16 } else { 8 }
    }

    /// NMI generation enabled.
    #[inline]
    #[must_use]
    pub fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// $2001 PPUMASK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Mask: u8 {
        /// Greyscale: AND every palette lookup with $30.
        const GREYSCALE = 1 << 0;
        /// Show the background in the left 8 pixels.
        const BG_LEFT = 1 << 1;
        /// Show sprites in the left 8 pixels.
        const SPRITES_LEFT = 1 << 2;
        /// Background rendering enable.
        const SHOW_BG = 1 << 3;
        /// Sprite rendering enable.
        const SHOW_SPRITES = 1 << 4;
        /// Colour emphasis, red (not modelled).
        const EMPHASIZE_RED = 1 << 5;
        /// Colour emphasis, green (not modelled).
        const EMPHASIZE_GREEN = 1 << 6;
        /// Colour emphasis, blue (not modelled).
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl Mask {
    /// Either layer enabled; the gate for the whole rendering pipeline.
    #[inline]
    #[must_use]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BG | Self::SHOW_SPRITES)
    }

    /// Background layer enabled.
    #[inline]
    #[must_use]
    pub fn show_background(self) -> bool {
        self.contains(Self::SHOW_BG)
    }

    /// Sprite layer enabled.
    #[inline]
    #[must_use]
    pub fn show_sprites(self) -> bool {
        self.contains(Self::SHOW_SPRITES)
    }

    /// Background hidden in the left 8 pixels.
    #[inline]
    #[must_use]
    pub fn clip_background_left(self) -> bool {
        !self.contains(Self::BG_LEFT)
    }

    /// Sprites hidden in the left 8 pixels.
    #[inline]
    #[must_use]
    pub fn clip_sprites_left(self) -> bool {
        !self.contains(Self::SPRITES_LEFT)
    }

    /// Greyscale output.
    #[inline]
    #[must_use]
    pub fn greyscale(self) -> bool {
        self.contains(Self::GREYSCALE)
    }
}

bitflags! {
    /// $2002 PPUSTATUS. Bits 0-4 are open bus and supplied by the system
    /// bus from its data-bus shadow.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Status: u8 {
        /// More than eight sprites sighted on a scanline.
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Vertical blank started.
        const VBLANK = 1 << 7;
    }
}

/// A CPU register write waiting for its PPU dot.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedWrite {
    /// A write is in flight.
    pub pending: bool,
    /// Dots until it lands.
    pub counter: u8,
    /// Target register ($2000-$2007).
    pub address: u16,
    /// Value written.
    pub value: u8,
}

/// Register shadows and shared internal flags.
#[derive(Debug, Default)]
#[allow(clippy::struct_excessive_bools)] // they are single-dot hardware flags
pub struct RegisterFile {
    /// $2000 shadow.
    pub ctrl: Ctrl,
    /// $2001 shadow.
    pub mask: Mask,
    /// $2002 shadow (PPU-owned bits only).
    pub status: Status,
    /// $2007 read buffer.
    pub read_buffer: u8,
    /// In-flight CPU write.
    pub staged: StagedWrite,
    /// A $2002 read happened since the last dot; arms the NMI
    /// suppression window.
    pub suppress_status: bool,
    /// A $2002 read right now would race the VBL flag set and must
    /// return bit 7 clear.
    pub clear_status: bool,
    /// On a visible or pre-render scanline.
    pub rendering_period: bool,
    /// A staged $2001 write turning background on is close enough to
    /// count for the odd-frame skip.
    pub bg_early_enable: bool,
    /// A staged $2001 write turning background off is close enough to
    /// count for the odd-frame skip.
    pub bg_early_disable: bool,
}

impl RegisterFile {
    /// Base staging delay in dots.
    const WRITE_DELAY: u8 = 2;
    /// Extra dots before a $2001 write gates rendering.
    const MASK_EXTRA_DELAY: u8 = 3;

    /// Fresh power-on register file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a CPU write to $2000-$2007.
    pub fn stage_write(&mut self, address: u16, value: u8) {
        self.staged.pending = true;
        self.staged.counter = Self::WRITE_DELAY;
        if address == 0x2001 {
            self.staged.counter += Self::MASK_EXTRA_DELAY;
        }
        self.staged.address = address;
        self.staged.value = value;
    }

    /// Count the staged write down by one dot. Returns the write when it
    /// lands this dot.
    pub fn clock_staged_write(&mut self) -> Option<(u16, u8)> {
        if !self.staged.pending {
            return None;
        }
        self.staged.counter -= 1;

        // Flag rendering-enable flips early so the odd-frame skip sees
        // the value the hardware would.
        if self.staged.address == 0x2001 && self.staged.counter == Self::MASK_EXTRA_DELAY {
            if self.staged.value & Mask::SHOW_BG.bits() != 0 {
                self.bg_early_enable = true;
            } else {
                self.bg_early_disable = true;
            }
        }

        if self.staged.counter == 0 {
            self.staged.pending = false;
            self.bg_early_enable = false;
            self.bg_early_disable = false;
            return Some((self.staged.address, self.staged.value));
        }
        None
    }

    /// Background considered enabled for the odd-frame skip, including
    /// in-flight $2001 writes.
    #[must_use]
    pub fn bg_enabled_for_skip(&self) -> bool {
        !self.bg_early_disable && (self.bg_early_enable || self.mask.show_background())
    }
}
