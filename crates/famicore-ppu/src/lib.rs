//! Cycle-accurate Ricoh 2C02 PPU core.
//!
//! One call to [`Ppu::tick`] is one dot of the 341×262 NTSC frame. The
//! crate models the background fetch pipeline, sprite evaluation and the
//! eight output units, the v/t/x/w scroll hardware, palette RAM with its
//! mirroring, the register side effects of $2000-$2007, and the NMI race
//! behaviour around the vertical-blank flag.
//!
//! # Shared register block
//!
//! The PPU half of the CPU/PPU shared state lives in [`RegisterFile`]:
//! register shadows, the $2007 read buffer and the write-delay buffer
//! that holds CPU register writes for the dots they need to land on. The
//! CPU half — NMI/DMA pins — is `famicore_cpu::InterruptPins`, passed
//! into [`Ppu::tick`] by the integration layer so neither chip owns the
//! other.
//!
//! # Memory
//!
//! Nametables and palette RAM live in [`VramMap`]; pattern tables belong
//! to the mapper and are reached through the [`ChrBus`] seam handed to
//! [`Ppu::tick`] and [`Ppu::read_data`].

mod background;
mod oam;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod timing;
mod vram;

pub use oam::{Oam, SecondaryOam, MAX_SPRITES_PER_LINE, OAM_SIZE, SECONDARY_OAM_SIZE};
pub use ppu::{ChrBus, Ppu, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};
pub use registers::{Ctrl, Mask, RegisterFile, StagedWrite, Status};
pub use scroll::Scroll;
pub use sprites::{SpriteEvaluator, SpritePixel, SpriteUnit, SpriteUnits};
pub use timing::{
    Timing, DOTS_PER_SCANLINE, PRE_RENDER_SCANLINE, SCANLINES_PER_FRAME, VBLANK_SCANLINE,
};
pub use vram::VramMap;

// The mirroring mode is cartridge-owned.
pub use famicore_mappers::Mirroring;
