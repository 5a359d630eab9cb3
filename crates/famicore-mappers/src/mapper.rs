//! Mapper trait.
//!
//! A mapper arbitrates both address spaces of the cartridge port: PRG
//! fetches from the CPU bus ($4020-$FFFF, PRG-RAM at $6000-$7FFF) and CHR
//! fetches from the PPU bus ($0000-$1FFF), plus nametable mirroring
//! control.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nametable mirroring mode.
///
/// The console has two physical 1 KiB nametable banks; the mirroring mode
/// decides which bank each of the four logical nametables resolves to.
/// Four-screen carts are rejected at load time and have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mirroring {
    /// A A / B B — nametables stack vertically, for vertical scrollers.
    #[default]
    Horizontal,
    /// A B / A B — nametables sit side by side, for horizontal scrollers.
    Vertical,
    /// All four nametables resolve to bank A.
    SingleScreenLower,
    /// All four nametables resolve to bank B.
    SingleScreenUpper,
}

/// Cartridge mapper interface.
pub trait Mapper: Send + Sync {
    /// Read from PRG space ($4020-$FFFF; $6000-$7FFF is PRG-RAM).
    fn read_prg(&self, addr: u16) -> u8;

    /// Write to PRG space. Writes at $8000+ drive mapper registers.
    ///
    /// `cpu_cycle` is the CPU's global cycle counter; MMC1 uses it to
    /// ignore writes on consecutive cycles the way the hardware's serial
    /// port does.
    fn write_prg(&mut self, addr: u16, value: u8, cpu_cycle: u64);

    /// Read from CHR space ($0000-$1FFF).
    fn read_chr(&self, addr: u16) -> u8;

    /// Write to CHR space. Only effective for CHR-RAM carts.
    fn write_chr(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring.
    fn mirroring(&self) -> Mirroring;

    /// iNES mapper number.
    fn mapper_number(&self) -> u8;

    /// Human-readable mapper name.
    fn mapper_name(&self) -> &'static str;

    /// Return the mapper to its power-on register state.
    fn reset(&mut self) {}
}
