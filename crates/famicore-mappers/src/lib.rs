//! iNES cartridge loading and mapper implementations.
//!
//! The mapper arbitrates both sides of the cartridge port: PRG fetches on
//! the CPU bus and CHR fetches on the PPU bus, plus nametable mirroring.
//! Two boards are supported:
//!
//! | Mapper | Name | Banking |
//! |--------|------|---------|
//! | 0 | NROM | none |
//! | 1 | MMC1 | serial-port PRG/CHR banking and mirroring control |
//!
//! # Example
//!
//! ```no_run
//! use famicore_mappers::{create_mapper, Rom};
//!
//! let data = std::fs::read("game.nes").expect("failed to read ROM");
//! let rom = Rom::load(&data).expect("failed to parse ROM");
//! let mapper = create_mapper(&rom).expect("unsupported mapper");
//! let reset_lo = mapper.read_prg(0xFFFC);
//! ```

mod mapper;
mod mmc1;
mod nrom;
mod rom;

pub use mapper::{Mapper, Mirroring};
pub use mmc1::Mmc1;
pub use nrom::Nrom;
pub use rom::{Rom, RomError, RomHeader};

/// Build the mapper named by the ROM header.
///
/// # Errors
///
/// Returns [`RomError::UnsupportedMapper`] for anything outside the
/// supported set.
pub fn create_mapper(rom: &Rom) -> Result<Box<dyn Mapper>, RomError> {
    match rom.header.mapper {
        0 => Ok(Box::new(Nrom::new(rom))),
        1 => Ok(Box::new(Mmc1::new(rom))),
        n => Err(RomError::UnsupportedMapper(n)),
    }
}

/// Mapper numbers this crate implements.
#[must_use]
pub fn supported_mappers() -> &'static [u8] {
    &[0, 1]
}
