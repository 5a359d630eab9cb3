//! NROM (mapper 0).
//!
//! No banking hardware at all: 16 KiB PRG mirrored into both windows, or
//! 32 KiB flat; 8 KiB of CHR-ROM (or CHR-RAM on the few boards without
//! CHR). Writes to $8000+ fall off the edge of the board.

use crate::mapper::{Mapper, Mirroring};
use crate::rom::Rom;

/// NROM cartridge.
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Build an NROM board from a loaded ROM.
    #[must_use]
    pub fn new(rom: &Rom) -> Self {
        let chr_is_ram = rom.chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0u8; rom.header.chr_ram_size.max(8 * 1024)]
        } else {
            rom.chr_rom.clone()
        };

        Self {
            prg_rom: rom.prg_rom.clone(),
            prg_ram: vec![0u8; rom.header.prg_ram_size],
            chr,
            chr_is_ram,
            mirroring: rom.header.mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                let offset = (addr - 0x6000) as usize % self.prg_ram.len().max(1);
                self.prg_ram.get(offset).copied().unwrap_or(0)
            }
            0x8000..=0xFFFF => {
                // A single 16 KiB bank appears in both windows.
                let offset = (addr - 0x8000) as usize % self.prg_rom.len();
                self.prg_rom[offset]
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8, _cpu_cycle: u64) {
        match addr {
            0x6000..=0x7FFF => {
                let len = self.prg_ram.len().max(1);
                let offset = (addr - 0x6000) as usize % len;
                if let Some(byte) = self.prg_ram.get_mut(offset) {
                    *byte = value;
                }
            }
            0x8000..=0xFFFF => {
                log::trace!("NROM ignores write of ${value:02X} to ${addr:04X}");
            }
            _ => {}
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        let offset = (addr & 0x1FFF) as usize % self.chr.len();
        self.chr[offset]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let offset = (addr & 0x1FFF) as usize % self.chr.len();
            self.chr[offset] = value;
        } else {
            log::warn!("write of ${value:02X} to CHR-ROM at ${addr:04X} dropped");
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u8 {
        0
    }

    fn mapper_name(&self) -> &'static str {
        "NROM"
    }
}
