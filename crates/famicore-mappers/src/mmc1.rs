//! MMC1 / SxROM (mapper 1).
//!
//! Configuration goes through a 5-bit serial port: bit 0 of each $8000+
//! write shifts into a buffer, and the fifth write commits the buffer to
//! one of four registers selected by address bits 14-13. A write with bit
//! 7 set resets the shift register and latches the fix-last-bank PRG mode.
//! The hardware ignores a write on the cycle directly after another, which
//! read-modify-write instructions trigger with their double write.

use crate::mapper::{Mapper, Mirroring};
use crate::rom::Rom;

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 4 * 1024;

/// PRG banking mode (control register bits 2-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PrgMode {
    /// 32 KiB switched at $8000; low bit of the bank number ignored.
    Switch32K,
    /// First bank fixed at $8000, 16 KiB switched at $C000.
    FixFirst,
    /// Last bank fixed at $C000, 16 KiB switched at $8000. Power-on state.
    #[default]
    FixLast,
}

/// CHR banking mode (control register bit 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ChrMode {
    /// One 8 KiB bank; low bit of the bank number ignored.
    #[default]
    Switch8K,
    /// Two independent 4 KiB banks.
    Switch4K,
}

/// MMC1 cartridge.
pub struct Mmc1 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_banks: usize,

    shift_reg: u8,
    shift_count: u8,
    /// CPU cycle of the previous register write, for the
    /// consecutive-cycle ignore.
    last_write_cycle: Option<u64>,

    mirroring: Mirroring,
    prg_mode: PrgMode,
    chr_mode: ChrMode,

    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,
    prg_ram_enabled: bool,
}

impl Mmc1 {
    /// Build an MMC1 board from a loaded ROM.
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
            prg_banks: rom.prg_rom.len() / PRG_BANK_SIZE,
            shift_reg: 0,
            shift_count: 0,
            last_write_cycle: None,
            mirroring: rom.header.mirroring,
            prg_mode: PrgMode::FixLast,
            chr_mode: ChrMode::Switch8K,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_ram_enabled: true,
        }
    }

    fn write_serial(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        // The serial port sees only the first of back-to-back writes.
        if self.last_write_cycle == Some(cpu_cycle.wrapping_sub(1)) {
            return;
        }
        self.last_write_cycle = Some(cpu_cycle);

        if value & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.prg_mode = PrgMode::FixLast;
            return;
        }

        self.shift_reg |= (value & 0x01) << self.shift_count;
        self.shift_count += 1;

        if self.shift_count == 5 {
            match (addr >> 13) & 0x03 {
                0 => self.write_control(self.shift_reg),
                1 => self.chr_bank_0 = self.shift_reg,
                2 => self.chr_bank_1 = self.shift_reg,
                _ => self.write_prg_bank(self.shift_reg),
            }
            self.shift_reg = 0;
            self.shift_count = 0;
        }
    }

    fn write_control(&mut self, value: u8) {
        self.mirroring = match value & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };
        self.prg_mode = match (value >> 2) & 0x03 {
            0 | 1 => PrgMode::Switch32K,
            2 => PrgMode::FixFirst,
            _ => PrgMode::FixLast,
        };
        self.chr_mode = if value & 0x10 != 0 {
            ChrMode::Switch4K
        } else {
            ChrMode::Switch8K
        };
        log::debug!(
            "MMC1 control: mirroring {:?}, prg {:?}, chr {:?}",
            self.mirroring,
            self.prg_mode,
            self.chr_mode
        );
    }

    fn write_prg_bank(&mut self, value: u8) {
        self.prg_bank = value & 0x0F;
        // Bit 4 disables PRG-RAM when set (active low enable).
        self.prg_ram_enabled = value & 0x10 == 0;
    }

    fn prg_offset(&self, addr: u16) -> usize {
        let bank = match self.prg_mode {
            PrgMode::Switch32K => {
                let base = (self.prg_bank & 0x0E) as usize;
                if addr < 0xC000 { base } else { base + 1 }
            }
            PrgMode::FixFirst => {
                if addr < 0xC000 {
                    0
                } else {
                    self.prg_bank as usize
                }
            }
            PrgMode::FixLast => {
                if addr < 0xC000 {
                    self.prg_bank as usize
                } else {
                    self.prg_banks.saturating_sub(1)
                }
            }
        };
        let bank = bank % self.prg_banks.max(1);
        bank * PRG_BANK_SIZE + (addr & 0x3FFF) as usize
    }

    fn chr_offset(&self, addr: u16) -> usize {
        let chr_banks = (self.chr.len() / CHR_BANK_SIZE).max(1);
        match self.chr_mode {
            ChrMode::Switch8K => {
                let bank = (self.chr_bank_0 & 0x1E) as usize % chr_banks;
                bank * CHR_BANK_SIZE + (addr & 0x1FFF) as usize
            }
            ChrMode::Switch4K => {
                let (bank, offset) = if addr < 0x1000 {
                    (self.chr_bank_0 as usize, (addr & 0x0FFF) as usize)
                } else {
                    (self.chr_bank_1 as usize, (addr & 0x0FFF) as usize)
                };
                (bank % chr_banks) * CHR_BANK_SIZE + offset
            }
        }
    }
}

impl Mapper for Mmc1 {
    fn read_prg(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled {
                    let offset = (addr - 0x6000) as usize % self.prg_ram.len().max(1);
                    self.prg_ram.get(offset).copied().unwrap_or(0)
                } else {
                    0
                }
            }
            0x8000..=0xFFFF => {
                let offset = self.prg_offset(addr) % self.prg_rom.len().max(1);
                self.prg_rom.get(offset).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8, cpu_cycle: u64) {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled {
                    let len = self.prg_ram.len().max(1);
                    let offset = (addr - 0x6000) as usize % len;
                    if let Some(byte) = self.prg_ram.get_mut(offset) {
                        *byte = value;
                    }
                }
            }
            0x8000..=0xFFFF => self.write_serial(addr, value, cpu_cycle),
            _ => {}
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        let offset = self.chr_offset(addr) % self.chr.len().max(1);
        self.chr.get(offset).copied().unwrap_or(0)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let offset = self.chr_offset(addr) % self.chr.len().max(1);
            if let Some(byte) = self.chr.get_mut(offset) {
                *byte = value;
            }
        } else {
            log::warn!("write of ${value:02X} to CHR-ROM at ${addr:04X} dropped");
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn mapper_number(&self) -> u8 {
        1
    }

    fn mapper_name(&self) -> &'static str {
        "MMC1"
    }

    fn reset(&mut self) {
        self.shift_reg = 0;
        self.shift_count = 0;
        self.last_write_cycle = None;
        self.prg_mode = PrgMode::FixLast;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::RomHeader;

    fn test_rom(prg_banks: u8, chr_banks: u8) -> Rom {
        // Tag every PRG bank with its index so bank switches are visible.
        let mut prg_rom = vec![0u8; prg_banks as usize * PRG_BANK_SIZE];
        for (i, chunk) in prg_rom.chunks_mut(PRG_BANK_SIZE).enumerate() {
            chunk.fill(i as u8);
        }
        let mut chr_rom = vec![0u8; chr_banks as usize * 8 * 1024];
        for (i, chunk) in chr_rom.chunks_mut(CHR_BANK_SIZE).enumerate() {
            chunk.fill(0x80 | i as u8);
        }
        Rom {
            header: RomHeader {
                prg_rom_size: prg_rom.len(),
                chr_rom_size: chr_rom.len(),
                prg_ram_size: 8 * 1024,
                chr_ram_size: if chr_banks == 0 { 8 * 1024 } else { 0 },
                mapper: 1,
                mirroring: Mirroring::Horizontal,
                has_battery: true,
                has_trainer: false,
            },
            trainer: None,
            prg_rom,
            chr_rom,
        }
    }

    /// Clock five serial writes, one bit per CPU "instruction".
    fn write_register(mapper: &mut Mmc1, addr: u16, value: u8, cycle: &mut u64) {
        for bit in 0..5 {
            mapper.write_prg(addr, (value >> bit) & 0x01, *cycle);
            *cycle += 4;
        }
    }

    #[test]
    fn reset_bit_clears_shift_register() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        mapper.write_prg(0x8000, 0x01, 0);
        mapper.write_prg(0x8000, 0x01, 4);
        assert_eq!(mapper.shift_count, 2);

        mapper.write_prg(0x8000, 0x80, 8);
        assert_eq!(mapper.shift_count, 0);
        assert_eq!(mapper.shift_reg, 0);
        assert_eq!(mapper.prg_mode, PrgMode::FixLast);
    }

    #[test]
    fn adjacent_cycle_writes_are_ignored() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        mapper.write_prg(0x8000, 0x01, 100);
        // The RMW double-write lands one cycle later and must not count.
        mapper.write_prg(0x8000, 0x00, 101);
        assert_eq!(mapper.shift_count, 1);

        mapper.write_prg(0x8000, 0x01, 103);
        assert_eq!(mapper.shift_count, 2);
    }

    #[test]
    fn fix_last_banking() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        let mut cycle = 0;
        write_register(&mut mapper, 0x8000, 0x0C, &mut cycle); // fix last
        write_register(&mut mapper, 0xE000, 0x02, &mut cycle); // bank 2

        assert_eq!(mapper.read_prg(0x8000), 2);
        assert_eq!(mapper.read_prg(0xC000), 7); // last bank fixed
    }

    #[test]
    fn fix_first_banking() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        let mut cycle = 0;
        write_register(&mut mapper, 0x8000, 0x08, &mut cycle); // fix first
        write_register(&mut mapper, 0xE000, 0x05, &mut cycle);

        assert_eq!(mapper.read_prg(0x8000), 0);
        assert_eq!(mapper.read_prg(0xC000), 5);
    }

    #[test]
    fn switch_32k_ignores_low_bank_bit() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        let mut cycle = 0;
        write_register(&mut mapper, 0x8000, 0x00, &mut cycle); // 32K mode
        write_register(&mut mapper, 0xE000, 0x03, &mut cycle); // bank 3 -> 2

        assert_eq!(mapper.read_prg(0x8000), 2);
        assert_eq!(mapper.read_prg(0xC000), 3);
    }

    #[test]
    fn mirroring_control() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        let mut cycle = 0;

        write_register(&mut mapper, 0x8000, 0x02, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
        write_register(&mut mapper, 0x8000, 0x03, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::Horizontal);
        write_register(&mut mapper, 0x8000, 0x00, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenLower);
        write_register(&mut mapper, 0x8000, 0x01, &mut cycle);
        assert_eq!(mapper.mirroring(), Mirroring::SingleScreenUpper);
    }

    #[test]
    fn chr_4k_banking() {
        let mut mapper = Mmc1::new(&test_rom(8, 2)); // four 4 KiB banks
        let mut cycle = 0;
        write_register(&mut mapper, 0x8000, 0x10, &mut cycle); // 4K mode
        write_register(&mut mapper, 0xA000, 0x02, &mut cycle);
        write_register(&mut mapper, 0xC000, 0x03, &mut cycle);

        assert_eq!(mapper.read_chr(0x0000), 0x82);
        assert_eq!(mapper.read_chr(0x1000), 0x83);
    }

    #[test]
    fn prg_ram_enable_is_active_low() {
        let mut mapper = Mmc1::new(&test_rom(8, 4));
        let mut cycle = 0;

        mapper.write_prg(0x6000, 0x42, cycle);
        assert_eq!(mapper.read_prg(0x6000), 0x42);

        // Bit 4 set disables the RAM.
        write_register(&mut mapper, 0xE000, 0x10, &mut cycle);
        assert_eq!(mapper.read_prg(0x6000), 0);
        mapper.write_prg(0x6000, 0x99, cycle);

        write_register(&mut mapper, 0xE000, 0x00, &mut cycle);
        assert_eq!(mapper.read_prg(0x6000), 0x42);
    }
}
