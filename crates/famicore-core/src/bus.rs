//! The system bus: the CPU's 64 KiB address space.
//!
//! ```text
//! $0000-$1FFF  2 KiB internal RAM, mirrored every $800
//! $2000-$3FFF  PPU registers, mirrored every 8 bytes
//! $4014        OAM DMA trigger
//! $4016/$4017  controller ports
//! $4000-$401F  otherwise APU space (out of scope; open bus)
//! $4020-$FFFF  cartridge (PRG-RAM at $6000, PRG-ROM/mapper at $8000)
//! ```
//!
//! Reads update a data-bus shadow; reads of unmapped or write-only
//! locations return it, which is the open-bus behaviour test ROMs poke
//! at. PPU register reads take effect immediately; register writes are
//! staged inside the PPU so they land on the dot they belong to.

use famicore_cpu::Bus;
use famicore_mappers::Mapper;
use famicore_ppu::Ppu;

use crate::input::Controller;

/// CPU-side system bus.
pub struct SystemBus {
    /// Internal RAM.
    ram: [u8; 0x0800],
    /// The PPU, owner of VRAM, OAM and the shared register file.
    pub ppu: Ppu,
    /// Cartridge mapper, serving both address spaces.
    pub mapper: Box<dyn Mapper>,
    controllers: [Controller; 2],
    /// Last value driven on the data bus.
    data_bus: u8,
    /// Page captured by a $4014 write, until the console hands it to the
    /// CPU's DMA pins.
    dma_request: Option<u8>,
    /// CPU cycle forwarded to mapper register writes.
    cpu_cycle: u64,
}

impl SystemBus {
    /// Build a bus around a mapper.
    #[must_use]
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        let mirroring = mapper.mirroring();
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(mirroring),
            mapper,
            controllers: [Controller::new(); 2],
            data_bus: 0,
            dma_request: None,
            cpu_cycle: 0,
        }
    }

    /// Power-on state for RAM, PPU and mapper.
    pub fn reset(&mut self) {
        self.ram = [0; 0x0800];
        self.ppu.reset();
        self.mapper.reset();
        self.ppu.set_mirroring(self.mapper.mirroring());
        self.controllers = [Controller::new(); 2];
        self.data_bus = 0;
        self.dma_request = None;
    }

    /// Run one PPU dot against the cartridge CHR space.
    pub fn tick_ppu(&mut self, pins: &mut famicore_cpu::InterruptPins) -> bool {
        self.ppu.tick(pins, self.mapper.as_mut())
    }

    /// The page of a $4014 write since the last call, if any.
    pub fn take_dma_request(&mut self) -> Option<u8> {
        self.dma_request.take()
    }

    /// Forward the CPU cycle counter for mapper write coalescing.
    pub fn set_cpu_cycle(&mut self, cycle: u64) {
        self.cpu_cycle = cycle;
    }

    /// Host-side button state for one port (0 or 1).
    pub fn set_controller(&mut self, port: usize, buttons: u8) {
        self.controllers[port].set_buttons(buttons);
    }

    /// Last data bus value, for open-bus assertions.
    #[must_use]
    pub fn data_bus(&self) -> u8 {
        self.data_bus
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers, mirrored every 8 bytes. Only $2002, $2004
            // and $2007 are readable; the rest float.
            0x2000..=0x3FFF => match addr & 0x0007 {
                2 => (self.ppu.read_status() & 0xE0) | (self.data_bus & 0x1F),
                4 => self.ppu.read_oam_data(),
                7 => self.ppu.read_data(self.mapper.as_mut()),
                _ => self.data_bus,
            },

            0x4016 => (self.data_bus & 0xE0) | self.controllers[0].read(),
            0x4017 => (self.data_bus & 0xE0) | self.controllers[1].read(),

            // APU registers and test mode: open bus without an APU.
            0x4000..=0x4015 | 0x4018..=0x401F => self.data_bus,

            // Expansion area: nothing drives the bus on NROM/MMC1 boards.
            0x4020..=0x5FFF => self.data_bus,

            0x6000..=0xFFFF => self.mapper.read_prg(addr),
        };

        self.data_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data_bus = value;

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,

            0x2000..=0x3FFF => self.ppu.stage_register_write(addr, value),

            0x4014 => self.dma_request = Some(value),

            0x4016 => {
                self.controllers[0].write_strobe(value);
                self.controllers[1].write_strobe(value);
            }

            // APU space, absent.
            0x4000..=0x4013 | 0x4015 | 0x4017..=0x401F => {}

            0x4020..=0xFFFF => {
                self.mapper.write_prg(addr, value, self.cpu_cycle);
                if addr >= 0x8000 {
                    // Mapper writes may retarget the nametable slots.
                    self.ppu.set_mirroring(self.mapper.mirroring());
                }
            }
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // Register peeks would have side effects; report the bus.
            0x2000..=0x5FFF => self.data_bus,
            0x6000..=0xFFFF => self.mapper.read_prg(addr),
        }
    }
}
