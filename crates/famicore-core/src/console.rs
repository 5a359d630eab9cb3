//! The console: CPU, PPU and bus interleaved at single-cycle granularity.
//!
//! One [`Console::tick`] is one CPU cycle followed by three PPU dots, CPU
//! first — the ordering every $2002 race, NMI edge and the odd-frame skip
//! depend on. There is no batching path: running a whole instruction and
//! then a block of dots would break the documented quirks.

use famicore_cpu::{Cpu, InterruptPins};
use famicore_mappers::{create_mapper, Rom, RomError};
use famicore_ppu::{FRAME_HEIGHT, FRAME_WIDTH};

use crate::bus::SystemBus;
use crate::palette;

/// Pixels in the host framebuffer.
pub const FRAMEBUFFER_PIXELS: usize = FRAME_WIDTH * FRAME_HEIGHT;

/// Errors surfaced to the host at load time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConsoleError {
    /// Cartridge image problems, including unsupported hardware.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
}

/// A complete NES.
pub struct Console {
    cpu: Cpu,
    bus: SystemBus,
    pins: InterruptPins,
    /// 256×240 `0xAARRGGBB` pixels, refreshed at each frame boundary.
    framebuffer: Vec<u32>,
    frame_count: u64,
}

impl Console {
    /// Build a console from an iNES file and apply the reset sequence.
    ///
    /// # Errors
    ///
    /// Propagates any [`RomError`]: bad header, truncated data,
    /// unsupported mapper or four-screen configuration.
    pub fn new(rom_data: &[u8]) -> Result<Self, ConsoleError> {
        let rom = Rom::load(rom_data)?;
        let mapper = create_mapper(&rom)?;
        log::info!(
            "loaded {} cartridge: {} KiB PRG, {} KiB CHR",
            mapper.mapper_name(),
            rom.header.prg_rom_size / 1024,
            rom.header.chr_rom_size / 1024,
        );

        let mut console = Self {
            cpu: Cpu::new(),
            bus: SystemBus::new(mapper),
            pins: InterruptPins::new(),
            framebuffer: vec![0xFF00_0000; FRAMEBUFFER_PIXELS],
            frame_count: 0,
        };
        console.cpu.reset(&mut console.bus);
        Ok(console)
    }

    /// Reset the whole machine: bus, PPU, mapper and the CPU reset
    /// sequence through the $FFFC vector.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.pins = InterruptPins::new();
        self.cpu.reset(&mut self.bus);
    }

    /// Advance one CPU cycle and three PPU dots. Returns `true` when the
    /// PPU crossed the frame presentation point (scanline 240, dot 0) and
    /// the framebuffer was refreshed.
    pub fn tick(&mut self) -> bool {
        // The mapper sees the cycle number the in-flight write occurs on.
        self.bus.set_cpu_cycle(self.cpu.cycles + 1);
        self.cpu.tick(&mut self.bus, &mut self.pins);

        // A $4014 write this cycle raises the DMA pins for the next
        // fetch boundary.
        if let Some(page) = self.bus.take_dma_request() {
            self.pins.dma_pending = true;
            self.pins.dma_page = page;
        }

        let mut frame_ready = false;
        for _ in 0..3 {
            if self.bus.tick_ppu(&mut self.pins) {
                frame_ready = true;
            }
        }

        if frame_ready {
            self.present_frame();
        }
        frame_ready
    }

    /// Run until the next frame boundary and return the framebuffer.
    pub fn run_frame(&mut self) -> &[u32] {
        while !self.tick() {}
        &self.framebuffer
    }

    fn present_frame(&mut self) {
        for (pixel, &index) in self
            .framebuffer
            .iter_mut()
            .zip(self.bus.ppu.frame_buffer().iter())
        {
            *pixel = palette::argb(index);
        }
        self.frame_count += 1;
    }

    /// Current framebuffer (256×240 `0xAARRGGBB`, row major).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    /// Frames presented so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Player 1 buttons, bit 0 = A.
    pub fn set_controller1(&mut self, buttons: u8) {
        self.bus.set_controller(0, buttons);
    }

    /// Player 2 buttons.
    pub fn set_controller2(&mut self, buttons: u8) {
        self.bus.set_controller(1, buttons);
    }

    /// The CPU, for tests and debuggers.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// The PPU, for tests and debuggers.
    #[must_use]
    pub fn ppu(&self) -> &famicore_ppu::Ppu {
        &self.bus.ppu
    }

    /// The interrupt/DMA pins, for tests.
    #[must_use]
    pub fn pins(&self) -> &InterruptPins {
        &self.pins
    }

    /// The system bus, for tests and debuggers.
    #[must_use]
    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// Side-effect-free memory read.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        use famicore_cpu::Bus;
        self.bus.peek(addr)
    }
}
