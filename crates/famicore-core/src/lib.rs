//! NES emulation core: CPU, PPU and mapper wired together.
//!
//! The [`Console`] interleaves one CPU cycle with three PPU dots, CPU
//! first, the granularity every shared-register quirk depends on:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Console                         │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │                  SystemBus                     │  │
//! │  │  ┌─────┐  ┌───────────────┐  ┌──────────────┐  │  │
//! │  │  │ RAM │  │ PPU (+ VRAM,  │  │    Mapper    │  │  │
//! │  │  │ 2KB │  │ OAM, regfile) │  │  (PRG + CHR) │  │  │
//! │  │  └─────┘  └───────────────┘  └──────────────┘  │  │
//! │  └────────────────────────────────────────────────┘  │
//! │        ▲                  ▲                           │
//! │   ┌────┴────┐      ┌──────┴───────┐                   │
//! │   │   CPU   │◄────►│ InterruptPins│                   │
//! │   └─────────┘      └──────────────┘                   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use famicore_core::{Console, Controller};
//!
//! let rom = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut console = Console::new(&rom).expect("failed to load cartridge");
//!
//! loop {
//!     console.set_controller1(Controller::A | Controller::START);
//!     let framebuffer = console.run_frame(); // 256x240 0xAARRGGBB
//!     let _ = framebuffer;
//! }
//! ```

mod bus;
mod console;
mod input;
pub mod palette;

pub use bus::SystemBus;
pub use console::{Console, ConsoleError, FRAMEBUFFER_PIXELS};
pub use input::Controller;

// Re-export the component crates' main types.
pub use famicore_cpu::{Bus, Cpu, InterruptPins, Status};
pub use famicore_mappers::{create_mapper, Mapper, Mirroring, Rom, RomError, RomHeader};
pub use famicore_ppu::Ppu;

/// NES timing constants (NTSC).
pub mod timing {
    /// Master clock frequency.
    pub const MASTER_CLOCK: u32 = 21_477_272;
    /// CPU clock: master / 12.
    pub const CPU_CLOCK: u32 = MASTER_CLOCK / 12;
    /// PPU clock: master / 4.
    pub const PPU_CLOCK: u32 = MASTER_CLOCK / 4;
    /// PPU dots per CPU cycle.
    pub const DOTS_PER_CPU_CYCLE: u32 = 3;
}
