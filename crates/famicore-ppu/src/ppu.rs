//! The 2C02 dot engine.
//!
//! [`Ppu::tick`] advances one dot. The integration layer runs the CPU
//! first, then three PPU dots per CPU cycle, so CPU register writes are
//! staged in the register file and land on the dot they would reach the
//! chip; register reads take effect immediately at the CPU's cycle.
//!
//! Pattern-table traffic goes through the [`ChrBus`] seam so the mapper
//! stays with the caller; nametables and palette RAM live in the
//! [`VramMap`](crate::vram::VramMap) behind the mirroring indirection.

use famicore_cpu::InterruptPins;
use famicore_mappers::{Mapper, Mirroring};

use crate::background::Background;
use crate::oam::{Oam, SecondaryOam};
use crate::registers::{Ctrl, Mask, RegisterFile, Status};
use crate::scroll::Scroll;
use crate::sprites::{sprite_pattern_addr, SpriteEvaluator, SpriteUnits};
use crate::timing::{Timing, PRE_RENDER_SCANLINE, VBLANK_SCANLINE};
use crate::vram::VramMap;

/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 240;
/// Pixels per frame.
pub const FRAME_SIZE: usize = FRAME_WIDTH * FRAME_HEIGHT;

/// The pattern-table side of the cartridge port, as the PPU sees it.
///
/// Every [`Mapper`] is a `ChrBus`, so the integration layer passes its
/// boxed mapper straight in.
pub trait ChrBus {
    /// Read from $0000-$1FFF.
    fn chr_read(&mut self, addr: u16) -> u8;

    /// Write to $0000-$1FFF (CHR-RAM carts).
    fn chr_write(&mut self, addr: u16, value: u8);
}

impl<M: Mapper + ?Sized> ChrBus for M {
    fn chr_read(&mut self, addr: u16) -> u8 {
        Mapper::read_chr(self, addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        Mapper::write_chr(self, addr, value)
    }
}

/// Ricoh 2C02 PPU.
pub struct Ppu {
    regs: RegisterFile,
    scroll: Scroll,
    vram: VramMap,
    oam: Oam,
    secondary: SecondaryOam,
    background: Background,
    evaluator: SpriteEvaluator,
    units: SpriteUnits,
    timing: Timing,
    /// Latched pattern address for the sprite being fetched.
    sprite_fetch_addr: u16,
    /// 6-bit colour indices, one per pixel.
    frame_buffer: Vec<u8>,
}

impl Ppu {
    /// Create a PPU with the cartridge's solder-pad mirroring.
    #[must_use]
    pub fn new(mirroring: Mirroring) -> Self {
        Self {
            regs: RegisterFile::new(),
            scroll: Scroll::new(),
            vram: VramMap::new(mirroring),
            oam: Oam::new(),
            secondary: SecondaryOam::new(),
            background: Background::new(),
            evaluator: SpriteEvaluator::new(),
            units: SpriteUnits::new(),
            timing: Timing::new(),
            sprite_fetch_addr: 0,
            frame_buffer: vec![0; FRAME_SIZE],
        }
    }

    /// Power-on state; keeps the current mirroring.
    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
        self.scroll = Scroll::new();
        self.vram.reset();
        self.oam.reset();
        self.secondary.clear();
        self.background.reset();
        self.evaluator = SpriteEvaluator::new();
        self.units.clear();
        self.timing.reset();
        self.sprite_fetch_addr = 0;
        self.frame_buffer.fill(0);
    }

    /// Follow a mapper-driven mirroring change. Only the four nametable
    /// indices move; no bytes are copied.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        if self.vram.mirroring() != mirroring {
            self.vram.set_mirroring(mirroring);
        }
    }

    // =====================================================================
    // CPU-facing register access
    // =====================================================================

    /// $2002 read: PPU-owned bits 5-7 (the bus supplies bits 0-4 from its
    /// data-bus shadow). Clears the VBL flag and the write toggle, and
    /// arms the NMI suppression window; in the race dots around the flag
    /// set the returned value has bit 7 forced clear.
    pub fn read_status(&mut self) -> u8 {
        let mut value = self.regs.status.bits();
        self.regs.status.remove(Status::VBLANK);
        self.scroll.reset_toggle();
        self.regs.suppress_status = true;

        if self.regs.clear_status {
            value &= !Status::VBLANK.bits();
            self.regs.clear_status = false;
        }
        value
    }

    /// $2004 read: the OAM byte at OAMADDR. Attribute bytes mask their
    /// unwired bits; OAMADDR does not advance.
    #[must_use]
    pub fn read_oam_data(&self) -> u8 {
        self.oam.read()
    }

    /// $2007 read: buffered for nametable data, immediate for palette
    /// data (which still refills the buffer from the nametable underneath
    /// the palette). Increments v afterwards — the glitchy double
    /// increment applies while rendering.
    pub fn read_data<C: ChrBus + ?Sized>(&mut self, chr: &mut C) -> u8 {
        let addr = self.scroll.vram_addr() & 0x3FFF;

        let value = if addr >= 0x3F00 {
            self.regs.read_buffer = self.vram.read(addr - 0x1000);
            self.vram.read(addr) & 0x3F
        } else {
            let buffered = self.regs.read_buffer;
            self.regs.read_buffer = if addr < 0x2000 {
                chr.chr_read(addr)
            } else {
                self.vram.read(addr)
            };
            buffered
        };

        self.increment_vram_after_access();
        value
    }

    /// Stage a CPU write to a $2000-$2007 register. It lands two dots
    /// later (five for $2001) inside [`Ppu::tick`].
    pub fn stage_register_write(&mut self, addr: u16, value: u8) {
        self.regs.stage_write(0x2000 | (addr & 0x0007), value);
    }

    // =====================================================================
    // Dot engine
    // =====================================================================

    /// Advance one dot. Returns `true` at the frame presentation point
    /// (scanline 240, dot 0).
    pub fn tick<C: ChrBus + ?Sized>(&mut self, pins: &mut InterruptPins, chr: &mut C) -> bool {
        // The lookahead and race windows last exactly one dot.
        pins.nmi_lookahead = false;
        self.regs.clear_status = false;

        let frame_ready = self.timing.advance();
        self.regs.rendering_period = self.timing.is_rendering_scanline();

        if let Some((addr, value)) = self.regs.clock_staged_write() {
            self.apply_register_write(addr, value, pins, chr);
        }

        // Odd-frame alignment skip, honouring in-flight $2001 writes.
        if self.regs.bg_enabled_for_skip()
            && self.timing.odd_frame()
            && self.timing.scanline() == PRE_RENDER_SCANLINE
            && self.timing.dot() == 339
        {
            self.timing.skip_prerender_dot();
        }

        self.update_vblank_state(pins);

        let rendering_enabled = self.regs.mask.rendering_enabled();
        let scanline = self.timing.scanline();
        let dot = self.timing.dot();

        if rendering_enabled && self.timing.is_rendering_scanline() {
            self.run_fetch_pipeline(dot, chr);
        }

        // Every visible dot produces a pixel, backdrop included.
        if self.timing.is_visible_scanline() && (1..=256).contains(&dot) {
            self.render_dot(scanline, dot);
        }

        if rendering_enabled && self.timing.is_rendering_scanline() {
            self.run_scroll_updates(dot);
        }

        if rendering_enabled {
            self.run_sprite_schedule(scanline, dot, chr);
        }

        self.regs.suppress_status = false;
        frame_ready
    }

    /// VBL flag, NMI latching and the $2002 race windows. The flag sets
    /// at scanline 241 dot 1 and clears at pre-render dot 1.
    fn update_vblank_state(&mut self, pins: &mut InterruptPins) {
        let scanline = self.timing.scanline();
        let dot = self.timing.dot();

        if scanline == VBLANK_SCANLINE {
            if dot == 0 {
                // A status read in this window sees bit 7 clear and must
                // not receive the NMI either.
                pins.nmi_lookahead = true;
                self.regs.clear_status = true;
            }
            if dot == 1 {
                self.regs.status.insert(Status::VBLANK);
            }
            if self.regs.ctrl.nmi_enabled() {
                if dot == 1 {
                    pins.nmi_pending = true;
                    pins.nmi_lookahead = true;
                } else if dot == 2 {
                    pins.nmi_lookahead = true;
                }
                if self.regs.suppress_status && (1..=3).contains(&dot) {
                    pins.ignore_nmi = true;
                }
            }
            if pins.ignore_nmi {
                pins.nmi_pending = false;
            }
            // Turning NMI generation off right after the flag set also
            // retracts the interrupt.
            if !self.regs.ctrl.nmi_enabled() && pins.nmi_pending && dot < 5 {
                pins.ignore_nmi = true;
                pins.nmi_pending = false;
            }
            if self.regs.suppress_status {
                self.regs.status.remove(Status::VBLANK);
            }
        } else if scanline == PRE_RENDER_SCANLINE && dot == 1 {
            self.regs
                .status
                .remove(Status::VBLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW);
            self.units.clear();
        } else if scanline == 240 && dot == 340 {
            pins.nmi_lookahead = true;
            self.regs.clear_status = true;
        } else if scanline == 240 && dot == 339 {
            self.regs.clear_status = true;
        }
    }

    /// Background fetches on dots 1-256 and 321-336: the 8-dot
    /// nametable/attribute/pattern micro-sequence.
    fn run_fetch_pipeline<C: ChrBus + ?Sized>(&mut self, dot: u16, chr: &mut C) {
        if !((1..=256).contains(&dot) || (321..=336).contains(&dot)) {
            return;
        }

        match (dot - 1) & 0x07 {
            0 => {
                let value = self.vram.read(self.scroll.nametable_addr());
                self.background.set_nametable_byte(value);
            }
            2 => {
                let value = self.vram.read(self.scroll.attribute_addr());
                self.background
                    .set_attribute_byte(value, self.scroll.coarse_x(), self.scroll.coarse_y());
            }
            4 => {
                let addr = self.bg_pattern_addr();
                let value = chr.chr_read(addr);
                self.background.set_pattern_low(value);
            }
            6 => {
                let addr = self.bg_pattern_addr() + 8;
                let value = chr.chr_read(addr);
                self.background.set_pattern_high(value);
            }
            _ => {}
        }
    }

    fn bg_pattern_addr(&self) -> u16 {
        self.regs.ctrl.bg_table_addr()
            + u16::from(self.background.nametable_byte()) * 16
            + u16::from(self.scroll.fine_y())
    }

    /// Shift-register movement and the v-register updates. Runs after
    /// pixel emission so the current dot sees pre-shift state.
    fn run_scroll_updates(&mut self, dot: u16) {
        if (1..=256).contains(&dot) || (321..=336).contains(&dot) {
            self.background.shift();
            if dot & 0x07 == 0 {
                self.background.reload_shift_registers();
                self.scroll.increment_x();
            }
            if dot == 256 {
                self.scroll.increment_y();
            }
        } else if dot == 257 {
            self.scroll.copy_horizontal();
        } else if self.timing.is_prerender_scanline() && (280..=304).contains(&dot) {
            self.scroll.copy_vertical();
        }
    }

    /// Sprite evaluation (dots 1-256) and the 257-320 fetches that load
    /// the eight output units for the next scanline.
    fn run_sprite_schedule<C: ChrBus + ?Sized>(&mut self, scanline: u16, dot: u16, chr: &mut C) {
        if !self.timing.is_visible_scanline() {
            return;
        }

        match dot {
            1 => {
                self.secondary.clear();
                self.evaluator.begin_scanline();
            }
            65..=256 => {
                self.evaluator.step(
                    dot,
                    &self.oam,
                    scanline,
                    self.regs.ctrl.sprite_height(),
                    &mut self.secondary,
                    &mut self.regs.status,
                );
            }
            257..=320 => self.run_sprite_fetch(scanline, dot, chr),
            _ => {}
        }
    }

    /// One dot of the eight-dot-per-sprite fetch window.
    fn run_sprite_fetch<C: ChrBus + ?Sized>(&mut self, scanline: u16, dot: u16, chr: &mut C) {
        if dot == 257 {
            self.units.clear();
        }

        let fetch = dot - 257;
        let slot = (fetch / 8) as usize;
        if slot >= usize::from(self.secondary.count()) {
            return;
        }

        let height = self.regs.ctrl.sprite_height();
        match fetch & 0x07 {
            // Steps 0 and 1 are the garbage nametable fetches.
            2 => {
                let attributes = self.secondary.attributes(slot);
                self.units.unit_mut(slot).attributes = attributes;
                let row = scanline.saturating_sub(u16::from(self.secondary.y(slot)));
                self.sprite_fetch_addr = sprite_pattern_addr(
                    self.secondary.tile(slot),
                    row,
                    height,
                    self.regs.ctrl.sprite_table_addr(),
                    attributes & 0x80 != 0,
                );
            }
            3 => self.units.unit_mut(slot).x_counter = self.secondary.x(slot),
            4 => {
                let fetched = chr.chr_read(self.sprite_fetch_addr);
                let unit = self.units.unit_mut(slot);
                // Bit 0 emits first; horizontal flip keeps the raw order.
                unit.pattern_lo = if unit.attributes & 0x40 != 0 {
                    fetched
                } else {
                    fetched.reverse_bits()
                };
            }
            6 => {
                let fetched = chr.chr_read(self.sprite_fetch_addr + 8);
                let sprite_zero = slot == 0 && self.evaluator.sprite_zero_found();
                let unit = self.units.unit_mut(slot);
                unit.pattern_hi = if unit.attributes & 0x40 != 0 {
                    fetched
                } else {
                    fetched.reverse_bits()
                };
                unit.active = true;
                unit.sprite_zero = sprite_zero;
            }
            _ => {}
        }
    }

    /// Compose one pixel: background mux, sprite priority and the
    /// sprite 0 hit test, then the palette lookup into the frame buffer.
    fn render_dot(&mut self, scanline: u16, dot: u16) {
        let mask = self.regs.mask;
        let fine_x = self.scroll.fine_x();

        let (mut bg_pixel, bg_palette) = if mask.show_background() {
            self.background.pixel(fine_x)
        } else {
            (0, 0)
        };
        if dot <= 8 && mask.clip_background_left() {
            bg_pixel = 0;
        }

        let mut sprite = if mask.show_sprites() {
            self.units.tick_pixel()
        } else {
            None
        };
        if dot <= 8 && mask.clip_sprites_left() {
            sprite = None;
        }

        if let Some(s) = sprite {
            let hit = s.sprite_zero
                && bg_pixel != 0
                && dot != 256
                && mask.show_background()
                && mask.show_sprites()
                && !self.regs.status.contains(Status::SPRITE_ZERO_HIT);
            if hit {
                self.regs.status.insert(Status::SPRITE_ZERO_HIT);
            }
        }

        let palette_index = match sprite {
            Some(s) if bg_pixel == 0 || !s.behind_background => 0x10 | (s.palette << 2) | s.pixel,
            _ if bg_pixel != 0 => (bg_palette << 2) | bg_pixel,
            _ => 0,
        };

        let mut colour = self.vram.read_palette(palette_index);
        if mask.greyscale() {
            colour &= 0x30;
        }
        self.frame_buffer[scanline as usize * FRAME_WIDTH + (dot as usize - 1)] = colour;
    }

    fn increment_vram_after_access(&mut self) {
        if self.regs.rendering_period && self.regs.mask.rendering_enabled() {
            // Rendering-time $2007 traffic disturbs both scroll counters.
            self.scroll.increment_y();
            self.scroll.increment_x();
        } else {
            self.scroll.increment_vram(self.regs.ctrl.vram_increment());
        }
    }

    fn apply_register_write<C: ChrBus + ?Sized>(
        &mut self,
        addr: u16,
        value: u8,
        pins: &mut InterruptPins,
        chr: &mut C,
    ) {
        match addr {
            0x2000 => {
                let new_ctrl = Ctrl::from_bits_truncate(value);
                // Enabling NMI generation mid-VBL raises the edge now,
                // delayed by one instruction.
                if self.regs.status.contains(Status::VBLANK)
                    && !self.regs.ctrl.nmi_enabled()
                    && new_ctrl.nmi_enabled()
                {
                    pins.nmi_pending = true;
                    pins.delay_nmi = true;
                }
                self.regs.ctrl = new_ctrl;
                self.scroll.write_ctrl(value);
            }
            0x2001 => self.regs.mask = Mask::from_bits_truncate(value),
            0x2002 => {}
            0x2003 => self.oam.addr = value,
            0x2004 => {
                if self.regs.rendering_period && self.regs.mask.rendering_enabled() {
                    self.oam.glitch_increment();
                } else {
                    self.oam.write(value);
                }
            }
            0x2005 => self.scroll.write_scroll(value),
            0x2006 => self.scroll.write_addr(value),
            0x2007 => {
                let target = self.scroll.vram_addr() & 0x3FFF;
                if target < 0x2000 {
                    chr.chr_write(target, value);
                } else {
                    self.vram.write(target, value);
                }
                self.increment_vram_after_access();
            }
            _ => {}
        }
    }

    // =====================================================================
    // Inspection
    // =====================================================================

    /// Current scanline.
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.timing.scanline()
    }

    /// Current dot.
    #[must_use]
    pub fn dot(&self) -> u16 {
        self.timing.dot()
    }

    /// Frames completed.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.timing.frame()
    }

    /// On an odd frame.
    #[must_use]
    pub fn odd_frame(&self) -> bool {
        self.timing.odd_frame()
    }

    /// $2000 shadow.
    #[must_use]
    pub fn ctrl(&self) -> Ctrl {
        self.regs.ctrl
    }

    /// $2001 shadow.
    #[must_use]
    pub fn mask(&self) -> Mask {
        self.regs.mask
    }

    /// PPU-owned status bits.
    #[must_use]
    pub fn status(&self) -> Status {
        self.regs.status
    }

    /// OAMADDR, for DMA stream verification.
    #[must_use]
    pub fn oam_addr(&self) -> u8 {
        self.oam.addr
    }

    /// Raw OAM byte, for tests and debug views.
    #[must_use]
    pub fn oam_byte(&self, index: u8) -> u8 {
        self.oam.data()[index as usize]
    }

    /// Side-effect-free VRAM read ($2000-$3FFF), for tests and debug
    /// views.
    #[must_use]
    pub fn peek_vram(&self, addr: u16) -> u8 {
        self.vram.read(addr)
    }

    /// Current VRAM address (v).
    #[must_use]
    pub fn vram_addr(&self) -> u16 {
        self.scroll.vram_addr()
    }

    /// The 6-bit colour index frame, row major.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8 KiB of CHR-RAM standing in for a cartridge.
    struct TestChr {
        bytes: Vec<u8>,
    }

    impl TestChr {
        fn new() -> Self {
            Self {
                bytes: vec![0; 0x2000],
            }
        }
    }

    impl ChrBus for TestChr {
        fn chr_read(&mut self, addr: u16) -> u8 {
            self.bytes[(addr & 0x1FFF) as usize]
        }

        fn chr_write(&mut self, addr: u16, value: u8) {
            self.bytes[(addr & 0x1FFF) as usize] = value;
        }
    }

    fn tick(ppu: &mut Ppu, pins: &mut InterruptPins, chr: &mut TestChr) -> bool {
        ppu.tick(pins, chr)
    }

    fn tick_to(
        ppu: &mut Ppu,
        pins: &mut InterruptPins,
        chr: &mut TestChr,
        scanline: u16,
        dot: u16,
    ) {
        let mut guard = 0u32;
        while !(ppu.scanline() == scanline && ppu.dot() == dot) {
            tick(ppu, pins, chr);
            guard += 1;
            assert!(guard < 200_000, "position never reached");
        }
    }

    /// Write a register through the staging buffer and let it land.
    fn write_register(
        ppu: &mut Ppu,
        pins: &mut InterruptPins,
        chr: &mut TestChr,
        addr: u16,
        value: u8,
    ) {
        ppu.stage_register_write(addr, value);
        let dots = if addr & 0x0007 == 1 { 5 } else { 2 };
        for _ in 0..dots {
            tick(ppu, pins, chr);
        }
    }

    #[test]
    fn vblank_flag_sets_at_241_dot_1() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 241, 0);
        assert!(!ppu.status().contains(Status::VBLANK));

        tick(&mut ppu, &mut pins, &mut chr);
        assert_eq!((ppu.scanline(), ppu.dot()), (241, 1));
        assert!(ppu.status().contains(Status::VBLANK));
    }

    #[test]
    fn vblank_flag_clears_at_prerender_dot_1() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 261, 0);
        assert!(ppu.status().contains(Status::VBLANK));
        tick(&mut ppu, &mut pins, &mut chr);
        assert!(!ppu.status().contains(Status::VBLANK));
    }

    #[test]
    fn nmi_latched_when_enabled() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2000, 0x80);

        tick_to(&mut ppu, &mut pins, &mut chr, 241, 1);
        assert!(pins.nmi_pending);
    }

    #[test]
    fn no_nmi_when_disabled() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 241, 5);
        assert!(!pins.nmi_pending);
    }

    #[test]
    fn status_read_clears_vblank_and_returns_it_once() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 241, 10);
        let value = ppu.read_status();
        assert_eq!(value & 0x80, 0x80);
        assert!(!ppu.status().contains(Status::VBLANK));

        let value = ppu.read_status();
        assert_eq!(value & 0x80, 0);
    }

    #[test]
    fn status_read_in_race_window_suppresses_nmi() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2000, 0x80);

        // CPU reads $2002 while the PPU sits at 241/0; the next dots run
        // within the same CPU cycle.
        tick_to(&mut ppu, &mut pins, &mut chr, 241, 0);
        let value = ppu.read_status();
        assert_eq!(value & 0x80, 0, "race read must see bit 7 clear");

        tick(&mut ppu, &mut pins, &mut chr); // dot 1
        assert!(!pins.nmi_pending, "NMI suppressed by the racing read");
        assert!(!ppu.status().contains(Status::VBLANK));
    }

    #[test]
    fn enabling_nmi_during_vblank_raises_it() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 245, 0);
        assert!(!pins.nmi_pending);

        write_register(&mut ppu, &mut pins, &mut chr, 0x2000, 0x80);
        assert!(pins.nmi_pending);
        assert!(pins.delay_nmi);
    }

    #[test]
    fn disabling_nmi_right_after_set_cancels_it() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2000, 0x80);

        // Stage the disable so it lands on 241/2, one dot after the set.
        tick_to(&mut ppu, &mut pins, &mut chr, 241, 0);
        ppu.stage_register_write(0x2000, 0x00);
        tick(&mut ppu, &mut pins, &mut chr); // dot 1: NMI latches
        assert!(pins.nmi_pending);
        tick(&mut ppu, &mut pins, &mut chr); // dot 2: disable lands
        assert!(!pins.nmi_pending);
        assert!(pins.ignore_nmi);
    }

    #[test]
    fn addr_data_write_read_round_trip() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x21);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x08);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x5A);

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x21);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x08);
        let _garbage = ppu.read_data(&mut chr);
        let value = ppu.read_data(&mut chr);
        assert_eq!(value, 0x5A);
    }

    #[test]
    fn data_reads_reach_chr_through_the_buffer() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        chr.bytes[0x0123] = 0x77;

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x01);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x23);
        let _garbage = ppu.read_data(&mut chr);
        assert_eq!(ppu.read_data(&mut chr), 0x77);
    }

    #[test]
    fn palette_reads_bypass_the_buffer() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x3F);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x00);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x2C);

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x3F);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x00);
        let value = ppu.read_data(&mut chr);
        assert_eq!(value, 0x2C);
    }

    #[test]
    fn data_access_increments_by_ctrl_amount() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x20);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x00);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x01);
        assert_eq!(ppu.vram_addr(), 0x2001);

        write_register(&mut ppu, &mut pins, &mut chr, 0x2000, 0x04);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x02);
        assert_eq!(ppu.vram_addr(), 0x2021);
        assert_eq!(ppu.peek_vram(0x2001), 0x02);
    }

    #[test]
    fn oam_addr_data_writes() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        write_register(&mut ppu, &mut pins, &mut chr, 0x2003, 0x10);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2004, 0x42);
        assert_eq!(ppu.oam_byte(0x10), 0x42);
        assert_eq!(ppu.oam_addr(), 0x11);
    }

    #[test]
    fn odd_frame_skips_prerender_dot_339() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2001, 0x08);

        // Frame 0 is even: dot 339 exists.
        tick_to(&mut ppu, &mut pins, &mut chr, 261, 338);
        tick(&mut ppu, &mut pins, &mut chr);
        assert_eq!(ppu.dot(), 339);

        // Frame 1 is odd: 338 steps straight to 340.
        tick_to(&mut ppu, &mut pins, &mut chr, 261, 338);
        assert!(ppu.odd_frame());
        tick(&mut ppu, &mut pins, &mut chr);
        assert_eq!(ppu.dot(), 340);
    }

    #[test]
    fn no_skip_when_rendering_disabled() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        tick_to(&mut ppu, &mut pins, &mut chr, 261, 338);
        tick(&mut ppu, &mut pins, &mut chr);
        assert_eq!(ppu.dot(), 339);

        tick_to(&mut ppu, &mut pins, &mut chr, 261, 338);
        assert!(ppu.odd_frame());
        tick(&mut ppu, &mut pins, &mut chr);
        assert_eq!(ppu.dot(), 339);
    }

    #[test]
    fn frame_ready_at_240_0() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        let mut ready_positions = Vec::new();
        for _ in 0..(341 * 262) {
            if tick(&mut ppu, &mut pins, &mut chr) {
                ready_positions.push((ppu.scanline(), ppu.dot()));
            }
        }
        assert_eq!(ready_positions, vec![(240, 0)]);
    }

    #[test]
    fn mask_write_is_delayed_five_dots() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        ppu.stage_register_write(0x2001, 0x18);
        for _ in 0..4 {
            tick(&mut ppu, &mut pins, &mut chr);
            assert!(!ppu.mask().rendering_enabled());
        }
        tick(&mut ppu, &mut pins, &mut chr);
        assert!(ppu.mask().rendering_enabled());
    }

    #[test]
    fn glitchy_oam_write_during_rendering() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2001, 0x08);

        tick_to(&mut ppu, &mut pins, &mut chr, 10, 100);
        let addr_before = ppu.oam_addr();
        write_register(&mut ppu, &mut pins, &mut chr, 0x2004, 0x55);
        assert_eq!(ppu.oam_addr(), addr_before.wrapping_add(4));
        assert_ne!(ppu.oam_byte(addr_before), 0x55);
    }

    #[test]
    fn chr_ram_writes_through_2007() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x00);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2006, 0x40);
        write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x99);
        assert_eq!(chr.bytes[0x0040], 0x99);
    }

    #[test]
    fn sprite_zero_hit_fires_on_overlap() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        // Solid tile 1 in both bitplanes.
        for row in 0..8 {
            chr.bytes[0x0010 + row] = 0xFF;
            chr.bytes[0x0018 + row] = 0xFF;
        }
        // Fill the first nametable with tile 1 so the background is
        // opaque everywhere.
        for addr in 0x2000u16..0x23C0 {
            write_register(&mut ppu, &mut pins, &mut chr, 0x2006, (addr >> 8) as u8);
            write_register(&mut ppu, &mut pins, &mut chr, 0x2006, addr as u8);
            write_register(&mut ppu, &mut pins, &mut chr, 0x2007, 0x01);
        }
        // Sprite 0 at (60, 40) with tile 1.
        write_register(&mut ppu, &mut pins, &mut chr, 0x2003, 0x00);
        for value in [40u8, 0x01, 0x00, 60] {
            write_register(&mut ppu, &mut pins, &mut chr, 0x2004, value);
        }
        // Both layers on, left columns unmasked.
        write_register(&mut ppu, &mut pins, &mut chr, 0x2001, 0x1E);

        // Run a frame; the hit must be set during the sprite's scanlines.
        tick_to(&mut ppu, &mut pins, &mut chr, 60, 0);
        assert!(ppu.status().contains(Status::SPRITE_ZERO_HIT));

        // And it clears on the pre-render line.
        tick_to(&mut ppu, &mut pins, &mut chr, 261, 2);
        assert!(!ppu.status().contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn sprite_overflow_flag_on_ninth_sprite() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut pins = InterruptPins::new();
        let mut chr = TestChr::new();

        // Nine sprites on scanline 50.
        write_register(&mut ppu, &mut pins, &mut chr, 0x2003, 0x00);
        for i in 0..9u8 {
            for value in [50u8, 0x01, 0x00, i * 8] {
                write_register(&mut ppu, &mut pins, &mut chr, 0x2004, value);
            }
        }
        write_register(&mut ppu, &mut pins, &mut chr, 0x2001, 0x18);

        tick_to(&mut ppu, &mut pins, &mut chr, 51, 0);
        assert!(ppu.status().contains(Status::SPRITE_OVERFLOW));
    }
}
