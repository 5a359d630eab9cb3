//! 6502 CPU core.
//!
//! The CPU is driven one cycle at a time through [`Cpu::tick`]. Each tick
//! performs exactly one bus access (or one internal cycle) and advances the
//! FETCH → DECODE → EXECUTE machine:
//!
//! - FETCH reads the opcode, loads `instruction_cycles_remaining` from the
//!   decode table and recognises interrupts and OAM DMA.
//! - DECODE runs one addressing-mode step per cycle, keyed on the
//!   remaining-cycle count, filling the address latches.
//! - EXECUTE is the final cycle: it performs the data access and applies
//!   the instruction's effect to registers or memory.
//!
//! Interrupts are only taken between instructions. The NMI handshake flags
//! ([`InterruptPins`]) are written by the PPU and consumed here; see the
//! field comments for the race behaviour around the VBL flag.

use crate::addressing::AddrMode as Mode;
use crate::bus::Bus;
use crate::interrupt::InterruptPins;
use crate::opcodes::{Op, OPCODE_TABLE};
use crate::phase::{Interrupt, Phase};
use crate::status::Status;

/// Cycles in a hardware interrupt sequence.
const INTERRUPT_SEQUENCE_CYCLES: u8 = 7;

/// DMA transfer cycles: 256 alternating read/write pairs.
const DMA_TRANSFER_CYCLES: u16 = 512;

/// NES 6502 CPU (2A03 core, no decimal arithmetic).
#[derive(Debug)]
pub struct Cpu {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Program counter.
    pub pc: u16,
    /// Stack pointer, low byte of $0100-$01FF.
    pub sp: u8,
    /// Status register.
    pub status: Status,
    /// Global cycle counter. Keeps advancing through DMA suspension.
    pub cycles: u64,

    // Instruction latches
    opcode: u8,
    addr_lo: u8,
    addr_hi: u8,
    base_addr: u8,
    target_addr: u16,
    operand: u8,
    offset: i8,
    address_bus: u16,
    data_bus: u8,

    phase: Phase,
    instruction_cycles_remaining: u8,

    // Interrupt sequencing
    servicing: Interrupt,
    interrupt_cycles_left: u8,
    process_interrupt: bool,
    /// Holds a recognised interrupt back for one instruction.
    delay_nmi: bool,
    /// Set by JMP absolute so a jump does not incur the lookahead delay.
    ignore_fetch_on_nmi: bool,

    // OAM DMA
    dma_cycles_left: u16,
    dma_latch: u8,
}

impl Cpu {
    /// Create a CPU in power-on state (SP = $FD, P = $24, PC = 0 until
    /// [`reset`](Self::reset) loads the vector).
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycles: 0,
            opcode: 0,
            addr_lo: 0,
            addr_hi: 0,
            base_addr: 0,
            target_addr: 0,
            operand: 0,
            offset: 0,
            address_bus: 0,
            data_bus: 0,
            phase: Phase::Fetch,
            instruction_cycles_remaining: 0,
            servicing: Interrupt::Nmi,
            interrupt_cycles_left: INTERRUPT_SEQUENCE_CYCLES,
            process_interrupt: false,
            delay_nmi: false,
            ignore_fetch_on_nmi: false,
            dma_cycles_left: 0,
            dma_latch: 0,
        }
    }

    /// Apply the RESET sequence: SP drops by 3 with no writes, I is set,
    /// and PC loads from $FFFC/$FFFD. Burns 7 cycles.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.sp = self.sp.wrapping_sub(3);
        self.status.insert(Status::I);
        self.pc = bus.read_u16(crate::vectors::RESET);
        self.cycles += 7;
        self.phase = Phase::Fetch;
        self.instruction_cycles_remaining = 0;
        self.process_interrupt = false;
        self.delay_nmi = false;
        self.ignore_fetch_on_nmi = false;
        self.interrupt_cycles_left = INTERRUPT_SEQUENCE_CYCLES;
        self.dma_cycles_left = 0;
    }

    /// Current execution phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last address driven onto the address bus.
    #[must_use]
    pub fn address_bus(&self) -> u16 {
        self.address_bus
    }

    /// Last value seen on the data bus.
    #[must_use]
    pub fn data_bus(&self) -> u8 {
        self.data_bus
    }

    /// Advance exactly one CPU cycle.
    ///
    /// Returns `true` when this cycle completed an instruction, an
    /// interrupt sequence or a DMA transfer — i.e. the next tick starts at
    /// a fetch boundary.
    pub fn tick(&mut self, bus: &mut impl Bus, pins: &mut InterruptPins) -> bool {
        self.cycles += 1;
        self.instruction_cycles_remaining = self.instruction_cycles_remaining.saturating_sub(1);

        if pins.delay_nmi {
            self.delay_nmi = true;
            pins.delay_nmi = false;
        }

        // A suppression hit drops the pending service request, unless the
        // 7-cycle sequence already started.
        if pins.ignore_nmi {
            if self.interrupt_cycles_left == INTERRUPT_SEQUENCE_CYCLES {
                self.process_interrupt = false;
            }
            pins.ignore_nmi = false;
        }

        if self.process_interrupt && !self.delay_nmi && self.phase == Phase::Fetch {
            return self.interrupt_tick(bus, pins);
        }

        if self.phase == Phase::Fetch {
            if pins.dma_pending {
                return self.dma_tick(bus, pins);
            }
            self.fetch_opcode(bus);
            self.delay_nmi = false;
        } else if self.phase == Phase::Decode {
            self.decode(bus);
        }

        if self.phase == Phase::Execute {
            self.phase = Phase::Fetch;
            self.execute(bus);

            if pins.nmi_pending || (pins.irq_line && !self.status.contains(Status::I)) {
                self.process_interrupt = true;
            }
            if pins.nmi_lookahead {
                self.delay_nmi = true;
            }
            if pins.nmi_lookahead && self.ignore_fetch_on_nmi {
                self.delay_nmi = false;
            }
            self.ignore_fetch_on_nmi = false;
            return true;
        }
        false
    }

    /// Run ticks until the next instruction boundary. Test/debug helper.
    pub fn step(&mut self, bus: &mut impl Bus, pins: &mut InterruptPins) -> u8 {
        let mut spent = 0u8;
        loop {
            let done = self.tick(bus, pins);
            spent = spent.saturating_add(1);
            if done {
                return spent;
            }
        }
    }

    // =====================================================================
    // Bus helpers: every access latches the address/data bus shadows.
    // =====================================================================

    fn read(&mut self, bus: &mut impl Bus, addr: u16) -> u8 {
        self.address_bus = addr;
        self.data_bus = bus.read(addr);
        self.data_bus
    }

    fn write(&mut self, bus: &mut impl Bus, addr: u16, value: u8) {
        self.address_bus = addr;
        self.data_bus = value;
        bus.write(addr, value);
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        self.write(bus, 0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(bus, 0x0100 | u16::from(self.sp))
    }

    // =====================================================================
    // FETCH
    // =====================================================================

    fn fetch_opcode(&mut self, bus: &mut impl Bus) {
        let at = self.pc;
        self.opcode = self.read(bus, at);
        self.pc = self.pc.wrapping_add(1);

        let info = &OPCODE_TABLE[self.opcode as usize];
        if info.op == Op::Ill {
            log::warn!("unofficial opcode ${:02X} at ${at:04X}, running as NOP", self.opcode);
        }
        self.instruction_cycles_remaining = info.cycles;
        self.phase = Phase::Decode;
    }

    // =====================================================================
    // DECODE — one bus cycle per call, keyed on the remaining-cycle count.
    // =====================================================================

    fn decode(&mut self, bus: &mut impl Bus) {
        let info = OPCODE_TABLE[self.opcode as usize];
        match info.op {
            Op::Brk => return self.decode_brk(bus),
            Op::Jsr => return self.decode_jsr(bus),
            Op::Rti => return self.decode_rti(bus),
            Op::Rts => return self.decode_rts(bus),
            Op::Pha | Op::Php => return self.decode_push(bus),
            Op::Pla | Op::Plp => return self.decode_pull(bus),
            Op::Jmp => return self.decode_jmp(bus),
            _ => {}
        }

        match info.mode {
            Mode::Implied | Mode::Accumulator => {
                // Dummy read of the byte after the opcode.
                self.read(bus, self.pc);
                self.phase = Phase::Execute;
            }
            Mode::Immediate => {
                self.operand = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.phase = Phase::Execute;
            }
            Mode::ZeroPage => self.decode_zero_page(bus, info.op),
            Mode::ZeroPageX => self.decode_zero_page_indexed(bus, info.op, self.x),
            Mode::ZeroPageY => self.decode_zero_page_indexed(bus, info.op, self.y),
            Mode::Absolute => self.decode_absolute(bus, info.op),
            Mode::AbsoluteX => self.decode_absolute_indexed(bus, info.op, self.x),
            Mode::AbsoluteY => self.decode_absolute_indexed(bus, info.op, self.y),
            Mode::IndirectX => self.decode_indirect_x(bus),
            Mode::IndirectY => self.decode_indirect_y(bus, info.op),
            Mode::Relative => self.decode_branch(bus),
            Mode::Indirect => {
                // JMP is the only indirect instruction and is handled above.
                self.phase = Phase::Execute;
            }
        }
    }

    fn decode_zero_page(&mut self, bus: &mut impl Bus, op: Op) {
        if op.is_rmw() {
            match self.instruction_cycles_remaining {
                4 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                3 => {
                    self.target_addr = u16::from(self.addr_lo);
                    self.operand = self.read(bus, self.target_addr);
                }
                2 => {
                    // Dummy write-back of the unmodified value.
                    self.write(bus, self.target_addr, self.operand);
                }
                _ => self.phase = Phase::Execute,
            }
        } else {
            match self.instruction_cycles_remaining {
                2 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                _ => {
                    self.target_addr = u16::from(self.addr_lo);
                    self.phase = Phase::Execute;
                }
            }
        }
    }

    fn decode_zero_page_indexed(&mut self, bus: &mut impl Bus, op: Op, index: u8) {
        if op.is_rmw() {
            match self.instruction_cycles_remaining {
                5 => {
                    self.base_addr = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                4 => {
                    // Dummy read at the unindexed address; the sum wraps in
                    // page zero.
                    self.read(bus, u16::from(self.base_addr));
                    self.target_addr = u16::from(self.base_addr.wrapping_add(index));
                }
                3 => self.operand = self.read(bus, self.target_addr),
                2 => self.write(bus, self.target_addr, self.operand),
                _ => self.phase = Phase::Execute,
            }
        } else {
            match self.instruction_cycles_remaining {
                3 => {
                    self.base_addr = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    self.read(bus, u16::from(self.base_addr));
                    self.target_addr = u16::from(self.base_addr.wrapping_add(index));
                }
                _ => self.phase = Phase::Execute,
            }
        }
    }

    fn decode_absolute(&mut self, bus: &mut impl Bus, op: Op) {
        if op.is_rmw() {
            match self.instruction_cycles_remaining {
                5 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                4 => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                3 => {
                    self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                    self.operand = self.read(bus, self.target_addr);
                }
                2 => self.write(bus, self.target_addr, self.operand),
                _ => self.phase = Phase::Execute,
            }
        } else {
            match self.instruction_cycles_remaining {
                3 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                _ => {
                    self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                    self.phase = Phase::Execute;
                }
            }
        }
    }

    fn decode_absolute_indexed(&mut self, bus: &mut impl Bus, op: Op, index: u8) {
        if op.is_rmw() {
            match self.instruction_cycles_remaining {
                6 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                5 => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                4 => {
                    // Read at the address before the carry propagates.
                    let partial = (u16::from(self.addr_hi) << 8)
                        | u16::from(self.addr_lo.wrapping_add(index));
                    self.read(bus, partial);
                }
                3 => {
                    self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi])
                        .wrapping_add(u16::from(index));
                    self.operand = self.read(bus, self.target_addr);
                }
                2 => self.write(bus, self.target_addr, self.operand),
                _ => self.phase = Phase::Execute,
            }
        } else {
            match self.instruction_cycles_remaining {
                4 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                3 => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => self.speculative_indexed_cycle(bus, op, index),
                _ => {
                    self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi])
                        .wrapping_add(u16::from(index));
                    self.phase = Phase::Execute;
                }
            }
        }
    }

    /// The T3 cycle of indexed absolute (and the T4 of `(zp),Y`): compute
    /// the address without the carry. Reads that stay within the page take
    /// their data this cycle; stores and page-crossing reads spend the
    /// cycle on a dummy read and fix the address next cycle.
    fn speculative_indexed_cycle(&mut self, bus: &mut impl Bus, op: Op, index: u8) {
        let partial =
            (u16::from(self.addr_hi) << 8) | u16::from(self.addr_lo.wrapping_add(index));
        self.target_addr = partial;
        if !op.is_store() && !page_cross(self.addr_lo, index) {
            self.phase = Phase::Execute;
        } else {
            self.read(bus, partial);
        }
    }

    fn decode_indirect_x(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            5 => {
                self.base_addr = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            4 => {
                self.read(bus, u16::from(self.base_addr));
                self.base_addr = self.base_addr.wrapping_add(self.x);
            }
            3 => self.addr_lo = self.read(bus, u16::from(self.base_addr)),
            2 => self.addr_hi = self.read(bus, u16::from(self.base_addr.wrapping_add(1))),
            _ => {
                self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                self.phase = Phase::Execute;
            }
        }
    }

    fn decode_indirect_y(&mut self, bus: &mut impl Bus, op: Op) {
        match self.instruction_cycles_remaining {
            5 => {
                self.base_addr = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            4 => self.addr_lo = self.read(bus, u16::from(self.base_addr)),
            3 => self.addr_hi = self.read(bus, u16::from(self.base_addr.wrapping_add(1))),
            2 => self.speculative_indexed_cycle(bus, op, self.y),
            _ => {
                self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi])
                    .wrapping_add(u16::from(self.y));
                self.phase = Phase::Execute;
            }
        }
    }

    fn decode_branch(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            3 => {
                self.offset = self.read(bus, self.pc) as i8;
                self.pc = self.pc.wrapping_add(1);
                if !self.branch_taken() {
                    self.target_addr = self.pc;
                    self.phase = Phase::Execute;
                }
            }
            2 => {
                // Address without the carry into PCH.
                let partial =
                    (self.pc & 0xFF00) | (self.pc.wrapping_add(self.offset as u16) & 0x00FF);
                self.read(bus, partial);
                self.target_addr = partial;
                let full = self.pc.wrapping_add(self.offset as u16);
                if full & 0xFF00 == self.pc & 0xFF00 {
                    self.phase = Phase::Execute;
                }
            }
            _ => {
                self.target_addr = self.pc.wrapping_add(self.offset as u16);
                self.phase = Phase::Execute;
            }
        }
    }

    fn decode_push(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            2 => {
                self.read(bus, self.pc);
            }
            _ => self.phase = Phase::Execute,
        }
    }

    fn decode_pull(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            3 => {
                self.read(bus, self.pc);
            }
            2 => {
                self.read(bus, 0x0100 | u16::from(self.sp));
            }
            _ => self.phase = Phase::Execute,
        }
    }

    fn decode_jmp(&mut self, bus: &mut impl Bus) {
        if OPCODE_TABLE[self.opcode as usize].mode == Mode::Absolute {
            // A jump replaces the fetch PC outright, so a pending NMI is
            // not held back through it.
            self.ignore_fetch_on_nmi = true;
            match self.instruction_cycles_remaining {
                2 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                _ => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.target_addr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                    self.phase = Phase::Execute;
                }
            }
        } else {
            match self.instruction_cycles_remaining {
                4 => {
                    self.addr_lo = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                3 => {
                    self.addr_hi = self.read(bus, self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    let ptr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                    self.operand = self.read(bus, ptr);
                }
                _ => {
                    // High byte wraps within the pointer's page.
                    let ptr = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                    let hi_addr = if ptr & 0x00FF == 0x00FF {
                        ptr & 0xFF00
                    } else {
                        ptr.wrapping_add(1)
                    };
                    let hi = self.read(bus, hi_addr);
                    self.target_addr = (u16::from(hi) << 8) | u16::from(self.operand);
                    self.phase = Phase::Execute;
                }
            }
        }
    }

    fn decode_jsr(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            5 => {
                self.addr_lo = self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            4 => {
                self.read(bus, 0x0100 | u16::from(self.sp));
            }
            3 => self.push(bus, (self.pc >> 8) as u8),
            2 => self.push(bus, self.pc as u8),
            _ => self.phase = Phase::Execute,
        }
    }

    fn decode_rts(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            5 => {
                self.read(bus, self.pc);
            }
            4 => {
                self.read(bus, 0x0100 | u16::from(self.sp));
            }
            3 => self.addr_lo = self.pull(bus),
            2 => {
                self.addr_hi = self.pull(bus);
                self.pc = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
            }
            _ => self.phase = Phase::Execute,
        }
    }

    fn decode_rti(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            5 => {
                self.read(bus, self.pc);
            }
            4 => {
                self.read(bus, 0x0100 | u16::from(self.sp));
            }
            3 => {
                let value = self.pull(bus);
                self.status = Status::from_stack_byte(value);
            }
            2 => self.addr_lo = self.pull(bus),
            _ => {
                self.addr_hi = self.pull(bus);
                self.phase = Phase::Execute;
            }
        }
    }

    fn decode_brk(&mut self, bus: &mut impl Bus) {
        match self.instruction_cycles_remaining {
            6 => {
                // Padding byte; BRK is effectively two bytes wide.
                self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            5 => self.push(bus, (self.pc >> 8) as u8),
            4 => self.push(bus, self.pc as u8),
            3 => {
                self.push(bus, self.status.to_stack_byte(true));
                self.status.insert(Status::I);
            }
            2 => self.addr_lo = self.read(bus, crate::vectors::IRQ),
            _ => {
                self.addr_hi = self.read(bus, crate::vectors::IRQ + 1);
                self.phase = Phase::Execute;
            }
        }
    }

    // =====================================================================
    // EXECUTE — the final cycle's data access and architectural effect.
    // =====================================================================

    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, bus: &mut impl Bus) {
        let info = OPCODE_TABLE[self.opcode as usize];
        match info.op {
            // Loads
            Op::Lda => {
                self.a = self.load_operand(bus);
                self.status.set_zn(self.a);
            }
            Op::Ldx => {
                self.x = self.load_operand(bus);
                self.status.set_zn(self.x);
            }
            Op::Ldy => {
                self.y = self.load_operand(bus);
                self.status.set_zn(self.y);
            }

            // Stores
            Op::Sta => self.write(bus, self.target_addr, self.a),
            Op::Stx => self.write(bus, self.target_addr, self.x),
            Op::Sty => self.write(bus, self.target_addr, self.y),

            // Arithmetic
            Op::Adc => {
                let value = self.load_operand(bus);
                self.adc(value);
            }
            Op::Sbc => {
                // SBC is ADC of the one's complement.
                let value = self.load_operand(bus);
                self.adc(!value);
            }
            Op::Cmp => {
                let value = self.load_operand(bus);
                self.compare(self.a, value);
            }
            Op::Cpx => {
                let value = self.load_operand(bus);
                self.compare(self.x, value);
            }
            Op::Cpy => {
                let value = self.load_operand(bus);
                self.compare(self.y, value);
            }

            // Logic
            Op::And => {
                self.a &= self.load_operand(bus);
                self.status.set_zn(self.a);
            }
            Op::Ora => {
                self.a |= self.load_operand(bus);
                self.status.set_zn(self.a);
            }
            Op::Eor => {
                self.a ^= self.load_operand(bus);
                self.status.set_zn(self.a);
            }
            Op::Bit => {
                let value = self.load_operand(bus);
                self.status.set(Status::Z, self.a & value == 0);
                self.status.set(Status::V, value & 0x40 != 0);
                self.status.set(Status::N, value & 0x80 != 0);
            }

            // Shifts and rotates
            Op::Asl => self.rmw(bus, info.mode, Self::asl_value),
            Op::Lsr => self.rmw(bus, info.mode, Self::lsr_value),
            Op::Rol => self.rmw(bus, info.mode, Self::rol_value),
            Op::Ror => self.rmw(bus, info.mode, Self::ror_value),

            // Memory increment/decrement
            Op::Inc => {
                let result = self.operand.wrapping_add(1);
                self.status.set_zn(result);
                self.write(bus, self.target_addr, result);
            }
            Op::Dec => {
                let result = self.operand.wrapping_sub(1);
                self.status.set_zn(result);
                self.write(bus, self.target_addr, result);
            }

            // Register increment/decrement
            Op::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Op::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Op::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Op::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }

            // Transfers
            Op::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Op::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Op::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Op::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Op::Txs => self.sp = self.x,
            Op::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }

            // Flags
            Op::Clc => self.status.remove(Status::C),
            Op::Sec => self.status.insert(Status::C),
            Op::Cli => self.status.remove(Status::I),
            Op::Sei => self.status.insert(Status::I),
            Op::Clv => self.status.remove(Status::V),
            Op::Cld => self.status.remove(Status::D),
            Op::Sed => self.status.insert(Status::D),

            // Stack
            Op::Pha => self.push(bus, self.a),
            Op::Php => {
                let value = self.status.to_stack_byte(true);
                self.push(bus, value);
            }
            Op::Pla => {
                self.a = self.pull(bus);
                self.status.set_zn(self.a);
            }
            Op::Plp => {
                let value = self.pull(bus);
                self.status = Status::from_stack_byte(value);
            }

            // Control flow
            Op::Jmp => self.pc = self.target_addr,
            Op::Jsr => {
                self.addr_hi = self.read(bus, self.pc);
                self.pc = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
            }
            Op::Rts => {
                self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            Op::Rti | Op::Brk => {
                self.pc = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
            }
            Op::Bcc | Op::Bcs | Op::Beq | Op::Bmi | Op::Bne | Op::Bpl | Op::Bvc | Op::Bvs => {
                self.pc = self.target_addr;
            }

            Op::Nop | Op::Ill => {}
        }
    }

    /// Final-cycle data fetch for read instructions.
    fn load_operand(&mut self, bus: &mut impl Bus) -> u8 {
        match OPCODE_TABLE[self.opcode as usize].mode {
            Mode::Immediate => self.operand,
            Mode::Accumulator => self.a,
            _ => {
                self.operand = self.read(bus, self.target_addr);
                self.operand
            }
        }
    }

    /// Shift/rotate dispatch: accumulator variants touch A, memory
    /// variants rewrite the value read during decode.
    fn rmw(&mut self, bus: &mut impl Bus, mode: Mode, f: fn(&mut Self, u8) -> u8) {
        if mode == Mode::Accumulator {
            self.a = f(self, self.a);
        } else {
            let result = f(self, self.operand);
            self.write(bus, self.target_addr, result);
        }
    }

    fn asl_value(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.status.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.status.set(Status::C, value & 0x01 != 0);
        let result = value >> 1;
        self.status.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.set(Status::C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.status.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C)) << 7;
        self.status.set(Status::C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.status.set_zn(result);
        result
    }

    fn adc(&mut self, value: u8) {
        let carry = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry;
        let result = sum as u8;

        self.status.set(Status::C, sum > 0xFF);
        self.status
            .set(Status::V, (self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.status.set_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set(Status::C, register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    fn branch_taken(&self) -> bool {
        match OPCODE_TABLE[self.opcode as usize].op {
            Op::Bpl => !self.status.contains(Status::N),
            Op::Bmi => self.status.contains(Status::N),
            Op::Bvc => !self.status.contains(Status::V),
            Op::Bvs => self.status.contains(Status::V),
            Op::Bcc => !self.status.contains(Status::C),
            Op::Bcs => self.status.contains(Status::C),
            Op::Bne => !self.status.contains(Status::Z),
            Op::Beq => self.status.contains(Status::Z),
            _ => false,
        }
    }

    // =====================================================================
    // Interrupt sequence (7 cycles) and OAM DMA
    // =====================================================================

    fn interrupt_tick(&mut self, bus: &mut impl Bus, pins: &mut InterruptPins) -> bool {
        match self.interrupt_cycles_left {
            7 => {
                // NMI wins over IRQ; a dropped line cancels the request.
                if pins.nmi_pending {
                    self.servicing = Interrupt::Nmi;
                } else if pins.irq_line && !self.status.contains(Status::I) {
                    self.servicing = Interrupt::Irq;
                } else {
                    self.process_interrupt = false;
                    return false;
                }
                self.read(bus, self.pc);
            }
            6 => {
                self.read(bus, self.pc);
            }
            5 => self.push(bus, (self.pc >> 8) as u8),
            4 => self.push(bus, self.pc as u8),
            3 => {
                self.push(bus, self.status.to_stack_byte(false));
                self.status.insert(Status::I);
            }
            2 => self.addr_lo = self.read(bus, self.servicing.vector()),
            1 => {
                self.addr_hi = self.read(bus, self.servicing.vector().wrapping_add(1));
                self.pc = u16::from_le_bytes([self.addr_lo, self.addr_hi]);
                if self.servicing == Interrupt::Nmi {
                    pins.nmi_pending = false;
                }
                self.process_interrupt = false;
                self.interrupt_cycles_left = INTERRUPT_SEQUENCE_CYCLES;
                return true;
            }
            _ => {}
        }
        self.interrupt_cycles_left -= 1;
        false
    }

    fn dma_tick(&mut self, bus: &mut impl Bus, pins: &mut InterruptPins) -> bool {
        if self.dma_cycles_left == 0 {
            // First suspended cycle; starting on an odd cycle costs one
            // extra alignment cycle.
            self.dma_cycles_left = if (self.cycles - 1) & 1 == 1 {
                DMA_TRANSFER_CYCLES + 2
            } else {
                DMA_TRANSFER_CYCLES + 1
            };
        }

        if self.dma_cycles_left > DMA_TRANSFER_CYCLES {
            // Leading idle cycle(s).
            self.read(bus, self.pc);
        } else {
            let step = DMA_TRANSFER_CYCLES - self.dma_cycles_left;
            let index = step / 2;
            if step % 2 == 0 {
                let src = (u16::from(pins.dma_page) << 8) | index;
                self.dma_latch = self.read(bus, src);
            } else {
                // Streaming through OAMDATA keeps the OAMADDR start offset
                // and wrap behaviour.
                self.write(bus, 0x2004, self.dma_latch);
            }
        }

        self.dma_cycles_left -= 1;
        if self.dma_cycles_left == 0 {
            pins.dma_pending = false;
            return true;
        }
        false
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn page_cross(low_byte: u8, index: u8) -> bool {
    u16::from(low_byte) + u16::from(index) > 0xFF
}
