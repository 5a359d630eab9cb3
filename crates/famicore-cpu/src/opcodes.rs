//! Opcode decode table.
//!
//! A 256-entry compile-time table mapping each opcode byte to its
//! operation, addressing mode and maximum cycle count. The cycle values
//! include the page-cross penalty where one exists; the decoder elides the
//! final cycle when a read instruction stays within the page.
//!
//! Unofficial opcodes are not implemented. They resolve to [`Op::Ill`],
//! which the core logs and runs as a two-cycle NOP.

use crate::addressing::AddrMode as Mode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Instruction operation (the semantic applied on the EXECUTE cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)] // the mnemonics are the documentation
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
    /// Unofficial opcode; runs as a 2-cycle NOP.
    Ill,
}

impl Op {
    /// Stores never take the page-cross short cut.
    #[inline]
    #[must_use]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sta | Self::Stx | Self::Sty)
    }

    /// Memory read-modify-write operations (dummy write-back before the
    /// modified value lands).
    #[inline]
    #[must_use]
    pub const fn is_rmw(self) -> bool {
        matches!(
            self,
            Self::Asl | Self::Lsr | Self::Rol | Self::Ror | Self::Inc | Self::Dec
        )
    }

    /// Relative-mode branch operations.
    #[inline]
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Bcc | Self::Bcs | Self::Beq | Self::Bmi | Self::Bne | Self::Bpl | Self::Bvc | Self::Bvs
        )
    }
}

/// One row of the decode table.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Mnemonic, for logs and debugger output.
    pub mnemonic: &'static str,
    /// Semantic operation.
    pub op: Op,
    /// Addressing mode.
    pub mode: Mode,
    /// Maximum cycle count (page-cross penalty included).
    pub cycles: u8,
}

const fn o(mnemonic: &'static str, op: Op, mode: Mode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        op,
        mode,
        cycles,
    }
}

const ILL: OpcodeInfo = o("???", Op::Ill, Mode::Implied, 2);

/// Complete decode table, indexed by opcode byte.
#[rustfmt::skip]
pub const OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00-0x0F
    o("BRK", Op::Brk, Mode::Implied, 7),
    o("ORA", Op::Ora, Mode::IndirectX, 6),
    ILL,
    ILL,
    ILL,
    o("ORA", Op::Ora, Mode::ZeroPage, 3),
    o("ASL", Op::Asl, Mode::ZeroPage, 5),
    ILL,
    o("PHP", Op::Php, Mode::Implied, 3),
    o("ORA", Op::Ora, Mode::Immediate, 2),
    o("ASL", Op::Asl, Mode::Accumulator, 2),
    ILL,
    ILL,
    o("ORA", Op::Ora, Mode::Absolute, 4),
    o("ASL", Op::Asl, Mode::Absolute, 6),
    ILL,
    // 0x10-0x1F
    o("BPL", Op::Bpl, Mode::Relative, 4),
    o("ORA", Op::Ora, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("ORA", Op::Ora, Mode::ZeroPageX, 4),
    o("ASL", Op::Asl, Mode::ZeroPageX, 6),
    ILL,
    o("CLC", Op::Clc, Mode::Implied, 2),
    o("ORA", Op::Ora, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("ORA", Op::Ora, Mode::AbsoluteX, 5),
    o("ASL", Op::Asl, Mode::AbsoluteX, 7),
    ILL,
    // 0x20-0x2F
    o("JSR", Op::Jsr, Mode::Absolute, 6),
    o("AND", Op::And, Mode::IndirectX, 6),
    ILL,
    ILL,
    o("BIT", Op::Bit, Mode::ZeroPage, 3),
    o("AND", Op::And, Mode::ZeroPage, 3),
    o("ROL", Op::Rol, Mode::ZeroPage, 5),
    ILL,
    o("PLP", Op::Plp, Mode::Implied, 4),
    o("AND", Op::And, Mode::Immediate, 2),
    o("ROL", Op::Rol, Mode::Accumulator, 2),
    ILL,
    o("BIT", Op::Bit, Mode::Absolute, 4),
    o("AND", Op::And, Mode::Absolute, 4),
    o("ROL", Op::Rol, Mode::Absolute, 6),
    ILL,
    // 0x30-0x3F
    o("BMI", Op::Bmi, Mode::Relative, 4),
    o("AND", Op::And, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("AND", Op::And, Mode::ZeroPageX, 4),
    o("ROL", Op::Rol, Mode::ZeroPageX, 6),
    ILL,
    o("SEC", Op::Sec, Mode::Implied, 2),
    o("AND", Op::And, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("AND", Op::And, Mode::AbsoluteX, 5),
    o("ROL", Op::Rol, Mode::AbsoluteX, 7),
    ILL,
    // 0x40-0x4F
    o("RTI", Op::Rti, Mode::Implied, 6),
    o("EOR", Op::Eor, Mode::IndirectX, 6),
    ILL,
    ILL,
    ILL,
    o("EOR", Op::Eor, Mode::ZeroPage, 3),
    o("LSR", Op::Lsr, Mode::ZeroPage, 5),
    ILL,
    o("PHA", Op::Pha, Mode::Implied, 3),
    o("EOR", Op::Eor, Mode::Immediate, 2),
    o("LSR", Op::Lsr, Mode::Accumulator, 2),
    ILL,
    o("JMP", Op::Jmp, Mode::Absolute, 3),
    o("EOR", Op::Eor, Mode::Absolute, 4),
    o("LSR", Op::Lsr, Mode::Absolute, 6),
    ILL,
    // 0x50-0x5F
    o("BVC", Op::Bvc, Mode::Relative, 4),
    o("EOR", Op::Eor, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("EOR", Op::Eor, Mode::ZeroPageX, 4),
    o("LSR", Op::Lsr, Mode::ZeroPageX, 6),
    ILL,
    o("CLI", Op::Cli, Mode::Implied, 2),
    o("EOR", Op::Eor, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("EOR", Op::Eor, Mode::AbsoluteX, 5),
    o("LSR", Op::Lsr, Mode::AbsoluteX, 7),
    ILL,
    // 0x60-0x6F
    o("RTS", Op::Rts, Mode::Implied, 6),
    o("ADC", Op::Adc, Mode::IndirectX, 6),
    ILL,
    ILL,
    ILL,
    o("ADC", Op::Adc, Mode::ZeroPage, 3),
    o("ROR", Op::Ror, Mode::ZeroPage, 5),
    ILL,
    o("PLA", Op::Pla, Mode::Implied, 4),
    o("ADC", Op::Adc, Mode::Immediate, 2),
    o("ROR", Op::Ror, Mode::Accumulator, 2),
    ILL,
    o("JMP", Op::Jmp, Mode::Indirect, 5),
    o("ADC", Op::Adc, Mode::Absolute, 4),
    o("ROR", Op::Ror, Mode::Absolute, 6),
    ILL,
    // 0x70-0x7F
    o("BVS", Op::Bvs, Mode::Relative, 4),
    o("ADC", Op::Adc, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("ADC", Op::Adc, Mode::ZeroPageX, 4),
    o("ROR", Op::Ror, Mode::ZeroPageX, 6),
    ILL,
    o("SEI", Op::Sei, Mode::Implied, 2),
    o("ADC", Op::Adc, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("ADC", Op::Adc, Mode::AbsoluteX, 5),
    o("ROR", Op::Ror, Mode::AbsoluteX, 7),
    ILL,
    // 0x80-0x8F
    ILL,
    o("STA", Op::Sta, Mode::IndirectX, 6),
    ILL,
    ILL,
    o("STY", Op::Sty, Mode::ZeroPage, 3),
    o("STA", Op::Sta, Mode::ZeroPage, 3),
    o("STX", Op::Stx, Mode::ZeroPage, 3),
    ILL,
    o("DEY", Op::Dey, Mode::Implied, 2),
    ILL,
    o("TXA", Op::Txa, Mode::Implied, 2),
    ILL,
    o("STY", Op::Sty, Mode::Absolute, 4),
    o("STA", Op::Sta, Mode::Absolute, 4),
    o("STX", Op::Stx, Mode::Absolute, 4),
    ILL,
    // 0x90-0x9F
    o("BCC", Op::Bcc, Mode::Relative, 4),
    o("STA", Op::Sta, Mode::IndirectY, 6),
    ILL,
    ILL,
    o("STY", Op::Sty, Mode::ZeroPageX, 4),
    o("STA", Op::Sta, Mode::ZeroPageX, 4),
    o("STX", Op::Stx, Mode::ZeroPageY, 4),
    ILL,
    o("TYA", Op::Tya, Mode::Implied, 2),
    o("STA", Op::Sta, Mode::AbsoluteY, 5),
    o("TXS", Op::Txs, Mode::Implied, 2),
    ILL,
    ILL,
    o("STA", Op::Sta, Mode::AbsoluteX, 5),
    ILL,
    ILL,
    // 0xA0-0xAF
    o("LDY", Op::Ldy, Mode::Immediate, 2),
    o("LDA", Op::Lda, Mode::IndirectX, 6),
    o("LDX", Op::Ldx, Mode::Immediate, 2),
    ILL,
    o("LDY", Op::Ldy, Mode::ZeroPage, 3),
    o("LDA", Op::Lda, Mode::ZeroPage, 3),
    o("LDX", Op::Ldx, Mode::ZeroPage, 3),
    ILL,
    o("TAY", Op::Tay, Mode::Implied, 2),
    o("LDA", Op::Lda, Mode::Immediate, 2),
    o("TAX", Op::Tax, Mode::Implied, 2),
    ILL,
    o("LDY", Op::Ldy, Mode::Absolute, 4),
    o("LDA", Op::Lda, Mode::Absolute, 4),
    o("LDX", Op::Ldx, Mode::Absolute, 4),
    ILL,
    // 0xB0-0xBF
    o("BCS", Op::Bcs, Mode::Relative, 4),
    o("LDA", Op::Lda, Mode::IndirectY, 6),
    ILL,
    ILL,
    o("LDY", Op::Ldy, Mode::ZeroPageX, 4),
    o("LDA", Op::Lda, Mode::ZeroPageX, 4),
    o("LDX", Op::Ldx, Mode::ZeroPageY, 4),
    ILL,
    o("CLV", Op::Clv, Mode::Implied, 2),
    o("LDA", Op::Lda, Mode::AbsoluteY, 5),
    o("TSX", Op::Tsx, Mode::Implied, 2),
    ILL,
    o("LDY", Op::Ldy, Mode::AbsoluteX, 5),
    o("LDA", Op::Lda, Mode::AbsoluteX, 5),
    o("LDX", Op::Ldx, Mode::AbsoluteY, 5),
    ILL,
    // 0xC0-0xCF
    o("CPY", Op::Cpy, Mode::Immediate, 2),
    o("CMP", Op::Cmp, Mode::IndirectX, 6),
    ILL,
    ILL,
    o("CPY", Op::Cpy, Mode::ZeroPage, 3),
    o("CMP", Op::Cmp, Mode::ZeroPage, 3),
    o("DEC", Op::Dec, Mode::ZeroPage, 5),
    ILL,
    o("INY", Op::Iny, Mode::Implied, 2),
    o("CMP", Op::Cmp, Mode::Immediate, 2),
    o("DEX", Op::Dex, Mode::Implied, 2),
    ILL,
    o("CPY", Op::Cpy, Mode::Absolute, 4),
    o("CMP", Op::Cmp, Mode::Absolute, 4),
    o("DEC", Op::Dec, Mode::Absolute, 6),
    ILL,
    // 0xD0-0xDF
    o("BNE", Op::Bne, Mode::Relative, 4),
    o("CMP", Op::Cmp, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("CMP", Op::Cmp, Mode::ZeroPageX, 4),
    o("DEC", Op::Dec, Mode::ZeroPageX, 6),
    ILL,
    o("CLD", Op::Cld, Mode::Implied, 2),
    o("CMP", Op::Cmp, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("CMP", Op::Cmp, Mode::AbsoluteX, 5),
    o("DEC", Op::Dec, Mode::AbsoluteX, 7),
    ILL,
    // 0xE0-0xEF
    o("CPX", Op::Cpx, Mode::Immediate, 2),
    o("SBC", Op::Sbc, Mode::IndirectX, 6),
    ILL,
    ILL,
    o("CPX", Op::Cpx, Mode::ZeroPage, 3),
    o("SBC", Op::Sbc, Mode::ZeroPage, 3),
    o("INC", Op::Inc, Mode::ZeroPage, 5),
    ILL,
    o("INX", Op::Inx, Mode::Implied, 2),
    o("SBC", Op::Sbc, Mode::Immediate, 2),
    o("NOP", Op::Nop, Mode::Implied, 2),
    ILL,
    o("CPX", Op::Cpx, Mode::Absolute, 4),
    o("SBC", Op::Sbc, Mode::Absolute, 4),
    o("INC", Op::Inc, Mode::Absolute, 6),
    ILL,
    // 0xF0-0xFF
    o("BEQ", Op::Beq, Mode::Relative, 4),
    o("SBC", Op::Sbc, Mode::IndirectY, 6),
    ILL,
    ILL,
    ILL,
    o("SBC", Op::Sbc, Mode::ZeroPageX, 4),
    o("INC", Op::Inc, Mode::ZeroPageX, 6),
    ILL,
    o("SED", Op::Sed, Mode::Implied, 2),
    o("SBC", Op::Sbc, Mode::AbsoluteY, 5),
    ILL,
    ILL,
    ILL,
    o("SBC", Op::Sbc, Mode::AbsoluteX, 5),
    o("INC", Op::Inc, Mode::AbsoluteX, 7),
    ILL,
];
