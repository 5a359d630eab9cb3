//! Whole-console scenarios: hand-assembled cartridges driven cycle by
//! cycle through the public API.

use famicore_core::Console;

/// Build an iNES image with one 16 KiB PRG bank (mirrored into both
/// windows) and 8 KiB of CHR-ROM. The program lands at $C000; the reset
/// vector points at it and the NMI vector at $C100.
fn nrom_image(program: &[u8], nmi_handler: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; 16 * 1024];
    prg[..program.len()].copy_from_slice(program);
    prg[0x0100..0x0100 + nmi_handler.len()].copy_from_slice(nmi_handler);
    prg[0x3FFA] = 0x00; // NMI -> $C100
    prg[0x3FFB] = 0xC1;
    prg[0x3FFC] = 0x00; // RESET -> $C000
    prg[0x3FFD] = 0xC0;

    let mut data = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1, 0, 0];
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&prg);
    data.extend_from_slice(&vec![0u8; 8 * 1024]);
    data
}

/// A 32 KiB MMC1 image, program at $8000.
fn mmc1_image(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; 32 * 1024];
    prg[..program.len()].copy_from_slice(program);
    prg[0x7FFC] = 0x00; // RESET -> $8000
    prg[0x7FFD] = 0x80;

    let mut data = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0x10, 0];
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&prg);
    data.extend_from_slice(&vec![0u8; 8 * 1024]);
    data
}

fn run_cycles(console: &mut Console, cycles: u32) {
    for _ in 0..cycles {
        console.tick();
    }
}

#[test]
fn reset_vector_and_first_instruction() {
    // LDA #$42 straight out of reset.
    let mut console = Console::new(&nrom_image(&[0xA9, 0x42], &[0x40])).unwrap();
    assert_eq!(console.cpu().pc, 0xC000);

    run_cycles(&mut console, 2);
    assert_eq!(console.cpu().a, 0x42);
    assert_eq!(console.cpu().pc, 0xC002);
    assert!(!console.cpu().status.contains(famicore_core::Status::N));
    assert!(!console.cpu().status.contains(famicore_core::Status::Z));
}

#[test]
fn adc_signed_overflow() {
    // A=0x50 plus M=0x50 overflows into the sign bit.
    let program = [
        0xA9, 0x50, // LDA #$50
        0x8D, 0x00, 0x02, // STA $0200
        0x6D, 0x00, 0x02, // ADC $0200
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();
    run_cycles(&mut console, 2 + 4 + 4);

    let cpu = console.cpu();
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status.contains(famicore_core::Status::N));
    assert!(cpu.status.contains(famicore_core::Status::V));
    assert!(!cpu.status.contains(famicore_core::Status::Z));
    assert!(!cpu.status.contains(famicore_core::Status::C));
}

#[test]
fn sbc_signed_overflow_with_borrow_clear() {
    // SEC; LDA #$50; SBC #$B0.
    let program = [0x38, 0xA9, 0x50, 0xE9, 0xB0];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();
    run_cycles(&mut console, 2 + 2 + 2);

    let cpu = console.cpu();
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status.contains(famicore_core::Status::N));
    assert!(cpu.status.contains(famicore_core::Status::V));
    assert!(!cpu.status.contains(famicore_core::Status::Z));
    assert!(!cpu.status.contains(famicore_core::Status::C));
}

#[test]
fn jmp_indirect_page_wrap() {
    // Pointer at $02FF: low byte from $02FF, high byte from $0200 (not
    // $0300).
    let program = [
        0xA9, 0x34, // LDA #$34
        0x8D, 0xFF, 0x02, // STA $02FF
        0xA9, 0x78, // LDA #$78
        0x8D, 0x00, 0x02, // STA $0200
        0xA9, 0x56, // LDA #$56
        0x8D, 0x00, 0x03, // STA $0300
        0x6C, 0xFF, 0x02, // JMP ($02FF)
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();
    run_cycles(&mut console, 2 + 4 + 2 + 4 + 2 + 4 + 5);
    assert_eq!(console.cpu().pc, 0x7834);
}

#[test]
fn nmi_delivered_once_per_frame() {
    // Enable NMI generation, then spin; the handler counts into $00.
    let program = [
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x20, // STA $2000
        0x4C, 0x05, 0xC0, // loop: JMP loop
    ];
    let handler = [
        0xE6, 0x00, // INC $00
        0x40, // RTI
    ];
    let mut console = Console::new(&nrom_image(&program, &handler)).unwrap();

    // Three frames of CPU cycles.
    run_cycles(&mut console, 3 * 29_781);
    let count = console.peek(0x0000);
    assert!(
        (2..=3).contains(&count),
        "expected one NMI per frame, got {count}"
    );
}

#[test]
fn oam_dma_timing_and_contents() {
    // Fill $0300-$03FF with 0..255, point OAMADDR at $40, then DMA page 3.
    let program = [
        0xA2, 0x00, // LDX #$00
        0x8A, // loop: TXA
        0x9D, 0x00, 0x03, // STA $0300,X
        0xE8, // INX
        0xD0, 0xF9, // BNE loop
        0xA9, 0x40, // LDA #$40
        0x8D, 0x03, 0x20, // STA $2003
        0xA9, 0x03, // LDA #$03
        0x8D, 0x14, 0x40, // STA $4014
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();

    // Run until the DMA request appears, recording the cycle.
    let mut dma_start = None;
    let mut dma_end = None;
    for _ in 0..10_000 {
        console.tick();
        let pending = console.pins().dma_pending;
        if pending && dma_start.is_none() {
            dma_start = Some(console.cpu().cycles);
        }
        if !pending && dma_start.is_some() {
            dma_end = Some(console.cpu().cycles);
            break;
        }
    }

    let start = dma_start.expect("DMA never started");
    let end = dma_end.expect("DMA never finished");
    let spent = end - start;
    assert!(
        spent == 513 || spent == 514,
        "DMA suspension took {spent} cycles"
    );

    // OAM received the page starting at OAMADDR $40, wrapping.
    for i in 0..256u16 {
        let oam_index = ((0x40 + i) & 0xFF) as u8;
        assert_eq!(
            console.ppu().oam_byte(oam_index),
            i as u8,
            "OAM byte {oam_index:02X}"
        );
    }
}

#[test]
fn palette_mirror_writes_through_2007() {
    // Write $3F10 and read the universal backdrop back at $3F00.
    let program = [
        0xA9, 0x3F, // LDA #$3F
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x10, // LDA #$10
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x2A, // LDA #$2A
        0x8D, 0x07, 0x20, // STA $2007
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();
    run_cycles(&mut console, 2 + 4 + 2 + 4 + 2 + 4 + 4);

    assert_eq!(console.ppu().peek_vram(0x3F10), 0x2A);
    assert_eq!(console.ppu().peek_vram(0x3F00), 0x2A);
}

#[test]
fn vblank_flag_window_visible_to_the_cpu() {
    // Spin on $2002 until bit 7 comes back set; the read clears it, so a
    // second poll loop observes it clear again.
    let program = [
        0x2C, 0x02, 0x20, // wait: BIT $2002
        0x10, 0xFB, // BPL wait
        0xA9, 0x01, // LDA #$01
        0x85, 0x10, // STA $10
        0x4C, 0x09, 0xC0, // loop: JMP loop
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();

    run_cycles(&mut console, 2 * 29_781);
    assert_eq!(console.peek(0x0010), 0x01, "VBL flag never observed");
}

#[test]
fn mmc1_serial_mirroring_switch() {
    // Reset the shift register, then clock five zero bits into the
    // control register: single-screen bank A.
    let program = [
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x80, // STA $8000  (reset)
        0xA9, 0x00, // LDA #$00
        0x8D, 0x00, 0x80, // STA $8000  x5 (serial bits)
        0x8D, 0x00, 0x80,
        0x8D, 0x00, 0x80,
        0x8D, 0x00, 0x80,
        0x8D, 0x00, 0x80,
        // Write $AB to nametable $2055 through $2006/$2007.
        0xA9, 0x20, // LDA #$20
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x55, // LDA #$55
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0xAB, // LDA #$AB
        0x8D, 0x07, 0x20, // STA $2007
    ];
    let mut console = Console::new(&mmc1_image(&program)).unwrap();
    run_cycles(&mut console, 200);

    // Single-screen: every logical nametable shows the same byte.
    assert_eq!(console.ppu().peek_vram(0x2055), 0xAB);
    assert_eq!(console.ppu().peek_vram(0x2455), 0xAB);
    assert_eq!(console.ppu().peek_vram(0x2855), 0xAB);
    assert_eq!(console.ppu().peek_vram(0x2C55), 0xAB);
}

#[test]
fn controller_strobe_and_read_from_program() {
    // Strobe the pad, read 8 bits, accumulate them into $20 (LSB first).
    let program = [
        0xA9, 0x01, // LDA #$01
        0x8D, 0x16, 0x40, // STA $4016
        0xA9, 0x00, // LDA #$00
        0x8D, 0x16, 0x40, // STA $4016
        0xA2, 0x08, // LDX #$08
        0xAD, 0x16, 0x40, // loop: LDA $4016
        0x4A, // LSR A      (bit -> carry)
        0x66, 0x20, // ROR $20
        0xCA, // DEX
        0xD0, 0xF7, // BNE loop
    ];
    let mut console = Console::new(&nrom_image(&program, &[0x40])).unwrap();
    console.set_controller1(0b1001_0110);

    run_cycles(&mut console, 400);
    assert_eq!(console.peek(0x0020), 0b1001_0110);
}
