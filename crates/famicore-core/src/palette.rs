//! The fixed 64-entry colour palette.
//!
//! "NES classic (FBX)" measurements from firebrandx.com, the set the
//! original hardware captures were matched against. Entries are 24-bit
//! RGB; [`argb`] adds the opaque alpha byte the host framebuffer expects.

/// 6-bit colour index to 24-bit RGB (`0xRRGGBB`).
pub const NES_PALETTE: [u32; 64] = [
    0x61_61_61, 0x00_00_88, 0x1F_0D_99, 0x37_13_79, 0x56_12_60, 0x5D_00_10, 0x52_0E_00, 0x3A_23_08,
    0x21_35_0C, 0x0D_41_0E, 0x17_44_17, 0x00_3A_1F, 0x00_2F_57, 0x00_00_00, 0x00_00_00, 0x00_00_00,
    0xAA_AA_AA, 0x0D_4D_C4, 0x4B_24_DE, 0x69_12_CF, 0x90_14_AD, 0x9D_1C_48, 0x92_34_04, 0x73_50_05,
    0x5D_69_13, 0x16_7A_11, 0x13_80_08, 0x12_76_49, 0x1C_66_91, 0x00_00_00, 0x00_00_00, 0x00_00_00,
    0xFC_FC_FC, 0x63_9A_FC, 0x8A_7E_FC, 0xB0_6A_FC, 0xDD_6F_F2, 0xE7_71_AB, 0xE3_86_58, 0xCC_9E_22,
    0xA8_B1_00, 0x72_C1_00, 0x5A_CD_4E, 0x34_C2_8E, 0x4F_BE_CE, 0x42_42_42, 0x00_00_00, 0x00_00_00,
    0xFC_FC_FC, 0xBE_D4_FC, 0xCA_CA_FC, 0xD9_C4_FC, 0xEC_C1_FC, 0xFA_C3_E7, 0xF7_CE_C3, 0xE2_CD_A7,
    0xDA_DB_9C, 0xC8_E3_9E, 0xBF_E5_B8, 0xB2_EB_C8, 0xB7_E5_EB, 0xAC_AC_AC, 0x00_00_00, 0x00_00_00,
];

/// Colour index to `0xAARRGGBB` with alpha forced opaque.
#[inline]
#[must_use]
pub fn argb(index: u8) -> u32 {
    0xFF00_0000 | NES_PALETTE[usize::from(index & 0x3F)]
}
