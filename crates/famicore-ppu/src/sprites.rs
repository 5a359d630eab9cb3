//! Sprite evaluation and the eight per-scanline sprite units.
//!
//! Evaluation walks primary OAM during dots 65-256 with the hardware's
//! odd/even protocol: odd dots read a sprite's Y byte, even dots test it
//! against the scanline and copy in-range sprites into secondary OAM. The
//! ninth in-range sighting sets the overflow flag and stops the walk.
//! Whichever sprite was evaluated first from OAM index 0 is the sprite 0
//! for hit detection on the following scanline.
//!
//! Dots 257-320 turn secondary OAM into eight loaded units: an attribute
//! latch, an X counter and two bit-reversed pattern shift registers each.

use crate::oam::{Oam, SecondaryOam, MAX_SPRITES_PER_LINE};
use crate::registers::Status;

/// Walks primary OAM for one scanline.
#[derive(Debug, Default)]
pub struct SpriteEvaluator {
    sprite_index: u8,
    read_buffer: u8,
    stop: bool,
    sprite_zero_found: bool,
}

impl SpriteEvaluator {
    /// Fresh evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the walk at dot 65 of each visible scanline.
    pub fn begin_scanline(&mut self) {
        self.sprite_index = 0;
        self.read_buffer = 0;
        self.stop = false;
        self.sprite_zero_found = false;
    }

    /// One evaluation dot (65-256).
    pub fn step(
        &mut self,
        dot: u16,
        oam: &Oam,
        scanline: u16,
        sprite_height: u16,
        secondary: &mut SecondaryOam,
        status: &mut Status,
    ) {
        if dot % 2 == 1 {
            // Odd dot: read the candidate's Y byte.
            self.read_buffer = oam.byte(self.sprite_index.wrapping_mul(4));
            return;
        }
        if self.stop {
            return;
        }

        let y = u16::from(self.read_buffer);
        let in_range = scanline >= y && scanline < y + sprite_height;
        if in_range {
            if u16::from(secondary.count()) < MAX_SPRITES_PER_LINE as u16 {
                secondary.push(oam, self.sprite_index);
                if self.sprite_index == 0 {
                    self.sprite_zero_found = true;
                }
            } else {
                // Ninth sighting: overflow, and the walk is over.
                status.insert(Status::SPRITE_OVERFLOW);
                self.stop = true;
            }
        }

        self.sprite_index += 1;
        if self.sprite_index == 64 {
            self.stop = true;
        }
    }

    /// OAM index 0 landed in secondary OAM this scanline.
    #[must_use]
    pub fn sprite_zero_found(&self) -> bool {
        self.sprite_zero_found
    }
}

/// Pattern table address of one sprite row.
///
/// 8x16 sprites ignore the $2000 table select: tile bit 0 picks the table
/// and the even tile pair supplies rows 0-7 and 8-15. Vertical flip
/// inverts the row across the full sprite height.
#[must_use]
pub fn sprite_pattern_addr(
    tile: u8,
    row: u16,
    sprite_height: u16,
    table_8x8: u16,
    flip_vertical: bool,
) -> u16 {
    let row = row.min(sprite_height - 1);
    let mut row = if flip_vertical {
        sprite_height - 1 - row
    } else {
        row
    };

    if sprite_height == 16 {
        let table = u16::from(tile & 0x01) * 0x1000;
        if row >= 8 {
            row += 8;
        }
        table + u16::from(tile & 0xFE) * 16 + row
    } else {
        table_8x8 + u16::from(tile) * 16 + row
    }
}

/// One of the eight sprite output units.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpriteUnit {
    /// Low bitplane, bit-reversed so bit 0 emits first.
    pub pattern_lo: u8,
    /// High bitplane, bit-reversed.
    pub pattern_hi: u8,
    /// Attribute byte.
    pub attributes: u8,
    /// Dots until the sprite starts emitting.
    pub x_counter: u8,
    /// Unit was loaded from secondary OAM this scanline.
    pub active: bool,
    /// This unit carries the sprite 0 identified at evaluation time.
    pub sprite_zero: bool,
}

impl SpriteUnit {
    /// Palette select (sprite palettes 4-7).
    #[inline]
    #[must_use]
    pub fn palette(self) -> u8 {
        self.attributes & 0x03
    }

    /// Attribute bit 5: sprite renders behind the background.
    #[inline]
    #[must_use]
    pub fn behind_background(self) -> bool {
        self.attributes & 0x20 != 0
    }
}

/// A sprite pixel chosen for the current dot.
#[derive(Debug, Clone, Copy)]
pub struct SpritePixel {
    /// 2-bit pattern value (non-zero).
    pub pixel: u8,
    /// Palette select.
    pub palette: u8,
    /// Sprite sits behind an opaque background.
    pub behind_background: bool,
    /// The pixel came from sprite 0.
    pub sprite_zero: bool,
}

/// The eight output units of one scanline.
#[derive(Debug, Default)]
pub struct SpriteUnits {
    units: [SpriteUnit; MAX_SPRITES_PER_LINE],
}

impl SpriteUnits {
    /// All units idle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deactivate everything at the start of the fetch window.
    pub fn clear(&mut self) {
        self.units = [SpriteUnit::default(); MAX_SPRITES_PER_LINE];
    }

    /// Mutable access for the fetch sequence.
    #[inline]
    pub fn unit_mut(&mut self, slot: usize) -> &mut SpriteUnit {
        &mut self.units[slot]
    }

    /// Advance every active unit one dot and pick the frontmost opaque
    /// sprite pixel. Units in their X countdown tick down; units at zero
    /// emit and shift.
    pub fn tick_pixel(&mut self) -> Option<SpritePixel> {
        let mut chosen: Option<SpritePixel> = None;

        for unit in &mut self.units {
            if !unit.active {
                continue;
            }
            if unit.x_counter > 0 {
                unit.x_counter -= 1;
                continue;
            }

            let pixel = ((unit.pattern_hi & 0x01) << 1) | (unit.pattern_lo & 0x01);
            unit.pattern_lo >>= 1;
            unit.pattern_hi >>= 1;

            // Lowest slot wins among overlapping sprites.
            if pixel != 0 && chosen.is_none() {
                chosen = Some(SpritePixel {
                    pixel,
                    palette: unit.palette(),
                    behind_background: unit.behind_background(),
                    sprite_zero: unit.sprite_zero,
                });
            }
        }
        chosen
    }
}
