//! Frame position: 262 scanlines of 341 dots, with the odd-frame skip.
//!
//! ```text
//! Scanline   Description
//! --------   -----------
//! 0-239      visible
//! 240        post-render (idle; the frame is presented at dot 0)
//! 241-260    vertical blank (VBL flag set at 241/1)
//! 261        pre-render (flags cleared at dot 1; dot 339 skipped on odd
//!            frames when background rendering is on)
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dots per scanline.
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanlines per frame.
pub const SCANLINES_PER_FRAME: u16 = 262;
/// First VBL scanline; the flag sets at dot 1.
pub const VBLANK_SCANLINE: u16 = 241;
/// Pre-render scanline.
pub const PRE_RENDER_SCANLINE: u16 = 261;

/// Scanline/dot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    scanline: u16,
    dot: u16,
    odd_frame: bool,
    frame: u64,
}

impl Timing {
    /// Power-on position: even frame, scanline 0, dot 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scanline: 0,
            dot: 0,
            odd_frame: false,
            frame: 0,
        }
    }

    /// Current scanline (0-261).
    #[inline]
    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot (0-340).
    #[inline]
    #[must_use]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// On an odd frame.
    #[inline]
    #[must_use]
    pub fn odd_frame(&self) -> bool {
        self.odd_frame
    }

    /// Visible scanline (0-239).
    #[inline]
    #[must_use]
    pub fn is_visible_scanline(&self) -> bool {
        self.scanline < 240
    }

    /// Pre-render scanline.
    #[inline]
    #[must_use]
    pub fn is_prerender_scanline(&self) -> bool {
        self.scanline == PRE_RENDER_SCANLINE
    }

    /// Visible or pre-render scanline: the fetch pipeline runs here.
    #[inline]
    #[must_use]
    pub fn is_rendering_scanline(&self) -> bool {
        self.is_visible_scanline() || self.is_prerender_scanline()
    }

    /// Advance one dot. Returns `true` when the new position is the frame
    /// presentation point (scanline 240, dot 0).
    pub fn advance(&mut self) -> bool {
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.odd_frame = !self.odd_frame;
                self.frame += 1;
            }
        }
        self.scanline == 240 && self.dot == 0
    }

    /// The odd-frame skip: jump over dot 339 of the pre-render scanline.
    /// Callable only when sitting on it.
    pub fn skip_prerender_dot(&mut self) {
        debug_assert_eq!(self.scanline, PRE_RENDER_SCANLINE);
        debug_assert_eq!(self.dot, 339);
        self.dot = 340;
    }

    /// Power-on position.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, scanline: u16, dot: u16, odd_frame: bool) {
        self.scanline = scanline;
        self.dot = dot;
        self.odd_frame = odd_frame;
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_wraps_scanlines_and_frames() {
        let mut timing = Timing::new();
        timing.set_position(0, 340, false);
        timing.advance();
        assert_eq!((timing.scanline(), timing.dot()), (1, 0));

        timing.set_position(261, 340, false);
        timing.advance();
        assert_eq!((timing.scanline(), timing.dot()), (0, 0));
        assert!(timing.odd_frame());
        assert_eq!(timing.frame(), 1);
    }

    #[test]
    fn frame_presented_at_240_0() {
        let mut timing = Timing::new();
        timing.set_position(239, 340, false);
        assert!(timing.advance());
        assert_eq!((timing.scanline(), timing.dot()), (240, 0));
        assert!(!timing.advance());
    }

    #[test]
    fn scanline_classification() {
        let mut timing = Timing::new();
        timing.set_position(100, 0, false);
        assert!(timing.is_visible_scanline());
        assert!(timing.is_rendering_scanline());

        timing.set_position(240, 0, false);
        assert!(!timing.is_rendering_scanline());

        timing.set_position(261, 0, false);
        assert!(timing.is_prerender_scanline());
        assert!(timing.is_rendering_scanline());
    }

    #[test]
    fn skip_jumps_dot_339() {
        let mut timing = Timing::new();
        timing.set_position(261, 339, true);
        timing.skip_prerender_dot();
        assert_eq!(timing.dot(), 340);
        timing.advance();
        assert_eq!((timing.scanline(), timing.dot()), (0, 0));
    }

    #[test]
    fn full_frame_dot_count() {
        let mut timing = Timing::new();
        let mut dots = 0u32;
        loop {
            timing.advance();
            dots += 1;
            if timing.scanline() == 0 && timing.dot() == 0 {
                break;
            }
        }
        assert_eq!(dots, u32::from(DOTS_PER_SCANLINE) * u32::from(SCANLINES_PER_FRAME));
    }
}
