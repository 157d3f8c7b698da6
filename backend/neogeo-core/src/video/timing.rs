//! Raster timing, the per-line sprite timer, and the per-frame auto-animation timer

use crate::video::{VideoCore, VideoTickEffect, sprites};
use bincode::{Decode, Encode};

pub const HTOTAL: u16 = 0x180;
pub const HBEND: u16 = 0x01E;
pub const HBSTART: u16 = 0x15E;
pub const VTOTAL: u16 = 0x108;
pub const VBEND: u16 = 0x010;
pub const VBSTART: u16 = 0x0F0;
pub const VSSTART: u16 = 0x100;

/// Display-side collaborator that owns the raster interrupt logic. The video port forwards the
/// registers it does not interpret itself.
pub trait DisplayTiming {
    /// Control register bits 4-7
    fn set_display_position_interrupt_control(&mut self, control: u16);

    fn set_display_counter_msb(&mut self, value: u16);

    fn set_display_counter_lsb(&mut self, value: u16);

    fn acknowledge_interrupt(&mut self, value: u16);
}

/// Display timing collaborator for hosts that do not emulate raster interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplayTiming;

impl DisplayTiming for NullDisplayTiming {
    fn set_display_position_interrupt_control(&mut self, _control: u16) {}

    fn set_display_counter_msb(&mut self, _value: u16) {}

    fn set_display_counter_lsb(&mut self, _value: u16) {}

    fn acknowledge_interrupt(&mut self, _value: u16) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct RasterPosition {
    pub scanline: u16,
}

impl RasterPosition {
    /// Vertical counter as seen by the CPU. The hardware counter runs from $0F8 to $1FF, which is
    /// the line number offset by $100 and folded back into that range.
    #[must_use]
    pub fn v_counter(self) -> u16 {
        let counter = self.scanline + 0x100;
        if counter >= 0x200 { counter - VTOTAL } else { counter }
    }

    #[must_use]
    pub fn in_vblank(self) -> bool {
        !(VBEND..VBSTART).contains(&self.scanline)
    }
}

#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct AutoAnimation {
    speed: u8,
    frame_counter: u8,
    counter: u8,
    disabled: bool,
}

impl AutoAnimation {
    pub fn write_control(&mut self, value: u16) {
        self.speed = (value >> 8) as u8;
        self.disabled = value & 0x0008 != 0;

        log::trace!("Auto-animation speed {} disabled {}", self.speed, self.disabled);
    }

    /// Counts `speed + 1` frames per step.
    pub fn tick_frame(&mut self) {
        if self.frame_counter == 0 {
            self.frame_counter = self.speed;
            self.counter = self.counter.wrapping_add(1);
        } else {
            self.frame_counter -= 1;
        }
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn frame_counter(&self) -> u8 {
        self.frame_counter
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }
}

impl VideoCore {
    /// Scanline timer. Line `scanline - 1` is drawn from the active list built one line earlier,
    /// then the active list for `scanline` is built. Returns `FrameComplete` once the last visible
    /// line has been drawn.
    pub fn on_scanline(&mut self, scanline: u16) -> VideoTickEffect {
        let scanline = scanline % VTOTAL;
        self.raster.scanline = scanline;

        if scanline == 0 {
            self.refresh_fixed_line_banks();
        }

        let mut effect = VideoTickEffect::None;
        if scanline != 0 {
            let previous = scanline - 1;
            if (VBEND..VBSTART).contains(&previous) {
                self.render_scanline(previous);
            }

            if previous == VBSTART - 1 {
                effect = VideoTickEffect::FrameComplete;
            }
        }

        let found = sprites::parse_sprites(&mut self.vram, scanline);
        log::trace!("Line {scanline}: {found} sprites");

        self.next_scanline = (scanline + 1) % VTOTAL;

        effect
    }

    /// Auto-animation timer, fired at the start of vertical sync.
    pub fn on_vsync(&mut self) {
        self.auto_animation.tick_frame();
    }

    /// Fire both timers in order for one full frame, for hosts without their own scheduler.
    pub fn run_frame(&mut self) {
        for _ in 0..VTOTAL {
            let scanline = self.next_scanline;
            self.on_scanline(scanline);

            if scanline == VSSTART {
                self.on_vsync();
            }
        }
    }

    #[must_use]
    pub fn raster_position(&self) -> RasterPosition {
        self.raster
    }

    #[must_use]
    pub fn next_scanline(&self) -> u16 {
        self.next_scanline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn v_counter_range() {
        assert_eq!(RasterPosition { scanline: 0 }.v_counter(), 0x100);
        assert_eq!(RasterPosition { scanline: 0xFF }.v_counter(), 0x1FF);
        assert_eq!(RasterPosition { scanline: 0x100 }.v_counter(), 0x200 - VTOTAL);
        assert_eq!(RasterPosition { scanline: VTOTAL - 1 }.v_counter(), 0xFF);

        for scanline in 0..VTOTAL {
            let counter = RasterPosition { scanline }.v_counter();
            assert!((0xF8..0x200).contains(&counter), "{scanline}: {counter:03X}");
        }
    }

    #[test]
    fn animation_steps_every_speed_plus_one_frames() {
        let mut animation = AutoAnimation::default();
        animation.write_control(0x0300);
        assert!(!animation.disabled());

        // Counter starts expired, so the first frame steps immediately
        animation.tick_frame();
        assert_eq!(animation.counter(), 1);

        for _ in 0..3 {
            animation.tick_frame();
            assert_eq!(animation.counter(), 1);
        }
        animation.tick_frame();
        assert_eq!(animation.counter(), 2);
    }

    #[test]
    fn animation_counter_wraps() {
        let mut animation = AutoAnimation::default();
        for _ in 0..256 {
            animation.tick_frame();
        }
        assert_eq!(animation.counter(), 0);

        animation.write_control(0x0008);
        assert!(animation.disabled());
    }
}
