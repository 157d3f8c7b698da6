//! Palette color decoding
//!
//! Color word layout: `D R0 G0 B0 R4 R3 R2 R1 G4 G3 G2 G1 B4 B3 B2 B1`. Each channel is a 5-bit
//! value fed through a 220/470/1000/2200/3900 ohm resistor ladder. Bit 15 ("dark bit") adds an
//! 8200 ohm pulldown on every channel, and the shadow/dim output adds a 150 ohm pulldown.

use crate::resnet;
use neogeo_common::frontend::Color;
use neogeo_common::num::GetBit;
use std::sync::LazyLock;

const LADDER: [f64; 5] = [220.0, 470.0, 1000.0, 2200.0, 3900.0];

const DARK_BIT_PULLDOWN: f64 = 8200.0;
const DIM_PULLDOWN: f64 = 150.0;

struct PenWeights {
    normal: [f64; 5],
    normal_bit15: [f64; 5],
    dark: [f64; 5],
    dark_bit15: [f64; 5],
}

impl PenWeights {
    fn compute() -> Self {
        // All four networks share the scale of the unloaded ladder so that their relative
        // brightness is preserved
        let (normal, scale) = resnet::compute_resistor_weights(255.0, LADDER, None, None);
        let weights = |pulldown: f64| {
            resnet::compute_resistor_weights(255.0, LADDER, Some(pulldown), Some(scale)).0
        };

        Self {
            normal,
            normal_bit15: weights(DARK_BIT_PULLDOWN),
            dark: weights(DIM_PULLDOWN),
            dark_bit15: weights(1.0 / (1.0 / DARK_BIT_PULLDOWN + 1.0 / DIM_PULLDOWN)),
        }
    }

    fn select(&self, bit15: bool, screen_dark: bool) -> &[f64; 5] {
        match (screen_dark, bit15) {
            (false, false) => &self.normal,
            (false, true) => &self.normal_bit15,
            (true, false) => &self.dark,
            (true, true) => &self.dark_bit15,
        }
    }
}

static PEN_WEIGHTS: LazyLock<PenWeights> = LazyLock::new(PenWeights::compute);

/// Convert a raw palette word to RGB, most significant channel bit first and the shared low bit
/// last.
#[must_use]
pub fn get_pen(color: u16, screen_dark: bool) -> Color {
    let weights = PEN_WEIGHTS.select(color.bit(15), screen_dark);

    let channel = |high_bit: u8, low_bit: u8| {
        resnet::combine_weights(weights, [
            color.bit(high_bit),
            color.bit(high_bit - 1),
            color.bit(high_bit - 2),
            color.bit(high_bit - 3),
            color.bit(low_bit),
        ])
    };

    Color::rgb(channel(11, 14), channel(7, 13), channel(3, 12))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn extremes() {
        assert_eq!(get_pen(0x0000, false), Color::BLACK);
        assert_eq!(get_pen(0x7FFF, false), Color::rgb(255, 255, 255));
        assert_eq!(get_pen(0x8000, true), Color::BLACK);
    }

    #[test]
    fn channels_are_independent() {
        let red = get_pen(0x4F00, false);
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));
        let green = get_pen(0x20F0, false);
        assert_eq!((green.r, green.g, green.b), (0, 255, 0));
        let blue = get_pen(0x100F, false);
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));
    }

    #[test]
    fn pulldowns_only_dim() {
        for color in (0..0x8000_u16).step_by(7) {
            let normal = get_pen(color, false);
            let bit15 = get_pen(color | 0x8000, false);
            let dark = get_pen(color, true);
            let dark_bit15 = get_pen(color | 0x8000, true);
            for dimmed in [bit15, dark, dark_bit15] {
                assert!(
                    dimmed.r <= normal.r && dimmed.g <= normal.g && dimmed.b <= normal.b,
                    "{color:04X}"
                );
            }

            assert!(dark_bit15.r <= dark.r && dark_bit15.g <= dark.g && dark_bit15.b <= dark.b);
        }
    }

    #[test]
    fn weights_are_shared_across_channels() {
        for level in 0..32_u16 {
            let color = ((level & 1) << 14) | ((level & 1) << 13) | ((level & 1) << 12)
                | ((level >> 1) << 8)
                | ((level >> 1) << 4)
                | (level >> 1);
            let pen = get_pen(color, false);
            assert!(pen.r == pen.g && pen.g == pen.b, "level {level}");
        }
    }
}
