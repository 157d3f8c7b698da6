//! Bit-field helpers for hardware register words

use std::ops::RangeInclusive;

pub trait GetBit: Copy {
    #[must_use]
    fn bit(self, i: u8) -> bool;

    /// Extract an inclusive bit range, shifted down to bit 0.
    #[must_use]
    fn bits(self, range: RangeInclusive<u8>) -> Self;
}

macro_rules! impl_get_bit {
    ($($t:ty),* $(,)?) => {
        $(
            impl GetBit for $t {
                #[inline]
                fn bit(self, i: u8) -> bool {
                    debug_assert!(u32::from(i) < <$t>::BITS);
                    (self >> i) & 1 != 0
                }

                #[inline]
                fn bits(self, range: RangeInclusive<u8>) -> Self {
                    let (low, high) = (*range.start(), *range.end());
                    debug_assert!(low <= high && u32::from(high) < <$t>::BITS);

                    let width = u32::from(high - low) + 1;
                    let mask = if width == <$t>::BITS { !0 } else { (1 << width) - 1 };
                    (self >> low) & mask
                }
            }
        )*
    };
}

impl_get_bit!(u8, u16, u32, usize);

/// Byte access on 16-bit bus words
pub trait U16Ext {
    fn lsb(self) -> u8;

    fn msb(self) -> u8;

    fn set_lsb(&mut self, value: u8);

    fn set_msb(&mut self, value: u8);
}

impl U16Ext for u16 {
    #[inline(always)]
    fn lsb(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    fn msb(self) -> u8 {
        (self >> 8) as u8
    }

    #[inline(always)]
    fn set_lsb(&mut self, value: u8) {
        *self = (*self & 0xFF00) | u16::from(value);
    }

    #[inline(always)]
    fn set_msb(&mut self, value: u8) {
        *self = (*self & 0x00FF) | (u16::from(value) << 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn bit_ranges() {
        assert!(0x8000_u16.bit(15));
        assert!(!0x8000_u16.bit(14));

        assert_eq!(0x0F00_u16.bits(8..=11), 0x0F);
        assert_eq!(0xABCD_u16.bits(0..=15), 0xABCD);
        assert_eq!(0b1010_0000_u8.bits(5..=7), 0b101);
    }

    #[test]
    fn byte_lanes() {
        let mut word = 0x1234_u16;
        assert_eq!(word.msb(), 0x12);
        assert_eq!(word.lsb(), 0x34);

        word.set_msb(0xAB);
        assert_eq!(word, 0xAB34);
        word.set_lsb(0xCD);
        assert_eq!(word, 0xABCD);
    }
}
