//! 68000 data bus byte lanes

use neogeo_common::num::U16Ext;

/// Which halves of the 16-bit data bus an access drives (the 68000 UDS/LDS strobes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteLanes {
    Word,
    /// Upper byte only (even address byte access)
    Upper,
    /// Lower byte only (odd address byte access)
    Lower,
}

impl ByteLanes {
    /// Merge a bus write into an existing word, keeping the byte that was not driven.
    #[must_use]
    pub fn merge(self, old: u16, new: u16) -> u16 {
        match self {
            Self::Word => new,
            Self::Upper => (old & 0x00FF) | (new & 0xFF00),
            Self::Lower => (old & 0xFF00) | (new & 0x00FF),
        }
    }

    /// Repeat the upper byte into the lower byte, which is what chips without byte strobes see
    /// on an upper-byte-only write.
    #[must_use]
    pub fn mirror_upper(value: u16) -> u16 {
        let mut mirrored = value;
        mirrored.set_lsb(value.msb());
        mirrored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn merge_keeps_undriven_byte() {
        assert_eq!(ByteLanes::Word.merge(0x1234, 0xABCD), 0xABCD);
        assert_eq!(ByteLanes::Upper.merge(0x1234, 0xABCD), 0xAB34);
        assert_eq!(ByteLanes::Lower.merge(0x1234, 0xABCD), 0x12CD);
    }

    #[test]
    fn mirror_upper_byte() {
        assert_eq!(ByteLanes::mirror_upper(0x5A00), 0x5A5A);
        assert_eq!(ByteLanes::mirror_upper(0x5AFF), 0x5A5A);
    }
}
