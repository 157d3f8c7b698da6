//! Sprite shrink tables

use crate::api::{NeoGeoVideoError, NeoGeoVideoResult};
use crate::graphics::impl_fake_encode_decode;

/// Horizontal shrink patterns, one per zoom factor. A 1 emits the corresponding source column and
/// a 0 drops it, so zoom factor N draws N+1 pixels out of 16.
pub const ZOOM_X_TABLES: [[u8; 16]; 16] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0],
    [1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1],
    [1, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1],
    [1, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

pub const ZOOM_Y_TABLE_LEN: usize = 0x10000;

/// Vertical shrink lookup: 256 entries per zoom factor, indexed by output line within the sprite.
/// Each entry packs the tile index within the sprite column (bits 4-7) and the row within that
/// tile (bits 0-3).
#[derive(Debug, Clone, Default)]
pub struct ZoomYTable(Box<[u8]>);

impl_fake_encode_decode!(ZoomYTable);

impl ZoomYTable {
    /// Load the table from the first 64KB of the zoom ROM region.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is shorter than 64KB.
    pub fn from_rom(rom: &[u8]) -> NeoGeoVideoResult<Self> {
        if rom.len() < ZOOM_Y_TABLE_LEN {
            return Err(NeoGeoVideoError::ZoomRomTooSmall {
                len: rom.len(),
                expected: ZOOM_Y_TABLE_LEN,
            });
        }

        Ok(Self(rom[..ZOOM_Y_TABLE_LEN].into()))
    }

    /// Build a table that drops source lines evenly. Zoom factor N shows N+1 of the 256 source
    /// lines; output lines past that repeat the last one shown.
    #[must_use]
    pub fn generate() -> Self {
        let mut table = vec![0; ZOOM_Y_TABLE_LEN];
        for (zoom, lines) in table.chunks_exact_mut(256).enumerate() {
            let height = zoom + 1;
            for (line, entry) in lines.iter_mut().enumerate() {
                let shown = line.min(zoom);
                *entry = (shown * 256 / height) as u8;
            }
        }

        Self(table.into_boxed_slice())
    }

    #[inline]
    #[must_use]
    pub fn entry(&self, zoom_y: u16, line: u16) -> u8 {
        let index = (usize::from(zoom_y & 0xFF) << 8) | usize::from(line & 0xFF);
        self.0.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn horizontal_tables_widen_with_zoom() {
        let counts: Vec<_> = ZOOM_X_TABLES
            .iter()
            .map(|table| table.iter().filter(|&&emit| emit != 0).count())
            .collect();

        assert_eq!(counts[0], 1);
        assert_eq!(counts[15], 16);
        assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
        for (zoom, &count) in counts.iter().enumerate() {
            assert_eq!(count, zoom + 1);
        }

        // Each pattern is a superset of the one below it
        for pair in ZOOM_X_TABLES.windows(2) {
            assert!(pair[0].iter().zip(&pair[1]).all(|(&lower, &upper)| lower <= upper));
        }
    }

    #[test]
    fn generated_vertical_table() {
        let table = ZoomYTable::generate();

        for line in 0..256 {
            assert_eq!(table.entry(0xFF, line), line as u8);
        }

        // Half height: every other source line, then the last shown line repeats
        assert_eq!(table.entry(0x7F, 0), 0x00);
        assert_eq!(table.entry(0x7F, 1), 0x02);
        assert_eq!(table.entry(0x7F, 0x7F), 0xFE);
        assert_eq!(table.entry(0x7F, 0x80), 0xFE);

        for zoom in 0..256 {
            assert!((0..255).all(|line| table.entry(zoom, line) <= table.entry(zoom, line + 1)));
        }
    }

    #[test]
    fn short_zoom_rom_rejected() {
        assert!(matches!(
            ZoomYTable::from_rom(&[0; 0x8000]),
            Err(NeoGeoVideoError::ZoomRomTooSmall { len: 0x8000, .. })
        ));
        assert!(ZoomYTable::from_rom(&[0; 0x20000]).is_ok());
    }
}
