//! Fixed layer: 40x32 grid of 8x8 characters drawn over the sprites
//!
//! Character map entries live at `$7000 + column * 32 + row`: bits 0-11 are the character code
//! and bits 12-15 select one of the first 16 palettes. Cartridges with more than 4096 characters
//! extend the code with a 2-bit bank read from the `$7500-$75FF` control area.

use crate::graphics::{FIXED_CHAR_LEN, FixedGraphics};
use crate::video::Vram;
use crate::video::palette::PaletteRam;
use bincode::{Decode, Encode};
use neogeo_common::frontend::Color;
use neogeo_config::FixedLayerBanking;

const CHARACTER_MAP_BASE: usize = 0x7000;
const BANK_CONTROL_BASE: usize = 0x7500;
const BANK_MARKER_BASE: usize = 0x7580;

pub const FIXED_COLUMNS: usize = 40;
const FIXED_ROWS: usize = 32;

// Byte offsets within a character row, left to right; each byte holds two pixels, low nibble first
const PIXEL_PAIR_OFFSETS: [usize; 4] = [0x10, 0x18, 0x00, 0x08];

/// Per-row banks for the line table scheme, expanded once per frame from the marker words.
#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct FixedLineBanks([u8; FIXED_ROWS]);

impl FixedLineBanks {
    /// A marker pair is `$0200` at `$7500+k` with `$FFxx` at `$7580+k`; its bank (low 2 bits)
    /// applies to the marker's row and every row after it until the next marker. Markers are read every
    /// other word.
    pub fn scan(vram: &Vram) -> Self {
        let mut banks = [0; FIXED_ROWS];
        let mut bank = 0;
        let mut row = 0;
        let mut k = 0;

        while row < FIXED_ROWS {
            let marker = vram[BANK_MARKER_BASE + k];
            if vram[BANK_CONTROL_BASE + k] == 0x0200 && marker & 0xFF00 == 0xFF00 {
                bank = (marker & 0x03) as u8;
                banks[row] = bank;
                row += 1;
                if row == FIXED_ROWS {
                    break;
                }
            }

            banks[row] = bank;
            row += 1;
            k += 2;
        }

        Self(banks)
    }

    pub fn bank(&self, row: usize) -> u8 {
        self.0[row % FIXED_ROWS]
    }
}

/// Decode one 8-pixel row of a character.
pub fn decode_fixed_row(graphics: &FixedGraphics, code: u16, fine_y: u16) -> [u8; 8] {
    let base = (usize::from(code) * FIXED_CHAR_LEN) | usize::from(fine_y & 0x07);

    let mut pixels = [0; 8];
    for (pair, &offset) in pixels.chunks_exact_mut(2).zip(&PIXEL_PAIR_OFFSETS) {
        let byte = graphics.byte(base + offset);
        pair[0] = byte & 0x0F;
        pair[1] = byte >> 4;
    }
    pixels
}

pub struct FixedRenderArgs<'a> {
    pub vram: &'a Vram,
    pub graphics: &'a FixedGraphics,
    pub palette: &'a PaletteRam,
    /// `None` for the BIOS characters, which are never banked
    pub banking: Option<FixedLayerBanking>,
    pub line_banks: &'a FixedLineBanks,
}

fn character_bank(args: &FixedRenderArgs<'_>, row: usize, column: usize) -> u16 {
    let bank = match args.banking {
        None | Some(FixedLayerBanking::None) => return 0,
        Some(FixedLayerBanking::LineTable) => args.line_banks.bank(row.wrapping_sub(2)),
        Some(FixedLayerBanking::ColumnGroups) => {
            let control = args.vram
                [BANK_CONTROL_BASE + (row.wrapping_sub(1) % FIXED_ROWS) + 32 * (column / 6)];
            let shift = (5 - column % 6) * 2;
            ((control >> shift) & 0x03) as u8
        }
    };

    u16::from(bank ^ 0x03)
}

pub fn render_fixed_line(args: &FixedRenderArgs<'_>, scanline: u16, line: &mut [Color]) {
    let row = usize::from(scanline >> 3);

    for column in 0..FIXED_COLUMNS {
        let entry = args.vram[CHARACTER_MAP_BASE + column * FIXED_ROWS + (row % FIXED_ROWS)];
        let code = (entry & 0x0FFF) + 0x1000 * character_bank(args, row, column);
        let pens = args.palette.pens_for(entry >> 12);

        let pixels = decode_fixed_row(args.graphics, code, scanline);
        for (out, pixel) in line[column * 8..column * 8 + 8].iter_mut().zip(pixels) {
            if pixel != 0 {
                *out = pens[usize::from(pixel)];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neogeo_common::boxedarray::BoxedWordArray;
    use test_log::test;

    #[test]
    fn nibble_order() {
        let mut rom = vec![0; FIXED_CHAR_LEN * 2];
        // Character 1, row 3
        let base = FIXED_CHAR_LEN + 3;
        rom[base + 0x10] = 0x21;
        rom[base + 0x18] = 0x43;
        rom[base] = 0x65;
        rom[base + 0x08] = 0x87;

        let graphics = FixedGraphics::new(&rom, "BIOS").unwrap();
        assert_eq!(decode_fixed_row(&graphics, 1, 3), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(decode_fixed_row(&graphics, 1, 2), [0; 8]);
        // Code wraps within the ROM
        assert_eq!(decode_fixed_row(&graphics, 3, 3), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn line_table_banks() {
        let mut vram: Vram = BoxedWordArray::new();

        // Marker at k=4 (row 2) selecting bank 2, marker at k=10 selecting bank 1
        vram[BANK_CONTROL_BASE + 4] = 0x0200;
        vram[BANK_MARKER_BASE + 4] = 0xFF02;
        vram[BANK_CONTROL_BASE + 10] = 0x0200;
        vram[BANK_MARKER_BASE + 10] = 0xFF01;
        // Not a marker: wrong high byte
        vram[BANK_CONTROL_BASE + 12] = 0x0200;
        vram[BANK_MARKER_BASE + 12] = 0x0003;

        let banks = FixedLineBanks::scan(&vram);
        assert_eq!(&banks.0[..2], &[0, 0]);
        // Each marker fills two rows
        assert_eq!(&banks.0[2..4], &[2, 2]);
        assert_eq!(banks.0[4], 2);
        assert_eq!(&banks.0[6..8], &[1, 1]);
        assert!(banks.0[8..].iter().all(|&bank| bank == 1));
    }

    #[test]
    fn markers_on_every_word_stop_at_last_row() {
        let mut vram: Vram = BoxedWordArray::new();
        for k in 0..64 {
            vram[BANK_CONTROL_BASE + k] = 0x0200;
            vram[BANK_MARKER_BASE + k] = 0xFF03;
        }

        let banks = FixedLineBanks::scan(&vram);
        assert!(banks.0.iter().all(|&bank| bank == 3));
    }
}
