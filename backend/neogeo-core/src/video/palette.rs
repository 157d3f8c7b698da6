//! Palette RAM (two 4096-color banks) and the pen cache for the active bank

use crate::bus::ByteLanes;
use crate::video::colors;
use bincode::{Decode, Encode};
use neogeo_common::boxedarray::BoxedWordArray;
use neogeo_common::frontend::Color;

pub const PALETTE_LEN: usize = 4096;

const PALETTE_INDEX_MASK: u16 = (PALETTE_LEN - 1) as u16;

#[derive(Debug, Clone, Encode, Decode)]
pub struct PaletteRam {
    banks: [BoxedWordArray<PALETTE_LEN>; 2],
    active_bank: usize,
    screen_dark: bool,
    pens: Box<[Color]>,
}

impl PaletteRam {
    pub fn new() -> Self {
        let mut palette = Self {
            banks: [BoxedWordArray::new(), BoxedWordArray::new()],
            active_bank: 0,
            screen_dark: false,
            pens: vec![Color::default(); PALETTE_LEN].into_boxed_slice(),
        };
        palette.regenerate_pens();
        palette
    }

    fn regenerate_pens(&mut self) {
        let bank = &self.banks[self.active_bank];
        for (pen, &color) in self.pens.iter_mut().zip(bank.iter()) {
            *pen = colors::get_pen(color, self.screen_dark);
        }
    }

    /// # Panics
    ///
    /// Panics if `bank` is not 0 or 1.
    pub fn set_bank(&mut self, bank: u8) {
        assert!(bank < 2, "invalid palette bank {bank}");

        let bank = usize::from(bank);
        if bank != self.active_bank {
            log::debug!("Palette bank changed to {bank}");
            self.active_bank = bank;
            self.regenerate_pens();
        }
    }

    pub fn set_screen_dark(&mut self, screen_dark: bool) {
        if screen_dark != self.screen_dark {
            log::debug!("Screen dark set to {screen_dark}");
            self.screen_dark = screen_dark;
            self.regenerate_pens();
        }
    }

    pub fn read(&self, index: u16) -> u16 {
        self.banks[self.active_bank][usize::from(index & PALETTE_INDEX_MASK)]
    }

    pub fn write(&mut self, index: u16, value: u16) {
        self.write_lanes(index, value, ByteLanes::Word);
    }

    pub fn write_lanes(&mut self, index: u16, value: u16, lanes: ByteLanes) {
        let index = usize::from(index & PALETTE_INDEX_MASK);
        let color = &mut self.banks[self.active_bank][index];
        *color = lanes.merge(*color, value);
        self.pens[index] = colors::get_pen(*color, self.screen_dark);
    }

    /// Bulk-load one bank, e.g. from a memory dump. Only the pens for the active bank are rebuilt.
    pub fn load_bank(&mut self, bank: u8, words: &[u16]) {
        assert!(bank < 2, "invalid palette bank {bank}");

        let bank = usize::from(bank);
        for (dst, &src) in self.banks[bank].iter_mut().zip(words) {
            *dst = src;
        }

        if bank == self.active_bank {
            self.regenerate_pens();
        }
    }

    pub fn active_bank(&self) -> u8 {
        self.active_bank as u8
    }

    pub fn screen_dark(&self) -> bool {
        self.screen_dark
    }

    pub fn raw_bank(&self, bank: u8) -> &[u16; PALETTE_LEN] {
        &self.banks[usize::from(bank & 1)]
    }

    #[inline]
    pub fn pen(&self, index: u16) -> Color {
        self.pens[usize::from(index & PALETTE_INDEX_MASK)]
    }

    /// 16 consecutive pens starting at `palette * 16`
    #[inline]
    pub fn pens_for(&self, palette: u16) -> &[Color] {
        let base = usize::from(palette & 0xFF) << 4;
        &self.pens[base..base + 16]
    }

    pub fn pens(&self) -> &[Color] {
        &self.pens
    }
}
