//! Debug views of palette RAM, graphics ROMs and register state

use crate::video::fixed::{self, FixedLineBanks};
use crate::video::{FixedLayerSource, VideoCore, colors, timing};
use neogeo_common::frontend::Color;

impl VideoCore {
    /// Copy all 4096 pens of the active palette bank.
    pub fn copy_pens(&self, out: &mut [Color]) {
        out.iter_mut().zip(self.palette.pens()).for_each(|(out, &pen)| *out = pen);
    }

    /// Decode either palette bank with the current screen dark setting, without switching banks.
    pub fn copy_palette_bank(&self, bank: u8, out: &mut [Color]) {
        let screen_dark = self.palette.screen_dark();
        for (out, &color) in out.iter_mut().zip(self.palette.raw_bank(bank)) {
            *out = colors::get_pen(color, screen_dark);
        }
    }

    /// Render one 16x16 sprite tile into `out` (row-major, 16 pixels per row). Transparent pixels
    /// are left untouched.
    pub fn render_sprite_tile(&self, code: u32, palette: u16, out: &mut [Color]) {
        let pens = self.palette.pens_for(palette);
        for (row, out_row) in out.chunks_exact_mut(16).take(16).enumerate() {
            let pixels = self.roms.sprites.row(code, row as u8);
            for (out, pixel) in out_row.iter_mut().zip(pixels) {
                if pixel != 0 {
                    *out = pens[usize::from(pixel)];
                }
            }
        }
    }

    /// Render one 8x8 fixed layer character into `out` (row-major, 8 pixels per row).
    pub fn render_fixed_char(
        &self,
        source: FixedLayerSource,
        code: u16,
        palette: u16,
        out: &mut [Color],
    ) {
        let graphics = match source {
            FixedLayerSource::Bios => &self.roms.fixed_bios,
            FixedLayerSource::Cartridge => &self.roms.fixed_cartridge,
        };
        let pens = self.palette.pens_for(palette & 0x0F);

        for (fine_y, out_row) in out.chunks_exact_mut(8).take(8).enumerate() {
            let pixels = fixed::decode_fixed_row(graphics, code, fine_y as u16);
            for (out, pixel) in out_row.iter_mut().zip(pixels) {
                if pixel != 0 {
                    *out = pens[usize::from(pixel)];
                }
            }
        }
    }

    pub fn dump_registers(&self, mut callback: impl FnMut(&str, &[(&str, &str)])) {
        callback("VRAM port", &[
            ("Address", &format!("${:04X}", self.port.address())),
            ("Modulo", &format!("${:04X}", self.port.modulo())),
            ("Read buffer", &format!("${:04X}", self.port.read_data())),
        ]);

        callback("Auto-animation", &[
            ("Speed", &self.auto_animation.speed().to_string()),
            ("Frame counter", &self.auto_animation.frame_counter().to_string()),
            ("Counter", &format!("${:02X}", self.auto_animation.counter())),
            ("Disabled", bool_str(self.auto_animation.disabled())),
        ]);

        callback("Palette", &[
            ("Active bank", &self.palette.active_bank().to_string()),
            ("Screen dark", bool_str(self.palette.screen_dark())),
        ]);

        callback("Raster", &[
            ("Scanline", &self.raster.scanline.to_string()),
            ("V counter", &format!("${:03X}", self.raster.v_counter())),
            ("VBlank", bool_str(self.raster.in_vblank())),
            ("Next scanline", &self.next_scanline.to_string()),
        ]);

        callback("Fixed layer", &[
            ("Source", &self.fixed_layer_source.to_string()),
            ("Banking", &self.config.fixed_layer_banking.to_string()),
            ("Line banks", &format_line_banks(&self.fixed_line_banks)),
        ]);

        callback("Timing", &[
            ("Pixels per line", &timing::HTOTAL.to_string()),
            ("Lines per frame", &timing::VTOTAL.to_string()),
            ("Visible lines", &format!("{}-{}", timing::VBEND, timing::VBSTART - 1)),
        ]);
    }
}

fn format_line_banks(banks: &FixedLineBanks) -> String {
    (0..32).map(|row| char::from(b'0' + banks.bank(row))).collect()
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}
