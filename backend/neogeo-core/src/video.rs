//! Neo-Geo LSPC (line sprite controller)

mod colors;
mod debug;
mod fixed;
mod palette;
mod port;
mod sprites;
pub mod timing;
mod zoom;


use crate::api::{NeoGeoVideoResult, VideoRoms};
use crate::bus::ByteLanes;
use crate::graphics::{FixedGraphics, SpriteGraphics, impl_fake_encode_decode};
use crate::video::fixed::{FixedLineBanks, FixedRenderArgs};
use crate::video::palette::PaletteRam;
use crate::video::port::VramPort;
use crate::video::sprites::SpriteRenderArgs;
use crate::video::timing::{AutoAnimation, RasterPosition};
use bincode::{Decode, Encode};
use neogeo_common::boxedarray::BoxedWordArray;
use neogeo_common::frontend::{Color, FrameSize};
use neogeo_config::{FixedLayerBanking, NeoGeoVideoConfig, UNBANKED_FIXED_ROM_LEN};
use std::fmt::{Display, Formatter};
use std::mem;

pub use colors::get_pen;
pub use palette::PALETTE_LEN;
pub use sprites::{MAX_SPRITES_PER_LINE, MAX_SPRITES_PER_SCREEN, SPRITE_LIST_EVEN, SPRITE_LIST_ODD};
pub use zoom::{ZOOM_X_TABLES, ZoomYTable};

pub const VRAM_LEN: usize = 0x10000;

pub type Vram = BoxedWordArray<VRAM_LEN>;

pub const SCREEN_WIDTH: usize = (timing::HBSTART - timing::HBEND) as usize;
pub const FRAME_BUFFER_LINES: usize = timing::VTOTAL as usize;
pub const VISIBLE_LINES: usize = (timing::VBSTART - timing::VBEND) as usize;

// Pen used for the backdrop, the last entry of the last palette
const BACKDROP_PEN: u16 = 0x0FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum FixedLayerSource {
    #[default]
    Bios,
    Cartridge,
}

impl Display for FixedLayerSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bios => write!(f, "BIOS"),
            Self::Cartridge => write!(f, "Cartridge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoTickEffect {
    None,
    FrameComplete,
}

#[derive(Debug, Clone)]
struct FrameBuffer(Vec<Color>);

impl Default for FrameBuffer {
    fn default() -> Self {
        Self(vec![Color::BLACK; SCREEN_WIDTH * FRAME_BUFFER_LINES])
    }
}

impl_fake_encode_decode!(FrameBuffer, VideoRomData);

#[derive(Debug, Clone, Default)]
struct VideoRomData {
    sprites: SpriteGraphics,
    fixed_bios: FixedGraphics,
    fixed_cartridge: FixedGraphics,
    zoom_y: ZoomYTable,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct VideoCore {
    vram: Vram,
    palette: PaletteRam,
    port: VramPort,
    auto_animation: AutoAnimation,
    fixed_layer_source: FixedLayerSource,
    fixed_line_banks: FixedLineBanks,
    raster: RasterPosition,
    next_scanline: u16,
    frame_buffer: FrameBuffer,
    roms: VideoRomData,
    config: NeoGeoVideoConfig,
}

impl VideoCore {
    /// # Errors
    ///
    /// Returns an error if any ROM region is empty or has an invalid size.
    pub fn new(roms: VideoRoms<'_>, config: NeoGeoVideoConfig) -> NeoGeoVideoResult<Self> {
        let sprites = SpriteGraphics::from_packed(roms.sprites)?;
        let fixed_bios = FixedGraphics::new(roms.fixed_bios, "BIOS")?;
        let fixed_cartridge = FixedGraphics::new(roms.fixed_cartridge, "Cartridge")?;
        let zoom_y = match roms.zoom_y {
            Some(rom) => ZoomYTable::from_rom(rom)?,
            None => {
                log::info!("No zoom ROM provided, using generated vertical shrink table");
                ZoomYTable::generate()
            }
        };

        if config.fixed_layer_banking != FixedLayerBanking::None
            && fixed_cartridge.len() <= UNBANKED_FIXED_ROM_LEN
        {
            log::warn!(
                "Fixed layer banking is set to '{}' but the cartridge fixed ROM is only {:#X} bytes",
                config.fixed_layer_banking,
                fixed_cartridge.len()
            );
        }

        log::info!("Video config:\n{config}");

        Ok(Self {
            vram: Vram::new(),
            palette: PaletteRam::new(),
            port: VramPort::default(),
            auto_animation: AutoAnimation::default(),
            fixed_layer_source: FixedLayerSource::default(),
            fixed_line_banks: FixedLineBanks::default(),
            raster: RasterPosition::default(),
            next_scanline: 0,
            frame_buffer: FrameBuffer::default(),
            roms: VideoRomData { sprites, fixed_bios, fixed_cartridge, zoom_y },
            config,
        })
    }

    /// Restore power-on register state. Video RAM and palette RAM keep their contents.
    pub fn reset(&mut self) {
        log::debug!("Video reset");

        self.port = VramPort::default();
        self.auto_animation = AutoAnimation::default();
        self.fixed_layer_source = FixedLayerSource::default();
        self.raster = RasterPosition::default();
        self.next_scanline = 0;
    }

    pub fn update_config(&mut self, config: NeoGeoVideoConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn config(&self) -> NeoGeoVideoConfig {
        self.config
    }

    /// Move the ROM-derived data out of another instance, typically one just loaded from a save
    /// state (which does not contain ROMs).
    pub fn take_rom_from(&mut self, other: &mut Self) {
        self.roms = mem::take(&mut other.roms);
    }

    pub fn set_fixed_layer_source(&mut self, source: FixedLayerSource) {
        if source != self.fixed_layer_source {
            log::debug!("Fixed layer source set to {source}");
            self.fixed_layer_source = source;
        }
    }

    #[must_use]
    pub fn fixed_layer_source(&self) -> FixedLayerSource {
        self.fixed_layer_source
    }

    /// Palette bank select, 0 or 1.
    ///
    /// # Panics
    ///
    /// Panics if `bank` is not 0 or 1.
    pub fn set_palette_bank(&mut self, bank: u8) {
        self.palette.set_bank(bank);
    }

    pub fn set_screen_dark(&mut self, screen_dark: bool) {
        self.palette.set_screen_dark(screen_dark);
    }

    /// Read a raw color word from the active bank. The index is masked to 12 bits.
    #[must_use]
    pub fn read_palette(&self, index: u16) -> u16 {
        self.palette.read(index)
    }

    pub fn write_palette(&mut self, index: u16, value: u16) {
        self.palette.write(index, value);
    }

    pub fn write_palette_lanes(&mut self, index: u16, value: u16, lanes: ByteLanes) {
        self.palette.write_lanes(index, value, lanes);
    }

    #[must_use]
    pub fn pen(&self, index: u16) -> Color {
        self.palette.pen(index)
    }

    #[must_use]
    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    /// Copy words into video RAM starting at address 0, e.g. from a memory dump.
    pub fn load_vram(&mut self, words: &[u16]) {
        for (dst, &src) in self.vram.iter_mut().zip(words) {
            *dst = src;
        }
    }

    /// # Panics
    ///
    /// Panics if `bank` is not 0 or 1.
    pub fn load_palette_bank(&mut self, bank: u8, words: &[u16]) {
        self.palette.load_bank(bank, words);
    }

    #[must_use]
    pub fn auto_animation_counter(&self) -> u8 {
        self.auto_animation.counter()
    }

    /// The full frame buffer, `SCREEN_WIDTH` pixels per line and one line per raster line.
    /// Only lines inside the visible area are ever drawn.
    #[must_use]
    pub fn frame_buffer(&self) -> &[Color] {
        &self.frame_buffer.0
    }

    #[must_use]
    pub fn visible_frame(&self) -> &[Color] {
        let start = usize::from(timing::VBEND) * SCREEN_WIDTH;
        &self.frame_buffer.0[start..start + VISIBLE_LINES * SCREEN_WIDTH]
    }

    #[must_use]
    pub fn visible_frame_size(&self) -> FrameSize {
        FrameSize { width: SCREEN_WIDTH as u32, height: VISIBLE_LINES as u32 }
    }

    fn refresh_fixed_line_banks(&mut self) {
        if self.config.fixed_layer_banking == FixedLayerBanking::LineTable {
            self.fixed_line_banks = FixedLineBanks::scan(&self.vram);
        }
    }

    fn render_scanline(&mut self, scanline: u16) {
        let start = usize::from(scanline) * SCREEN_WIDTH;
        let line = &mut self.frame_buffer.0[start..start + SCREEN_WIDTH];

        line.fill(self.palette.pen(BACKDROP_PEN));

        if self.config.sprites_enabled {
            let args = SpriteRenderArgs {
                vram: &self.vram,
                graphics: &self.roms.sprites,
                zoom_y_table: &self.roms.zoom_y,
                palette: &self.palette,
                animation: &self.auto_animation,
                code_mask: self.config.sprite_code_bits.code_mask(),
            };
            sprites::render_sprite_line(&args, scanline, line);
        }

        if self.config.fixed_layer_enabled {
            let (graphics, banking) = match self.fixed_layer_source {
                FixedLayerSource::Bios => (&self.roms.fixed_bios, None),
                FixedLayerSource::Cartridge => {
                    (&self.roms.fixed_cartridge, Some(self.config.fixed_layer_banking))
                }
            };

            let args = FixedRenderArgs {
                vram: &self.vram,
                graphics,
                palette: &self.palette,
                banking,
                line_banks: &self.fixed_line_banks,
            };
            fixed::render_fixed_line(&args, scanline, line);
        }
    }
}
