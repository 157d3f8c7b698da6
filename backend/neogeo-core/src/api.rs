//! Construction inputs and error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeoGeoVideoError {
    #[error("Sprite graphics ROM is empty")]
    EmptySpriteRom,
    #[error("Sprite graphics ROM length {len:#X} is not a multiple of the {tile_len}-byte tile size")]
    MisalignedSpriteRom { len: usize, tile_len: usize },
    #[error("{region} fixed layer ROM is empty")]
    EmptyFixedRom { region: &'static str },
    #[error(
        "{region} fixed layer ROM length {len:#X} is not a multiple of the {char_len}-byte character size"
    )]
    MisalignedFixedRom { region: &'static str, len: usize, char_len: usize },
    #[error("Zoom ROM is {len:#X} bytes, at least {expected:#X} bytes are required")]
    ZoomRomTooSmall { len: usize, expected: usize },
}

pub type NeoGeoVideoResult<T> = Result<T, NeoGeoVideoError>;

/// ROM regions consumed by the video core. All regions are owned by the ROM loading layer; the
/// core copies what it needs at construction time.
#[derive(Debug, Clone, Copy)]
pub struct VideoRoms<'a> {
    /// Sprite graphics in the packed 4bpp cartridge format, 128 bytes per 16x16 tile
    pub sprites: &'a [u8],
    /// Fixed layer characters from the system BIOS, 32 bytes per 8x8 character
    pub fixed_bios: &'a [u8],
    /// Fixed layer characters from the cartridge
    pub fixed_cartridge: &'a [u8],
    /// Vertical shrink lookup ROM; a generated table is used when not provided
    pub zoom_y: Option<&'a [u8]>,
}
