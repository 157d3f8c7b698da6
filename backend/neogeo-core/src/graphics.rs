//! Graphics ROM regions
//!
//! Sprite tiles are stored on the cartridge as four interleaved bitplanes, 128 bytes per 16x16
//! tile. They are expanded once at load time into one byte per pixel so that the per-scanline
//! sprite renderer can index pixels directly.

use crate::api::{NeoGeoVideoError, NeoGeoVideoResult};
use neogeo_config::SPRITE_TILE_LEN;

/// Expanded bytes per sprite tile (16x16, one byte per pixel)
pub const EXPANDED_TILE_LEN: usize = 256;

/// Fixed layer ROM bytes per 8x8 character
pub const FIXED_CHAR_LEN: usize = 32;

// Encodes nothing and decodes to Default; ROM-derived data is restored with take_rom_from
macro_rules! impl_fake_encode_decode {
    ($($t:ty),* $(,)?) => {
        $(
            impl ::bincode::Encode for $t {
                fn encode<E: ::bincode::enc::Encoder>(
                    &self,
                    _encoder: &mut E,
                ) -> Result<(), ::bincode::error::EncodeError> {
                    Ok(())
                }
            }

            impl<Context> ::bincode::Decode<Context> for $t {
                fn decode<D: ::bincode::de::Decoder<Context = Context>>(
                    _decoder: &mut D,
                ) -> Result<Self, ::bincode::error::DecodeError> {
                    Ok(Self::default())
                }
            }

            impl<'de, Context> ::bincode::BorrowDecode<'de, Context> for $t {
                fn borrow_decode<D: ::bincode::de::BorrowDecoder<'de, Context = Context>>(
                    _decoder: &mut D,
                ) -> Result<Self, ::bincode::error::DecodeError> {
                    Ok(Self::default())
                }
            }
        )*
    };
}

pub(crate) use impl_fake_encode_decode;

#[derive(Debug, Clone, Default)]
pub struct SpriteGraphics {
    pixels: Box<[u8]>,
    address_mask: usize,
}

impl_fake_encode_decode!(SpriteGraphics, FixedGraphics);

impl SpriteGraphics {
    /// Expand a packed sprite ROM into one byte per pixel.
    ///
    /// Each output tile is 16 rows of 16 pixels. The left half of a row comes from the planes at
    /// `0x40 | row * 4` and the right half from `row * 4`; within a plane byte, bit N is pixel N.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is empty or is not a whole number of tiles.
    pub fn from_packed(rom: &[u8]) -> NeoGeoVideoResult<Self> {
        if rom.is_empty() {
            return Err(NeoGeoVideoError::EmptySpriteRom);
        }

        if rom.len() % SPRITE_TILE_LEN != 0 {
            return Err(NeoGeoVideoError::MisalignedSpriteRom {
                len: rom.len(),
                tile_len: SPRITE_TILE_LEN,
            });
        }

        let mut pixels = Vec::with_capacity(rom.len() * 2);
        for tile in rom.chunks_exact(SPRITE_TILE_LEN) {
            for y in 0..16 {
                for half_base in [0x40, 0x00] {
                    let planes = &tile[half_base | (y << 2)..(half_base | (y << 2)) + 4];
                    for x in 0..8 {
                        let bit = |plane: usize| (planes[plane] >> x) & 1;
                        pixels.push((bit(3) << 3) | (bit(1) << 2) | (bit(2) << 1) | bit(0));
                    }
                }
            }
        }

        let address_mask = pixels.len().next_power_of_two() - 1;

        log::info!(
            "Expanded {:#X}-byte sprite ROM into {:#X} tiles (address mask {address_mask:#X})",
            rom.len(),
            rom.len() / SPRITE_TILE_LEN
        );

        Ok(Self { pixels: pixels.into_boxed_slice(), address_mask })
    }

    /// One 16-pixel row of a tile. Addresses past the end of the ROM (but within the power-of-two
    /// mirror range) read as transparent.
    #[inline]
    #[must_use]
    pub fn row(&self, code: u32, row: u8) -> [u8; 16] {
        let address = (((code as usize) << 8) | (usize::from(row) << 4)) & self.address_mask;
        let mut out = [0; 16];
        if let Some(src) = self.pixels.get(address..address + 16) {
            out.copy_from_slice(src);
        }
        out
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.pixels.len() / EXPANDED_TILE_LEN
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedGraphics {
    rom: Box<[u8]>,
    address_mask: usize,
}

impl FixedGraphics {
    /// # Errors
    ///
    /// Returns an error if the ROM is empty or is not a whole number of characters.
    pub fn new(rom: &[u8], region: &'static str) -> NeoGeoVideoResult<Self> {
        if rom.is_empty() {
            return Err(NeoGeoVideoError::EmptyFixedRom { region });
        }

        if rom.len() % FIXED_CHAR_LEN != 0 {
            return Err(NeoGeoVideoError::MisalignedFixedRom {
                region,
                len: rom.len(),
                char_len: FIXED_CHAR_LEN,
            });
        }

        let address_mask = rom.len().next_power_of_two() - 1;
        log::info!(
            "{region} fixed layer ROM: {:#X} bytes (address mask {address_mask:#X})",
            rom.len()
        );

        Ok(Self { rom: rom.into(), address_mask })
    }

    #[inline]
    #[must_use]
    pub fn byte(&self, address: usize) -> u8 {
        self.rom.get(address & self.address_mask).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rom.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use test_log::test;

    /// Pack a 16x16 tile of 4-bit pixels into the cartridge bitplane layout.
    pub(crate) fn pack_tile(pixels: &[[u8; 16]; 16]) -> [u8; SPRITE_TILE_LEN] {
        let mut tile = [0; SPRITE_TILE_LEN];
        for (y, row) in pixels.iter().enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                let base = (if x < 8 { 0x40 } else { 0x00 }) | (y << 2);
                let bit = x % 8;
                for (color_bit, plane) in [(0, 0), (1, 2), (2, 1), (3, 3)] {
                    if pixel & (1 << color_bit) != 0 {
                        tile[base + plane] |= 1 << bit;
                    }
                }
            }
        }
        tile
    }

    #[test]
    fn expansion_restores_pixel_order() {
        let mut pixels = [[0; 16]; 16];
        for (y, row) in pixels.iter_mut().enumerate() {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = ((x + y) % 16) as u8;
            }
        }

        let graphics = SpriteGraphics::from_packed(&pack_tile(&pixels)).unwrap();
        assert_eq!(graphics.tile_count(), 1);
        for y in 0..16 {
            assert_eq!(graphics.row(0, y as u8), pixels[y], "row {y}");
        }
    }

    #[test]
    fn sprite_codes_wrap_at_power_of_two() {
        let mut pixels = [[0; 16]; 16];
        pixels[3][5] = 7;
        let mut rom = pack_tile(&pixels).to_vec();
        rom.extend_from_slice(&[0; SPRITE_TILE_LEN * 2]);

        // 3 tiles round up to a 4-tile mirror; tile 3 is past the end and reads transparent
        let graphics = SpriteGraphics::from_packed(&rom).unwrap();
        assert_eq!(graphics.row(4, 3)[5], 7);
        assert_eq!(graphics.row(3, 3), [0; 16]);
    }

    #[test]
    fn bad_rom_sizes_are_rejected() {
        assert!(matches!(SpriteGraphics::from_packed(&[]), Err(NeoGeoVideoError::EmptySpriteRom)));
        assert!(matches!(
            SpriteGraphics::from_packed(&[0; 100]),
            Err(NeoGeoVideoError::MisalignedSpriteRom { len: 100, .. })
        ));
        assert!(matches!(
            FixedGraphics::new(&[0; 33], "BIOS"),
            Err(NeoGeoVideoError::MisalignedFixedRom { len: 33, .. })
        ));
        assert!(matches!(
            FixedGraphics::new(&[], "Cartridge"),
            Err(NeoGeoVideoError::EmptyFixedRom { .. })
        ));
    }

    #[test]
    fn fixed_rom_mirrors() {
        let mut rom = vec![0; 0x60];
        rom[0x05] = 0xAB;
        let graphics = FixedGraphics::new(&rom, "BIOS").unwrap();
        assert_eq!(graphics.byte(0x05), 0xAB);
        assert_eq!(graphics.byte(0x85), 0xAB);
        assert_eq!(graphics.byte(0x65), 0);
    }
}
