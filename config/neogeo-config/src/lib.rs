use bincode::{Decode, Encode};
use std::fmt::{Display, Formatter};

/// Sprite graphics ROM bytes per 16x16 tile (4 bitplanes, packed)
pub const SPRITE_TILE_LEN: usize = 128;

/// Cartridge fix ROMs larger than this are only fully addressable through fixed layer banking
pub const UNBANKED_FIXED_ROM_LEN: usize = 0x20000;

/// How the cartridge fixed layer (8x8 text layer) extends its 12-bit character codes.
///
/// The banking scheme is a property of the cartridge board, so it is chosen by the driver layer
/// rather than guessed from ROM contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FixedLayerBanking {
    #[default]
    None,
    /// Garou / Metal Slug 3: bank-change markers in the $7500/$7580 control region are expanded
    /// into a per-row bank table once per frame
    LineTable,
    /// KOF 2000 / Matrimelee: 2-bit banks packed six columns per word, looked up per row group
    ColumnGroups,
}

impl FixedLayerBanking {
    pub const ALL: [Self; 3] = [Self::None, Self::LineTable, Self::ColumnGroups];
}

impl Display for FixedLayerBanking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::LineTable => write!(f, "Line table (Garou / Metal Slug 3)"),
            Self::ColumnGroups => write!(f, "Column groups (KOF 2000 / Matrimelee)"),
        }
    }
}

/// Number of sprite tile code bits honored by the board.
///
/// The low 16 bits always come from the tile code word; attribute bits 4-6 supply code bits 16-18,
/// but only boards with enough sprite ROM wire them up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SpriteCodeBits {
    Sixteen,
    Seventeen,
    Eighteen,
    #[default]
    Nineteen,
}

impl SpriteCodeBits {
    pub const ALL: [Self; 4] = [Self::Sixteen, Self::Seventeen, Self::Eighteen, Self::Nineteen];

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Sixteen => 16,
            Self::Seventeen => 17,
            Self::Eighteen => 18,
            Self::Nineteen => 19,
        }
    }

    #[must_use]
    pub const fn code_mask(self) -> u32 {
        (1 << self.bits()) - 1
    }

    /// Smallest code width that can address every tile in a packed sprite ROM of the given length.
    #[must_use]
    pub fn for_sprite_rom_len(len: usize) -> Self {
        let tiles = len / SPRITE_TILE_LEN;
        let width = match tiles {
            0..=0x10000 => Self::Sixteen,
            0x10001..=0x20000 => Self::Seventeen,
            0x20001..=0x40000 => Self::Eighteen,
            _ => Self::Nineteen,
        };

        log::debug!("Sprite ROM of {len:#X} bytes ({tiles:#X} tiles) uses {width} tile code");

        width
    }
}

impl Display for SpriteCodeBits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct NeoGeoVideoConfig {
    pub fixed_layer_banking: FixedLayerBanking,
    pub sprite_code_bits: SpriteCodeBits,
    pub sprites_enabled: bool,
    pub fixed_layer_enabled: bool,
}

impl Default for NeoGeoVideoConfig {
    fn default() -> Self {
        Self {
            fixed_layer_banking: FixedLayerBanking::default(),
            sprite_code_bits: SpriteCodeBits::default(),
            sprites_enabled: true,
            fixed_layer_enabled: true,
        }
    }
}

impl Display for NeoGeoVideoConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "fixed_layer_banking: {}", self.fixed_layer_banking)?;
        writeln!(f, "sprite_code_bits: {}", self.sprite_code_bits)?;
        writeln!(f, "sprites_enabled: {}", self.sprites_enabled)?;
        write!(f, "fixed_layer_enabled: {}", self.fixed_layer_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn sprite_code_bits_from_rom_len() {
        // 8MB of packed tiles is exactly 64K tiles
        assert_eq!(SpriteCodeBits::for_sprite_rom_len(0x800000), SpriteCodeBits::Sixteen);
        assert_eq!(SpriteCodeBits::for_sprite_rom_len(0x800080), SpriteCodeBits::Seventeen);
        assert_eq!(SpriteCodeBits::for_sprite_rom_len(0x1000000), SpriteCodeBits::Seventeen);
        assert_eq!(SpriteCodeBits::for_sprite_rom_len(0x2000000), SpriteCodeBits::Eighteen);
        assert_eq!(SpriteCodeBits::for_sprite_rom_len(0x4000000), SpriteCodeBits::Nineteen);
    }

    #[test]
    fn code_masks() {
        assert_eq!(SpriteCodeBits::Sixteen.code_mask(), 0x0FFFF);
        assert_eq!(SpriteCodeBits::Nineteen.code_mask(), 0x7FFFF);
        assert!(SpriteCodeBits::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn default_config_enables_both_layers() {
        let config = NeoGeoVideoConfig::default();
        assert!(config.sprites_enabled && config.fixed_layer_enabled);
        assert_eq!(config.fixed_layer_banking, FixedLayerBanking::None);
        assert_eq!(config.to_string().lines().count(), 4);
    }
}
