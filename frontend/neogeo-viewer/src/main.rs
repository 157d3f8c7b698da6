use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::Env;
use neogeo_common::frontend::Color;
use neogeo_config::{FixedLayerBanking, NeoGeoVideoConfig, SpriteCodeBits};
use neogeo_core::video::PALETTE_LEN;
use neogeo_core::{FixedLayerSource, VideoCore, VideoRoms};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_OPTIONS_HEADING: &str = "Video Config Options";

/// Render a Neo-Geo frame from ROM images and video/palette RAM dumps
#[derive(Parser)]
struct Args {
    /// Sprite graphics ROM, with the C ROM pairs already interleaved
    #[arg(long)]
    sprites: PathBuf,

    /// System BIOS fixed layer ROM (sfix)
    #[arg(long)]
    bios_fix: PathBuf,

    /// Cartridge fixed layer ROM (S ROM)
    #[arg(long)]
    cart_fix: PathBuf,

    /// Zoom ROM (000-lo.lo); a generated table is used if not set
    #[arg(long)]
    zoom: Option<PathBuf>,

    /// Video RAM dump, big-endian 16-bit words starting at address 0
    #[arg(long)]
    vram: PathBuf,

    /// Palette RAM dump, big-endian 16-bit words; bank 0 followed by an optional bank 1
    #[arg(long)]
    palette: PathBuf,

    /// Active palette bank (0 / 1)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..2))]
    palette_bank: u8,

    /// Enable the screen dark (dim) output
    #[arg(long, default_value_t)]
    screen_dark: bool,

    /// Draw the fixed layer from the BIOS ROM instead of the cartridge ROM
    #[arg(long, default_value_t)]
    bios_fixed_layer: bool,

    /// Number of frames to run before capturing
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Output PNG path
    #[arg(short = 'o', long, default_value = "frame.png")]
    output: PathBuf,

    /// Log video registers after rendering
    #[arg(long, default_value_t)]
    dump_registers: bool,

    /// TOML file with video config; command-line options override it
    #[arg(long, help_heading = CONFIG_OPTIONS_HEADING)]
    config: Option<PathBuf>,

    /// Fixed layer banking scheme
    #[arg(long, help_heading = CONFIG_OPTIONS_HEADING)]
    fixed_layer_banking: Option<FixedLayerBanking>,

    /// Sprite tile code width; derived from the sprite ROM size if not set here or in the config
    /// file
    #[arg(long, help_heading = CONFIG_OPTIONS_HEADING)]
    sprite_code_bits: Option<SpriteCodeBits>,

    /// Do not draw sprites
    #[arg(long, default_value_t, help_heading = CONFIG_OPTIONS_HEADING)]
    hide_sprites: bool,

    /// Do not draw the fixed layer
    #[arg(long, default_value_t, help_heading = CONFIG_OPTIONS_HEADING)]
    hide_fixed_layer: bool,
}

impl Args {
    fn video_config(
        &self,
        file_config: Option<NeoGeoVideoConfig>,
        sprite_rom_len: usize,
    ) -> NeoGeoVideoConfig {
        let from_file = file_config.is_some();
        let mut config = file_config.unwrap_or_default();

        if let Some(banking) = self.fixed_layer_banking {
            config.fixed_layer_banking = banking;
        }

        if let Some(code_bits) = self.sprite_code_bits {
            config.sprite_code_bits = code_bits;
        } else if !from_file {
            config.sprite_code_bits = SpriteCodeBits::for_sprite_rom_len(sprite_rom_len);
        }

        config.sprites_enabled &= !self.hide_sprites;
        config.fixed_layer_enabled &= !self.hide_fixed_layer;

        config
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Unable to read '{}'", path.display()))
}

fn read_words(path: &Path) -> anyhow::Result<Vec<u16>> {
    let bytes = read_file(path)?;
    if bytes.len() % 2 != 0 {
        log::warn!("'{}' has an odd length; ignoring the last byte", path.display());
    }

    Ok(bytes.chunks_exact(2).map(|word| u16::from_be_bytes([word[0], word[1]])).collect())
}

fn read_config_file(path: &Path) -> anyhow::Result<NeoGeoVideoConfig> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Unable to parse config file '{}'", path.display()))
}

fn write_png(path: &Path, frame: &[Color], width: u32, height: u32) -> anyhow::Result<()> {
    let rgba: Vec<u8> = bytemuck::cast_slice(frame).to_vec();
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("Frame buffer does not match {width}x{height}"))?;
    image.save(path).with_context(|| format!("Unable to write PNG to '{}'", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let sprites = read_file(&args.sprites)?;
    let fixed_bios = read_file(&args.bios_fix)?;
    let fixed_cartridge = read_file(&args.cart_fix)?;
    let zoom_y = args.zoom.as_deref().map(read_file).transpose()?;

    let file_config = args.config.as_deref().map(read_config_file).transpose()?;
    let config = args.video_config(file_config, sprites.len());

    let roms = VideoRoms {
        sprites: &sprites,
        fixed_bios: &fixed_bios,
        fixed_cartridge: &fixed_cartridge,
        zoom_y: zoom_y.as_deref(),
    };
    let mut core = VideoCore::new(roms, config)?;

    core.load_vram(&read_words(&args.vram)?);

    let palette = read_words(&args.palette)?;
    let (bank_0, bank_1) = palette.split_at(palette.len().min(PALETTE_LEN));
    core.load_palette_bank(0, bank_0);
    core.load_palette_bank(1, bank_1);
    core.set_palette_bank(args.palette_bank);
    core.set_screen_dark(args.screen_dark);

    core.set_fixed_layer_source(if args.bios_fixed_layer {
        FixedLayerSource::Bios
    } else {
        FixedLayerSource::Cartridge
    });

    for _ in 0..args.frames {
        core.run_frame();
    }

    if args.dump_registers {
        core.dump_registers(|section, fields| {
            log::info!("{section}");
            for (name, value) in fields {
                log::info!("  {name}: {value}");
            }
        });
    }

    let size = core.visible_frame_size();
    write_png(&args.output, core.visible_frame(), size.width, size.height)?;

    log::info!("Wrote {}x{} frame to '{}'", size.width, size.height, args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const REQUIRED: [&str; 11] = [
        "neogeo-viewer",
        "--sprites",
        "c.bin",
        "--bios-fix",
        "sfix.sfix",
        "--cart-fix",
        "s1.bin",
        "--vram",
        "vram.bin",
        "--palette",
        "palette.bin",
    ];

    fn parse(extra: &[&str]) -> Args {
        Args::try_parse_from(REQUIRED.iter().chain(extra)).unwrap()
    }

    #[test]
    fn defaults_derive_code_bits_from_rom() {
        let args = parse(&[]);
        assert_eq!(args.output, PathBuf::from("frame.png"));
        assert_eq!(args.frames, 1);

        let config = args.video_config(None, 0x2000000);
        assert_eq!(config.sprite_code_bits, SpriteCodeBits::Eighteen);
        assert_eq!(config.fixed_layer_banking, FixedLayerBanking::None);
        assert!(config.sprites_enabled && config.fixed_layer_enabled);
    }

    #[test]
    fn flags_override_config_file() {
        let file_config: NeoGeoVideoConfig = toml::from_str(concat!(
            "fixed_layer_banking = \"LineTable\"\n",
            "sprite_code_bits = \"Seventeen\"\n",
            "fixed_layer_enabled = false\n",
        ))
        .unwrap();
        assert!(file_config.sprites_enabled);

        let config = parse(&[]).video_config(Some(file_config), 0x2000000);
        assert_eq!(config.fixed_layer_banking, FixedLayerBanking::LineTable);
        assert_eq!(config.sprite_code_bits, SpriteCodeBits::Seventeen);
        assert!(!config.fixed_layer_enabled);

        let args = parse(&[
            "--fixed-layer-banking",
            "column-groups",
            "--sprite-code-bits",
            "nineteen",
            "--hide-sprites",
        ]);
        let config = args.video_config(Some(file_config), 0x2000000);
        assert_eq!(config.fixed_layer_banking, FixedLayerBanking::ColumnGroups);
        assert_eq!(config.sprite_code_bits, SpriteCodeBits::Nineteen);
        assert!(!config.sprites_enabled);
        assert!(!config.fixed_layer_enabled);
    }

    #[test]
    fn palette_bank_is_range_checked() {
        assert!(Args::try_parse_from(REQUIRED.iter().chain(&["--palette-bank", "2"])).is_err());
        assert_eq!(parse(&["--palette-bank", "1"]).palette_bank, 1);
    }
}
