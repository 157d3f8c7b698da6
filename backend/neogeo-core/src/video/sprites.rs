//! Sprite scanline pipeline
//!
//! Sprite control block layout in video RAM, indexed by sprite number `n`:
//!   `$0000 + n*64 + tile*2`: tile code low 16 bits
//!   `$0001 + n*64 + tile*2`: tile attributes
//!   `$8000 | n`: zoom control
//!   `$8200 | n`: Y control
//!   `$8400 | n`: X position
//!   `$8600-$867F`: active list for even lines
//!   `$8680-$86FF`: active list for odd lines
//!
//! Every line, the parser writes the numbers of the sprites that intersect it into one of two
//! active lists, and the renderer draws from that list one line later.

use crate::graphics::SpriteGraphics;
use crate::video::palette::PaletteRam;
use crate::video::timing::AutoAnimation;
use crate::video::zoom::{ZOOM_X_TABLES, ZoomYTable};
use crate::video::{SCREEN_WIDTH, Vram};
use neogeo_common::frontend::Color;
use neogeo_common::num::GetBit;

const ZOOM_CONTROL_BASE: usize = 0x8000;
const Y_CONTROL_BASE: usize = 0x8200;
const X_POSITION_BASE: usize = 0x8400;

pub const SPRITE_LIST_EVEN: usize = 0x8600;
pub const SPRITE_LIST_ODD: usize = 0x8680;

/// Sprites scanned by the parser each line
pub const MAX_SPRITES_PER_SCREEN: u16 = 381;
pub const MAX_SPRITES_PER_LINE: usize = 96;

// X positions in this range are entirely offscreen on both sides of the wrap
const DEAD_X_START: u16 = 0x140;
const DEAD_X_END: u16 = 0x1F0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YControl(pub u16);

impl YControl {
    /// Top line in 9-bit raster coordinates. Not masked, so a raw position of 0 gives $200.
    pub fn y(self) -> u16 {
        0x200 - (self.0 >> 7)
    }

    pub fn chained(self) -> bool {
        self.0.bit(6)
    }

    /// Height in 16-line tiles
    pub fn rows(self) -> u16 {
        self.0 & 0x3F
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomControl(pub u16);

impl ZoomControl {
    pub fn zoom_y(self) -> u16 {
        self.0 & 0xFF
    }

    pub fn zoom_x(self) -> u16 {
        self.0.bits(8..=11)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileAttributes(pub u16);

impl TileAttributes {
    pub fn palette(self) -> u16 {
        self.0 >> 8
    }

    /// Tile code bits 16-18
    pub fn code_high(self) -> u32 {
        (u32::from(self.0) << 12) & 0x70000
    }

    pub fn animate_3_bits(self) -> bool {
        self.0.bit(3)
    }

    pub fn animate_2_bits(self) -> bool {
        self.0.bit(2)
    }

    pub fn vertical_flip(self) -> bool {
        self.0.bit(1)
    }

    pub fn horizontal_flip(self) -> bool {
        self.0.bit(0)
    }
}

fn y_control(vram: &Vram, sprite: u16) -> YControl {
    YControl(vram[Y_CONTROL_BASE | usize::from(sprite)])
}

fn zoom_control(vram: &Vram, sprite: u16) -> ZoomControl {
    ZoomControl(vram[ZOOM_CONTROL_BASE | usize::from(sprite)])
}

pub fn sprite_list_base(scanline: u16) -> usize {
    if scanline.bit(0) { SPRITE_LIST_ODD } else { SPRITE_LIST_EVEN }
}

/// Whether a sprite spanning `rows` tiles from line `y` covers `scanline`, accounting for
/// wraparound at line 512. A row count of 0 covers every line.
pub fn sprite_on_scanline(scanline: u16, y: u16, rows: u16) -> bool {
    let max_y = (y + rows * 16).wrapping_sub(1) & 0x1FF;

    if max_y >= y {
        (y..=max_y).contains(&scanline)
    } else {
        scanline >= y || scanline <= max_y
    }
}

/// Build the active sprite list for a line. Returns the number of sprites found.
pub fn parse_sprites(vram: &mut Vram, scanline: u16) -> usize {
    let list_base = sprite_list_base(scanline);

    let mut y = 0;
    let mut rows = 0;
    let mut count = 0;

    for sprite in 0..MAX_SPRITES_PER_SCREEN {
        let control = y_control(vram, sprite);
        if !control.chained() {
            y = control.y();
            rows = control.rows();
        }

        if rows == 0 || !sprite_on_scanline(scanline, y, rows) {
            continue;
        }

        vram[list_base + count] = sprite;
        count += 1;
        if count == MAX_SPRITES_PER_LINE {
            log::trace!("Sprite limit reached on line {scanline} at sprite {sprite}");
            break;
        }
    }

    // Unused slots plus one slot past the end are cleared
    vram[list_base + count..=list_base + MAX_SPRITES_PER_LINE].fill(0);

    count
}

/// Number of list entries the renderer walks: up to and including the slot after the last
/// nonzero entry. Sprite #0 is a valid entry, so a zero-padded list draws sprite #0 one extra time,
/// and an empty list still draws it once. The hardware behaves the same way.
pub fn active_list_len(list: &[u16]) -> usize {
    match list.iter().rposition(|&sprite| sprite != 0) {
        Some(i) if i == MAX_SPRITES_PER_LINE - 1 => MAX_SPRITES_PER_LINE,
        Some(i) => i + 2,
        None => 1,
    }
}

pub struct SpriteRenderArgs<'a> {
    pub vram: &'a Vram,
    pub graphics: &'a SpriteGraphics,
    pub zoom_y_table: &'a ZoomYTable,
    pub palette: &'a PaletteRam,
    pub animation: &'a AutoAnimation,
    pub code_mask: u32,
}

struct SpriteState {
    x: u16,
    y: u16,
    zoom_x: u16,
    zoom_y: u16,
    rows: u16,
}

/// Draw every sprite in a line's active list into `line`, later entries over earlier ones.
pub fn render_sprite_line(args: &SpriteRenderArgs<'_>, scanline: u16, line: &mut [Color]) {
    let vram = args.vram;
    let list_base = sprite_list_base(scanline);
    let list = &vram[list_base..list_base + MAX_SPRITES_PER_LINE];

    let mut state = SpriteState { x: 0, y: 0, zoom_x: 0, zoom_y: 0, rows: 0 };

    for &entry in &list[..active_list_len(list)] {
        let sprite = entry & 0x1FF;
        let y_control = y_control(vram, sprite);
        let zoom_control = zoom_control(vram, sprite);

        // Chained sprites continue to the right of the previous list entry
        if y_control.chained() {
            state.x = (state.x + state.zoom_x + 1) & 0x1FF;
            state.zoom_x = zoom_control.zoom_x();
        } else {
            state.y = y_control.y();
            state.x = vram[X_POSITION_BASE | usize::from(sprite)] >> 7;
            state.zoom_y = zoom_control.zoom_y();
            state.zoom_x = zoom_control.zoom_x();
            state.rows = y_control.rows();
        }

        if (DEAD_X_START..=DEAD_X_END).contains(&state.x) {
            continue;
        }

        // Sprite RAM may have changed since the list was built
        if !sprite_on_scanline(scanline, state.y, state.rows) {
            continue;
        }

        render_sprite_row(args, sprite, &state, scanline, line);
    }
}

fn render_sprite_row(
    args: &SpriteRenderArgs<'_>,
    sprite: u16,
    state: &SpriteState,
    scanline: u16,
    line: &mut [Color],
) {
    let sprite_line = scanline.wrapping_sub(state.y) & 0x1FF;
    let mut zoom_line = sprite_line & 0xFF;
    let mut invert = sprite_line.bit(8);

    if invert {
        zoom_line ^= 0xFF;
    }

    // Sprites taller than 32 tiles repeat the shrunk image, mirrored on every other pass
    if state.rows > 0x20 {
        let period = (state.zoom_y + 1) << 1;
        zoom_line %= period;
        if zoom_line > state.zoom_y {
            zoom_line = period - 1 - zoom_line;
            invert = !invert;
        }
    }

    let zoom_entry = args.zoom_y_table.entry(state.zoom_y, zoom_line);
    let mut tile_row = zoom_entry & 0x0F;
    let mut tile = u16::from(zoom_entry >> 4);
    if invert {
        tile_row ^= 0x0F;
        tile ^= 0x1F;
    }

    let tile_offset = (usize::from(sprite) << 6) | (usize::from(tile) << 1);
    let code_word = args.vram[tile_offset];
    let attributes = TileAttributes(args.vram[tile_offset + 1]);

    let mut code = (attributes.code_high() | u32::from(code_word)) & args.code_mask;
    if !args.animation.disabled() {
        let counter = u32::from(args.animation.counter());
        if attributes.animate_3_bits() {
            code = (code & !0x07) | (counter & 0x07);
        } else if attributes.animate_2_bits() {
            code = (code & !0x03) | (counter & 0x03);
        }
    }

    if attributes.vertical_flip() {
        tile_row ^= 0x0F;
    }

    let pixels = args.graphics.row(code, tile_row);
    let pens = args.palette.pens_for(attributes.palette());
    let zoom_x_table = &ZOOM_X_TABLES[usize::from(state.zoom_x)];
    let horizontal_flip = attributes.horizontal_flip();

    let source_pixels = (0..16).map(|i| if horizontal_flip { pixels[15 - i] } else { pixels[i] });
    let emitted =
        source_pixels.zip(zoom_x_table).filter(|&(_, &emit)| emit != 0).map(|(pixel, _)| pixel);

    if state.x <= DEAD_X_END {
        for (col, pixel) in (usize::from(state.x)..SCREEN_WIDTH).zip(emitted) {
            if pixel != 0 {
                line[col] = pens[usize::from(pixel)];
            }
        }
    } else {
        // Wraps past X=511; only the part that re-enters at X=0 is visible
        let skipped = 0x200 - usize::from(state.x);
        for (col, pixel) in emitted.skip(skipped).enumerate() {
            if pixel != 0 {
                line[col] = pens[usize::from(pixel)];
            }
        }
    }
}
