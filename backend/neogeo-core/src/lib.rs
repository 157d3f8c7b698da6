//! Neo-Geo LSPC video core: palette and pen cache, video RAM port, scanline sprite pipeline,
//! fixed layer, and the two hardware timers that drive them

mod api;
pub mod bus;
pub mod graphics;
pub mod resnet;
pub mod video;

pub use api::{NeoGeoVideoError, NeoGeoVideoResult, VideoRoms};
pub use bus::ByteLanes;
pub use neogeo_config::{FixedLayerBanking, NeoGeoVideoConfig, SpriteCodeBits};
pub use video::timing::{DisplayTiming, NullDisplayTiming, RasterPosition};
pub use video::{FixedLayerSource, VideoCore, VideoTickEffect};
