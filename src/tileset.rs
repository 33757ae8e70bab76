use std::fmt;
use std::path::Path;

use macroquad::prelude::{FilterMode, Rect, Texture2D};

use crate::error::MapError;

/// Decoded RGBA8 atlas image, stored bottom row first.
#[derive(Clone)]
pub struct Atlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Atlas {
    const CHANNELS: u8 = 4;

    /// Decode an image file. The UV math assumes 4 channels, so anything else is refused.
    pub fn decode<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let path = path.as_ref();
        let fail = |reason: String| MapError::ResourceLoad {
            path: path.display().to_string(),
            reason,
        };

        let img = image::open(path).map_err(|e| fail(e.to_string()))?;
        let channels = img.color().channel_count();
        if channels != Self::CHANNELS {
            return Err(fail(format!(
                "expected {} channels, image has {channels}",
                Self::CHANNELS
            )));
        }

        let rgba = img.flipv().into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw()).map_err(|e| match e {
            MapError::ResourceLoad { reason, .. } => fail(reason),
            other => other,
        })
    }

    /// Wrap raw RGBA8 pixels. `pixels.len()` must be `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, MapError> {
        let fail = |reason: String| MapError::ResourceLoad {
            path: String::from("<memory>"),
            reason,
        };
        if width == 0 || height == 0 {
            return Err(fail(format!("empty atlas {width}x{height}")));
        }
        // Texture2D sizes are u16.
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(fail(format!("atlas {width}x{height} is too large")));
        }
        let expected = width as usize * height as usize * Self::CHANNELS as usize;
        if pixels.len() != expected {
            return Err(fail(format!(
                "pixel buffer holds {} bytes, {width}x{height} RGBA needs {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Atlas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, bottom row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Upload to the GPU. Needs a running macroquad context.
    pub fn to_texture(&self) -> Texture2D {
        let tex = Texture2D::from_rgba8(self.width as u16, self.height as u16, &self.pixels);
        tex.set_filter(FilterMode::Nearest);
        tex
    }
}

impl fmt::Debug for Atlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atlas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Normalized texture coordinates of one tile inside its atlas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    /// Left edge
    pub u_min: f32,
    /// Bottom edge
    pub v_min: f32,
    /// Right edge
    pub u_max: f32,
    /// Top edge
    pub v_max: f32,
}

impl UvRect {
    /// Zero-area rectangle returned for tiles that are not in the atlas.
    pub const EMPTY: UvRect = UvRect {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 0.0,
        v_max: 0.0,
    };

    /// True for a zero-area rectangle.
    pub fn is_empty(&self) -> bool {
        self.u_max <= self.u_min || self.v_max <= self.v_min
    }

    /// Pixel source rectangle for `draw_texture_ex` on a texture of the given size.
    pub fn to_source_rect(&self, width: u32, height: u32) -> Rect {
        let (w, h) = (width as f32, height as f32);
        Rect::new(
            self.u_min * w,
            self.v_min * h,
            (self.u_max - self.u_min) * w,
            (self.v_max - self.v_min) * h,
        )
    }
}

/// An atlas together with the resource path it was loaded from.
#[derive(Debug)]
pub struct TileSet {
    path: String,
    atlas: Atlas,
}

impl TileSet {
    /// Pair an already decoded atlas with its path.
    pub fn new(path: impl Into<String>, atlas: Atlas) -> Self {
        TileSet {
            path: path.into(),
            atlas,
        }
    }

    /// Decode the atlas at `path`.
    pub fn load(path: &str) -> Result<Self, MapError> {
        Ok(Self::new(path, Atlas::decode(path)?))
    }

    /// Resource path, also the registry key.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The decoded atlas.
    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// Atlas cells per row when cut into `tile_size` squares.
    pub fn tiles_per_row(&self, tile_size: u32) -> u32 {
        if tile_size == 0 {
            return 0;
        }
        self.atlas.width / tile_size
    }

    /// Number of whole `tile_size` cells the atlas holds.
    pub fn tile_count(&self, tile_size: u32) -> u32 {
        if tile_size == 0 {
            return 0;
        }
        self.tiles_per_row(tile_size) * (self.atlas.height / tile_size)
    }

    /// UV rectangle of `tile_index`, tiles laid out row-major from the atlas origin.
    pub fn uv_rect(&self, tile_index: u16, tile_size: u32) -> UvRect {
        let per_row = self.tiles_per_row(tile_size);
        if per_row == 0 || tile_index as u32 >= self.tile_count(tile_size) {
            return UvRect::EMPTY;
        }

        let tile_u = tile_size as f32 / self.atlas.width as f32;
        let tile_v = tile_size as f32 / self.atlas.height as f32;
        let col = tile_index as u32 % per_row;
        let row = tile_index as u32 / per_row;

        let u_min = col as f32 * tile_u;
        let v_min = row as f32 * tile_v;
        UvRect {
            u_min,
            v_min,
            u_max: u_min + tile_u,
            v_max: v_min + tile_v,
        }
    }
}
