use std::fmt;
use std::io;
use std::path::PathBuf;

use serde_json::error::Category;

use crate::resize::Direction;

/// Error type for the tile grid, its tilesets and the map file codec
#[derive(Debug)]
pub enum MapError {
    /// Cell coordinate outside `[0, columns) x [0, rows)`
    IndexOutOfBounds {
        /// Requested column
        x: u32,
        /// Requested row
        y: u32,
        /// Grid width
        columns: u32,
        /// Grid height
        rows: u32,
    },
    /// Every tileset slot of the grid is taken
    CapacityExceeded {
        /// Number of slots a grid can hold
        capacity: usize,
    },
    /// A shrink would leave a zero-sized (or negative) dimension
    InvalidResize {
        /// Side being resized
        direction: Direction,
        /// Requested signed change
        count: i32,
        /// Grid width before the resize
        columns: u32,
        /// Grid height before the resize
        rows: u32,
    },
    /// Tile index or tileset slot exceeds its packed field width
    TileOutOfRange {
        /// Requested tile index
        tile_index: u16,
        /// Requested tileset slot
        tileset_slot: u8,
    },
    /// Grid created with a zero column count, row count or tile size
    InvalidDimensions {
        /// Requested width
        columns: u32,
        /// Requested height
        rows: u32,
        /// Requested tile size
        tile_size: u32,
    },
    /// Atlas image could not be decoded or violates the RGBA assumption
    ResourceLoad {
        /// Resource path as requested
        path: String,
        /// What went wrong
        reason: String,
    },
    /// File I/O error
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// Malformed JSON
    Parse(serde_json::Error),
    /// Well-formed JSON that is not a valid tile map document
    CorruptDocument(String),
    /// Unsupported file format (non-JSON map path)
    UnsupportedFormat(String),
    /// Configuration file could not be read
    Config(String),
    /// Editor operation needs an active map and there is none
    NoActiveMap,
    /// Map has never been saved and no target path was given
    NoSavePath,
}

impl MapError {
    /// Classifies a serde_json failure: syntax problems are `Parse`, shape problems are
    /// `CorruptDocument`.
    pub fn from_json(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => MapError::CorruptDocument(err.to_string()),
            _ => MapError::Parse(err),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::IndexOutOfBounds {
                x,
                y,
                columns,
                rows,
            } => write!(f, "Cell ({x}, {y}) is outside a {columns}x{rows} grid"),
            MapError::CapacityExceeded { capacity } => {
                write!(f, "Tileset slots are full ({capacity} max)")
            }
            MapError::InvalidResize {
                direction,
                count,
                columns,
                rows,
            } => write!(
                f,
                "Resizing a {columns}x{rows} grid by {count} on the {direction:?} side leaves no cells"
            ),
            MapError::TileOutOfRange {
                tile_index,
                tileset_slot,
            } => write!(
                f,
                "Tile index {tile_index} / tileset slot {tileset_slot} does not fit the packed tile"
            ),
            MapError::InvalidDimensions {
                columns,
                rows,
                tile_size,
            } => write!(
                f,
                "Invalid map dimensions {columns}x{rows} with tile size {tile_size}"
            ),
            MapError::ResourceLoad { path, reason } => {
                write!(f, "Failed to load tileset '{path}': {reason}")
            }
            MapError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            MapError::Parse(e) => write!(f, "JSON parse error: {}", e),
            MapError::CorruptDocument(msg) => write!(f, "Corrupt tile map document: {}", msg),
            MapError::UnsupportedFormat(path) => write!(f, "Unsupported file format: {}", path),
            MapError::Config(msg) => write!(f, "Config error: {}", msg),
            MapError::NoActiveMap => write!(f, "No tile map is open"),
            MapError::NoSavePath => write!(f, "Tile map has no file path yet"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::from_json(err)
    }
}
