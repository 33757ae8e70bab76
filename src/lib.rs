#![warn(missing_docs)]

//! Tile-grid storage, directional resize and JSON persistence for a tile-map editor.

mod config;
mod editor;
mod error;
mod grid;
mod loader {
    pub mod json_loader;
}
mod registry;
mod resize;
mod task;
mod tile;
mod tileset;

pub use config::EditorConfig;
pub use editor::{unique_paths, EditorSession};
pub use error::MapError;
pub use grid::{TileGrid, SLOT_CAPACITY};
pub use loader::json_loader::{
    from_document, from_json_str, load_map_file, save_map_file, to_document, to_json_string,
    TileMapDocument,
};
pub use registry::{TileSetHandle, TileSetRegistry};
pub use resize::{remap, resized_dimensions, Axis, Direction};
pub use task::{Task, TaskQueue, TaskSender};
pub use tile::{
    decode, encode, Tile, MAX_TILESET_SLOT, MAX_TILE_INDEX, TILESET_SLOT_BITS, TILE_INDEX_BITS,
};
pub use tileset::{Atlas, TileSet, UvRect};
