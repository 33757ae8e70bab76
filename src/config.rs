//! Editor configuration.
//!
//! Settings come from an INI file. Missing keys keep their defaults.
//!
//! ```ini
//! [map]
//! name = untitled
//! columns = 32
//! rows = 32
//! tile_size = 32
//!
//! [window]
//! width = 1280
//! height = 720
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::MapError;

const DEFAULT_MAP_NAME: &str = "untitled";
const DEFAULT_COLUMNS: u32 = 32;
const DEFAULT_ROWS: u32 = 32;
const DEFAULT_TILE_SIZE: u32 = 32;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_CONFIG_PATH: &str = "./editor.ini";

/// Defaults for new maps and the editor window.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Name given to new maps.
    pub map_name: String,
    /// Columns of a new map.
    pub columns: u32,
    /// Rows of a new map.
    pub rows: u32,
    /// Tile size of a new map, in pixels.
    pub tile_size: u32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Where the configuration is read from and written to.
    pub config_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorConfig {
    /// Configuration with built-in defaults.
    pub fn new() -> Self {
        Self {
            map_name: DEFAULT_MAP_NAME.to_owned(),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            tile_size: DEFAULT_TILE_SIZE,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Defaults, bound to a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Overlay values from `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), MapError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| MapError::Config(format!("Failed to load config file: {e}")))?;

        if let Some(name) = config.get("map", "name") {
            self.map_name = name;
        }
        // zero sizes are not valid maps, keep the default instead
        let positive = |v: Option<u64>| v.filter(|&n| n > 0 && n <= u32::MAX as u64).map(|n| n as u32);
        if let Some(columns) = positive(config.getuint("map", "columns").ok().flatten()) {
            self.columns = columns;
        }
        if let Some(rows) = positive(config.getuint("map", "rows").ok().flatten()) {
            self.rows = rows;
        }
        if let Some(tile_size) = positive(config.getuint("map", "tile_size").ok().flatten()) {
            self.tile_size = tile_size;
        }
        if let Some(width) = positive(config.getuint("window", "width").ok().flatten()) {
            self.window_width = width;
        }
        if let Some(height) = positive(config.getuint("window", "height").ok().flatten()) {
            self.window_height = height;
        }

        info!(
            "Loaded config: new maps '{}' {}x{} @ {}px, window {}x{}",
            self.map_name, self.columns, self.rows, self.tile_size, self.window_width, self.window_height
        );
        Ok(())
    }

    /// Write the current values to `config_path`.
    pub fn save_to_file(&self) -> Result<(), MapError> {
        let mut config = Ini::new();
        config.set("map", "name", Some(self.map_name.clone()));
        config.set("map", "columns", Some(self.columns.to_string()));
        config.set("map", "rows", Some(self.rows.to_string()));
        config.set("map", "tile_size", Some(self.tile_size.to_string()));
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));

        config
            .write(&self.config_path)
            .map_err(|source| MapError::Io {
                path: self.config_path.clone(),
                source,
            })
    }
}
