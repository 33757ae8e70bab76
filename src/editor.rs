use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::EditorConfig;
use crate::error::MapError;
use crate::grid::TileGrid;
use crate::registry::TileSetRegistry;
use crate::resize::Direction;
use crate::tile::{encode, Tile};

/// Normalise `path` to a forward-slash path relative to the working directory when it
/// lies below it, absolute otherwise.
fn normalize(path: &str, cwd: &Path) -> String {
    let p = Path::new(path);
    let abs = if p.is_absolute() { p.to_path_buf() } else { cwd.join(p) };
    let mut parts: Vec<std::path::Component> = Vec::new();
    for c in abs.components() {
        match c {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !matches!(
                    parts.last(),
                    None | Some(std::path::Component::RootDir | std::path::Component::Prefix(_))
                ) {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    let abs: PathBuf = parts.iter().collect();
    let rel = abs.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(abs);
    rel.to_string_lossy().replace('\\', "/")
}

/// Candidates not already in `existing` (or earlier in `candidates`), compared after
/// normalising both to working-directory-relative form. Returned in normalised form.
pub fn unique_paths<S: AsRef<str>, E: AsRef<str>>(candidates: &[S], existing: &[E]) -> Vec<String> {
    let cwd = std::env::current_dir().unwrap_or_default();
    let mut seen: Vec<String> = existing.iter().map(|e| normalize(e.as_ref(), &cwd)).collect();
    let mut unique = Vec::new();
    for c in candidates {
        let path = normalize(c.as_ref(), &cwd);
        if seen.contains(&path) {
            continue;
        }
        seen.push(path.clone());
        unique.push(path);
    }
    unique
}

/// Everything the editor's logic thread owns: the tileset cache, the active map and
/// the brush.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    registry: TileSetRegistry,
    map: Option<TileGrid>,
    map_path: Option<PathBuf>,
    saved: bool,
    tileset_slot: u8,
    current_tile: Tile,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::new())
    }
}

impl EditorSession {
    /// Session with no open map.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            registry: TileSetRegistry::new(),
            map: None,
            map_path: None,
            saved: true,
            tileset_slot: 0,
            current_tile: Tile::EMPTY,
        }
    }

    /// Settings the session was started with.
    pub fn config(&self) -> &EditorConfig { &self.config }
    /// Tileset cache shared by every map this session opens.
    pub fn registry(&self) -> &TileSetRegistry { &self.registry }
    /// The open map, if any.
    pub fn map(&self) -> Option<&TileGrid> { self.map.as_ref() }
    /// Where the open map was last loaded from or saved to.
    pub fn map_path(&self) -> Option<&Path> { self.map_path.as_deref() }
    /// Brush tile.
    pub fn current_tile(&self) -> Tile { self.current_tile }
    /// Slot of the palette tileset.
    pub fn selected_tileset(&self) -> u8 { self.tileset_slot }

    /// True when the active map has no unsaved edits.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    fn map_mut(&mut self) -> Result<&mut TileGrid, MapError> {
        self.map.as_mut().ok_or(MapError::NoActiveMap)
    }

    fn reset_brush(&mut self) {
        self.tileset_slot = 0;
        self.current_tile = Tile::EMPTY;
    }

    /// Replace the active map with an empty one sized from the config.
    pub fn new_map(&mut self) -> Result<(), MapError> {
        let (name, columns, rows, tile_size) = (
            self.config.map_name.clone(),
            self.config.columns,
            self.config.rows,
            self.config.tile_size,
        );
        self.new_map_with(name, columns, rows, tile_size)
    }

    /// Replace the active map with an empty one of the given size.
    pub fn new_map_with(
        &mut self,
        name: impl Into<String>,
        columns: u32,
        rows: u32,
        tile_size: u32,
    ) -> Result<(), MapError> {
        let grid = TileGrid::new(name, columns, rows, tile_size)?;
        info!("New tile map '{}' {}x{}", grid.name(), columns, rows);
        self.map = Some(grid);
        self.map_path = None;
        self.saved = false;
        self.reset_brush();
        Ok(())
    }

    /// Load `path` and make it the active map. On failure the current map stays.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MapError> {
        let path = path.as_ref();
        let grid = TileGrid::load(path, &mut self.registry)?;
        self.map = Some(grid);
        self.map_path = Some(path.to_path_buf());
        self.saved = true;
        self.reset_brush();
        Ok(())
    }

    /// Save to the path the map was opened from or last saved to.
    pub fn save(&mut self) -> Result<(), MapError> {
        let path = self.map_path.clone().ok_or(MapError::NoSavePath)?;
        self.save_as(path)
    }

    /// Save to `path` and remember it for later saves.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MapError> {
        let path = path.as_ref();
        let map = self.map.as_ref().ok_or(MapError::NoActiveMap)?;
        map.save(path)?;
        self.map_path = Some(path.to_path_buf());
        self.saved = true;
        Ok(())
    }

    /// Load each new tileset in `paths` and give it a slot in the active map.
    ///
    /// Paths already in the map are skipped, as are files that do not exist or fail
    /// to decode. Stops at slot capacity. Returns the slots filled.
    pub fn add_tilesets<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<Vec<u8>, MapError> {
        let existing: Vec<String> = self
            .map
            .as_ref()
            .ok_or(MapError::NoActiveMap)?
            .tileset_paths()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut added = Vec::new();
        for path in unique_paths(paths, &existing) {
            if !Path::new(&path).exists() {
                warn!("Skipping tileset {path}: file not found");
                continue;
            }
            let handle = match self.registry.load_or_get(&path) {
                Ok(h) => h,
                Err(e) => {
                    warn!("Skipping tileset: {e}");
                    continue;
                }
            };
            match self.map_mut()?.add_tileset(handle) {
                Ok(slot) => {
                    info!("Added tileset {path} in slot {slot}");
                    added.push(slot);
                }
                Err(e) => {
                    warn!("Not adding {path}: {e}");
                    break;
                }
            }
        }
        if !added.is_empty() {
            self.saved = false;
        }
        Ok(added)
    }

    /// Drop the tileset in `slot` from the active map, clearing tiles that used it.
    pub fn remove_tileset(&mut self, slot: u8) -> Result<bool, MapError> {
        let map = self.map_mut()?;
        let Some(handle) = map.tileset(slot).cloned() else {
            return Ok(false);
        };
        map.remove_tileset(&handle);
        if self.current_tile.slot() == slot {
            self.current_tile = Tile::EMPTY;
        }
        self.saved = false;
        Ok(true)
    }

    /// Make `slot` the palette the brush picks from. `false` if the slot is empty.
    pub fn select_tileset(&mut self, slot: u8) -> bool {
        let populated = self.map.as_ref().is_some_and(|m| m.tileset(slot).is_some());
        if populated {
            self.tileset_slot = slot;
        }
        populated
    }

    /// Set the brush to the atlas cell under pixel `(atlas_x, atlas_y)` of the selected
    /// tileset, counted from the atlas origin. `None` when the pixel is off the atlas.
    pub fn pick_tile(&mut self, atlas_x: f32, atlas_y: f32) -> Option<Tile> {
        let map = self.map.as_ref()?;
        let ts = map.tileset(self.tileset_slot)?;
        let atlas = ts.atlas();
        if atlas_x < 0.0
            || atlas_y < 0.0
            || atlas_x >= atlas.width() as f32
            || atlas_y >= atlas.height() as f32
        {
            return None;
        }

        let size = map.tile_size();
        let per_row = ts.tiles_per_row(size);
        let col = atlas_x as u32 / size;
        let row = atlas_y as u32 / size;
        if col >= per_row || row >= atlas.height() / size {
            return None;
        }
        let index = u16::try_from(row * per_row + col).ok()?;
        let tile = encode(index, self.tileset_slot).ok()?;
        if tile.is_empty() {
            return None;
        }
        self.current_tile = tile;
        Some(tile)
    }

    /// Paint the brush at `(x, y)`. Returns whether a cell changed.
    pub fn paint(&mut self, x: u32, y: u32) -> bool {
        let tile = self.current_tile;
        if tile.is_empty() {
            return false;
        }
        self.put(x, y, tile)
    }

    /// Clear `(x, y)`. Returns whether a cell changed.
    pub fn erase(&mut self, x: u32, y: u32) -> bool {
        self.put(x, y, Tile::EMPTY)
    }

    fn put(&mut self, x: u32, y: u32, tile: Tile) -> bool {
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !map.contains(x, y) || map.get(x, y) == tile {
            return false;
        }
        map.set(x, y, tile);
        self.saved = false;
        true
    }

    /// Grow or shrink the active map on one side.
    pub fn resize(&mut self, direction: Direction, count: i32) -> Result<(), MapError> {
        self.map_mut()?.resize(direction, count)?;
        self.saved = false;
        Ok(())
    }
}
