use std::rc::Rc;

use log::debug;

use crate::error::MapError;
use crate::registry::TileSetHandle;
use crate::resize::{remap, resized_dimensions, Axis, Direction};
use crate::tile::{Tile, TILESET_SLOT_BITS};
use crate::tileset::UvRect;

/// Number of tileset slots a grid holds; one per value of the packed slot field.
pub const SLOT_CAPACITY: usize = 1 << TILESET_SLOT_BITS;

/// Dense single-layer tile map.
///
/// Tiles are stored row-major (`x + y * columns`). Tileset slots are sparse: slot
/// numbers are what tiles store, so removing a tileset never renumbers the others.
#[derive(Debug, Clone)]
pub struct TileGrid {
    name: String,
    columns: u32,
    rows: u32,
    tile_size: u32,
    tiles: Vec<Tile>,
    slots: [Option<TileSetHandle>; SLOT_CAPACITY],
}

impl TileGrid {
    /// Grid of `columns x rows` empty tiles with no tilesets.
    pub fn new(
        name: impl Into<String>,
        columns: u32,
        rows: u32,
        tile_size: u32,
    ) -> Result<Self, MapError> {
        if columns == 0 || rows == 0 || tile_size == 0 {
            return Err(MapError::InvalidDimensions {
                columns,
                rows,
                tile_size,
            });
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
            tile_size,
            tiles: vec![Tile::EMPTY; columns as usize * rows as usize],
            slots: std::array::from_fn(|_| None),
        })
    }

    /// Build from already validated parts. `tiles.len()` must be `columns * rows`.
    pub(crate) fn from_parts(
        name: String,
        columns: u32,
        rows: u32,
        tile_size: u32,
        tiles: Vec<Tile>,
    ) -> Result<Self, MapError> {
        let mut grid = Self::new(name, columns, rows, tile_size)?;
        if tiles.len() != grid.tiles.len() {
            return Err(MapError::CorruptDocument(format!(
                "{} tiles for a {columns}x{rows} grid",
                tiles.len()
            )));
        }
        grid.tiles = tiles;
        Ok(grid)
    }

    /// Map name.
    pub fn name(&self) -> &str { &self.name }
    /// Rename the map.
    pub fn set_name(&mut self, name: impl Into<String>) { self.name = name.into(); }
    /// Width in cells.
    pub fn columns(&self) -> u32 { self.columns }
    /// Height in cells.
    pub fn rows(&self) -> u32 { self.rows }
    /// Cell edge in pixels.
    pub fn tile_size(&self) -> u32 { self.tile_size }

    /// Flat row-major tile storage.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Whether `(x, y)` is a cell of this grid.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.columns && y < self.rows
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.columns as usize
    }

    fn check(&self, x: u32, y: u32) -> Result<usize, MapError> {
        if !self.contains(x, y) {
            return Err(MapError::IndexOutOfBounds {
                x,
                y,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(self.index(x, y))
    }

    /// Tile at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the grid; callers bounds-check with [`Self::contains`].
    pub fn get(&self, x: u32, y: u32) -> Tile {
        match self.check(x, y) {
            Ok(i) => self.tiles[i],
            Err(e) => panic!("{e}"),
        }
    }

    /// Overwrite the tile at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) {
        match self.check(x, y) {
            Ok(i) => self.tiles[i] = tile,
            Err(e) => panic!("{e}"),
        }
    }

    /// Checked [`Self::get`].
    pub fn try_get(&self, x: u32, y: u32) -> Result<Tile, MapError> {
        self.check(x, y).map(|i| self.tiles[i])
    }

    /// Checked [`Self::set`].
    pub fn try_set(&mut self, x: u32, y: u32, tile: Tile) -> Result<(), MapError> {
        let i = self.check(x, y)?;
        self.tiles[i] = tile;
        Ok(())
    }

    /// Every non-empty cell as `(x, y, tile)`, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, Tile)> + '_ {
        let columns = self.columns as usize;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_empty())
            .map(move |(i, t)| ((i % columns) as u32, (i / columns) as u32, *t))
    }

    /// Tileset in `slot`, if populated.
    pub fn tileset(&self, slot: u8) -> Option<&TileSetHandle> {
        self.slots.get(slot as usize)?.as_ref()
    }

    /// Tileset that `tile` draws from. `None` for the empty tile or an unpopulated slot.
    pub fn tileset_for(&self, tile: Tile) -> Option<&TileSetHandle> {
        if tile.is_empty() {
            return None;
        }
        self.tileset(tile.slot())
    }

    /// Populated slots in slot order.
    pub fn tilesets(&self) -> impl Iterator<Item = (u8, &TileSetHandle)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|h| (i as u8, h)))
    }

    /// Paths of the populated slots in slot order.
    pub fn tileset_paths(&self) -> Vec<&str> {
        self.tilesets().map(|(_, h)| h.path()).collect()
    }

    /// First slot holding a tileset loaded from `path`.
    pub fn slot_of(&self, path: &str) -> Option<u8> {
        self.tilesets().find(|(_, h)| h.path() == path).map(|(s, _)| s)
    }

    /// Put `handle` into the lowest free slot and return that slot.
    ///
    /// The same tileset may occupy several slots; de-duplication is the caller's call.
    pub fn add_tileset(&mut self, handle: TileSetHandle) -> Result<u8, MapError> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(MapError::CapacityExceeded {
                capacity: SLOT_CAPACITY,
            });
        };
        self.slots[slot] = Some(handle);
        Ok(slot as u8)
    }

    /// Empty the slot holding `handle` and clear every tile that referenced it.
    ///
    /// Returns the freed slot. Other slots keep their numbers.
    pub fn remove_tileset(&mut self, handle: &TileSetHandle) -> Option<u8> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|h| Rc::ptr_eq(h, handle)))? as u8;
        self.slots[slot as usize] = None;

        let mut cleared = 0usize;
        for tile in self.tiles.iter_mut().filter(|t| !t.is_empty() && t.slot() == slot) {
            *tile = Tile::EMPTY;
            cleared += 1;
        }
        debug!("removed tileset slot {slot}, cleared {cleared} tiles");
        Some(slot)
    }

    /// UV rectangle of `tile` in its tileset, cut at this grid's tile size.
    pub fn uv_rect(&self, tile: Tile) -> Option<UvRect> {
        self.tileset_for(tile)
            .map(|ts| ts.uv_rect(tile.index(), self.tile_size))
    }

    /// Copy of this grid grown (`count > 0`) or shrunk (`count < 0`) on one side.
    ///
    /// Cells that land outside the new bounds are dropped; new cells are empty.
    pub fn resized(&self, direction: Direction, count: i32) -> Result<TileGrid, MapError> {
        let (columns, rows) = resized_dimensions(self.columns, self.rows, direction, count)
            .ok_or(MapError::InvalidResize {
                direction,
                count,
                columns: self.columns,
                rows: self.rows,
            })?;

        let mut tiles = vec![Tile::EMPTY; columns as usize * rows as usize];
        for old_y in 0..self.rows {
            let Some(y) = remap(old_y, self.rows, rows, direction, Axis::Y) else {
                continue;
            };
            for old_x in 0..self.columns {
                let Some(x) = remap(old_x, self.columns, columns, direction, Axis::X) else {
                    continue;
                };
                tiles[x as usize + y as usize * columns as usize] = self.tiles[self.index(old_x, old_y)];
            }
        }

        Ok(TileGrid {
            name: self.name.clone(),
            columns,
            rows,
            tile_size: self.tile_size,
            tiles,
            slots: self.slots.clone(),
        })
    }

    /// In-place [`Self::resized`]. On error the grid is unchanged.
    pub fn resize(&mut self, direction: Direction, count: i32) -> Result<(), MapError> {
        let next = self.resized(direction, count)?;
        debug!(
            "resized '{}' {:?} by {count}: {}x{} -> {}x{}",
            self.name, direction, self.columns, self.rows, next.columns, next.rows
        );
        *self = next;
        Ok(())
    }
}
