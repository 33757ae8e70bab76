use crate::error::MapError;

/*
    A tile is 16 bits:

    [ 15 ........ 10 | 9 ................ 0 ]
    [ tileset  slot  |      tile  index     ]

    * 10 bits for the tile index   -> 1024 tiles per tileset
    * 6  bits for the tileset slot -> 64 tilesets per grid
*/

/// Width of the tile index field.
pub const TILE_INDEX_BITS: u32 = 10;
/// Width of the tileset slot field.
pub const TILESET_SLOT_BITS: u32 = 6;

/// Index field of a packed tile.
pub const TILE_INDEX_MASK: u16 = 0x03FF; // bits 0..=9
/// Slot field of a packed tile, once shifted down.
pub const TILESET_SLOT_MASK: u16 = 0x3F; // after shifting down by TILE_INDEX_BITS

/// Number of tiles a single tileset can address.
pub const MAX_TILE_INDEX: u16 = TILE_INDEX_MASK;
/// Highest slot number a tile can reference.
pub const MAX_TILESET_SLOT: u8 = TILESET_SLOT_MASK as u8;

/// A packed grid cell value: which tile of which tileset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile(pub u16);

impl Tile {
    /// "No tile". All bits set, so it collides with tile 1023 of slot 63, which is
    /// therefore never a paintable tile.
    pub const EMPTY: Tile = Tile(u16::MAX);

    /// Packs `tile_index` and `tileset_slot`, rejecting values that would spill into
    /// the neighbouring field.
    pub fn new(tile_index: u16, tileset_slot: u8) -> Result<Self, MapError> {
        encode(tile_index, tileset_slot)
    }

    /// Packed value.
    #[inline] pub fn raw(self) -> u16 { self.0 }
    /// True for [`Tile::EMPTY`].
    #[inline] pub fn is_empty(self) -> bool { self == Tile::EMPTY }
    /// Tile index within its tileset.
    #[inline] pub fn index(self) -> u16 { self.0 & TILE_INDEX_MASK }
    /// Tileset slot in the owning grid.
    #[inline] pub fn slot(self) -> u8 { ((self.0 >> TILE_INDEX_BITS) & TILESET_SLOT_MASK) as u8 }

    /// Same tile index, different slot. Used when a save compacts slot numbers.
    #[inline]
    pub(crate) fn with_slot(self, tileset_slot: u8) -> Tile {
        Tile((self.0 & TILE_INDEX_MASK) | ((tileset_slot as u16 & TILESET_SLOT_MASK) << TILE_INDEX_BITS))
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::EMPTY
    }
}

impl From<u16> for Tile {
    fn from(raw: u16) -> Self {
        Tile(raw)
    }
}

/// `(tileset_slot << 10) | tile_index`.
pub fn encode(tile_index: u16, tileset_slot: u8) -> Result<Tile, MapError> {
    if tile_index > MAX_TILE_INDEX || tileset_slot > MAX_TILESET_SLOT {
        return Err(MapError::TileOutOfRange {
            tile_index,
            tileset_slot,
        });
    }
    Ok(Tile(((tileset_slot as u16) << TILE_INDEX_BITS) | tile_index))
}

/// Splits a tile into `(tile_index, tileset_slot)`.
#[inline]
pub fn decode(tile: Tile) -> (u16, u8) {
    (tile.index(), tile.slot())
}
