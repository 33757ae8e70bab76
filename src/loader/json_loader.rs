// src/loader/json_loader.rs
use crate::error::MapError;
use crate::grid::{TileGrid, SLOT_CAPACITY};
use crate::registry::TileSetRegistry;
use crate::tile::Tile;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk shape of a tile map. Array index in `tile_sets` is the slot number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMapDocument {
    /// Map name
    pub name: String,
    /// Width in cells
    pub columns: u32,
    /// Height in cells
    pub rows: u32,
    /// Cell size in pixels
    pub tile_size: u32,
    /// Packed tile values, row-major
    pub tiles: Vec<u16>,
    /// Tileset resource paths, in slot order
    pub tile_sets: Vec<String>,
}

/// Snapshot `grid` as a document.
///
/// Populated slots are written densely in slot order; if removals left holes, saved tile
/// values are rewritten to the compacted slot numbers so the document stays consistent.
/// Tiles whose slot holds no tileset are saved as empty, since their slot number may be
/// reused by the compaction.
pub fn to_document(grid: &TileGrid) -> TileMapDocument {
    let mut compact = [None::<u8>; SLOT_CAPACITY];
    let mut tile_sets = Vec::new();
    for (slot, ts) in grid.tilesets() {
        compact[slot as usize] = Some(tile_sets.len() as u8);
        tile_sets.push(ts.path().to_owned());
    }

    let tiles = grid
        .tiles()
        .iter()
        .map(|&t| match compact[t.slot() as usize] {
            _ if t.is_empty() => t.raw(),
            Some(new_slot) => t.with_slot(new_slot).raw(),
            None => Tile::EMPTY.raw(),
        })
        .collect();

    TileMapDocument {
        name: grid.name().to_owned(),
        columns: grid.columns(),
        rows: grid.rows(),
        tile_size: grid.tile_size(),
        tiles,
        tile_sets,
    }
}

/// Rebuild a grid from `doc`, resolving tileset paths through `registry` in slot order.
///
/// The document is validated before any tileset is touched. Tilesets resolved before a
/// failing one stay cached in the registry.
pub fn from_document(
    doc: TileMapDocument,
    registry: &mut TileSetRegistry,
) -> Result<TileGrid, MapError> {
    let expected = doc.columns as usize * doc.rows as usize;
    if doc.tiles.len() != expected {
        return Err(MapError::CorruptDocument(format!(
            "'{}' has {} tiles, {}x{} needs {expected}",
            doc.name,
            doc.tiles.len(),
            doc.columns,
            doc.rows
        )));
    }
    if doc.columns == 0 || doc.rows == 0 || doc.tile_size == 0 {
        return Err(MapError::CorruptDocument(format!(
            "'{}' has zero size ({}x{}, tile size {})",
            doc.name, doc.columns, doc.rows, doc.tile_size
        )));
    }
    if doc.tile_sets.len() > SLOT_CAPACITY {
        return Err(MapError::CorruptDocument(format!(
            "'{}' references {} tilesets, at most {SLOT_CAPACITY} fit",
            doc.name,
            doc.tile_sets.len()
        )));
    }

    let tiles = doc.tiles.into_iter().map(Tile).collect();
    let mut grid = TileGrid::from_parts(doc.name, doc.columns, doc.rows, doc.tile_size, tiles)?;
    for path in &doc.tile_sets {
        let handle = registry.load_or_get(path)?;
        grid.add_tileset(handle)?;
    }
    Ok(grid)
}

/// Pretty-printed JSON for `grid`.
pub fn to_json_string(grid: &TileGrid) -> Result<String, MapError> {
    serde_json::to_string_pretty(&to_document(grid)).map_err(MapError::from)
}

/// Parse JSON text and rebuild the grid it describes.
pub fn from_json_str(text: &str, registry: &mut TileSetRegistry) -> Result<TileGrid, MapError> {
    let doc: TileMapDocument = serde_json::from_str(text)?;
    from_document(doc, registry)
}

fn require_json(path: &Path) -> Result<(), MapError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::UnsupportedFormat(path.display().to_string()));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `grid` to `path`. The JSON goes to a sibling temp file first and is renamed
/// over `path`, so a failed save leaves the previous file as it was.
pub fn save_map_file<P: AsRef<Path>>(grid: &TileGrid, path: P) -> Result<(), MapError> {
    let path = path.as_ref();
    require_json(path)?;

    let text = to_json_string(grid)?;
    let tmp = temp_path_for(path);
    if let Err(source) = std::fs::write(&tmp, text) {
        let _ = std::fs::remove_file(&tmp);
        return Err(MapError::Io { path: tmp, source });
    }
    if let Err(source) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(MapError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(
        "saved tile map '{}' ({}x{}) to {}",
        grid.name(),
        grid.columns(),
        grid.rows(),
        path.display()
    );
    Ok(())
}

/// Read and decode the map at `path`.
pub fn load_map_file<P: AsRef<Path>>(
    path: P,
    registry: &mut TileSetRegistry,
) -> Result<TileGrid, MapError> {
    let path = path.as_ref();
    require_json(path)?;

    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = from_json_str(&txt, registry)?;

    info!(
        "loaded tile map '{}' ({}x{}, {} tilesets) from {}",
        grid.name(),
        grid.columns(),
        grid.rows(),
        grid.tilesets().count(),
        path.display()
    );
    Ok(grid)
}

impl TileGrid {
    /// See [`save_map_file`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MapError> {
        save_map_file(self, path)
    }

    /// See [`load_map_file`].
    pub fn load<P: AsRef<Path>>(
        path: P,
        registry: &mut TileSetRegistry,
    ) -> Result<TileGrid, MapError> {
        load_map_file(path, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::encode;
    use crate::tileset::Atlas;
    use std::rc::Rc;

    fn registry_with(paths: &[&str]) -> TileSetRegistry {
        let mut reg = TileSetRegistry::new();
        for p in paths {
            reg.insert(p, Atlas::from_rgba8(64, 64, vec![0; 64 * 64 * 4]).unwrap());
        }
        reg
    }

    #[test]
    fn document_uses_camel_case_field_names() {
        let mut reg = registry_with(&["tiles/a.png"]);
        let mut grid = TileGrid::new("level", 2, 1, 32).unwrap();
        grid.add_tileset(reg.load_or_get("tiles/a.png").unwrap()).unwrap();
        grid.set(0, 0, encode(5, 0).unwrap());

        let value: serde_json::Value = serde_json::from_str(&to_json_string(&grid).unwrap()).unwrap();
        assert_eq!(value["name"], "level");
        assert_eq!(value["columns"], 2);
        assert_eq!(value["rows"], 1);
        assert_eq!(value["tileSize"], 32);
        assert_eq!(value["tiles"], serde_json::json!([5, 65535]));
        assert_eq!(value["tileSets"], serde_json::json!(["tiles/a.png"]));
    }

    #[test]
    fn round_trip_through_json_text() {
        let mut reg = registry_with(&["a.png", "b.png"]);
        let mut grid = TileGrid::new("rt", 3, 2, 16).unwrap();
        grid.add_tileset(reg.load_or_get("a.png").unwrap()).unwrap();
        grid.add_tileset(reg.load_or_get("b.png").unwrap()).unwrap();
        grid.set(0, 0, encode(1, 0).unwrap());
        grid.set(2, 1, encode(9, 1).unwrap());

        let back = from_json_str(&to_json_string(&grid).unwrap(), &mut reg).unwrap();
        assert_eq!(back.name(), "rt");
        assert_eq!((back.columns(), back.rows(), back.tile_size()), (3, 2, 16));
        assert_eq!(back.tiles(), grid.tiles());
        assert_eq!(back.tileset_paths(), vec!["a.png", "b.png"]);
        // resolved through the cache, not re-decoded
        assert!(Rc::ptr_eq(back.tileset(1).unwrap(), grid.tileset(1).unwrap()));
    }

    #[test]
    fn holes_are_compacted_and_tiles_follow() {
        let mut reg = registry_with(&["a.png", "b.png", "c.png"]);
        let mut grid = TileGrid::new("holes", 2, 1, 16).unwrap();
        let a = reg.load_or_get("a.png").unwrap();
        grid.add_tileset(Rc::clone(&a)).unwrap();
        grid.add_tileset(reg.load_or_get("b.png").unwrap()).unwrap();
        grid.add_tileset(reg.load_or_get("c.png").unwrap()).unwrap();
        grid.set(0, 0, encode(4, 1).unwrap());
        grid.set(1, 0, encode(7, 2).unwrap());
        grid.remove_tileset(&a);

        let doc = to_document(&grid);
        assert_eq!(doc.tile_sets, vec!["b.png", "c.png"]);
        assert_eq!(doc.tiles, vec![encode(4, 0).unwrap().raw(), encode(7, 1).unwrap().raw()]);

        let back = from_document(doc, &mut reg).unwrap();
        assert_eq!(back.tileset_for(back.get(1, 0)).unwrap().path(), "c.png");
    }

    #[test]
    fn tiles_without_a_tileset_are_saved_empty() {
        let mut reg = registry_with(&["a.png", "b.png"]);
        let mut grid = TileGrid::new("orphan", 2, 1, 16).unwrap();
        let a = reg.load_or_get("a.png").unwrap();
        grid.add_tileset(Rc::clone(&a)).unwrap();
        grid.add_tileset(reg.load_or_get("b.png").unwrap()).unwrap();
        grid.remove_tileset(&a);
        grid.set(0, 0, encode(3, 0).unwrap());
        grid.set(1, 0, encode(2, 1).unwrap());
        assert!(grid.tileset_for(grid.get(0, 0)).is_none());

        let doc = to_document(&grid);
        assert_eq!(doc.tiles, vec![Tile::EMPTY.raw(), encode(2, 0).unwrap().raw()]);

        let back = from_document(doc, &mut reg).unwrap();
        assert!(back.get(0, 0).is_empty());
        assert!(back.tileset_for(back.get(0, 0)).is_none());
        assert_eq!(back.tileset_for(back.get(1, 0)).unwrap().path(), "b.png");
    }

    #[test]
    fn tile_count_mismatch_is_corrupt() {
        let mut reg = TileSetRegistry::new();
        let json = r#"{"name":"m","columns":2,"rows":2,"tileSize":8,"tiles":[1,2,3],"tileSets":[]}"#;
        assert!(matches!(
            from_json_str(json, &mut reg),
            Err(MapError::CorruptDocument(_))
        ));
    }

    #[test]
    fn missing_field_is_corrupt_not_parse() {
        let mut reg = TileSetRegistry::new();
        let json = r#"{"name":"m","columns":1,"rows":1,"tiles":[0],"tileSets":[]}"#;
        assert!(matches!(
            from_json_str(json, &mut reg),
            Err(MapError::CorruptDocument(_))
        ));
    }

    #[test]
    fn oversized_tile_value_is_corrupt() {
        let mut reg = TileSetRegistry::new();
        let json = r#"{"name":"m","columns":1,"rows":1,"tileSize":8,"tiles":[70000],"tileSets":[]}"#;
        assert!(matches!(
            from_json_str(json, &mut reg),
            Err(MapError::CorruptDocument(_))
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let mut reg = TileSetRegistry::new();
        assert!(matches!(
            from_json_str("{ not json", &mut reg),
            Err(MapError::Parse(_))
        ));
    }

    #[test]
    fn unresolvable_tileset_fails_after_earlier_ones_are_cached() {
        let mut reg = registry_with(&["ok.png"]);
        let json = r#"{"name":"m","columns":1,"rows":1,"tileSize":8,"tiles":[0],
                       "tileSets":["ok.png","missing/nowhere.png"]}"#;
        assert!(matches!(
            from_json_str(json, &mut reg),
            Err(MapError::ResourceLoad { .. })
        ));
        assert!(reg.contains("ok.png"));
        assert!(!reg.contains("missing/nowhere.png"));
    }

    #[test]
    fn non_json_paths_are_unsupported() {
        let mut reg = TileSetRegistry::new();
        let err = load_map_file("level.tmx", &mut reg).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(p) if p == "level.tmx"));
    }

    #[test]
    fn temp_path_sits_next_to_target() {
        assert_eq!(
            temp_path_for(Path::new("maps/level.json")),
            PathBuf::from("maps/level.json.tmp")
        );
    }
}
