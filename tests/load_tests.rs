// tests/load_tests.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tilegrid_editor::{
    encode, load_map_file, Direction, MapError, Tile, TileGrid, TileSetRegistry,
};

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tilegrid_{tag}_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_rgba_atlas(dir: &Path, name: &str, w: u32, h: u32) -> String {
    let path = dir.join(name);
    image::RgbaImage::new(w, h).save(&path).expect("write png");
    path.to_str().expect("path utf8").to_owned()
}

#[test]
fn save_then_load_round_trips_grid_and_slots() {
    let dir = temp_dir("roundtrip");
    let grass = write_rgba_atlas(&dir, "grass.png", 256, 256);
    let water = write_rgba_atlas(&dir, "water.png", 128, 64);

    let mut reg = TileSetRegistry::new();
    let mut grid = TileGrid::new("overworld", 4, 3, 32).unwrap();
    grid.add_tileset(reg.load_or_get(&grass).unwrap()).unwrap();
    grid.add_tileset(reg.load_or_get(&water).unwrap()).unwrap();
    grid.set(0, 0, encode(9, 0).unwrap());
    grid.set(3, 2, encode(7, 1).unwrap());

    let path = dir.join("overworld.json");
    grid.save(&path).expect("save");
    assert!(!dir.join("overworld.json.tmp").exists());

    let back = TileGrid::load(&path, &mut reg).expect("load");
    assert_eq!(back.name(), grid.name());
    assert_eq!(
        (back.columns(), back.rows(), back.tile_size()),
        (grid.columns(), grid.rows(), grid.tile_size())
    );
    assert_eq!(back.tiles(), grid.tiles());
    assert_eq!(back.tileset_paths(), grid.tileset_paths());
    assert_eq!(reg.len(), 2);

    let uv = back.uv_rect(back.get(0, 0)).unwrap();
    assert_eq!((uv.u_min, uv.v_min, uv.u_max, uv.v_max), (0.125, 0.125, 0.25, 0.25));
}

#[test]
fn saved_map_survives_resize_of_a_copy() {
    let dir = temp_dir("scenario");
    let mut grid = TileGrid::new("scenario", 3, 2, 32).unwrap();
    grid.set(1, 0, encode(5, 0).unwrap());
    let path = dir.join("scenario.json");
    grid.save(&path).unwrap();

    let mut copy = grid.clone();
    copy.resize(Direction::Top, 1).unwrap();
    assert_eq!((copy.columns(), copy.rows()), (3, 3));
    assert_eq!(copy.get(1, 1), grid.get(1, 0));
    assert_eq!(copy.get(1, 0), Tile::EMPTY);

    let mut reg = TileSetRegistry::new();
    let on_disk = load_map_file(&path, &mut reg).unwrap();
    assert_eq!(on_disk.rows(), 2);
    assert_eq!(on_disk.get(1, 0), encode(5, 0).unwrap());
}

#[test]
fn registry_decodes_each_path_once() {
    let dir = temp_dir("registry");
    let atlas = write_rgba_atlas(&dir, "once.png", 64, 32);

    let mut reg = TileSetRegistry::new();
    let a = reg.load_or_get(&atlas).unwrap();
    let b = reg.load_or_get(&atlas).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!((a.atlas().width(), a.atlas().height()), (64, 32));
    assert_eq!(reg.len(), 1);
}

#[test]
fn three_channel_atlas_is_rejected_and_not_cached() {
    let dir = temp_dir("rgb");
    let path = dir.join("rgb.png");
    image::RgbImage::new(32, 32).save(&path).unwrap();
    let path = path.to_str().unwrap();

    let mut reg = TileSetRegistry::new();
    let err = reg.load_or_get(path).unwrap_err();
    assert!(matches!(err, MapError::ResourceLoad { .. }));
    assert!(!reg.contains(path));
}

#[test]
fn atlas_rows_are_flipped_bottom_first() {
    let dir = temp_dir("flip");
    let path = dir.join("flip.png");
    let mut img = image::RgbaImage::new(1, 2);
    img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255])); // top
    img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255])); // bottom
    img.save(&path).unwrap();

    let mut reg = TileSetRegistry::new();
    let ts = reg.load_or_get(path.to_str().unwrap()).unwrap();
    assert_eq!(&ts.atlas().pixels()[..4], &[0, 0, 255, 255]);
}

#[test]
fn missing_map_file_is_io_error() {
    let dir = temp_dir("missing");
    let mut reg = TileSetRegistry::new();
    let err = load_map_file(dir.join("nope.json"), &mut reg).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
}

#[test]
fn failed_save_keeps_previous_file() {
    let dir = temp_dir("failed_save");
    let path = dir.join("keep.json");
    fs::write(&path, "previous contents").unwrap();

    // a directory squatting on the temp name makes the write fail
    fs::create_dir_all(dir.join("keep.json.tmp")).unwrap();
    let grid = TileGrid::new("m", 1, 1, 8).unwrap();
    let err = grid.save(&path).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous contents");
}

#[test]
fn failed_save_leaves_no_temp_file() {
    let dir = temp_dir("failed_rename");
    // a non-empty directory in place of the target makes the rename fail
    let path = dir.join("taken.json");
    fs::create_dir_all(path.join("inner")).unwrap();

    let grid = TileGrid::new("m", 1, 1, 8).unwrap();
    let err = grid.save(&path).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
    assert!(!dir.join("taken.json.tmp").exists());
    assert!(path.join("inner").is_dir());
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = temp_dir("malformed");
    let path = dir.join("bad.json");
    fs::write(&path, "{ not valid json").unwrap();

    let mut reg = TileSetRegistry::new();
    assert!(matches!(
        load_map_file(&path, &mut reg),
        Err(MapError::Parse(_))
    ));
}

#[test]
fn load_ignores_extra_fields() {
    let dir = temp_dir("extra");
    let path = dir.join("extra.json");
    fs::write(
        &path,
        r#"{ "name": "x", "columns": 1, "rows": 1, "tileSize": 8,
             "tiles": [65535], "tileSets": [], "layers": [] }"#,
    )
    .unwrap();

    let mut reg = TileSetRegistry::new();
    let grid = load_map_file(&path, &mut reg).unwrap();
    assert!(grid.get(0, 0).is_empty());
}
