use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use macroquad::prelude::*;
use tilegrid_editor::{Direction, EditorConfig, EditorSession, TaskQueue};

/// Minimal tile map editor window
#[derive(Parser)]
#[command(version, about = "Paint, resize and save JSON tile maps")]
struct Cli {
    /// INI file with map and window defaults.
    #[arg(long, value_name = "PATH", default_value = "editor.ini")]
    config: PathBuf,

    /// Map to open on start-up.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,

    /// Tilesets to add to the map.
    #[arg(long = "tileset", value_name = "PATH")]
    tilesets: Vec<String>,
}

fn load_config(path: &Path) -> EditorConfig {
    let mut config = EditorConfig::with_path(path);
    if let Err(e) = config.load_from_file() {
        log::warn!("{e}; using defaults");
    }
    config
}

fn window_conf() -> Conf {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    Conf {
        window_title: "Tile Map Editor".into(),
        window_width: config.window_width as i32,
        window_height: config.window_height as i32,
        ..Default::default()
    }
}

fn start_session(cli: &Cli) -> anyhow::Result<EditorSession> {
    let mut session = EditorSession::new(load_config(&cli.config));
    session.new_map().context("Creating the initial map")?;
    Ok(session)
}

fn arrow_direction() -> Option<Direction> {
    if is_key_pressed(KeyCode::Left) {
        Some(Direction::Left)
    } else if is_key_pressed(KeyCode::Right) {
        Some(Direction::Right)
    } else if is_key_pressed(KeyCode::Up) {
        Some(Direction::Top)
    } else if is_key_pressed(KeyCode::Down) {
        Some(Direction::Bottom)
    } else {
        None
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut session = match start_session(&cli) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e:#}");
            return;
        }
    };

    let tasks = TaskQueue::new();
    if let Some(path) = cli.map.clone() {
        // stands in for a file dialog running off the logic thread
        let sender = tasks.sender();
        std::thread::spawn(move || {
            sender.enqueue(move |s| {
                if let Err(e) = s.open(&path) {
                    log::error!("{e}");
                }
            });
        });
    }
    if !cli.tilesets.is_empty() {
        let paths = cli.tilesets.clone();
        tasks.enqueue(move |s| {
            if let Err(e) = s.add_tilesets(&paths) {
                log::error!("{e}");
            }
        });
    }

    let mut textures: HashMap<String, Texture2D> = HashMap::new();

    loop {
        tasks.poll(&mut session);
        clear_background(DARKGRAY);

        let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
        let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);

        if ctrl && is_key_pressed(KeyCode::S) {
            if let Err(e) = session.save() {
                log::warn!("{e}");
            }
        }
        if ctrl {
            if let Some(dir) = arrow_direction() {
                let count = if shift { -1 } else { 1 };
                if let Err(e) = session.resize(dir, count) {
                    log::warn!("{e}");
                }
            }
        }
        for (key, slot) in [(KeyCode::Key1, 0u8), (KeyCode::Key2, 1), (KeyCode::Key3, 2)] {
            if is_key_pressed(key) {
                session.select_tileset(slot);
            }
        }

        let Some(map) = session.map() else {
            next_frame().await;
            continue;
        };
        let ts = map.tile_size() as f32;
        let (columns, rows) = (map.columns(), map.rows());

        for (_, tileset) in map.tilesets() {
            if !textures.contains_key(tileset.path()) {
                textures.insert(tileset.path().to_owned(), tileset.atlas().to_texture());
            }
        }

        for (x, y, tile) in map.iter() {
            let (Some(tileset), Some(uv)) = (map.tileset_for(tile), map.uv_rect(tile)) else {
                continue;
            };
            let Some(tex) = textures.get(tileset.path()) else {
                continue;
            };
            let atlas = tileset.atlas();
            draw_texture_ex(
                tex,
                x as f32 * ts,
                y as f32 * ts,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(ts, ts)),
                    source: Some(uv.to_source_rect(atlas.width(), atlas.height())),
                    // atlas rows are stored bottom first
                    flip_y: true,
                    ..Default::default()
                },
            );
        }
        draw_rectangle_lines(0.0, 0.0, columns as f32 * ts, rows as f32 * ts, 2.0, LIGHTGRAY);

        // palette: selected tileset along the right edge
        let palette_x = screen_width() - 256.0;
        if let Some(tileset) = map.tileset(session.selected_tileset()) {
            if let Some(tex) = textures.get(tileset.path()) {
                let atlas = tileset.atlas();
                draw_texture_ex(
                    tex,
                    palette_x,
                    0.0,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(atlas.width() as f32, atlas.height() as f32)),
                        flip_y: true,
                        ..Default::default()
                    },
                );
            }
        }

        let (mx, my) = mouse_position();
        if mx >= palette_x {
            if is_mouse_button_pressed(MouseButton::Left) {
                // palette is drawn upright, atlas rows count from the bottom
                let atlas_h = map
                    .tileset(session.selected_tileset())
                    .map(|t| t.atlas().height() as f32)
                    .unwrap_or(0.0);
                session.pick_tile(mx - palette_x, atlas_h - my);
            }
        } else if mx >= 0.0 && my >= 0.0 {
            let (cx, cy) = ((mx / ts) as u32, (my / ts) as u32);
            if is_mouse_button_down(MouseButton::Left) {
                session.paint(cx, cy);
            } else if is_mouse_button_down(MouseButton::Right) {
                session.erase(cx, cy);
            }
        }

        let status = format!(
            "{} {}",
            session.map_path().map(|p| p.display().to_string()).unwrap_or_else(|| "<unsaved>".into()),
            if session.is_saved() { "" } else { "*" }
        );
        draw_text(&status, 10.0, screen_height() - 10.0, 24.0, WHITE);

        next_frame().await;
    }
}
