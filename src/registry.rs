use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::MapError;
use crate::tileset::{Atlas, TileSet};

/// Shared reference to a cached tileset.
pub type TileSetHandle = Rc<TileSet>;

/// Path-keyed tileset cache. Each distinct path is decoded at most once and lives
/// until the registry is dropped; nothing is evicted.
///
/// Not `Send`: the registry belongs to the editor's logic thread.
#[derive(Debug, Default)]
pub struct TileSetRegistry {
    sets: HashMap<String, TileSetHandle>,
}

impl TileSetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tileset for `path`, decoding it on first use.
    ///
    /// A failed decode inserts nothing, so a later call retries.
    pub fn load_or_get(&mut self, path: &str) -> Result<TileSetHandle, MapError> {
        if let Some(handle) = self.sets.get(path) {
            debug!("tileset cache hit: {path}");
            return Ok(Rc::clone(handle));
        }

        let handle = Rc::new(TileSet::load(path)?);
        debug!(
            "tileset cache miss: {path} ({}x{})",
            handle.atlas().width(),
            handle.atlas().height()
        );
        self.sets.insert(path.to_owned(), Rc::clone(&handle));
        Ok(handle)
    }

    /// Register an atlas that was decoded elsewhere. An existing entry for `path` wins.
    pub fn insert(&mut self, path: &str, atlas: Atlas) -> TileSetHandle {
        Rc::clone(
            self.sets
                .entry(path.to_owned())
                .or_insert_with(|| Rc::new(TileSet::new(path, atlas))),
        )
    }

    /// Cached tileset for `path`, without loading.
    pub fn get(&self, path: &str) -> Option<TileSetHandle> {
        self.sets.get(path).cloned()
    }

    /// Whether `path` has been loaded.
    pub fn contains(&self, path: &str) -> bool {
        self.sets.contains_key(path)
    }

    /// Number of cached tilesets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
