pub mod chat;
pub mod config;
pub mod layout;
pub mod timer;

use std::path::Path;
use std::rc::Rc;

use overlayroom_core::storage::StorageBackend;
use overlayroom_core::{Config, Database, HeadlessRenderer, KvStore, MemoryStore, OverlayContext};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load the config and bring up the overlay on the configured store.
pub fn open_context(memory: bool) -> CliResult<OverlayContext> {
    let config = Config::load()?;
    let store: Rc<dyn KvStore> = if memory || config.storage.backend == StorageBackend::Memory {
        Rc::new(MemoryStore::new())
    } else {
        match config.storage.database_path.as_deref() {
            Some(path) => Rc::new(Database::open_at(Path::new(path))?),
            None => Rc::new(Database::open()?),
        }
    };
    let ctx = OverlayContext::new(config, store, Box::new(HeadlessRenderer::new()))?;
    Ok(ctx)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
