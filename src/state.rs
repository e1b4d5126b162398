use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::forum::backend::DynForumBackend;
use crate::forum::repository::SqliteForumBackend;
use crate::forum::storage::ObjectStore;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub backend: DynForumBackend,
    pub store: ObjectStore,
}

impl AppState {
    /// Wire the SQLite backend and object store from config.
    pub fn new(db: DbPool, config: Config) -> Self {
        let store = ObjectStore::new(config.uploads_path(), config.storage.public_url.clone());
        let backend = SqliteForumBackend::new(
            db.clone(),
            store.clone(),
            config.storage.max_object_bytes,
        );
        Self {
            db,
            config,
            backend: Arc::new(backend),
            store,
        }
    }
}
