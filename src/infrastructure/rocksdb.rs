use crate::domain::ports::KeyValueStorage;
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family standing in for origin-scoped storage.
pub const CF_LOCAL: &str = "local";
/// Column Family standing in for tab-scoped session storage.
pub const CF_SESSION: &str = "session";

/// A persistent key/value storage backed by one RocksDB column family.
///
/// Both handles returned by [`RocksDBStorage::open`] share the same `Arc<DB>`,
/// which keeps the registration list and the session slot in one database
/// while keeping their keys apart.
#[derive(Clone)]
pub struct RocksDBStorage {
    db: Arc<DB>,
    column_family: &'static str,
}

impl RocksDBStorage {
    /// Opens or creates a RocksDB instance at `path`.
    ///
    /// Returns `(local, session)` storages.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<(Self, Self)> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_local = ColumnFamilyDescriptor::new(CF_LOCAL, Options::default());
        let cf_session = ColumnFamilyDescriptor::new(CF_SESSION, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_local, cf_session])
            .map_err(storage_error)?;
        let db = Arc::new(db);

        Ok((
            Self {
                db: db.clone(),
                column_family: CF_LOCAL,
            },
            Self {
                db,
                column_family: CF_SESSION,
            },
        ))
    }

    fn handle(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(self.column_family).ok_or_else(|| {
            RegistrationError::Storage(format!(
                "Column family '{}' not found",
                self.column_family
            ))
        })
    }
}

fn storage_error(e: rocksdb::Error) -> RegistrationError {
    RegistrationError::Storage(e.to_string())
}

#[async_trait]
impl KeyValueStorage for RocksDBStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let cf = self.handle()?;
        let Some(bytes) = self.db.get_cf(cf, key.as_bytes()).map_err(storage_error)? else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| RegistrationError::Storage(format!("Invalid UTF-8 under '{}': {}", key, e)))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let cf = self.handle()?;
        self.db
            .put_cf(cf, key.as_bytes(), value.as_bytes())
            .map_err(storage_error)
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let cf = self.handle()?;
        self.db.delete_cf(cf, key.as_bytes()).map_err(storage_error)
    }
}
