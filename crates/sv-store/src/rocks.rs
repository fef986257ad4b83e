//! RocksDB store implementation.

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteOptions, DB};
use shared_types::{ChainPublicKey, SchnorrRandPair, ValidatorRecord};
use std::path::PathBuf;
use sv_agent::{StoreError, ValidatorStore};
use tracing::debug;

/// Column family holding validator records.
pub const CF_VALIDATORS: &str = "validators";
/// Column family holding committed randomness pairs.
pub const CF_RAND_PAIRS: &str = "rand_pairs";

const COLUMN_FAMILIES: &[&str] = &[CF_VALIDATORS, CF_RAND_PAIRS];

/// RocksDB configuration for the validator store.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Write buffer size in bytes (default: 16MB; the working set is tiny)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true; losing a committed
    /// randomness pair is a safety violation, not an inconvenience)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/validator-store"),
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests (no fsync, small buffers).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed validator store.
pub struct RocksDbStore {
    db: DB,
    write_opts: WriteOptions,
}

impl RocksDbStore {
    /// Open or create the database at the configured path.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Backend {
                reason: format!("failed to open {}: {e}", config.path.display()),
            })?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(config.sync_writes);

        debug!(path = %config.path.display(), "opened validator store");
        Ok(Self { db, write_opts })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db.cf_handle(name).ok_or_else(|| StoreError::Backend {
            reason: format!("missing column family {name}"),
        })
    }

    fn rand_key(chain_pk: &ChainPublicKey, height: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(40);
        key.extend_from_slice(chain_pk.as_bytes());
        key.extend_from_slice(&height.to_be_bytes());
        key
    }
}

fn backend_err(e: rocksdb::Error) -> StoreError {
    StoreError::Backend {
        reason: e.to_string(),
    }
}

fn codec_err(e: bincode::Error) -> StoreError {
    StoreError::Codec {
        reason: e.to_string(),
    }
}

impl ValidatorStore for RocksDbStore {
    fn get_validator(
        &self,
        chain_pk: &ChainPublicKey,
    ) -> Result<Option<ValidatorRecord>, StoreError> {
        let cf = self.cf(CF_VALIDATORS)?;
        match self.db.get_cf(cf, chain_pk.as_bytes()).map_err(backend_err)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(codec_err)?)),
            None => Ok(None),
        }
    }

    fn save_validator(&mut self, record: &ValidatorRecord) -> Result<(), StoreError> {
        let cf = self.cf(CF_VALIDATORS)?;
        let bytes = bincode::serialize(record).map_err(codec_err)?;
        self.db
            .put_cf_opt(cf, record.chain_pk.as_bytes(), bytes, &self.write_opts)
            .map_err(backend_err)
    }

    fn list_validators(&self) -> Result<Vec<ValidatorRecord>, StoreError> {
        let cf = self.cf(CF_VALIDATORS)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, bytes) = item.map_err(backend_err)?;
            records.push(bincode::deserialize(&bytes).map_err(codec_err)?);
        }
        Ok(records)
    }

    fn save_rand_pair(
        &mut self,
        chain_pk: &ChainPublicKey,
        height: u64,
        pair: &SchnorrRandPair,
    ) -> Result<(), StoreError> {
        // Exactly-once: identical material is a no-op, different material is
        // a conflict, never an overwrite.
        match self.get_rand_pair(chain_pk, height)? {
            Some(existing) if existing == *pair => return Ok(()),
            Some(_) => return Err(StoreError::RandPairConflict { height }),
            None => {}
        }
        let cf = self.cf(CF_RAND_PAIRS)?;
        let bytes = bincode::serialize(pair).map_err(codec_err)?;
        self.db
            .put_cf_opt(cf, Self::rand_key(chain_pk, height), bytes, &self.write_opts)
            .map_err(backend_err)
    }

    fn get_rand_pair(
        &self,
        chain_pk: &ChainPublicKey,
        height: u64,
    ) -> Result<Option<SchnorrRandPair>, StoreError> {
        let cf = self.cf(CF_RAND_PAIRS)?;
        match self
            .db
            .get_cf(cf, Self::rand_key(chain_pk, height))
            .map_err(backend_err)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(codec_err)?)),
            None => Ok(None),
        }
    }
}
