//! Schema version bookkeeping in the `meta` database.

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use crate::LmdbError;

/// The schema version that the current code writes and expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub(crate) fn read_schema_version(
    meta_db: &Database<Bytes, Bytes>,
    txn: &RoTxn,
) -> Result<u32, LmdbError> {
    match meta_db.get(txn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                LmdbError::Serialization("schema_version has unexpected byte length".to_string())
            })?;
            Ok(u32::from_le_bytes(arr))
        }
        None => Ok(0),
    }
}

/// Stamp a fresh database with the current schema version, or check that an
/// existing one is not newer than this code understands.
pub(crate) fn ensure_schema(
    meta_db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
) -> Result<(), LmdbError> {
    let stored = read_schema_version(meta_db, wtxn)?;

    if stored == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    if stored > CURRENT_SCHEMA_VERSION {
        return Err(LmdbError::SchemaTooNew {
            stored,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    meta_db.put(wtxn, SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_le_bytes())?;
    tracing::debug!(from = stored, to = CURRENT_SCHEMA_VERSION, "schema version stamped");
    Ok(())
}
