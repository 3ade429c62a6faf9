// Multi-asset registry and asset-aware transaction rules for UTXO chains
//
// SPDX-License-Identifier: Apache-2.0
//
// Designed in 2019-2025 by Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
// Written in 2024-2025 by Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2024 LNP/BP Standards Association, Switzerland.
// Copyright (C) 2024-2025 LNP/BP Laboratories,
//                         Institute for Distributed and Cognitive Systems (InDCS), Switzerland.
// Copyright (C) 2025 RGB Consortium, Switzerland.
// Copyright (C) 2019-2025 Dr Maxim Orlovsky.
// All rights under the above copyrights are reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Authoritative in-memory asset table with explicit persistence.

use std::error::Error as StdError;
use std::sync::{Mutex, MutexGuard, PoisonError};

use amplify::confinement::{self, Confined, SmallVec, U24};
use indexmap::IndexMap;
use strict_encoding::{DeserializeError, SerializeError, StrictDeserialize, StrictSerialize};

use crate::resolvers::AssetResolver;
use crate::store::AssetStore;
use crate::{
    Amount, AssetFlag, AssetNo, AssetRecord, AssetStat, AssetStatus, ASSET_KEY, ASSET_STAT_KEY,
    LIB_NAME_COIN_ASSETS,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum RegistryError {
    /// asset number {0} is negative.
    InvalidId(AssetNo),

    /// asset {0} has an empty name.
    EmptyName(AssetNo),

    /// asset {0} must have a positive scale.
    InvalidScale(AssetNo),

    /// asset {0} must have a positive supply cap.
    InvalidSupply(AssetNo),

    /// asset {0} is already registered with different parameters.
    Conflict(AssetNo),

    /// asset {0} is unknown.
    NotFound(AssetNo),

    /// the native asset record can't be modified or removed.
    NativeAsset,

    /// the asset table has reached its maximum size.
    TooManyAssets,
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum PersistError<E: StdError> {
    /// asset store failure: {0}
    Store(E),

    /// nothing is stored under the '{0}' key.
    NotFound(&'static str),

    /// stored asset data exceed size limits. {0}
    #[from]
    Size(confinement::Error),

    /// unable to encode asset data. {0}
    #[from]
    Encode(SerializeError),

    /// stored asset data are corrupted. {0}
    #[from]
    Decode(DeserializeError),

    /// stored asset table is empty.
    Empty,

    /// stored asset data contain asset {0} more than once.
    DuplicateAsset(AssetNo),

    /// stored asset table belongs to an incompatible chain: its first record is not the native
    /// asset.
    IncompatibleNative,
}

/// Persisted form of the asset table: records in insertion order, native
/// asset first.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
struct AssetTable(SmallVec<AssetRecord>);

impl StrictSerialize for AssetTable {}
impl StrictDeserialize for AssetTable {}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
struct StatTable(SmallVec<AssetStat>);

impl StrictSerialize for StatTable {}
impl StrictDeserialize for StatTable {}

#[derive(Debug)]
struct Registry<S: AssetStore> {
    records: IndexMap<AssetNo, AssetRecord>,
    stats: IndexMap<AssetNo, AssetStat>,
    store: S,
}

impl<S: AssetStore> Registry<S> {
    fn record_mut(&mut self, id: AssetNo) -> Result<&mut AssetRecord, RegistryError> {
        if id.is_native() {
            return Err(RegistryError::NativeAsset);
        }
        self.records.get_mut(&id).ok_or(RegistryError::NotFound(id))
    }

    fn stat_mut(&mut self, id: AssetNo) -> &mut AssetStat {
        self.stats.entry(id).or_insert_with(|| AssetStat::new(id))
    }
}

/// Table of all assets known to the node.
///
/// A single mutex covers both the records and the statistics; every accessor
/// returns point-in-time copies, so no caller keeps a reference into the
/// table after the lock is released.
#[derive(Debug)]
pub struct AssetRegistry<S: AssetStore> {
    inner: Mutex<Registry<S>>,
}

impl<S: AssetStore> AssetRegistry<S> {
    /// Constructs registry containing only the native asset. Use [`Self::load`]
    /// to restore the persisted state.
    pub fn new(store: S) -> Self {
        let native = AssetRecord::native();
        let mut records = IndexMap::new();
        records.insert(native.id, native);
        Self { inner: Mutex::new(Registry { records, stats: none!(), store }) }
    }

    pub fn into_store(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .store
    }

    // The guarded data are plain maps updated by single statements, thus a
    // panic in another thread can't leave them half-modified.
    fn lock_inner(&self) -> MutexGuard<'_, Registry<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new asset.
    ///
    /// Registering a record identical to an already known one succeeds and
    /// leaves the table unchanged; a different record under a known id is a
    /// conflict.
    pub fn create(&self, record: AssetRecord) -> Result<(), RegistryError> {
        let id = record.id;
        if id.value() < 0 {
            return Err(RegistryError::InvalidId(id));
        }
        if record.name.is_empty() {
            return Err(RegistryError::EmptyName(id));
        }
        if record.scale <= 0 {
            return Err(RegistryError::InvalidScale(id));
        }
        if record.max_supply <= Amount::ZERO {
            return Err(RegistryError::InvalidSupply(id));
        }

        let mut inner = self.lock_inner();
        match inner.records.get(&id) {
            Some(known) if *known != record => {
                debug!("Asset {id} is already registered with different parameters");
                return Err(RegistryError::Conflict(id));
            }
            Some(_) => {
                debug!("Asset {id} is already registered");
            }
            None if inner.records.len() >= u16::MAX as usize => {
                return Err(RegistryError::TooManyAssets);
            }
            None => {
                info!("Registering asset {id} '{}' with cap {}", record.name, record.max_supply);
            }
        }
        inner.records.insert(id, record);
        Ok(())
    }

    /// Removes asset record, keeping its statistics.
    pub fn remove(&self, id: AssetNo) -> Result<AssetRecord, RegistryError> {
        let mut inner = self.lock_inner();
        inner.record_mut(id)?;
        let record = inner
            .records
            .shift_remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        info!("Asset {id} removed from the registry");
        Ok(record)
    }

    /// Sets the `DISABLED` flag. Returns whether the status has changed.
    pub fn lock(&self, id: AssetNo) -> Result<bool, RegistryError> {
        self.set_flag(id, AssetFlag::Disabled, true)
    }

    /// Clears the `DISABLED` flag. Returns whether the status has changed.
    pub fn unlock(&self, id: AssetNo) -> Result<bool, RegistryError> {
        self.set_flag(id, AssetFlag::Disabled, false)
    }

    fn set_flag(&self, id: AssetNo, flag: AssetFlag, set: bool) -> Result<bool, RegistryError> {
        let mut inner = self.lock_inner();
        let record = inner.record_mut(id)?;
        let old = record.status;
        record.status = if set { old.with(flag) } else { old.without(flag) };
        let changed = old != record.status;
        if changed {
            info!("Asset {id} status changed from {old} to {}", record.status);
        }
        Ok(changed)
    }

    pub fn is_locked(&self, id: AssetNo) -> bool {
        self.lock_inner()
            .records
            .get(&id)
            .map(AssetRecord::is_locked)
            .unwrap_or_default()
    }

    /// Overwrites asset status, returning the previous one.
    pub fn update_status(
        &self,
        id: AssetNo,
        status: AssetStatus,
    ) -> Result<AssetStatus, RegistryError> {
        let mut inner = self.lock_inner();
        let record = inner.record_mut(id)?;
        let old = record.status;
        record.status = status;
        if old != status {
            info!("Asset {id} status changed from {old} to {status}");
        }
        Ok(old)
    }

    pub fn get(&self, id: AssetNo) -> Option<AssetRecord> {
        self.lock_inner().records.get(&id).cloned()
    }

    /// Snapshot of all records in insertion order.
    pub fn get_all(&self) -> Vec<AssetRecord> {
        self.lock_inner().records.values().cloned().collect()
    }

    pub fn count(&self) -> usize { self.lock_inner().records.len() }

    pub fn contains(&self, id: AssetNo) -> bool { self.lock_inner().records.contains_key(&id) }

    pub fn ids(&self) -> Vec<AssetNo> { self.lock_inner().records.keys().copied().collect() }

    /// Asset number following the largest registered one.
    pub fn next_id(&self) -> Option<AssetNo> {
        self.lock_inner()
            .records
            .keys()
            .max()
            .copied()
            .unwrap_or(AssetNo::NATIVE)
            .checked_next()
    }

    /// Writes the asset table to the store.
    pub fn persist(&self) -> Result<(), PersistError<S::Error>> {
        let mut inner = self.lock_inner();
        let table = AssetTable(Confined::try_from_iter(inner.records.values().cloned())?);
        let data = table.to_strict_serialized::<U24>()?;
        inner
            .store
            .write(ASSET_KEY, data.as_slice())
            .map_err(|err| {
                warn!("Unable to persist asset table: {err}");
                PersistError::Store(err)
            })?;
        debug!("Asset table with {} records persisted", table.0.len());
        Ok(())
    }

    /// Replaces the in-memory asset table with the persisted one, returning the
    /// number of loaded records. On error the registry is left unchanged.
    pub fn load(&self) -> Result<usize, PersistError<S::Error>> {
        let mut inner = self.lock_inner();
        let data = inner
            .store
            .read(ASSET_KEY)
            .map_err(PersistError::Store)?
            .ok_or(PersistError::NotFound(ASSET_KEY))?;
        let table = AssetTable::from_strict_serialized::<U24>(Confined::try_from(data)?)?;
        match table.0.first() {
            None => return Err(PersistError::Empty),
            Some(first) if *first != AssetRecord::native() => {
                warn!("Stored asset table starts with asset {} instead of the native one", first.id);
                return Err(PersistError::IncompatibleNative);
            }
            Some(_) => {}
        }
        let mut records = IndexMap::with_capacity(table.0.len());
        for record in table.0.release() {
            let id = record.id;
            if records.insert(id, record).is_some() {
                warn!("Stored asset table contains asset {id} more than once");
                return Err(PersistError::DuplicateAsset(id));
            }
        }
        inner.records = records;
        debug!("Asset table with {} records loaded", inner.records.len());
        Ok(inner.records.len())
    }

    /// Writes mint and burn statistics to the store.
    pub fn persist_stats(&self) -> Result<(), PersistError<S::Error>> {
        let mut inner = self.lock_inner();
        let table = StatTable(Confined::try_from_iter(inner.stats.values().cloned())?);
        let data = table.to_strict_serialized::<U24>()?;
        inner
            .store
            .write(ASSET_STAT_KEY, data.as_slice())
            .map_err(|err| {
                warn!("Unable to persist asset statistics: {err}");
                PersistError::Store(err)
            })?;
        Ok(())
    }

    /// Restores mint and burn statistics. Absence of persisted statistics is
    /// not an error and results in empty statistics.
    pub fn load_stats(&self) -> Result<usize, PersistError<S::Error>> {
        let mut inner = self.lock_inner();
        let Some(data) = inner
            .store
            .read(ASSET_STAT_KEY)
            .map_err(PersistError::Store)?
        else {
            debug!("No asset statistics stored");
            inner.stats.clear();
            return Ok(0);
        };
        let table = StatTable::from_strict_serialized::<U24>(Confined::try_from(data)?)?;
        let mut stats = IndexMap::with_capacity(table.0.len());
        for stat in table.0.release() {
            let id = stat.asset_id;
            if stats.insert(id, stat).is_some() {
                return Err(PersistError::DuplicateAsset(id));
            }
        }
        inner.stats = stats;
        Ok(inner.stats.len())
    }

    pub fn record_mint(&self, id: AssetNo, amount: Amount) {
        self.lock_inner().stat_mut(id).add_minted(amount);
    }

    /// Adds to the daily mint counter; the day boundary is computed from
    /// `as_of` (unix seconds, normally the block time).
    pub fn record_mint_today(&self, id: AssetNo, amount: Amount, as_of: i64) {
        self.lock_inner()
            .stat_mut(id)
            .add_minted_today(amount, as_of);
    }

    pub fn record_destroy(&self, id: AssetNo, amount: Amount) {
        self.lock_inner().stat_mut(id).add_destroyed(amount);
    }

    pub fn stat(&self, id: AssetNo) -> Option<AssetStat> {
        self.lock_inner().stats.get(&id).cloned()
    }

    pub fn stats(&self) -> Vec<AssetStat> { self.lock_inner().stats.values().cloned().collect() }
}

impl<S: AssetStore> AssetResolver for AssetRegistry<S> {
    fn resolve_asset(&self, no: AssetNo) -> Option<AssetRecord> { self.get(no) }
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;
    use crate::MemStore;

    fn gold() -> AssetRecord {
        AssetRecord::new(AssetNo::new(1), "GOLD", "gold coin", "addr", 100, Amount::new(1000))
            .unwrap()
    }

    struct BrokenStore;

    impl AssetStore for BrokenStore {
        type Error = io::Error;

        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
            Err(io::Error::other("disk is gone"))
        }

        fn write(&mut self, _key: &str, _data: &[u8]) -> Result<(), Self::Error> {
            Err(io::Error::other("disk is gone"))
        }
    }

    #[test]
    fn native_prepopulated() {
        let registry = AssetRegistry::new(MemStore::new());
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get(AssetNo::NATIVE), Some(AssetRecord::native()));
        assert_eq!(registry.next_id(), Some(AssetNo::new(1)));
    }

    #[test]
    fn create_idempotent() {
        let registry = AssetRegistry::new(MemStore::new());
        registry.create(gold()).unwrap();
        registry.create(gold()).unwrap();
        assert_eq!(registry.count(), 2);

        let mut other = gold();
        other.max_supply = Amount::new(2000);
        assert_eq!(registry.create(other), Err(RegistryError::Conflict(AssetNo::new(1))));
        assert_eq!(registry.get(AssetNo::new(1)), Some(gold()));
        assert_eq!(registry.create(AssetRecord::native()), Ok(()));
    }

    #[test]
    fn create_validation() {
        let registry = AssetRegistry::new(MemStore::new());
        let mut record = gold();
        record.id = AssetNo::new(-1);
        assert_eq!(registry.create(record), Err(RegistryError::InvalidId(AssetNo::new(-1))));

        let mut record = gold();
        record.scale = 0;
        assert_eq!(registry.create(record), Err(RegistryError::InvalidScale(AssetNo::new(1))));

        let mut record = gold();
        record.max_supply = Amount::ZERO;
        assert_eq!(registry.create(record), Err(RegistryError::InvalidSupply(AssetNo::new(1))));

        let record =
            AssetRecord::new(AssetNo::new(2), "", "", "", 1, Amount::new(1)).unwrap();
        assert_eq!(registry.create(record), Err(RegistryError::EmptyName(AssetNo::new(2))));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn lock_unlock() {
        let registry = AssetRegistry::new(MemStore::new());
        let id = AssetNo::new(1);
        registry.create(gold()).unwrap();
        assert!(!registry.is_locked(id));
        assert_eq!(registry.lock(id), Ok(true));
        assert!(registry.is_locked(id));
        assert_eq!(registry.lock(id), Ok(false));
        assert_eq!(registry.unlock(id), Ok(true));
        assert_eq!(registry.unlock(id), Ok(false));
        assert!(!registry.is_locked(AssetNo::new(7)));
        assert_eq!(registry.lock(AssetNo::new(7)), Err(RegistryError::NotFound(AssetNo::new(7))));
        assert_eq!(registry.lock(AssetNo::NATIVE), Err(RegistryError::NativeAsset));
    }

    #[test]
    fn update_status_returns_previous() {
        let registry = AssetRegistry::new(MemStore::new());
        let id = AssetNo::new(1);
        registry.create(gold()).unwrap();
        let status = AssetStatus::from_bits(0b1010);
        assert_eq!(registry.update_status(id, status), Ok(AssetStatus::ACTIVE));
        assert_eq!(registry.update_status(id, status), Ok(status));
        assert_eq!(registry.get(id).unwrap().status.bits(), 0b1010);
    }

    #[test]
    fn remove_keeps_stats() {
        let registry = AssetRegistry::new(MemStore::new());
        let id = AssetNo::new(1);
        registry.create(gold()).unwrap();
        registry.record_mint(id, Amount::new(10));
        assert_eq!(registry.remove(id), Ok(gold()));
        assert_eq!(registry.remove(id), Err(RegistryError::NotFound(id)));
        assert_eq!(registry.remove(AssetNo::NATIVE), Err(RegistryError::NativeAsset));
        assert_eq!(registry.stat(id).unwrap().total_minted, Amount::new(10));
    }

    #[test]
    fn insertion_order() {
        let registry = AssetRegistry::new(MemStore::new());
        for no in [5, 2, 9] {
            let mut record = gold();
            record.id = AssetNo::new(no);
            registry.create(record).unwrap();
        }
        assert_eq!(registry.ids(), vec![0, 5, 2, 9].into_iter().map(AssetNo::new).collect::<Vec<_>>());
        assert_eq!(registry.next_id(), Some(AssetNo::new(10)));
    }

    #[test]
    fn persist_roundtrip() {
        let registry = AssetRegistry::new(MemStore::new());
        registry.create(gold()).unwrap();
        registry.lock(AssetNo::new(1)).unwrap();
        registry.persist().unwrap();
        let records = registry.get_all();

        let restored = AssetRegistry::new(registry.into_store());
        assert_eq!(restored.load().unwrap(), 2);
        assert_eq!(restored.get_all(), records);
    }

    #[test]
    fn load_missing() {
        let registry = AssetRegistry::new(MemStore::new());
        assert!(matches!(registry.load(), Err(PersistError::NotFound(ASSET_KEY))));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn load_rejects_foreign_native() {
        let mut native = AssetRecord::native();
        native.max_supply = Amount::new(1);
        let table = AssetTable(Confined::from_checked(vec![native, gold()]));
        let mut store = MemStore::new();
        store
            .write(ASSET_KEY, table.to_strict_serialized::<U24>().unwrap().as_slice())
            .unwrap();

        let registry = AssetRegistry::new(store);
        assert!(matches!(registry.load(), Err(PersistError::IncompatibleNative)));
        assert_eq!(registry.get_all(), vec![AssetRecord::native()]);
    }

    #[test]
    fn load_rejects_duplicates() {
        let mut forged = AssetRecord::native();
        forged.max_supply = Amount::new(1);
        forged.status = AssetStatus::from_bits(1);
        let table = AssetTable(Confined::from_checked(vec![AssetRecord::native(), gold(), forged]));
        let mut store = MemStore::new();
        store
            .write(ASSET_KEY, table.to_strict_serialized::<U24>().unwrap().as_slice())
            .unwrap();
        let registry = AssetRegistry::new(store);
        assert!(matches!(
            registry.load(),
            Err(PersistError::DuplicateAsset(id)) if id == AssetNo::NATIVE
        ));
        assert_eq!(registry.get_all(), vec![AssetRecord::native()]);

        let table = AssetTable(Confined::from_checked(vec![AssetRecord::native(), gold(), gold()]));
        let mut store = registry.into_store();
        store
            .write(ASSET_KEY, table.to_strict_serialized::<U24>().unwrap().as_slice())
            .unwrap();
        let registry = AssetRegistry::new(store);
        assert!(matches!(
            registry.load(),
            Err(PersistError::DuplicateAsset(id)) if id == AssetNo::new(1)
        ));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn load_rejects_empty_and_garbage() {
        let mut store = MemStore::new();
        store
            .write(ASSET_KEY, AssetTable::default().to_strict_serialized::<U24>().unwrap().as_slice())
            .unwrap();
        let registry = AssetRegistry::new(store);
        assert!(matches!(registry.load(), Err(PersistError::Empty)));

        let mut store = registry.into_store();
        store.write(ASSET_KEY, &[0xFF]).unwrap();
        let registry = AssetRegistry::new(store);
        assert!(matches!(registry.load(), Err(PersistError::Decode(_))));
    }

    #[test]
    fn store_errors_surface() {
        let registry = AssetRegistry::new(BrokenStore);
        registry.create(gold()).unwrap();
        assert!(matches!(registry.persist(), Err(PersistError::Store(_))));
        assert!(matches!(registry.load(), Err(PersistError::Store(_))));
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn stats_roundtrip() {
        let registry = AssetRegistry::new(MemStore::new());
        assert_eq!(registry.load_stats().unwrap(), 0);

        let id = AssetNo::new(1);
        registry.record_mint(id, Amount::new(100));
        registry.record_mint_today(id, Amount::new(100), 86_400 * 3 + 5);
        registry.record_destroy(id, Amount::new(30));
        registry.persist_stats().unwrap();
        let stats = registry.stats();

        let restored = AssetRegistry::new(registry.into_store());
        assert_eq!(restored.load_stats().unwrap(), 1);
        assert_eq!(restored.stats(), stats);
        assert_eq!(restored.stat(id).unwrap().outstanding(), Amount::new(70));
    }

    #[test]
    fn stats_deterministic() {
        let replay = || {
            let registry = AssetRegistry::new(MemStore::new());
            let id = AssetNo::new(1);
            for (amount, time) in [(5, 1_000), (7, 2_000), (11, 86_400 + 1)] {
                registry.record_mint(id, Amount::new(amount));
                registry.record_mint_today(id, Amount::new(amount), time);
            }
            registry.stat(id).unwrap()
        };
        let stat = replay();
        assert_eq!(stat, replay());
        assert_eq!(stat.total_minted, Amount::new(23));
        assert_eq!(stat.total_minted_today, Amount::new(11));
    }
}
