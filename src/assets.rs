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

//! Caller-facing asset management API.

use std::error::Error as StdError;
use std::sync::{Mutex, MutexGuard, PoisonError};

use amplify::confinement;

use crate::registry::{PersistError, RegistryError};
use crate::store::AssetStore;
use crate::{Amount, AssetNo, AssetRecord, AssetRegistry, AssetStat, AssetStatus};

/// Maximal number of characters kept from an asset name.
pub const MAX_NAME_LEN: usize = 6;
/// Maximal number of characters kept from an asset description.
pub const MAX_DESCRIPTION_LEN: usize = 32;

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum IssueError<E: StdError> {
    /// asset name must not be empty.
    EmptyName,

    /// asset scale must be positive, not {0}.
    InvalidScale(i64),

    /// total supply of {0} units at the given scale is not a positive number of smallest units.
    InvalidSupply(i64),

    /// asset named '{0}' already exists.
    NameExists(String),

    /// no free asset number is left.
    NoFreeId,

    /// asset {0} is unknown.
    NotFound(AssetNo),

    /// asset metadata is too long. {0}
    #[from]
    TooLong(confinement::Error),

    #[from]
    #[display(inner)]
    Registry(RegistryError),

    #[from]
    #[display(inner)]
    Persist(PersistError<E>),
}

impl<E: StdError> IssueError<E> {
    fn from_registry(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => IssueError::NotFound(id),
            err => IssueError::Registry(err),
        }
    }
}

/// Outcome of a lock or unlock request.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum LockOutcome {
    #[display("done")]
    Done,

    /// The asset already had the requested status.
    #[display("already")]
    Already,
}

/// Parameters of a new asset.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct IssueParams {
    pub name: String,
    pub description: String,
    pub creator: String,
    /// Supply cap in display units.
    pub total_supply: i64,
    /// Smallest units per display unit.
    pub scale: i64,
}

impl IssueParams {
    pub fn new(name: impl ToString, total_supply: i64, scale: i64) -> Self {
        IssueParams { name: name.to_string(), total_supply, scale, ..default!() }
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_creator(mut self, creator: impl ToString) -> Self {
        self.creator = creator.to_string();
        self
    }
}

/// Asset registry with every change persisted before it is reported as done.
#[derive(Debug)]
pub struct Assets<S: AssetStore> {
    registry: AssetRegistry<S>,
    // Serializes each registry change with its persistence.
    writer: Mutex<()>,
}

impl<S: AssetStore> Assets<S> {
    /// Creates a fresh set of assets containing only the native one, without
    /// touching the store.
    pub fn new(store: S) -> Self { Self::with(AssetRegistry::new(store)) }

    pub fn with(registry: AssetRegistry<S>) -> Self { Self { registry, writer: none!() } }

    /// Loads assets and their statistics from the store.
    pub fn load(store: S) -> Result<Self, PersistError<S::Error>> {
        let registry = AssetRegistry::new(store);
        registry.load()?;
        registry.load_stats()?;
        Ok(Self::with(registry))
    }

    /// Loads assets from the store, initializing the store with the native
    /// asset if it contains no asset table yet.
    pub fn open(store: S) -> Result<Self, PersistError<S::Error>> {
        let registry = AssetRegistry::new(store);
        match registry.load() {
            Ok(count) => debug!("Loaded {count} assets"),
            Err(PersistError::NotFound(_)) => {
                info!("Asset table is absent; initializing it with the native asset");
                registry.persist()?;
            }
            Err(err) => return Err(err),
        }
        registry.load_stats()?;
        Ok(Self::with(registry))
    }

    pub fn registry(&self) -> &AssetRegistry<S> { &self.registry }

    pub fn into_registry(self) -> AssetRegistry<S> { self.registry }

    /// Issues a new asset under the next free asset number.
    ///
    /// Name and description are truncated to [`MAX_NAME_LEN`] and
    /// [`MAX_DESCRIPTION_LEN`] characters; the truncated name must be unique.
    pub fn create_asset(&self, params: IssueParams) -> Result<AssetNo, IssueError<S::Error>> {
        let name = params.name.chars().take(MAX_NAME_LEN).collect::<String>();
        if name.is_empty() {
            return Err(IssueError::EmptyName);
        }
        if params.scale <= 0 {
            return Err(IssueError::InvalidScale(params.scale));
        }
        let max_supply = Amount::with_scale_checked(params.total_supply, params.scale)
            .filter(|max| *max > Amount::ZERO)
            .ok_or(IssueError::InvalidSupply(params.total_supply))?;
        let description = params
            .description
            .chars()
            .take(MAX_DESCRIPTION_LEN)
            .collect::<String>();

        let _guard = self.lock_writer();
        if self
            .registry
            .get_all()
            .iter()
            .any(|record| record.name.as_str() == name)
        {
            return Err(IssueError::NameExists(name));
        }
        let id = self.registry.next_id().ok_or(IssueError::NoFreeId)?;
        let record =
            AssetRecord::new(id, &name, &description, &params.creator, params.scale, max_supply)?;
        self.registry.create(record)?;

        if let Err(err) = self.registry.persist() {
            warn!("Asset {id} is dropped since it can't be persisted");
            self.registry.remove(id)?;
            return Err(err.into());
        }
        info!("Asset {id} '{name}' issued with supply cap {max_supply}");
        Ok(id)
    }

    pub fn lock_asset(&self, id: AssetNo) -> Result<LockOutcome, IssueError<S::Error>> {
        self.change_lock(id, true)
    }

    pub fn unlock_asset(&self, id: AssetNo) -> Result<LockOutcome, IssueError<S::Error>> {
        self.change_lock(id, false)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn change_lock(&self, id: AssetNo, lock: bool) -> Result<LockOutcome, IssueError<S::Error>> {
        let _guard = self.lock_writer();
        let apply = |lock: bool| {
            if lock { self.registry.lock(id) } else { self.registry.unlock(id) }
        };
        let changed = apply(lock).map_err(IssueError::from_registry)?;
        if !changed {
            return Ok(LockOutcome::Already);
        }
        if let Err(err) = self.registry.persist() {
            warn!("Status change of asset {id} is reverted since it can't be persisted");
            apply(!lock)?;
            return Err(err.into());
        }
        Ok(LockOutcome::Done)
    }

    /// Replaces the status flags of an asset, returning the previous ones.
    pub fn set_status(
        &self,
        id: AssetNo,
        status: AssetStatus,
    ) -> Result<AssetStatus, IssueError<S::Error>> {
        let _guard = self.lock_writer();
        let old = self
            .registry
            .update_status(id, status)
            .map_err(IssueError::from_registry)?;
        if old == status {
            return Ok(old);
        }
        if let Err(err) = self.registry.persist() {
            warn!("Status change of asset {id} is reverted since it can't be persisted");
            self.registry.update_status(id, old)?;
            return Err(err.into());
        }
        Ok(old)
    }

    pub fn get_asset(&self, id: AssetNo) -> Option<AssetRecord> { self.registry.get(id) }

    pub fn list_assets(&self) -> Vec<AssetRecord> { self.registry.get_all() }

    pub fn asset_stat(&self, id: AssetNo) -> Option<AssetStat> { self.registry.stat(id) }

    pub fn list_stats(&self) -> Vec<AssetStat> { self.registry.stats() }
}
