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

#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports,
    dead_code,
    // missing_docs
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

// REGISTRY:
// create    :: AssetRecord -> Registry          -- idempotent for identical records
// lock      :: Registry, AssetNo -> Registry    -- sets `DISABLED`
// persist   :: Registry -> Store                -- key "asset"
// load      :: Store -> Registry                -- checks the native record
//
// CONSENSUS:
// split     :: Transaction -> Split<TxOut>      -- last output pays native fee
// check     :: Transaction, Resolver -> ()      -- supply caps, unknown assets
//
// MINING:
// mint      :: Registry, MintedSupply, MintRequest -> Coinbase

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate strict_encoding;
#[macro_use]
extern crate log;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

mod amount;
mod asset;
mod tx;
pub mod codec;
pub mod store;
mod registry;
mod resolvers;
pub mod validation;
mod coinbase;
mod assets;

pub use amount::Amount;
pub use asset::{AssetFlag, AssetNo, AssetRecord, AssetStat, AssetStatus};
pub use assets::{
    Assets, IssueError, IssueParams, LockOutcome, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};
pub use codec::{split_inputs, split_outputs, Split};
pub use coinbase::{CoinbaseBuilder, MintError, MintRequest, Minted};
pub use registry::{AssetRegistry, PersistError, RegistryError};
pub use resolvers::{AssetResolver, CoinbaseLedger, MintedSupply};
#[cfg(feature = "fs")]
pub use store::FsStore;
pub use store::{AssetStore, MemStore};
pub use tx::{Outpoint, ScriptBytes, Transaction, TxIn, TxOut, Txid};
pub use validation::{RejectClass, RejectReason, TxValidator};

/// Name of the strict type library for the persisted asset tables.
pub const LIB_NAME_COIN_ASSETS: &str = "CoinAssets";

/// Number of smallest units in one display unit of the native asset.
pub const COIN: i64 = 100_000_000;

/// Supply cap of the native asset, in smallest units.
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

/// Store key under which the asset table is persisted.
pub const ASSET_KEY: &str = "asset";

/// Store key under which the mint/burn statistics are persisted.
pub const ASSET_STAT_KEY: &str = "asset-stat";
