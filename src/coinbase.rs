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

use crate::resolvers::MintedSupply;
use crate::store::AssetStore;
use crate::validation::{RejectReason, TxValidator, MIN_COINBASE_SCRIPT_LEN};
use crate::{
    Amount, AssetNo, AssetRegistry, Outpoint, ScriptBytes, Transaction, TxIn, TxOut,
};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum MintError {
    /// asset {0} is unknown.
    UnknownAsset(AssetNo),

    /// asset {0} is disabled and can't be minted.
    DisabledAsset(AssetNo),

    /// mint amount {0} is outside of the asset supply range.
    InvalidAmount(Amount),

    /// coinbase fee {0} is negative.
    NegativeFee(Amount),

    /// minting {requested} would exceed the supply cap; only {remaining} can still be minted.
    CapExceeded { requested: Amount, remaining: Amount },

    /// constructed coinbase is invalid. {0}
    #[from]
    Rejected(RejectReason),
}

/// Parameters of a coinbase mint.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MintRequest {
    pub asset: AssetNo,
    pub amount: Amount,
    /// Script receiving the minted amount and the fee.
    pub destination: ScriptBytes,
    /// Native asset fee collected by the block; ignored when zero for the
    /// native asset.
    pub fee: Amount,
    pub height: u32,
    /// Block timestamp, used for daily statistics.
    pub block_time: i64,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct Minted {
    pub tx: Transaction,
    /// Amount of the asset which may still be minted after this coinbase.
    pub remaining: Amount,
}

/// Builds coinbase transactions minting an asset within its supply cap.
pub struct CoinbaseBuilder<'a, S: AssetStore, M: MintedSupply + ?Sized> {
    registry: &'a AssetRegistry<S>,
    supply: &'a M,
}

impl<'a, S: AssetStore, M: MintedSupply + ?Sized> CoinbaseBuilder<'a, S, M> {
    pub fn new(registry: &'a AssetRegistry<S>, supply: &'a M) -> Self {
        Self { registry, supply }
    }

    /// Amount of the asset which may still be minted on the current chain.
    pub fn remaining(&self, asset: AssetNo) -> Result<Amount, MintError> {
        let record = self
            .registry
            .get(asset)
            .ok_or(MintError::UnknownAsset(asset))?;
        let minted = self.supply.minted_supply(asset).max(Amount::ZERO);
        Ok(record
            .max_supply
            .saturating_sub(minted)
            .max(Amount::ZERO))
    }

    /// Constructs the coinbase and records the mint in the registry
    /// statistics.
    pub fn build(&self, request: MintRequest) -> Result<Minted, MintError> {
        let asset = request.asset;
        let record = self
            .registry
            .get(asset)
            .ok_or(MintError::UnknownAsset(asset))?;
        if record.is_locked() {
            return Err(MintError::DisabledAsset(asset));
        }
        if !record.money_range(request.amount) {
            return Err(MintError::InvalidAmount(request.amount));
        }
        if request.fee.is_negative() {
            return Err(MintError::NegativeFee(request.fee));
        }

        let remaining = self.remaining(asset)?;
        if request.amount > remaining {
            debug!("Mint of {} units of asset {asset} exceeds remaining {remaining}", request.amount);
            return Err(MintError::CapExceeded { requested: request.amount, remaining });
        }

        let mut input = TxIn::new(Outpoint::null());
        input.script_sig = height_script(request.height);
        let mut outputs = vec![TxOut::new(request.amount, request.destination.clone())];
        if !asset.is_native() || request.fee > Amount::ZERO {
            outputs.push(TxOut::new(request.fee, request.destination));
        }
        let tx = Transaction::new(asset, vec![input], outputs);
        TxValidator::new(self.registry).check_transaction(&tx, false)?;

        self.registry.record_mint(asset, request.amount);
        self.registry
            .record_mint_today(asset, request.amount, request.block_time);
        info!(
            "Coinbase at height {} mints {} units of asset {asset}",
            request.height, request.amount
        );

        Ok(Minted { tx, remaining: remaining.saturating_sub(request.amount) })
    }
}

/// Block height as little-endian bytes without trailing zeros, padded to the
/// minimal coinbase script length.
fn height_script(height: u32) -> ScriptBytes {
    let mut script = height.to_le_bytes().to_vec();
    while script.len() > MIN_COINBASE_SCRIPT_LEN && script.last() == Some(&0) {
        script.pop();
    }
    ScriptBytes::from(script)
}
