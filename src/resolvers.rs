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

use crate::{Amount, AssetNo, AssetRecord, Transaction};

/// Source of asset definitions for transaction validation.
pub trait AssetResolver {
    /// Returns a point-in-time copy of the asset record, if the asset exists.
    fn resolve_asset(&self, no: AssetNo) -> Option<AssetRecord>;
}

impl<R: AssetResolver + ?Sized> AssetResolver for &R {
    fn resolve_asset(&self, no: AssetNo) -> Option<AssetRecord> { (**self).resolve_asset(no) }
}

/// Chain scan reporting the amount of an asset already minted by coinbase
/// transactions of the current best chain.
pub trait MintedSupply {
    fn minted_supply(&self, asset: AssetNo) -> Amount;
}

impl<M: MintedSupply + ?Sized> MintedSupply for &M {
    fn minted_supply(&self, asset: AssetNo) -> Amount { (**self).minted_supply(asset) }
}

/// Coinbase transactions of the best chain, in block order.
///
/// Minted supply of an asset is the sum of the first outputs of all
/// coinbases carrying that asset number; the remaining coinbase outputs are
/// fees and do not count.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct CoinbaseLedger {
    coinbases: Vec<Transaction>,
}

impl CoinbaseLedger {
    pub fn new() -> Self { none!() }

    /// Appends coinbase of the next block. Returns `false` and ignores the
    /// transaction if it is not a coinbase or its mint output is absent or
    /// negative.
    pub fn push(&mut self, tx: Transaction) -> bool {
        if !tx.is_coinbase() {
            debug!("Ignoring non-coinbase transaction in the coinbase ledger");
            return false;
        }
        match tx.outputs.first() {
            Some(out) if !out.value.is_negative() => {}
            _ => {
                debug!("Ignoring coinbase of asset {} without a valid mint output", tx.asset_no);
                return false;
            }
        }
        self.coinbases.push(tx);
        true
    }

    /// Drops the coinbase of the tip block, for chain reorganizations.
    pub fn pop(&mut self) -> Option<Transaction> { self.coinbases.pop() }

    pub fn len(&self) -> usize { self.coinbases.len() }

    pub fn is_empty(&self) -> bool { self.coinbases.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> { self.coinbases.iter() }
}

impl FromIterator<Transaction> for CoinbaseLedger {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        let mut ledger = CoinbaseLedger::new();
        for tx in iter {
            ledger.push(tx);
        }
        ledger
    }
}

impl MintedSupply for CoinbaseLedger {
    fn minted_supply(&self, asset: AssetNo) -> Amount {
        self.coinbases
            .iter()
            .filter(|tx| tx.asset_no == asset)
            .filter_map(|tx| tx.outputs.first())
            .map(|out| out.value)
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Outpoint, TxIn, TxOut};

    fn coinbase(asset: i32, values: &[i64]) -> Transaction {
        Transaction::new(
            AssetNo::new(asset),
            vec![TxIn::new(Outpoint::null())],
            values.iter().map(|v| TxOut::new(*v, vec![0x51u8])).collect(),
        )
    }

    #[test]
    fn sums_first_outputs() {
        let ledger: CoinbaseLedger =
            [coinbase(0, &[50]), coinbase(3, &[100, 1]), coinbase(3, &[20, 7]), coinbase(4, &[9, 0])]
                .into_iter()
                .collect();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.minted_supply(AssetNo::new(3)), Amount::new(120));
        assert_eq!(ledger.minted_supply(AssetNo::NATIVE), Amount::new(50));
        assert_eq!(ledger.minted_supply(AssetNo::new(8)), Amount::ZERO);
    }

    #[test]
    fn rejects_non_coinbase() {
        let mut ledger = CoinbaseLedger::new();
        let mut tx = coinbase(3, &[10, 0]);
        tx.inputs[0].prevout.vout = 0;
        assert!(!ledger.push(tx));
        assert!(ledger.is_empty());
        assert!(ledger.push(coinbase(3, &[10, 0])));
        assert_eq!(ledger.pop().map(|tx| tx.asset_no), Some(AssetNo::new(3)));
    }

    #[test]
    fn rejects_invalid_mint_output() {
        let mut ledger = CoinbaseLedger::new();
        assert!(!ledger.push(coinbase(3, &[-500, 0])));
        assert!(!ledger.push(coinbase(3, &[])));
        assert!(ledger.push(coinbase(3, &[0, 0])));
        assert!(ledger.push(coinbase(3, &[40, 0])));
        assert_eq!(ledger.minted_supply(AssetNo::new(3)), Amount::new(40));
    }
}
