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

//! Asset-aware transaction checks.
//!
//! [`TxValidator::check_transaction`] is the context-free consensus predicate
//! which every node must evaluate identically; [`TxValidator::check_policy`]
//! holds the additional mempool rules applied before it.

use std::collections::HashSet;

use crate::codec::{split_inputs, split_outputs};
use crate::resolvers::AssetResolver;
use crate::{Amount, AssetNo, Outpoint, Transaction};

pub const MIN_COINBASE_SCRIPT_LEN: usize = 2;
pub const MAX_COINBASE_SCRIPT_LEN: usize = 100;

/// Kind of a transaction rejection.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum RejectClass {
    /// Wrong transaction shape or negative values.
    #[display("malformed")]
    Malformed,

    #[display("unknown-asset")]
    UnknownAsset,

    #[display("disabled-asset")]
    DisabledAsset,

    /// Value above the supply cap of an asset.
    #[display("supply-cap")]
    SupplyCap,
}

/// Reason for a permanent transaction rejection.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum RejectReason {
    /// transaction has no inputs.
    NoInputs,

    /// transaction has no outputs.
    NoOutputs,

    /// transaction of asset {0} lacks either asset outputs or the native fee output.
    FeeOutputMissing(AssetNo),

    /// transaction of asset {0} lacks either asset inputs or the native fee input.
    FeeInputMissing(AssetNo),

    /// native fee output value {0} is out of the allowed range.
    FeeOutOfRange(Amount),

    /// asset {0} is unknown.
    UnknownAsset(AssetNo),

    /// asset {0} is disabled.
    DisabledAsset(AssetNo),

    /// output value {0} is negative.
    NegativeOutput(Amount),

    /// output value {value} exceeds the supply cap {cap} of asset {asset}.
    OutputTooLarge {
        asset: AssetNo,
        value: Amount,
        cap: Amount,
    },

    /// outputs of asset {asset} sum above its supply cap {cap}.
    TotalTooLarge { asset: AssetNo, cap: Amount },

    /// outpoint {0} is spent twice.
    DuplicateInput(Outpoint),

    /// coinbase input script has invalid length {0}.
    CoinbaseLength(usize),

    /// non-coinbase transaction spends a null outpoint.
    NullPrevout,
}

impl RejectReason {
    /// Reject reason string reported through the base chain validation state.
    pub fn reason(&self) -> &'static str {
        match self {
            RejectReason::NoInputs => "bad-txns-vin-empty",
            RejectReason::NoOutputs | RejectReason::FeeOutputMissing(_) => "bad-txns-vout-empty",
            RejectReason::FeeInputMissing(_) => "bad-txns-vin-fee-missing",
            RejectReason::FeeOutOfRange(_) | RejectReason::OutputTooLarge { .. } => {
                "bad-txns-vout-toolarge"
            }
            RejectReason::UnknownAsset(_) => "bad-txns-assetno",
            RejectReason::DisabledAsset(_) => "bad-txns-asset-disabled",
            RejectReason::NegativeOutput(_) => "bad-txns-vout-negative",
            RejectReason::TotalTooLarge { .. } => "bad-txns-txouttotal-toolarge",
            RejectReason::DuplicateInput(_) => "bad-txns-inputs-duplicate",
            RejectReason::CoinbaseLength(_) => "bad-cb-length",
            RejectReason::NullPrevout => "bad-txns-prevout-null",
        }
    }

    pub fn class(&self) -> RejectClass {
        match self {
            RejectReason::NoInputs
            | RejectReason::NoOutputs
            | RejectReason::FeeOutputMissing(_)
            | RejectReason::FeeInputMissing(_)
            | RejectReason::NegativeOutput(_)
            | RejectReason::DuplicateInput(_)
            | RejectReason::CoinbaseLength(_)
            | RejectReason::NullPrevout => RejectClass::Malformed,
            RejectReason::FeeOutOfRange(value) if value.is_negative() => RejectClass::Malformed,
            RejectReason::FeeOutOfRange(_)
            | RejectReason::OutputTooLarge { .. }
            | RejectReason::TotalTooLarge { .. } => RejectClass::SupplyCap,
            RejectReason::UnknownAsset(_) => RejectClass::UnknownAsset,
            RejectReason::DisabledAsset(_) => RejectClass::DisabledAsset,
        }
    }
}

/// Transaction checks against a set of known assets.
///
/// The validator holds no lock: each asset lookup returns a copy of the
/// record, so independent transactions are validated concurrently.
#[derive(Copy, Clone, Debug)]
pub struct TxValidator<'r, R: AssetResolver + ?Sized> {
    resolver: &'r R,
}

impl<'r, R: AssetResolver + ?Sized> TxValidator<'r, R> {
    pub fn new(resolver: &'r R) -> Self { Self { resolver } }

    /// Mempool admission: policy rules followed by the consensus check.
    pub fn accept(&self, tx: &Transaction) -> Result<(), RejectReason> {
        self.check_policy(tx)?;
        self.check_transaction(tx, true)
    }

    /// Rules applied to new transfers before they are relayed or mined. These
    /// are not part of consensus: blocks with such transactions are still
    /// valid.
    pub fn check_policy(&self, tx: &Transaction) -> Result<(), RejectReason> {
        let asset = tx.asset_no;
        let record = self.resolver.resolve_asset(asset).ok_or_else(|| {
            debug!("Policy rejects transaction of unknown asset {asset}");
            RejectReason::UnknownAsset(asset)
        })?;
        if record.is_locked() {
            debug!("Policy rejects transaction of disabled asset {asset}");
            return Err(RejectReason::DisabledAsset(asset));
        }
        if !tx.is_coinbase() && split_inputs(tx).is_malformed() {
            debug!("Policy rejects transaction of asset {asset} without a fee input");
            return Err(RejectReason::FeeInputMissing(asset));
        }
        Ok(())
    }

    /// Consensus check of a transaction; the first failed rule is reported.
    pub fn check_transaction(
        &self,
        tx: &Transaction,
        check_duplicate_inputs: bool,
    ) -> Result<(), RejectReason> {
        self.check_consensus(tx, check_duplicate_inputs)
            .inspect_err(|reason| {
                debug!("Transaction rejected ({}): {reason}", reason.reason());
            })
    }

    fn check_consensus(
        &self,
        tx: &Transaction,
        check_duplicate_inputs: bool,
    ) -> Result<(), RejectReason> {
        if tx.inputs.is_empty() {
            return Err(RejectReason::NoInputs);
        }
        if tx.outputs.is_empty() {
            return Err(RejectReason::NoOutputs);
        }

        let split = split_outputs(tx);
        let Some(payload) = split.payload() else {
            return Err(RejectReason::FeeOutputMissing(tx.asset_no));
        };
        if let Some(fee) = split.fee() {
            let native = self
                .resolver
                .resolve_asset(AssetNo::NATIVE)
                .ok_or(RejectReason::UnknownAsset(AssetNo::NATIVE))?;
            if !native.money_range(fee.value) {
                return Err(RejectReason::FeeOutOfRange(fee.value));
            }
        }

        if !payload.is_empty() {
            let asset = tx.asset_no;
            let record = self
                .resolver
                .resolve_asset(asset)
                .ok_or(RejectReason::UnknownAsset(asset))?;
            let cap = record.max_supply;
            let mut total = Amount::ZERO;
            for out in payload {
                if out.value.is_negative() {
                    return Err(RejectReason::NegativeOutput(out.value));
                }
                if out.value > cap {
                    return Err(RejectReason::OutputTooLarge { asset, value: out.value, cap });
                }
                total = total
                    .checked_add(out.value)
                    .filter(|total| record.money_range(*total))
                    .ok_or(RejectReason::TotalTooLarge { asset, cap })?;
            }
        }

        if check_duplicate_inputs {
            let mut spent = HashSet::with_capacity(tx.inputs.len());
            for input in &tx.inputs {
                if !spent.insert(input.prevout) {
                    return Err(RejectReason::DuplicateInput(input.prevout));
                }
            }
        }

        if tx.is_coinbase() {
            let len = tx.inputs[0].script_sig.len();
            if !(MIN_COINBASE_SCRIPT_LEN..=MAX_COINBASE_SCRIPT_LEN).contains(&len) {
                return Err(RejectReason::CoinbaseLength(len));
            }
        } else if tx.inputs.iter().any(|input| input.prevout.is_null()) {
            return Err(RejectReason::NullPrevout);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{AssetRecord, AssetRegistry, MemStore, Txid, TxIn, TxOut, COIN, MAX_MONEY};

    fn registry() -> AssetRegistry<MemStore> {
        let registry = AssetRegistry::new(MemStore::new());
        let gold =
            AssetRecord::new(AssetNo::new(3), "GOLD", "gold", "addr", 10, Amount::new(1000))
                .unwrap();
        registry.create(gold).unwrap();
        registry
    }

    fn input(n: u8) -> TxIn { TxIn::new(Outpoint::new(Txid::from_byte_array([n; 32]), 0)) }

    fn tx(asset: i32, inputs: usize, values: &[i64]) -> Transaction {
        Transaction::new(
            AssetNo::new(asset),
            (1..=inputs as u8).map(input).collect(),
            values.iter().map(|v| TxOut::new(*v, vec![0x51u8])).collect(),
        )
    }

    fn check(registry: &AssetRegistry<MemStore>, tx: &Transaction) -> Result<(), RejectReason> {
        TxValidator::new(registry).check_transaction(tx, true)
    }

    #[test]
    fn accepts_valid() {
        let registry = registry();
        assert_eq!(check(&registry, &tx(0, 1, &[COIN, 5])), Ok(()));
        assert_eq!(check(&registry, &tx(3, 2, &[600, 400, 5])), Ok(()));
        assert_eq!(check(&registry, &tx(3, 2, &[0, 0])), Ok(()));
    }

    #[test]
    fn running_total_above_cap() {
        let registry = registry();
        let err = check(&registry, &tx(3, 2, &[600, 500, 1])).unwrap_err();
        assert_eq!(err, RejectReason::TotalTooLarge {
            asset: AssetNo::new(3),
            cap: Amount::new(1000)
        });
        assert_eq!(err.reason(), "bad-txns-txouttotal-toolarge");
        assert_eq!(err.class(), RejectClass::SupplyCap);
    }

    #[test]
    fn single_output_above_cap() {
        let registry = registry();
        let err = check(&registry, &tx(3, 2, &[1001, 1])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-vout-toolarge");
        assert_eq!(err.class(), RejectClass::SupplyCap);

        let err = check(&registry, &tx(0, 1, &[MAX_MONEY + 1])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-vout-toolarge");
    }

    #[test]
    fn native_total_overflow() {
        let registry = registry();
        let err = check(&registry, &tx(0, 1, &[MAX_MONEY, MAX_MONEY])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-txouttotal-toolarge");
    }

    #[test]
    fn unknown_asset() {
        let registry = registry();
        for values in [[0, 0], [10, 1], [0, 1]] {
            let err = check(&registry, &tx(999, 2, &values)).unwrap_err();
            assert_eq!(err, RejectReason::UnknownAsset(AssetNo::new(999)));
            assert_eq!(err.reason(), "bad-txns-assetno");
            assert_eq!(err.class(), RejectClass::UnknownAsset);
        }
    }

    #[test]
    fn malformed_shape() {
        let registry = registry();
        let err = check(&registry, &tx(3, 2, &[100])).unwrap_err();
        assert_eq!(err, RejectReason::FeeOutputMissing(AssetNo::new(3)));
        assert_eq!(err.reason(), "bad-txns-vout-empty");
        assert_eq!(err.class(), RejectClass::Malformed);

        assert_eq!(check(&registry, &tx(3, 0, &[100, 1])), Err(RejectReason::NoInputs));
        assert_eq!(check(&registry, &tx(3, 1, &[])), Err(RejectReason::NoOutputs));
    }

    #[test]
    fn fee_range() {
        let registry = registry();
        let err = check(&registry, &tx(3, 2, &[100, -1])).unwrap_err();
        assert_eq!(err, RejectReason::FeeOutOfRange(Amount::new(-1)));
        assert_eq!(err.class(), RejectClass::Malformed);

        let err = check(&registry, &tx(3, 2, &[100, MAX_MONEY + 1])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-vout-toolarge");
        assert_eq!(err.class(), RejectClass::SupplyCap);

        // The fee is checked against the native cap, not the asset one.
        assert_eq!(check(&registry, &tx(3, 2, &[100, 5000])), Ok(()));
    }

    #[test]
    fn negative_output() {
        let registry = registry();
        let err = check(&registry, &tx(3, 2, &[-5, 1])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-vout-negative");
        assert_eq!(err.class(), RejectClass::Malformed);
    }

    #[test]
    fn duplicate_inputs() {
        let registry = registry();
        let mut dup = tx(3, 2, &[100, 1]);
        dup.inputs[1] = dup.inputs[0].clone();
        assert_eq!(check(&registry, &dup).unwrap_err().reason(), "bad-txns-inputs-duplicate");
        assert_eq!(TxValidator::new(&registry).check_transaction(&dup, false), Ok(()));
    }

    #[test]
    fn coinbase_script() {
        let registry = registry();
        let mut coinbase = Transaction::new(AssetNo::NATIVE, vec![TxIn::new(Outpoint::null())], vec![
            TxOut::new(COIN, vec![0x51u8]),
        ]);
        coinbase.inputs[0].script_sig = vec![1u8].into();
        assert_eq!(check(&registry, &coinbase), Err(RejectReason::CoinbaseLength(1)));
        coinbase.inputs[0].script_sig = vec![0u8; 101].into();
        assert_eq!(check(&registry, &coinbase), Err(RejectReason::CoinbaseLength(101)));
        coinbase.inputs[0].script_sig = vec![1u8, 0].into();
        assert_eq!(check(&registry, &coinbase), Ok(()));

        let mut spend = tx(0, 2, &[10]);
        spend.inputs[1].prevout = Outpoint::null();
        assert_eq!(check(&registry, &spend), Err(RejectReason::NullPrevout));
    }

    #[test]
    fn policy_lock_unlock() {
        let registry = registry();
        let id = AssetNo::new(3);
        let transfer = tx(3, 2, &[100, 1]);
        let validator = TxValidator::new(&registry);
        assert_eq!(validator.accept(&transfer), Ok(()));

        registry.lock(id).unwrap();
        let err = validator.accept(&transfer).unwrap_err();
        assert_eq!(err, RejectReason::DisabledAsset(id));
        assert_eq!(err.class(), RejectClass::DisabledAsset);
        // Consensus alone does not know about the lock.
        assert_eq!(validator.check_transaction(&transfer, true), Ok(()));

        registry.unlock(id).unwrap();
        assert_eq!(validator.accept(&transfer), Ok(()));
    }

    #[test]
    fn policy_fee_input() {
        let registry = registry();
        let validator = TxValidator::new(&registry);
        let err = validator.accept(&tx(3, 1, &[100, 1])).unwrap_err();
        assert_eq!(err.reason(), "bad-txns-vin-fee-missing");
        assert_eq!(validator.accept(&tx(0, 1, &[100])), Ok(()));
        assert_eq!(
            validator.accept(&tx(7, 2, &[0, 0])),
            Err(RejectReason::UnknownAsset(AssetNo::new(7)))
        );
    }
}
