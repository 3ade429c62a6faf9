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

//! Positional convention letting a single transaction shape carry either a
//! native-asset transfer or an asset transfer together with its native fee.
//!
//! For `asset_no == 0` all inputs and outputs are in the native asset. For any
//! other asset number the last input and the last output are native-asset fee
//! entries, and everything before them is denominated in `asset_no`. There is
//! no explicit tag: the position alone defines the role.

use crate::{Transaction, TxIn, TxOut};

/// Result of splitting transaction inputs or outputs into payload and fee.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Split<'tx, T> {
    /// Non-native asset transaction with less than two entries, which can't
    /// hold both a payload and a fee.
    Malformed,

    /// Native asset transaction; no fee entry.
    Plain(&'tx [T]),

    /// Asset payload followed by the native-asset fee entry.
    AssetPlusFee(&'tx [T], &'tx T),
}

impl<'tx, T> Split<'tx, T> {
    pub fn is_malformed(&self) -> bool { matches!(self, Split::Malformed) }

    /// Entries denominated in the transaction asset.
    pub fn payload(&self) -> Option<&'tx [T]> {
        match *self {
            Split::Malformed => None,
            Split::Plain(payload) | Split::AssetPlusFee(payload, _) => Some(payload),
        }
    }

    pub fn fee(&self) -> Option<&'tx T> {
        match *self {
            Split::AssetPlusFee(_, fee) => Some(fee),
            Split::Malformed | Split::Plain(_) => None,
        }
    }
}

fn split<T>(native: bool, items: &[T]) -> Split<'_, T> {
    if native {
        return Split::Plain(items);
    }
    match items.split_last() {
        Some((fee, payload)) if !payload.is_empty() => Split::AssetPlusFee(payload, fee),
        _ => Split::Malformed,
    }
}

/// Splits transaction outputs into asset payload and native fee output.
pub fn split_outputs(tx: &Transaction) -> Split<'_, TxOut> {
    split(tx.asset_no.is_native(), &tx.outputs)
}

/// Splits transaction inputs into asset payload and native fee input.
pub fn split_inputs(tx: &Transaction) -> Split<'_, TxIn> {
    split(tx.asset_no.is_native(), &tx.inputs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Amount, AssetNo, Outpoint, Txid};

    fn outs(values: &[i64]) -> Vec<TxOut> {
        values.iter().map(|v| TxOut::new(*v, vec![0x51u8])).collect()
    }

    fn ins(count: u8) -> Vec<TxIn> {
        (0..count)
            .map(|no| TxIn::new(Outpoint::new(Txid::from_byte_array([no + 1; 32]), no as u32)))
            .collect()
    }

    #[test]
    fn native_outputs_not_split() {
        let tx = Transaction::new(AssetNo::NATIVE, ins(1), outs(&[100, 200, 5]));
        let split = split_outputs(&tx);
        assert_eq!(split, Split::Plain(&tx.outputs[..]));
        assert_eq!(split.payload().map(<[_]>::len), Some(3));
        assert_eq!(split.fee(), None);
    }

    #[test]
    fn asset_outputs_split_last() {
        let tx = Transaction::new(AssetNo::new(3), ins(2), outs(&[100, 200, 5]));
        let split = split_outputs(&tx);
        let payload = split.payload().unwrap();
        assert_eq!(payload.iter().map(|o| o.value).collect::<Vec<_>>(), vec![
            Amount::new(100),
            Amount::new(200)
        ]);
        assert_eq!(split.fee().unwrap().value, Amount::new(5));
    }

    #[test]
    fn asset_outputs_malformed() {
        let tx = Transaction::new(AssetNo::new(3), ins(2), outs(&[100]));
        assert!(split_outputs(&tx).is_malformed());
        let tx = Transaction::new(AssetNo::new(3), ins(2), vec![]);
        assert!(split_outputs(&tx).is_malformed());
        assert_eq!(split_outputs(&tx).payload(), None);
    }

    #[test]
    fn native_empty_outputs_are_plain() {
        let tx = Transaction::new(AssetNo::NATIVE, ins(1), vec![]);
        assert_eq!(split_outputs(&tx), Split::Plain(&[][..]));
    }

    #[test]
    fn inputs_split_symmetric() {
        let tx = Transaction::new(AssetNo::new(7), ins(3), outs(&[1, 1]));
        let split = split_inputs(&tx);
        assert_eq!(split.payload().unwrap().len(), 2);
        assert_eq!(split.fee(), tx.inputs.last());

        let tx = Transaction::new(AssetNo::new(7), ins(1), outs(&[1, 1]));
        assert!(split_inputs(&tx).is_malformed());
    }

    #[test]
    fn split_counts_hold_for_any_length() {
        for len in 2..16 {
            let values = (0..len).collect::<Vec<i64>>();
            let tx = Transaction::new(AssetNo::new(1), ins(2), outs(&values));
            let split = split_outputs(&tx);
            assert_eq!(split.payload().unwrap().len(), len as usize - 1);
            assert_eq!(split.fee().unwrap().value, Amount::new(len - 1));
        }
    }
}
