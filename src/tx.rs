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

//! Shape of the base chain transaction as seen by the asset rules.
//!
//! Only the data read by the registry, codec, validator and coinbase builder
//! is modelled here; serialization, hashing and scripts belong to the base
//! chain.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use amplify::hex::{self, FromHex, ToHex};
use amplify::Bytes32;

#[cfg(feature = "serde")]
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{Amount, AssetNo};

/// Transaction id in its internal byte order.
///
/// Displayed and parsed in the reversed byte order, as in Bitcoin; the
/// [`LowerHex`](std::fmt::LowerHex) form keeps the internal order.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
#[cfg_attr(feature = "serde", derive(SerializeDisplay, DeserializeFromStr))]
pub struct Txid(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl Txid {
    pub const fn from_byte_array(bytes: [u8; 32]) -> Self { Txid(Bytes32::from_array(bytes)) }

    pub fn to_byte_array(self) -> [u8; 32] { self.0.to_byte_array() }

    pub fn is_zero(&self) -> bool { self.to_byte_array() == [0u8; 32] }
}

impl Display for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut bytes = self.to_byte_array();
        bytes.reverse();
        f.write_str(&bytes.to_hex())
    }
}

impl FromStr for Txid {
    type Err = hex::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = Bytes32::from_hex(s)?.to_byte_array();
        bytes.reverse();
        Ok(Txid::from_byte_array(bytes))
    }
}

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[display("{txid}:{vout}")]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outpoint {
    pub txid: Txid,
    pub vout: u32,
}

impl Outpoint {
    pub const fn new(txid: Txid, vout: u32) -> Self { Outpoint { txid, vout } }

    /// Outpoint spent by coinbase inputs.
    pub const fn null() -> Self { Outpoint { txid: Txid::from_byte_array([0u8; 32]), vout: u32::MAX } }

    pub fn is_null(&self) -> bool { self.txid.is_zero() && self.vout == u32::MAX }
}

#[derive(Wrapper, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, From)]
#[wrapper(Deref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ScriptBytes(#[from] Vec<u8>);

impl ScriptBytes {
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&[u8]> for ScriptBytes {
    fn from(bytes: &[u8]) -> Self { ScriptBytes(bytes.to_vec()) }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct TxIn {
    pub prevout: Outpoint,
    pub script_sig: ScriptBytes,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prevout: Outpoint) -> Self {
        TxIn { prevout, script_sig: none!(), sequence: u32::MAX }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: ScriptBytes,
}

impl TxOut {
    pub fn new(value: impl Into<Amount>, script_pubkey: impl Into<ScriptBytes>) -> Self {
        TxOut { value: value.into(), script_pubkey: script_pubkey.into() }
    }
}

/// Base chain transaction extended with the asset number.
///
/// With a non-native `asset_no` the last input and the last output are
/// denominated in the native asset and pay the fee; see [`crate::codec`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct Transaction {
    pub version: i32,
    pub asset_no: AssetNo,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(asset_no: AssetNo, inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Transaction { version: 2, asset_no, inputs, outputs, lock_time: 0 }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    /// Sum of all output values, regardless of which asset they belong to.
    pub fn total_out(&self) -> Amount { self.outputs.iter().map(|out| out.value).sum() }
}
