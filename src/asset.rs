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

use std::fmt::{self, Display, Formatter, Write};

use amplify::confinement::{self, TinyString};
use chrono::{DateTime, TimeZone, Utc};

use crate::{Amount, COIN, LIB_NAME_COIN_ASSETS, MAX_MONEY};

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Number of an asset inside the registry; referenced by transactions through
/// their `asset_no` field.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, From)]
#[wrapper(Display, FromStr)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct AssetNo(#[from] i32);

impl AssetNo {
    /// The chain's own asset, which always exists.
    pub const NATIVE: Self = AssetNo(0);

    pub const fn new(no: i32) -> Self { AssetNo(no) }

    pub const fn value(self) -> i32 { self.0 }

    pub const fn is_native(self) -> bool { self.0 == 0 }

    /// Next asset number, or `None` if the number space is exhausted.
    pub fn checked_next(self) -> Option<Self> { self.0.checked_add(1).map(AssetNo) }
}

/// Single status flag of an asset.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum AssetFlag {
    /// The asset can't be used in new transactions.
    #[display("disabled")]
    Disabled,

    #[display("no-create-tx")]
    NoCreateTx,

    /// Reserved; not checked by the transaction rules.
    #[display("no-send-tx")]
    NoSendTx,
}

impl AssetFlag {
    pub const ALL: [AssetFlag; 3] = [AssetFlag::Disabled, AssetFlag::NoCreateTx, AssetFlag::NoSendTx];

    pub const fn bit(self) -> u32 {
        match self {
            AssetFlag::Disabled => 1,
            AssetFlag::NoCreateTx => 1 << 1,
            AssetFlag::NoSendTx => 1 << 2,
        }
    }
}

/// Set of [`AssetFlag`]s.
///
/// Stored as the bitwise OR of the flag bits; bits not known to this library
/// are kept as-is, so a raw status update always round-trips.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct AssetStatus(u32);

impl AssetStatus {
    pub const ACTIVE: Self = AssetStatus(0);

    pub const fn from_bits(bits: u32) -> Self { AssetStatus(bits) }

    pub const fn bits(self) -> u32 { self.0 }

    pub const fn contains(self, flag: AssetFlag) -> bool { self.0 & flag.bit() != 0 }

    #[must_use]
    pub const fn with(self, flag: AssetFlag) -> Self { AssetStatus(self.0 | flag.bit()) }

    #[must_use]
    pub const fn without(self, flag: AssetFlag) -> Self { AssetStatus(self.0 & !flag.bit()) }

    pub const fn is_disabled(self) -> bool { self.contains(AssetFlag::Disabled) }

    pub fn flags(self) -> impl Iterator<Item = AssetFlag> {
        AssetFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    fn unknown_bits(self) -> u32 {
        AssetFlag::ALL
            .iter()
            .fold(self.0, |bits, flag| bits & !flag.bit())
    }
}

impl From<AssetFlag> for AssetStatus {
    fn from(flag: AssetFlag) -> Self { AssetStatus::ACTIVE.with(flag) }
}

impl Display for AssetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("active");
        }
        let mut first = true;
        for flag in self.flags() {
            if !first {
                f.write_char('|')?;
            }
            Display::fmt(&flag, f)?;
            first = false;
        }
        let unknown = self.unknown_bits();
        if unknown != 0 {
            if !first {
                f.write_char('|')?;
            }
            write!(f, "{unknown:#x}")?;
        }
        Ok(())
    }
}

/// Definition of a coin asset.
///
/// Registry lookups use `id` only; the remaining fields take part in equality
/// so that re-registration of an asset with different parameters is detected.
#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(StrictType, StrictDumb, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS, dumb = AssetRecord::native())]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct AssetRecord {
    pub id: AssetNo,
    pub name: TinyString,
    pub description: TinyString,
    /// Address recorded as the asset owner; advisory only.
    pub creator_address: TinyString,
    /// Number of smallest units in a display unit.
    pub scale: i64,
    /// Hard cap on the number of smallest units which may ever exist.
    pub max_supply: Amount,
    pub status: AssetStatus,
}

impl AssetRecord {
    pub const NATIVE_NAME: &'static str = "VC";
    pub const NATIVE_DESCRIPTION: &'static str = "main asset";
    pub const NATIVE_CREATOR: &'static str = "00000000000000000000000000000000000";

    /// Canonical record of the native asset.
    pub fn native() -> Self {
        AssetRecord {
            id: AssetNo::NATIVE,
            name: TinyString::from_checked(Self::NATIVE_NAME.to_owned()),
            description: TinyString::from_checked(Self::NATIVE_DESCRIPTION.to_owned()),
            creator_address: TinyString::from_checked(Self::NATIVE_CREATOR.to_owned()),
            scale: COIN,
            max_supply: Amount::new(MAX_MONEY),
            status: AssetStatus::ACTIVE,
        }
    }

    pub fn new(
        id: AssetNo,
        name: &str,
        description: &str,
        creator_address: &str,
        scale: i64,
        max_supply: Amount,
    ) -> Result<Self, confinement::Error> {
        Ok(AssetRecord {
            id,
            name: TinyString::try_from(name.to_owned())?,
            description: TinyString::try_from(description.to_owned())?,
            creator_address: TinyString::try_from(creator_address.to_owned())?,
            scale,
            max_supply,
            status: AssetStatus::ACTIVE,
        })
    }

    pub fn is_native(&self) -> bool { self.id.is_native() }

    pub fn is_locked(&self) -> bool { self.status.is_disabled() }

    /// Checks that a value is non-negative and does not exceed the supply cap.
    pub fn money_range(&self, value: Amount) -> bool {
        !value.is_negative() && value <= self.max_supply
    }
}

impl Display for AssetRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{: >6}", self.id)?;
        f.write_char(f.fill())?;
        write!(f, "{: <8}", self.name.as_str())?;
        f.write_char(f.fill())?;
        write!(f, "{: >20}", self.max_supply.floor(self.scale))?;
        f.write_char(f.fill())?;
        write!(f, "{: >12}", self.scale)?;
        f.write_char(f.fill())?;
        write!(f, "{: <12}", self.status.to_string())?;
        f.write_char(f.fill())?;
        write!(f, "{: <36}", self.creator_address.as_str())?;
        f.write_char(f.fill())?;
        f.write_str(self.description.as_str())
    }
}

/// Running mint and burn counters of a single asset.
///
/// These are operational statistics; the supply cap is enforced on
/// transactions and coinbases, not through these numbers.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct AssetStat {
    pub asset_id: AssetNo,
    pub total_minted: Amount,
    pub total_minted_today: Amount,
    /// Unix timestamp of the last daily update.
    pub day_anchor: i64,
    pub total_destroyed: Amount,
}

impl AssetStat {
    pub fn new(asset_id: AssetNo) -> Self { AssetStat { asset_id, ..default!() } }

    pub fn add_minted(&mut self, amount: Amount) {
        self.total_minted = self.total_minted.saturating_add(amount);
    }

    /// Adds to the daily counter, first resetting it if `as_of` falls on a
    /// different UTC day than the previous update.
    pub fn add_minted_today(&mut self, amount: Amount, as_of: i64) {
        if self.day_anchor.div_euclid(SECONDS_PER_DAY) != as_of.div_euclid(SECONDS_PER_DAY) {
            self.total_minted_today = Amount::ZERO;
        }
        self.day_anchor = as_of;
        self.total_minted_today = self.total_minted_today.saturating_add(amount);
    }

    pub fn add_destroyed(&mut self, amount: Amount) {
        self.total_destroyed = self.total_destroyed.saturating_add(amount);
    }

    /// Minted minus destroyed units.
    pub fn outstanding(&self) -> Amount { self.total_minted.saturating_sub(self.total_destroyed) }

    pub fn day_anchor_time(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.day_anchor, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Display for AssetStat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{: >6}", self.asset_id)?;
        f.write_char(f.fill())?;
        write!(f, "{: >20}", self.total_minted)?;
        f.write_char(f.fill())?;
        write!(f, "{: >20}", self.total_minted_today)?;
        f.write_char(f.fill())?;
        write!(f, "{}", self.day_anchor_time().format("%Y-%m-%d"))?;
        f.write_char(f.fill())?;
        write!(f, "{: >20}", self.total_destroyed)
    }
}
