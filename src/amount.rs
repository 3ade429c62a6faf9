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

use std::iter::Sum;

use crate::LIB_NAME_COIN_ASSETS;

/// Value denominated in the smallest unit of some asset.
///
/// The asset itself is not part of the value: it is defined by the transaction
/// `asset_no` and the position of the output (see [`crate::codec`]).
#[derive(
    Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, From
)]
#[wrapper(Display, FromStr)]
#[derive(StrictType, StrictEncode, StrictDecode)]
#[strict_type(lib = LIB_NAME_COIN_ASSETS)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Amount(#[from] i64);

impl Amount {
    pub const ZERO: Self = Amount(0);

    pub const fn new(value: i64) -> Self { Amount(value) }

    pub const fn value(self) -> i64 { self.0 }

    pub const fn is_negative(self) -> bool { self.0 < 0 }

    /// Converts a number of display units into smallest units using the asset
    /// scale, failing on a non-positive scale or on overflow.
    pub fn with_scale_checked(units: i64, scale: i64) -> Option<Self> {
        if scale <= 0 {
            return None;
        }
        units.checked_mul(scale).map(Amount)
    }

    /// Splits the amount into whole display units and the remaining smallest
    /// units.
    pub fn split(self, scale: i64) -> (i64, i64) {
        if scale <= 0 {
            return (self.0, 0);
        }
        (self.0 / scale, self.0 % scale)
    }

    /// Whole display units contained in the amount, rounding towards zero.
    pub fn floor(self, scale: i64) -> i64 { self.split(scale).0 }

    #[must_use]
    pub fn checked_add(self, other: impl Into<Self>) -> Option<Self> {
        self.0.checked_add(other.into().0).map(Self)
    }
    #[must_use]
    pub fn checked_sub(self, other: impl Into<Self>) -> Option<Self> {
        self.0.checked_sub(other.into().0).map(Self)
    }

    pub fn saturating_add(self, other: impl Into<Self>) -> Self {
        self.0.saturating_add(other.into().0).into()
    }
    pub fn saturating_sub(self, other: impl Into<Self>) -> Self {
        self.0.saturating_sub(other.into().0).into()
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |sum, value| sum.saturating_add(value))
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self { iter.copied().sum() }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scale_conversion() {
        assert_eq!(Amount::with_scale_checked(21, 100_000), Some(Amount::new(2_100_000)));
        assert_eq!(Amount::with_scale_checked(1, 0), None);
        assert_eq!(Amount::with_scale_checked(i64::MAX, 2), None);
    }

    #[test]
    fn split_display_units() {
        let amount = Amount::new(12_345_678);
        assert_eq!(amount.split(1_000_000), (12, 345_678));
        assert_eq!(amount.floor(1_000_000), 12);
        assert_eq!(amount.split(0), (12_345_678, 0));
    }

    #[test]
    fn sum_saturates() {
        let total: Amount = [Amount::new(i64::MAX), Amount::new(1)].iter().sum();
        assert_eq!(total, Amount::new(i64::MAX));
    }

    #[test]
    fn checked_arithmetics() {
        assert_eq!(Amount::new(5).checked_add(7), Some(Amount::new(12)));
        assert_eq!(Amount::new(i64::MAX).checked_add(1), None);
        assert_eq!(Amount::new(i64::MIN).checked_sub(1), None);
        assert!(Amount::new(-1).is_negative());
    }
}
