// Command-line toolbox for coin asset registries
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


use std::path::PathBuf;

use clap::{ArgAction, ValueHint};
use coinasset::AssetNo;

#[derive(Parser)]
#[clap(
    name = "assetx",
    bin_name = "assetx",
    author,
    version,
    about = "Command-line toolbox for coin asset registries"
)]
pub struct Args {
    /// Set verbosity level; can be used multiple times
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory keeping the asset registry
    #[clap(
        short,
        long,
        global = true,
        default_value = ".",
        env = "ASSETX_DATA_DIR",
        value_hint = ValueHint::DirPath
    )]
    pub data_dir: PathBuf,

    /// Command to execute
    #[clap(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Initialize a registry containing only the native asset
    Init {
        /// Overwrite an existing registry
        #[clap(short, long)]
        force: bool,
    },

    /// Issue a new asset
    Create {
        /// Asset name; only the first 6 characters are kept
        name: String,

        /// Supply cap, in display units
        total: i64,

        /// Number of smallest units in a display unit
        scale: i64,

        /// Asset description; only the first 32 characters are kept
        #[clap(short = 'D', long, default_value = "")]
        description: String,

        /// Address of the asset creator
        #[clap(short, long, default_value = "")]
        creator: String,
    },

    /// List known assets
    List {
        /// Print the list as YAML
        #[clap(long)]
        yaml: bool,
    },

    /// Print detailed information about an asset
    Info { id: AssetNo },

    /// Disable an asset for new transactions
    Lock { id: AssetNo },

    /// Enable a previously locked asset
    Unlock { id: AssetNo },

    /// Overwrite raw status bits of an asset
    Status {
        id: AssetNo,

        /// New status bits (1 - disabled, 2 - no tx creation, 4 - no sending)
        bits: u32,
    },

    /// Print mint and burn statistics
    Stats,

    /// Validate a transaction against the registry
    Check {
        /// YAML file with the transaction
        #[clap(value_hint = ValueHint::FilePath)]
        tx: PathBuf,

        /// Run only the consensus check, skipping mempool policy
        #[clap(long)]
        consensus: bool,
    },

    /// Construct a coinbase transaction minting an asset
    Mint {
        /// Asset to mint
        asset: AssetNo,

        /// Amount to mint, in smallest units
        amount: i64,

        /// Hex-encoded script receiving the minted amount
        #[clap(short, long)]
        to: String,

        /// Native asset fee collected by the coinbase
        #[clap(short, long, default_value = "0")]
        fee: i64,

        /// Block height
        #[clap(long, default_value = "0")]
        height: u32,

        /// Block time as unix timestamp; defaults to the current time
        #[clap(long)]
        time: Option<i64>,

        /// YAML file with previous coinbase transactions of the chain
        #[clap(short, long, value_hint = ValueHint::FilePath)]
        coinbases: Option<PathBuf>,
    },
}
