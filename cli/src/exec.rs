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


use std::fs::File;
use std::io::stdout;
use std::path::Path;

use amplify::hex::FromHex;
use coinasset::validation::TxValidator;
use coinasset::{
    Amount, AssetRecord, AssetStat, AssetStatus, AssetStore, Assets, CoinbaseBuilder,
    CoinbaseLedger, FsStore, IssueParams, MintRequest, Transaction, ASSET_KEY,
};
use serde::Serialize;

use crate::cmd::{Args, Cmd};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetInfo {
    asset: AssetRecord,
    stat: Option<AssetStat>,
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path)
        .map_err(|err| anyhow!("Unable to open '{}': {err}", path.display()))?;
    Ok(serde_yaml::from_reader(file)?)
}

impl Args {
    fn load(&self) -> anyhow::Result<Assets<FsStore>> {
        Ok(Assets::load(FsStore::new(&self.data_dir)?)?)
    }

    fn init(&self, force: bool) -> anyhow::Result<()> {
        let store = FsStore::new(&self.data_dir)?;
        if !force && store.read(ASSET_KEY)?.is_some() {
            return Err(anyhow!(
                "Asset registry already exists in '{}'; use --force to overwrite it",
                self.data_dir.display()
            ));
        }
        let assets = Assets::new(store);
        assets.registry().persist()?;
        assets.registry().persist_stats()?;
        eprintln!("Asset registry initialized in '{}'", self.data_dir.display());
        Ok(())
    }

    pub fn exec(&self) -> anyhow::Result<()> {
        match &self.command {
            Cmd::Init { force } => self.init(*force)?,

            Cmd::Create { name, total, scale, description, creator } => {
                let params = IssueParams::new(name, *total, *scale)
                    .with_description(description)
                    .with_creator(creator);
                let id = self.load()?.create_asset(params)?;
                println!("{id}");
            }

            Cmd::List { yaml: true } => {
                serde_yaml::to_writer(stdout(), &self.load()?.list_assets())?;
            }
            Cmd::List { yaml: false } => {
                println!(
                    "{: >6}\t{: <8}\t{: >20}\t{: >12}\t{: <12}\t{: <36}\tDescription",
                    "Id", "Name", "Supply cap", "Scale", "Status", "Creator"
                );
                for record in self.load()?.list_assets() {
                    println!("{record:\t<}");
                }
            }

            Cmd::Info { id } => {
                let assets = self.load()?;
                let asset = assets
                    .get_asset(*id)
                    .ok_or(anyhow!("Asset {id} is unknown"))?;
                let info = AssetInfo { asset, stat: assets.asset_stat(*id) };
                serde_yaml::to_writer(stdout(), &info)?;
            }

            Cmd::Lock { id } => {
                let outcome = self.load()?.lock_asset(*id)?;
                eprintln!("Locking asset {id}: {outcome}");
            }
            Cmd::Unlock { id } => {
                let outcome = self.load()?.unlock_asset(*id)?;
                eprintln!("Unlocking asset {id}: {outcome}");
            }

            Cmd::Status { id, bits } => {
                let status = AssetStatus::from_bits(*bits);
                let old = self.load()?.set_status(*id, status)?;
                eprintln!("Status of asset {id} changed from {old} to {status}");
            }

            Cmd::Stats => {
                println!(
                    "{: >6}\t{: >20}\t{: >20}\t{: <10}\t{: >20}",
                    "Id", "Minted", "Minted today", "Day", "Destroyed"
                );
                for stat in self.load()?.list_stats() {
                    println!("{stat:\t<}");
                }
            }

            Cmd::Check { tx, consensus } => {
                let tx = read_yaml::<Transaction>(tx)?;
                let assets = self.load()?;
                let validator = TxValidator::new(assets.registry());
                let res = if *consensus {
                    validator.check_transaction(&tx, true)
                } else {
                    validator.accept(&tx)
                };
                match res {
                    Ok(()) => println!("valid"),
                    Err(reason) => {
                        return Err(anyhow!(
                            "transaction is invalid ({}, {}): {reason}",
                            reason.reason(),
                            reason.class()
                        ))
                    }
                }
            }

            Cmd::Mint { asset, amount, to, fee, height, time, coinbases } => {
                let destination = Vec::<u8>::from_hex(to)
                    .map_err(|err| anyhow!("Invalid destination script: {err}"))?;
                let ledger: CoinbaseLedger = match coinbases {
                    Some(path) => read_yaml::<Vec<Transaction>>(path)?
                        .into_iter()
                        .collect(),
                    None => CoinbaseLedger::new(),
                };
                let assets = self.load()?;
                let request = MintRequest {
                    asset: *asset,
                    amount: Amount::new(*amount),
                    destination: destination.into(),
                    fee: Amount::new(*fee),
                    height: *height,
                    block_time: time.unwrap_or_else(|| chrono::Utc::now().timestamp()),
                };
                let minted = CoinbaseBuilder::new(assets.registry(), &ledger).build(request)?;
                assets.registry().persist_stats()?;
                info!("Remaining mintable amount of asset {asset}: {}", minted.remaining);
                serde_yaml::to_writer(stdout(), &minted)?;
            }
        }
        Ok(())
    }
}
