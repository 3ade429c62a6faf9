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

//! Key-value persistence used by the asset registry.
//!
//! The registry only needs two primitives, reading and writing a byte blob
//! under a fixed key. Node software plugs its own database in by implementing
//! [`AssetStore`]; this module provides an in-memory store and, with the `fs`
//! feature, a store keeping each key in a separate file.

use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error as StdError;

pub trait AssetStore {
    type Error: StdError;

    /// Reads the value stored under `key`, returning `None` if the key was
    /// never written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replaces the value stored under `key`.
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error>;
}

/// Store keeping all the data in memory.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct MemStore {
    data: HashMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self { none!() }

    pub fn contains_key(&self, key: &str) -> bool { self.data.contains_key(key) }

    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> { self.data.remove(key) }
}

impl AssetStore for MemStore {
    // With in-memory data we have no connectivity or I/O errors
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.data.get(key).cloned())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
        self.data.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

impl<S: AssetStore> AssetStore for &mut S {
    type Error = S::Error;

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> { (**self).read(key) }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(key, data)
    }
}

#[cfg(feature = "fs")]
mod fs {
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use super::*;

    const EXTENSION: &str = "dat";

    /// Store keeping each key in a `<key>.dat` file inside a data directory.
    #[derive(Clone, Eq, PartialEq, Debug)]
    pub struct FsStore {
        path: PathBuf,
    }

    impl FsStore {
        /// Opens a store in `path`, creating the directory if needed.
        pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
            let path = path.as_ref().to_path_buf();
            std::fs::create_dir_all(&path)?;
            Ok(Self { path })
        }

        pub fn path(&self) -> &Path { &self.path }

        fn file(&self, key: &str) -> PathBuf {
            let mut file = self.path.join(key);
            file.set_extension(EXTENSION);
            file
        }
    }

    impl AssetStore for FsStore {
        type Error = io::Error;

        fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
            match std::fs::read(self.file(key)) {
                Ok(data) => Ok(Some(data)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err),
            }
        }

        fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
            // Write to a side file first, so a crash never leaves a truncated value behind.
            let file = self.file(key);
            let mut tmp = file.clone();
            tmp.set_extension("tmp");
            {
                let mut fd = std::fs::File::create(&tmp)?;
                fd.write_all(data)?;
                fd.sync_all()?;
            }
            std::fs::rename(&tmp, &file)
        }
    }
}
#[cfg(feature = "fs")]
pub use fs::FsStore;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mem_store_roundtrip() {
        let mut store = MemStore::new();
        assert_eq!(store.read("asset").unwrap(), None);
        store.write("asset", b"\x01\x02").unwrap();
        assert_eq!(store.read("asset").unwrap(), Some(vec![1, 2]));
        store.write("asset", b"\x03").unwrap();
        assert_eq!(store.read("asset").unwrap(), Some(vec![3]));
        assert!(store.contains_key("asset"));
    }

    #[cfg(feature = "fs")]
    #[test]
    fn fs_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("coinasset-store-{}", std::process::id()));
        let mut store = FsStore::new(&dir).unwrap();
        assert_eq!(store.read("asset").unwrap(), None);
        store.write("asset", b"data").unwrap();
        assert_eq!(store.read("asset").unwrap(), Some(b"data".to_vec()));

        let reopened = FsStore::new(&dir).unwrap();
        assert_eq!(reopened.read("asset").unwrap(), Some(b"data".to_vec()));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
