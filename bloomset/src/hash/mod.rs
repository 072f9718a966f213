// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Seeded hashing used to address filter bits.
//!
//! A Bloom filter needs `k` hash functions. Rather than `k` unrelated
//! algorithms, one keyed algorithm is reseeded per probe: probe `i` uses seed
//! `i`. [`SeededHash`] is the seam where that algorithm plugs in; [`Murmur3`]
//! is the default.

use std::hash::Hash;

mod murmurhash;

pub use self::murmurhash::Murmur3;

/// Seed used to compute the initial scalar hash of non-textual elements.
pub const DEFAULT_SEED: u32 = 9001;

/// A keyed hash family indexed by an integer seed.
///
/// Implementations must be deterministic: the same `bytes` and `seed` always
/// produce the same value, otherwise inserted elements become unreachable.
pub trait SeededHash {
    /// Hashes `bytes` with the member of the family selected by `seed`.
    fn hash_with_seed(&self, bytes: &[u8], seed: u32) -> u64;
}

impl<H: SeededHash + ?Sized> SeededHash for &H {
    fn hash_with_seed(&self, bytes: &[u8], seed: u32) -> u64 {
        (**self).hash_with_seed(bytes, seed)
    }
}

/// Computes the initial scalar hash of an arbitrary [`Hash`] value.
///
/// This feeds the value through MurmurHash3 x64/128 with [`DEFAULT_SEED`] and
/// keeps the low 64 bits. It does not depend on the filter's [`SeededHash`],
/// so two filters with different hashers still agree on an element's identity.
pub fn initial_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
    value.hash(&mut hasher);
    let (lo, _) = hasher.finish128();
    lo
}
