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

use crate::hash::SeededHash;

/// MurmurHash3 x64/128, truncated to the low 64 bits.
///
/// The seed selects the member of the family, so probe `i` of a filter uses
/// `murmurhash3_x64_128(bytes, i).0`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Murmur3;

impl SeededHash for Murmur3 {
    fn hash_with_seed(&self, bytes: &[u8], seed: u32) -> u64 {
        let (h1, _) = mur3::murmurhash3_x64_128(bytes, seed);
        h1
    }
}
