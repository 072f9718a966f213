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

use std::fmt::Write;

use crate::bloom::Element;
use crate::hash::SeededHash;

/// Bit positions probed for one element, in probe order.
///
/// Probe `i` is seeded with `i`. Textual elements hash their bytes directly.
/// Opaque elements chain: each probe hashes the decimal form of the previous
/// probe's hash, starting from the element's initial hash.
pub(super) struct Probes<'a, H> {
    hasher: &'a H,
    element: Element<'a>,
    num_bits: u64,
    hash_count: u32,
    next_seed: u32,
    scratch: String,
}

impl<'a, H: SeededHash> Probes<'a, H> {
    pub(super) fn new(hasher: &'a H, element: Element<'a>, size: usize, hash_count: u32) -> Self {
        Probes {
            hasher,
            element,
            num_bits: size as u64,
            hash_count,
            next_seed: 0,
            scratch: String::with_capacity(20),
        }
    }
}

impl<H: SeededHash> Iterator for Probes<'_, H> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next_seed == self.hash_count {
            return None;
        }
        let seed = self.next_seed;
        self.next_seed += 1;

        let hash = match self.element {
            Element::Textual(bytes) => self.hasher.hash_with_seed(bytes, seed),
            Element::Opaque(last) => {
                self.scratch.clear();
                // Formatting an integer into a String cannot fail.
                let _ = write!(self.scratch, "{last}");
                let hash = self.hasher.hash_with_seed(self.scratch.as_bytes(), seed);
                self.element = Element::Opaque(hash);
                hash
            }
        };
        Some((hash % self.num_bits) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.hash_count - self.next_seed) as usize;
        (remaining, Some(remaining))
    }
}

impl<H: SeededHash> ExactSizeIterator for Probes<'_, H> {}
