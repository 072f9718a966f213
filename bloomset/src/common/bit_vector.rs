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

use std::fmt;

use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

/// Fixed-length bit storage backing a Bloom filter.
///
/// A thin adapter over [`bitvec`] exposing only the operations the filter
/// consumes. The length is fixed at construction; bits are only ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    bits: BitVec<u64, Lsb0>,
}

impl BitVector {
    /// Largest length the backing storage can address.
    pub const MAX_LEN: usize = BitSlice::<u64, Lsb0>::MAX_BITS;

    /// Creates a vector of `len` clear bits.
    ///
    /// # Panics
    ///
    /// Panics if `len > MAX_LEN`.
    pub fn new(len: usize) -> Self {
        BitVector {
            bits: BitVec::repeat(false, len),
        }
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns whether the vector has no addressable bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Sets the bit at `index`, returning whether it was previously clear.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize) -> bool {
        let was_clear = !self.bits[index];
        self.bits.set(index, true);
        was_clear
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Number of set bits.
    pub fn count_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Returns the bitwise OR of two vectors of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn union(&self, other: &BitVector) -> BitVector {
        assert_eq!(
            self.len(),
            other.len(),
            "cannot union bit vectors of different lengths"
        );

        let mut bits = self.bits.clone();
        for (word, other_word) in bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *word |= *other_word;
        }
        BitVector { bits }
    }
}

/// Renders the bits as `0`/`1` characters, index 0 first.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
