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
use std::sync::Arc;

use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;

use crate::bloom::BloomElement;
use crate::bloom::BloomFilter;
use crate::error::Error;
use crate::hash::Murmur3;
use crate::hash::SeededHash;

/// A reference-counted handle to a Bloom filter.
///
/// Cloning the handle (or calling [`shallow_copy`](Self::shallow_copy)) does
/// not copy bits: every handle observes elements added through any other. The
/// filter lives until the last handle is dropped. Access is guarded by a
/// reader-writer lock, so concurrent queries proceed in parallel while adds
/// are serialized against everything else.
///
/// [`deep_copy`](Self::deep_copy) detaches an independent [`BloomFilter`].
///
/// # Examples
///
/// ```
/// use bloomset::bloom::BloomFilter;
///
/// let original = BloomFilter::new(1024, 4, 0.01).unwrap().into_shared();
/// let shallow = original.shallow_copy();
/// let deep = original.deep_copy();
///
/// original.add("apple").unwrap();
/// assert!(shallow.might_contain("apple"));
/// assert!(!deep.might_contain("apple"));
/// ```
pub struct SharedBloomFilter<H = Murmur3> {
    inner: Arc<RwLock<BloomFilter<H>>>,
}

impl<H> Clone for SharedBloomFilter<H> {
    fn clone(&self) -> Self {
        SharedBloomFilter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: SeededHash> SharedBloomFilter<H> {
    /// Takes ownership of `filter` behind a shared handle.
    pub fn new(filter: BloomFilter<H>) -> Self {
        SharedBloomFilter {
            inner: Arc::new(RwLock::new(filter)),
        }
    }

    /// Returns another handle to the same filter.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// Returns an independent filter with the current bit pattern.
    pub fn deep_copy(&self) -> BloomFilter<H>
    where
        H: Clone,
    {
        self.inner.read().clone()
    }

    /// Adds an element through the write lock. See [`BloomFilter::add`].
    pub fn add<T: BloomElement>(&self, element: T) -> Result<(), Error> {
        self.inner.write().add(element)
    }

    /// See [`BloomFilter::contains_and_add`].
    pub fn contains_and_add<T: BloomElement>(&self, element: T) -> Result<bool, Error> {
        self.inner.write().contains_and_add(element)
    }

    /// See [`BloomFilter::might_contain`].
    pub fn might_contain<T: BloomElement>(&self, element: T) -> bool {
        self.inner.read().might_contain(element)
    }

    /// Unions the current bits of two shared filters into a new owned filter.
    ///
    /// The locks are taken one after the other, never nested, so opposite
    /// unions on two threads cannot deadlock.
    pub fn union(&self, other: &SharedBloomFilter<H>) -> Result<BloomFilter<H>, Error>
    where
        H: Clone,
    {
        let other = other.deep_copy();
        self.inner.read().union(&other)
    }

    /// Locks the filter for reading and returns the guard.
    ///
    /// Adds through other handles block until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, BloomFilter<H>> {
        self.inner.read()
    }

    /// See [`BloomFilter::load_factor`].
    pub fn load_factor(&self) -> f64 {
        self.inner.read().load_factor()
    }

    /// See [`BloomFilter::expected_false_positive_rate`].
    pub fn expected_false_positive_rate(&self) -> f64 {
        self.inner.read().expected_false_positive_rate()
    }

    /// Returns whether both handles point at the same filter.
    pub fn ptr_eq(&self, other: &SharedBloomFilter<H>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this filter.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<H: SeededHash> From<BloomFilter<H>> for SharedBloomFilter<H> {
    fn from(filter: BloomFilter<H>) -> Self {
        SharedBloomFilter::new(filter)
    }
}

impl<H: fmt::Debug> fmt::Debug for SharedBloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBloomFilter")
            .field("handles", &Arc::strong_count(&self.inner))
            .field("filter", &*self.inner.read())
            .finish()
    }
}

impl<H> fmt::Display for SharedBloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.read(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_share_bits() {
        let a = SharedBloomFilter::new(BloomFilter::new(256, 3, 0.1).unwrap());
        let b = a.shallow_copy();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.handle_count(), 2);

        b.add("x").unwrap();
        assert!(a.might_contain("x"));
        assert_eq!(a.load_factor(), b.load_factor());

        drop(b);
        assert_eq!(a.handle_count(), 1);
    }

    #[test]
    fn test_deep_copy_detaches() {
        let shared = BloomFilter::new(256, 3, 0.1).unwrap().into_shared();
        shared.add(1_u32).unwrap();

        let mut detached = shared.deep_copy();
        assert_eq!(detached, *shared.read());

        detached.add(2_u32).unwrap();
        shared.add(3_u32).unwrap();
        assert!(detached.might_contain(1_u32));
        assert_ne!(detached, *shared.read());
    }

    #[test]
    fn test_union_with_itself() {
        let shared = BloomFilter::new(64, 2, 0.1).unwrap().into_shared();
        shared.add("a").unwrap();
        let merged = shared.union(&shared.shallow_copy()).unwrap();
        assert_eq!(merged, *shared.read());
    }

    #[test]
    fn test_concurrent_adds_are_visible() {
        let shared = BloomFilter::new(4096, 4, 0.01).unwrap().into_shared();

        std::thread::scope(|s| {
            for t in 0..4_u64 {
                let handle = shared.shallow_copy();
                s.spawn(move || {
                    for i in 0..100 {
                        handle.add(t * 1000 + i).unwrap();
                    }
                });
            }
        });

        for t in 0..4_u64 {
            for i in 0..100 {
                assert!(shared.might_contain(t * 1000 + i));
            }
        }
        assert!(shared.to_string().starts_with("BloomFilter(size=4096, hash_count=4"));
    }
}
