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

use tracing::debug;
use tracing::trace;

use crate::bloom::BloomElement;
use crate::bloom::BloomFilterBuilder;
use crate::bloom::SharedBloomFilter;
use crate::bloom::probe::Probes;
use crate::common::BitVector;
use crate::error::Error;
use crate::hash::Murmur3;
use crate::hash::SeededHash;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (added elements always report `true`)
/// - A bounded false positive rate
/// - Constant space usage, fixed at construction
///
/// Bits are only ever set. There is no removal, reset, intersection or
/// difference: clearing a bit could hide an element that was added.
///
/// `Clone` is a deep copy. Use [`SharedBloomFilter`] when several owners must
/// observe the same bits.
#[derive(Debug, Clone)]
pub struct BloomFilter<H = Murmur3> {
    /// Number of addressable bits (m)
    size: usize,
    /// Number of probes per element (k)
    hash_count: u32,
    /// Ceiling on the estimated false positive rate
    max_fp_rate: f64,
    bits: BitVector,
    hasher: H,
}

impl BloomFilter {
    /// Creates an empty filter hashing with [`Murmur3`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfig`] if `size` or `hash_count` is zero,
    /// if `size` exceeds [`BitVector::MAX_LEN`], or if `max_fp_rate` is not
    /// strictly between 0 and 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomset::bloom::BloomFilter;
    /// use bloomset::error::ErrorKind;
    ///
    /// let filter = BloomFilter::new(128, 4, 0.25).unwrap();
    /// assert!(filter.is_empty());
    ///
    /// let err = BloomFilter::new(0, 4, 0.25).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    /// ```
    ///
    /// [`ErrorKind::InvalidConfig`]: crate::error::ErrorKind::InvalidConfig
    pub fn new(size: usize, hash_count: u32, max_fp_rate: f64) -> Result<Self, Error> {
        Self::with_hasher(size, hash_count, max_fp_rate, Murmur3)
    }

    /// Creates a filter and adds every element in iteration order.
    ///
    /// # Errors
    ///
    /// Fails like [`new`](Self::new), or with
    /// [`ErrorKind::UnhashableElement`] on the first element that cannot be
    /// hashed. No filter is returned in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomset::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::with_elements(256, 3, 0.05, ["a", "b", "c"]).unwrap();
    /// assert!(filter.might_contain("b"));
    /// ```
    ///
    /// [`ErrorKind::UnhashableElement`]: crate::error::ErrorKind::UnhashableElement
    pub fn with_elements<I>(
        size: usize,
        hash_count: u32,
        max_fp_rate: f64,
        elements: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: BloomElement,
    {
        let mut filter = Self::new(size, hash_count, max_fp_rate)?;
        filter.add_all(elements)?;
        Ok(filter)
    }

    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomset::bloom::BloomFilter;
    ///
    /// // By accuracy
    /// let filter = BloomFilter::builder().with_accuracy(1000, 0.01).build().unwrap();
    ///
    /// // By size
    /// let filter = BloomFilter::builder().with_size(10_000, 7).build().unwrap();
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }
}

impl<H: SeededHash> BloomFilter<H> {
    /// Creates an empty filter addressing bits with `hasher`.
    ///
    /// Validation is identical to [`BloomFilter::new`].
    pub fn with_hasher(
        size: usize,
        hash_count: u32,
        max_fp_rate: f64,
        hasher: H,
    ) -> Result<Self, Error> {
        validate_config(size, hash_count, max_fp_rate)?;
        debug!(size, hash_count, max_fp_rate, "created bloom filter");

        Ok(BloomFilter {
            size,
            hash_count,
            max_fp_rate,
            bits: BitVector::new(size),
            hasher,
        })
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds an element to the filter.
    ///
    /// After this returns `Ok`, `might_contain(element)` is `true` for the
    /// lifetime of the filter. Adding the same element again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnhashableElement`] if the element has no stable
    /// hash representation. The filter is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 4, 0.01).unwrap();
    ///
    /// filter.add("apple").unwrap();
    /// filter.add(42_u64).unwrap();
    /// assert!(filter.add(f64::NAN).is_err());
    ///
    /// assert!(filter.might_contain("apple"));
    /// ```
    ///
    /// [`ErrorKind::UnhashableElement`]: crate::error::ErrorKind::UnhashableElement
    pub fn add<T: BloomElement>(&mut self, element: T) -> Result<(), Error> {
        let element = element
            .to_element()
            .inspect_err(|err| trace!(%err, "rejected element"))?;

        for position in Probes::new(&self.hasher, element, self.size, self.hash_count) {
            self.bits.set(position);
        }
        Ok(())
    }

    /// Adds every element in iteration order, stopping at the first error.
    ///
    /// Elements before the failing one stay added.
    pub fn add_all<I>(&mut self, elements: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: BloomElement,
    {
        for element in elements {
            self.add(element)?;
        }
        Ok(())
    }

    /// Tests and adds an element in a single pass over its probes.
    ///
    /// Returns whether the element was possibly present before the call.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 4, 0.01).unwrap();
    ///
    /// assert!(!filter.contains_and_add("apple").unwrap());
    /// assert!(filter.contains_and_add("apple").unwrap());
    /// ```
    pub fn contains_and_add<T: BloomElement>(&mut self, element: T) -> Result<bool, Error> {
        let element = element
            .to_element()
            .inspect_err(|err| trace!(%err, "rejected element"))?;

        let mut was_present = true;
        for position in Probes::new(&self.hasher, element, self.size, self.hash_count) {
            if self.bits.set(position) {
                was_present = false;
            }
        }
        Ok(was_present)
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: the element was **possibly** added (or is a false positive)
    /// - `false`: the element was **definitely not** added
    ///
    /// An element that cannot be hashed could never have been added, so it
    /// yields `false` instead of an error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 4, 0.01).unwrap();
    /// filter.add("apple").unwrap();
    ///
    /// assert!(filter.might_contain("apple"));
    /// assert!(!filter.might_contain(f64::NAN));
    /// ```
    pub fn might_contain<T: BloomElement>(&self, element: T) -> bool {
        match element.to_element() {
            Ok(element) => Probes::new(&self.hasher, element, self.size, self.hash_count)
                .all(|position| self.bits.get(position)),
            Err(_) => false,
        }
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Returns a new filter holding the bitwise OR of both filters.
    ///
    /// The result keeps this filter's configuration and hasher and reports
    /// every element that either operand reports. Neither operand is modified.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleFilter`] if the filters differ in size
    /// or hash count.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::new(512, 3, 0.01).unwrap();
    /// let mut f2 = BloomFilter::new(512, 3, 0.01).unwrap();
    ///
    /// f1.add("a").unwrap();
    /// f2.add("b").unwrap();
    ///
    /// let merged = f1.union(&f2).unwrap();
    /// assert!(merged.might_contain("a"));
    /// assert!(merged.might_contain("b"));
    /// ```
    ///
    /// [`ErrorKind::IncompatibleFilter`]: crate::error::ErrorKind::IncompatibleFilter
    pub fn union(&self, other: &BloomFilter<H>) -> Result<Self, Error>
    where
        H: Clone,
    {
        if !self.is_compatible(other) {
            return Err(Error::incompatible("cannot union bloom filters of different shapes")
                .with_context("size", self.size)
                .with_context("other_size", other.size)
                .with_context("hash_count", self.hash_count)
                .with_context("other_hash_count", other.hash_count));
        }

        let bits = self.bits.union(&other.bits);
        debug!(
            size = self.size,
            hash_count = self.hash_count,
            bits_set = bits.count_set(),
            "merged bloom filters"
        );

        Ok(BloomFilter {
            size: self.size,
            hash_count: self.hash_count,
            max_fp_rate: self.max_fp_rate,
            bits,
            hasher: self.hasher.clone(),
        })
    }

    /// Wraps this filter into a handle whose clones share the same bits.
    pub fn into_shared(self) -> SharedBloomFilter<H> {
        SharedBloomFilter::new(self)
    }
}

impl<H> BloomFilter<H> {
    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the number of addressable bits.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of probes per element.
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Returns the configured ceiling on the false positive rate.
    pub fn max_fp_rate(&self) -> f64 {
        self.max_fp_rate
    }

    /// Returns the hash family used for probing.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the underlying bits.
    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> usize {
        self.bits.count_set()
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits_set() == 0
    }

    /// Returns the fraction of bits set, in `[0, 1]`.
    ///
    /// Never decreases as elements are added.
    pub fn load_factor(&self) -> f64 {
        self.bits_set() as f64 / self.size as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// A query for an absent element is a false positive when all `k` probed
    /// bits happen to be set, so the estimate is `load_factor ^ k`. This uses
    /// the observed fill rather than the closed form `(1 - e^(-k*n/m))^k`,
    /// because the number of distinct elements `n` is not tracked. See
    /// [`BloomFilterBuilder::false_positive_rate_for`] for the closed form.
    pub fn expected_false_positive_rate(&self) -> f64 {
        self.load_factor().powf(f64::from(self.hash_count))
    }

    /// Returns whether the estimated false positive rate exceeds
    /// [`max_fp_rate`](Self::max_fp_rate).
    pub fn is_saturated(&self) -> bool {
        self.expected_false_positive_rate() > self.max_fp_rate
    }

    /// Checks if two filters can be merged.
    ///
    /// Filters are compatible if they have the same size and hash count.
    pub fn is_compatible<H2>(&self, other: &BloomFilter<H2>) -> bool {
        self.size == other.size && self.hash_count == other.hash_count
    }
}

/// Filters are equal when configuration and bit state match.
///
/// This compares representations: filters with different insertion histories
/// can be equal if their bits collide into the same pattern.
impl<H> PartialEq for BloomFilter<H> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.hash_count == other.hash_count
            && self.max_fp_rate == other.max_fp_rate
            && self.bits == other.bits
    }
}

impl<H> fmt::Display for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BloomFilter(size={}, hash_count={}, max_fp_rate={:.6}, bits={})",
            self.size, self.hash_count, self.max_fp_rate, self.bits
        )
    }
}

pub(super) fn validate_config(size: usize, hash_count: u32, max_fp_rate: f64) -> Result<(), Error> {
    if size == 0 {
        return Err(Error::invalid_config("size must be at least 1").with_context("size", size));
    }
    if size > BitVector::MAX_LEN {
        return Err(Error::invalid_config("size exceeds the addressable bit count")
            .with_context("size", size)
            .with_context("max_size", BitVector::MAX_LEN));
    }
    if hash_count == 0 {
        return Err(Error::invalid_config("hash_count must be at least 1")
            .with_context("hash_count", hash_count));
    }
    // Written so that NaN fails too.
    if !(max_fp_rate > 0.0 && max_fp_rate < 1.0) {
        return Err(
            Error::invalid_config("max_fp_rate must be between 0.0 and 1.0 (exclusive)")
                .with_context("max_fp_rate", max_fp_rate),
        );
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_is_empty() {
        let filter = BloomFilter::new(128, 4, 0.25).unwrap();
        assert_eq!(filter.size(), 128);
        assert_eq!(filter.hash_count(), 4);
        assert_eq!(filter.max_fp_rate(), 0.25);
        assert!(filter.is_empty());
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.expected_false_positive_rate(), 0.0);
    }

    #[test]
    fn test_invalid_config() {
        for (size, hash_count, rate) in [
            (0, 3, 0.1),
            (16, 0, 0.1),
            (16, 3, 0.0),
            (16, 3, 1.0),
            (16, 3, -0.5),
            (16, 3, f64::NAN),
        ] {
            let err = BloomFilter::new(size, hash_count, rate).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        }
    }

    #[test]
    fn test_oversized_filter_is_rejected() {
        let err = BloomFilter::new(usize::MAX, 1, 0.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.context_value("size"), Some(usize::MAX.to_string().as_str()));

        let err = BloomFilter::new(BitVector::MAX_LEN + 1, 1, 0.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_add_sets_at_most_k_bits() {
        let mut filter = BloomFilter::new(16, 3, 0.1).unwrap();
        filter.add(5).unwrap();
        assert!(filter.bits_set() >= 1 && filter.bits_set() <= 3);
        assert!(filter.might_contain(5));

        let before = filter.bits().clone();
        filter.add(6).unwrap();
        assert!(before.ones().all(|i| filter.bits().get(i)));
        assert!(filter.might_contain(5));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut filter = BloomFilter::new(256, 5, 0.1).unwrap();
        filter.add("apple").unwrap();
        let once = filter.clone();
        filter.add("apple").unwrap();
        assert_eq!(filter, once);
    }

    #[test]
    fn test_unhashable_add_leaves_state() {
        let mut filter = BloomFilter::new(64, 3, 0.1).unwrap();
        filter.add("x").unwrap();
        let before = filter.clone();

        let err = filter.add(f32::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnhashableElement);
        assert_eq!(filter, before);
        assert!(!filter.might_contain(f32::NAN));
    }

    #[test]
    fn test_contains_and_add() {
        let mut filter = BloomFilter::new(1024, 4, 0.01).unwrap();
        assert!(!filter.contains_and_add(42_u64).unwrap());
        assert!(filter.contains_and_add(42_u64).unwrap());
        assert!(filter.contains_and_add(f64::NAN).is_err());
    }

    #[test]
    fn test_union_keeps_receiver_config() {
        let mut f1 = BloomFilter::new(64, 2, 0.1).unwrap();
        let mut f2 = BloomFilter::new(64, 2, 0.3).unwrap();
        f1.add("a").unwrap();
        f2.add("b").unwrap();

        let merged = f1.union(&f2).unwrap();
        assert_eq!(merged.max_fp_rate(), 0.1);
        assert!(merged.might_contain("a"));
        assert!(merged.might_contain("b"));
        assert!(!f1.is_empty() && !f2.is_empty());
    }

    #[test]
    fn test_union_incompatible() {
        let f1 = BloomFilter::new(8, 2, 0.1).unwrap();
        let f2 = BloomFilter::new(16, 2, 0.1).unwrap();
        let err = f1.union(&f2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
        assert_eq!(err.context_value("other_size"), Some("16"));

        let f3 = BloomFilter::new(8, 3, 0.1).unwrap();
        assert_eq!(f1.union(&f3).unwrap_err().kind(), ErrorKind::IncompatibleFilter);
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilter::new(1000, 5, 0.01).unwrap();
        filter.add("test").unwrap();
        assert!(filter.bits_set() > 0);
        assert!(filter.load_factor() > 0.0);

        let expected = filter.load_factor().powi(5);
        assert!((filter.expected_false_positive_rate() - expected).abs() < 1e-12);
        assert!(!filter.is_saturated());
    }

    #[test]
    fn test_saturation() {
        let mut filter = BloomFilter::new(32, 2, 0.05).unwrap();
        for i in 0..200_u32 {
            filter.add(i).unwrap();
        }
        assert!(filter.load_factor() > 0.9);
        assert!(filter.is_saturated());
    }

    #[test]
    fn test_display() {
        let mut filter = BloomFilter::new(8, 1, 0.25).unwrap();
        assert_eq!(
            filter.to_string(),
            "BloomFilter(size=8, hash_count=1, max_fp_rate=0.250000, bits=00000000)"
        );

        filter.add("a").unwrap();
        let shown = filter.to_string();
        let bits = shown
            .trim_start_matches("BloomFilter(size=8, hash_count=1, max_fp_rate=0.250000, bits=")
            .trim_end_matches(')');
        assert_eq!(bits.len(), 8);
        assert_eq!(bits.matches('1').count(), 1);
    }
}
