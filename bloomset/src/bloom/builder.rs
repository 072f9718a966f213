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

use crate::bloom::BloomFilter;
use crate::bloom::sketch::validate_config;
use crate::error::Error;
use crate::hash::Murmur3;
use crate::hash::SeededHash;

/// Ceiling on the false positive rate when none is given.
pub const DEFAULT_MAX_FP_RATE: f64 = 0.01;

const MAX_SUGGESTED_HASH_COUNT: u32 = 100;

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Manual { size: usize, hash_count: u32 },
    Accuracy { max_items: u64, fp_rate: f64 },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two sizing modes:
/// - [`with_accuracy()`](Self::with_accuracy): derive size and hash count from
///   an expected element count and a target false positive rate
/// - [`with_size()`](Self::with_size): give the bit count and hash count
///   directly
///
/// Nothing is validated until [`build()`](Self::build), which reports invalid
/// settings as [`ErrorKind::InvalidConfig`].
///
/// [`ErrorKind::InvalidConfig`]: crate::error::ErrorKind::InvalidConfig
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder<H = Murmur3> {
    sizing: Option<Sizing>,
    max_fp_rate: Option<f64>,
    hasher: H,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        BloomFilterBuilder {
            sizing: None,
            max_fp_rate: None,
            hasher: Murmur3,
        }
    }
}

impl<H: SeededHash> BloomFilterBuilder<H> {
    /// Sizes the filter for `max_items` distinct elements at `fp_rate`.
    ///
    /// Unless overridden with [`max_fp_rate()`](Self::max_fp_rate), `fp_rate`
    /// also becomes the filter's false positive ceiling.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let filter = BloomFilter::builder()
    ///     .with_accuracy(10_000, 0.01)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.hash_count(), 7);
    /// assert_eq!(filter.max_fp_rate(), 0.01);
    /// ```
    pub fn with_accuracy(mut self, max_items: u64, fp_rate: f64) -> Self {
        self.sizing = Some(Sizing::Accuracy { max_items, fp_rate });
        self
    }

    /// Sets the bit count and hash count directly.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let filter = BloomFilter::builder().with_size(128, 4).build().unwrap();
    /// assert_eq!(filter.size(), 128);
    /// ```
    pub fn with_size(mut self, size: usize, hash_count: u32) -> Self {
        self.sizing = Some(Sizing::Manual { size, hash_count });
        self
    }

    /// Sets the false positive ceiling reported by the filter.
    pub fn max_fp_rate(mut self, max_fp_rate: f64) -> Self {
        self.max_fp_rate = Some(max_fp_rate);
        self
    }

    /// Replaces the hash family used for probing.
    ///
    /// Filters built with different hash families address different bits for
    /// the same element; only union filters that share one.
    pub fn hasher<H2: SeededHash>(self, hasher: H2) -> BloomFilterBuilder<H2> {
        BloomFilterBuilder {
            sizing: self.sizing,
            max_fp_rate: self.max_fp_rate,
            hasher,
        }
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfig`] if no sizing mode was chosen, if
    /// `max_items` is zero, if a rate is not strictly between 0 and 1, or if
    /// the resulting size is zero or larger than the bit vector can address.
    ///
    /// [`ErrorKind::InvalidConfig`]: crate::error::ErrorKind::InvalidConfig
    pub fn build(self) -> Result<BloomFilter<H>, Error> {
        let Some(sizing) = self.sizing else {
            return Err(Error::invalid_config(
                "must call with_accuracy() or with_size() before build()",
            ));
        };

        let (size, hash_count, default_rate) = match sizing {
            Sizing::Manual { size, hash_count } => (size, hash_count, DEFAULT_MAX_FP_RATE),
            Sizing::Accuracy { max_items, fp_rate } => {
                validate_accuracy(max_items, fp_rate)?;
                let Some(num_bits) = BloomFilterBuilder::suggest_size(max_items, fp_rate) else {
                    return Err(Error::invalid_config("suggested size is out of range")
                        .with_context("max_items", max_items)
                        .with_context("fp_rate", fp_rate));
                };
                let size = usize::try_from(num_bits).map_err(|err| {
                    Error::invalid_config("suggested size does not fit in memory")
                        .with_context("max_items", max_items)
                        .with_context("fp_rate", fp_rate)
                        .set_source(err)
                })?;
                let hash_count = BloomFilterBuilder::suggest_hash_count(max_items, num_bits);
                (size, hash_count, fp_rate)
            }
        };

        let max_fp_rate = self.max_fp_rate.unwrap_or(default_rate);
        BloomFilter::with_hasher(size, hash_count, max_fp_rate, self.hasher)
    }
}

impl BloomFilterBuilder {
    /// Suggests the number of bits for `max_items` elements at `fp_rate`.
    ///
    /// Formula: `m = ceil(-n * ln(p) / ln(2)^2)`, at least 1. Returns `None`
    /// when the result is not finite or does not fit in a `u64`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_size(1000, 0.01).unwrap();
    /// assert!(bits > 9500 && bits < 9700); // ~9586 bits
    ///
    /// assert_eq!(BloomFilterBuilder::suggest_size(u64::MAX, 1e-300), None);
    /// ```
    pub fn suggest_size(max_items: u64, fp_rate: f64) -> Option<u64> {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        let bits = (-n * fp_rate.ln() / ln2_squared).ceil();
        // u64::MAX as f64 rounds up to 2^64, which is already out of range.
        if !bits.is_finite() || bits >= u64::MAX as f64 {
            return None;
        }
        Some((bits as u64).max(1))
    }

    /// Suggests the number of probes for `max_items` elements in `size` bits.
    ///
    /// Formula: `k = round(m / n * ln(2))`, clamped to `[1, 100]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_hash_count(1000, 10_000), 7);
    /// ```
    pub fn suggest_hash_count(max_items: u64, size: u64) -> u32 {
        let m = size as f64;
        let n = max_items.max(1) as f64;
        let k = (m / n * std::f64::consts::LN_2).round();
        (k as u32).clamp(1, MAX_SUGGESTED_HASH_COUNT)
    }

    /// Suggests the number of probes from a target rate alone.
    ///
    /// Formula: `k = round(-log2(p))`, clamped to `[1, 100]`.
    pub fn suggest_hash_count_for_rate(fp_rate: f64) -> u32 {
        let k = -fp_rate.log2();
        (k.round() as u32).clamp(1, MAX_SUGGESTED_HASH_COUNT)
    }

    /// Closed-form false positive rate after `num_items` distinct insertions.
    ///
    /// Formula: `(1 - e^(-k * n / m))^k`. Returns 0 when `size` or
    /// `hash_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let rate = BloomFilterBuilder::false_positive_rate_for(9586, 7, 1000);
    /// assert!((rate - 0.01).abs() < 0.001);
    /// ```
    pub fn false_positive_rate_for(size: usize, hash_count: u32, num_items: u64) -> f64 {
        if size == 0 || hash_count == 0 {
            return 0.0;
        }
        let k = f64::from(hash_count);
        let fill = 1.0 - (-k * num_items as f64 / size as f64).exp();
        fill.powf(k)
    }
}

fn validate_accuracy(max_items: u64, fp_rate: f64) -> Result<(), Error> {
    if max_items == 0 {
        return Err(Error::invalid_config("max_items must be greater than 0"));
    }
    // Rejects NaN as well.
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(
            Error::invalid_config("fp_rate must be between 0.0 and 1.0 (exclusive)")
                .with_context("fp_rate", fp_rate),
        );
    }
    Ok(())
}
