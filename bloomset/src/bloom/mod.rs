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

//! Bloom filter for probabilistic set membership testing.
//!
//! A Bloom filter answers "might this element have been added?" using a fixed
//! bit vector and `k` hash probes per element. False positives are possible,
//! false negatives are not: a query returns either "possibly in set" or
//! "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: once added, an element is reported forever
//! - **Append-only**: bits are never cleared, so removal is not offered
//! - **Fixed size**: the bit count and probe count never change
//! - **Union only**: two filters of the same shape merge by bitwise OR;
//!   intersection and difference are not sound and are not provided
//!
//! # Usage
//!
//! ```rust
//! use bloomset::bloom::BloomFilter;
//! use bloomset::bloom::Hashed;
//!
//! let mut filter = BloomFilter::builder()
//!     .with_accuracy(1000, 0.01)
//!     .build()
//!     .unwrap();
//!
//! filter.add("apple").unwrap();
//! filter.add(42_u64).unwrap();
//! filter.add(Hashed(("tuple", 7))).unwrap();
//!
//! assert!(filter.might_contain("apple"));
//! assert!(!filter.might_contain("grape")); // never added (probably)
//!
//! println!("Load factor: {:.4}", filter.load_factor());
//! println!("Est. FPP: {:.4}%", filter.expected_false_positive_rate() * 100.0);
//! ```
//!
//! # Probing
//!
//! Probe `i` in `0..k` hashes with seed `i`. Strings and byte buffers are
//! hashed directly. Other values are first reduced to one scalar hash, then
//! each probe hashes the decimal form of the previous probe's result. The bit
//! position is the hash modulo the filter size.
//!
//! Values without a stable identity (`NaN`) cannot be added and are never
//! reported as members.
//!
//! # Sharing
//!
//! [`BloomFilter`] owns its bits and `Clone` copies them. [`SharedBloomFilter`]
//! is a reference-counted handle for owners that must see each other's adds.

mod builder;
mod element;
mod probe;
mod shared;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::DEFAULT_MAX_FP_RATE;
pub use self::element::BloomElement;
pub use self::element::Element;
pub use self::element::Hashed;
pub use self::shared::SharedBloomFilter;
pub use self::sketch::BloomFilter;
