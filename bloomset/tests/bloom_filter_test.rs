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

use bloomset::bloom::BloomFilter;
use bloomset::bloom::BloomFilterBuilder;
use bloomset::bloom::Hashed;
use bloomset::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;

fn filter_with_range(start: u64, count: u64) -> BloomFilter {
    let mut filter = BloomFilter::new(512, 4, 0.05).unwrap();
    for i in start..start + count {
        filter.add(i).unwrap();
    }
    filter
}

#[test]
fn test_no_false_negatives() {
    let mut filter = BloomFilter::builder()
        .with_accuracy(5_000, 0.01)
        .build()
        .unwrap();

    for i in 0..5_000_u64 {
        filter.add(i).unwrap();
        filter.add(format!("key-{i}")).unwrap();
    }
    for i in 0..5_000_u64 {
        assert!(filter.might_contain(i));
        assert!(filter.might_contain(format!("key-{i}")));
    }
}

#[test]
fn test_idempotent_add() {
    let mut once = BloomFilter::new(128, 3, 0.1).unwrap();
    once.add("apple").unwrap();
    once.add(3.5_f64).unwrap();

    let mut twice = once.clone();
    twice.add("apple").unwrap();
    twice.add(3.5_f64).unwrap();

    assert_eq!(once.bits(), twice.bits());
}

#[test]
fn test_union_soundness() {
    let a = filter_with_range(0, 40);
    let b = filter_with_range(1_000, 40);
    let u = a.union(&b).unwrap();

    for e in (0..80).chain(1_000..1_080).chain(5_000..5_200_u64) {
        assert_eq!(u.might_contain(e), a.might_contain(e) || b.might_contain(e));
    }
}

#[test]
fn test_union_commutative_and_empty_identity() {
    let a = filter_with_range(0, 30);
    let b = filter_with_range(500, 30);
    assert_eq!(a.union(&b).unwrap().bits(), b.union(&a).unwrap().bits());

    let empty = BloomFilter::new(512, 4, 0.05).unwrap();
    assert_eq!(a.union(&empty).unwrap(), a);
    assert_eq!(empty.union(&a).unwrap().bits(), a.bits());
}

#[test]
fn test_union_rejects_mismatched_shapes() {
    let small = BloomFilter::new(8, 2, 0.1).unwrap();
    let large = BloomFilter::new(16, 2, 0.1).unwrap();
    let err = small.union(&large).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    assert!(!small.is_compatible(&large));
}

#[test]
fn test_equality_reflects_configuration_and_state() {
    let mut a = BloomFilter::new(64, 3, 0.1).unwrap();
    let b = BloomFilter::new(64, 3, 0.1).unwrap();
    assert_eq!(a, b);

    assert_ne!(a, BloomFilter::new(64, 3, 0.2).unwrap());
    assert_ne!(a, BloomFilter::new(64, 4, 0.1).unwrap());
    assert_ne!(a, BloomFilter::new(65, 3, 0.1).unwrap());

    a.add("only in a").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_load_factor_bounds_and_monotonic() {
    let mut filter = BloomFilter::new(64, 3, 0.1).unwrap();
    assert_eq!(filter.load_factor(), 0.0);

    let mut previous = 0.0;
    for i in 0..200_u32 {
        filter.add(i).unwrap();
        let load = filter.load_factor();
        assert_that!(load, ge(previous));
        assert_that!(load, le(1.0));
        let rate = filter.expected_false_positive_rate();
        assert_that!(rate, ge(0.0));
        assert_that!(rate, le(1.0));
        previous = load;
    }
}

#[test]
fn test_small_filter_scenario() {
    let mut filter = BloomFilter::new(16, 3, 0.1).unwrap();
    filter.add(5).unwrap();

    let set_after_five: Vec<usize> = filter.bits().ones().collect();
    assert!(!set_after_five.is_empty() && set_after_five.len() <= 3);
    assert!(filter.might_contain(5));

    let before_query = filter.clone();
    let _ = filter.might_contain(6);
    assert_eq!(filter, before_query);

    filter.add(6).unwrap();
    assert!(set_after_five.iter().all(|&i| filter.bits().get(i)));
    assert!(filter.might_contain(5));
}

#[test]
fn test_rejects_zero_size() {
    let err = BloomFilter::new(0, 3, 0.1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn test_with_elements() {
    let filter = BloomFilter::with_elements(256, 3, 0.1, ["a", "b", "c"]).unwrap();
    let mut manual = BloomFilter::new(256, 3, 0.1).unwrap();
    for e in ["a", "b", "c"] {
        manual.add(e).unwrap();
    }
    assert_eq!(filter, manual);

    let err = BloomFilter::with_elements(256, 3, 0.1, [1.0, f64::NAN, 2.0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnhashableElement);
}

#[test]
fn test_unhashable_is_never_a_member() {
    let mut filter = BloomFilter::new(8, 8, 0.5).unwrap();
    for i in 0..100 {
        filter.add(i).unwrap();
    }
    assert_eq!(filter.load_factor(), 1.0);
    assert!(filter.might_contain("anything at all"));
    assert!(!filter.might_contain(f64::NAN));
}

#[test]
fn test_opaque_and_textual_are_distinct_paths() {
    let mut filter = BloomFilter::new(1 << 16, 4, 0.01).unwrap();
    filter.add(Hashed(("user", 42_u32))).unwrap();
    assert!(filter.might_contain(Hashed(("user", 42_u32))));
    assert!(!filter.might_contain(Hashed(("user", 43_u32))));
    assert!(!filter.might_contain("user"));
}

#[test]
fn test_observed_false_positive_rate() {
    let mut filter = BloomFilter::builder()
        .with_accuracy(1_000, 0.01)
        .build()
        .unwrap();
    for i in 0..1_000 {
        filter.add(format!("present-{i}")).unwrap();
    }

    let trials = 10_000;
    let false_positives = (0..trials)
        .filter(|i| filter.might_contain(format!("absent-{i}")))
        .count();
    let observed = false_positives as f64 / trials as f64;
    assert_that!(observed, le(0.03));

    let closed_form =
        BloomFilterBuilder::false_positive_rate_for(filter.size(), filter.hash_count(), 1_000);
    assert_that!(filter.expected_false_positive_rate(), near(closed_form, 0.005));
}
