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

//! Example demonstrating Bloom filter usage

use bloomset::bloom::BloomFilter;
use bloomset::bloom::BloomFilterBuilder;
use bloomset::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    // RUST_LOG=bloomset=debug shows construction and union events.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Bloom Filter Example ===\n");

    // Example 1: Capacity planning
    println!("1. Capacity planning for 10,000 items at 1%:");
    if let Some(size) = BloomFilterBuilder::suggest_size(10_000, 0.01) {
        let hash_count = BloomFilterBuilder::suggest_hash_count(10_000, size);
        println!("   Suggested size: {size} bits");
        println!("   Suggested hash count: {hash_count}");
    }
    println!();

    // Example 2: Add and query
    println!("2. Add and query:");
    let mut visited = BloomFilter::builder()
        .with_accuracy(10_000, 0.01)
        .build()?;
    for i in 0..10_000 {
        visited.add(format!("https://example.com/page/{i}"))?;
    }
    println!(
        "   Seen page 42: {}",
        visited.might_contain("https://example.com/page/42")
    );
    println!(
        "   Seen page 99999: {}",
        visited.might_contain("https://example.com/page/99999")
    );
    println!("   Load factor: {:.4}", visited.load_factor());
    println!(
        "   Est. FPP: {:.4}%",
        visited.expected_false_positive_rate() * 100.0
    );
    println!("   Saturated: {}", visited.is_saturated());
    println!();

    // Example 3: Union
    println!("3. Union of two small filters:");
    let left = BloomFilter::with_elements(32, 2, 0.25, ["a", "b"])?;
    let right = BloomFilter::with_elements(32, 2, 0.25, ["c"])?;
    let merged = left.union(&right)?;
    println!("   {left}");
    println!("   {right}");
    println!("   {merged}");
    println!();

    // Example 4: Rejections
    println!("4. Rejections:");
    match BloomFilter::new(0, 3, 0.1) {
        Ok(_) => println!("   unexpected success"),
        Err(err) => println!("   new(size=0): {err}"),
    }
    match left.union(&BloomFilter::new(16, 2, 0.25)?) {
        Ok(_) => println!("   unexpected success"),
        Err(err) => println!("   union(32, 16): {err}"),
    }
    let mut scratch = BloomFilter::new(64, 2, 0.1)?;
    if let Err(err) = scratch.add(f64::NAN) {
        println!("   add(NaN): {err}");
    }
    println!("   might_contain(NaN): {}", scratch.might_contain(f64::NAN));

    Ok(())
}
