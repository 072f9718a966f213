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

use std::hash::Hash;

use crate::error::Error;
use crate::hash::initial_hash;

/// The hashing input derived from an element.
///
/// Textual data is hashed directly from its bytes. Everything else is reduced
/// to one scalar hash up front and then chained through the seeded hash once
/// per probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    /// Bytes hashed directly for every probe.
    Textual(&'a [u8]),
    /// Initial scalar hash of a non-textual value.
    Opaque(u64),
}

/// Types that can be inserted into or queried against a Bloom filter.
///
/// Implemented for strings and byte buffers (textual), for the primitive
/// scalar types (opaque), and for any [`Hash`] type through [`Hashed`].
/// Implementations may reject values that lack a stable identity, such as
/// `NaN`; such values can never be added and are never reported as members.
///
/// Elements are typed. Opaque values hash their [`Hash`] encoding, which
/// differs between types holding the same number, so `5_i32` and `5_u64`
/// are different elements. Add and query with the same type.
///
/// ```
/// use bloomset::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::new(1 << 16, 4, 0.01).unwrap();
/// filter.add(5_i32).unwrap();
/// assert!(filter.might_contain(5_i32));
/// assert!(!filter.might_contain(5_u64));
/// ```
pub trait BloomElement {
    /// Resolves this value into the input of the probe sequence.
    fn to_element(&self) -> Result<Element<'_>, Error>;
}

impl<T: BloomElement + ?Sized> BloomElement for &T {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        (**self).to_element()
    }
}

impl BloomElement for str {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Textual(self.as_bytes()))
    }
}

impl BloomElement for String {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Textual(self.as_bytes()))
    }
}

impl BloomElement for [u8] {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Textual(self))
    }
}

impl<const N: usize> BloomElement for [u8; N] {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Textual(self))
    }
}

impl BloomElement for Vec<u8> {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Textual(self))
    }
}

macro_rules! impl_opaque_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BloomElement for $ty {
                fn to_element(&self) -> Result<Element<'_>, Error> {
                    Ok(Element::Opaque(initial_hash(self)))
                }
            }
        )*
    };
}

impl_opaque_element!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char
);

macro_rules! impl_float_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BloomElement for $ty {
                fn to_element(&self) -> Result<Element<'_>, Error> {
                    if self.is_nan() {
                        return Err(Error::unhashable("NaN has no stable identity")
                            .with_context("type", stringify!($ty)));
                    }
                    // -0.0 == 0.0, so both must land on the same bits.
                    let normalized = if *self == 0.0 { 0.0 } else { *self };
                    Ok(Element::Opaque(initial_hash(&normalized.to_bits())))
                }
            }
        )*
    };
}

impl_float_element!(f32, f64);

/// Adapts any [`Hash`] value into an opaque element.
///
/// # Examples
///
/// ```
/// use bloomset::bloom::BloomFilter;
/// use bloomset::bloom::Hashed;
///
/// let mut filter = BloomFilter::new(1024, 4, 0.01).unwrap();
/// filter.add(Hashed(("user", 42_u32))).unwrap();
/// assert!(filter.might_contain(Hashed(("user", 42_u32))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hashed<T>(pub T);

impl<T: Hash> BloomElement for Hashed<T> {
    fn to_element(&self) -> Result<Element<'_>, Error> {
        Ok(Element::Opaque(initial_hash(&self.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_textual_inputs_share_bytes() {
        assert_eq!("abc".to_element().unwrap(), Element::Textual(b"abc"));
        assert_eq!(
            String::from("abc").to_element().unwrap(),
            b"abc".to_element().unwrap()
        );
        assert_eq!(
            vec![b'a', b'b', b'c'].to_element().unwrap(),
            Element::Textual(b"abc")
        );
    }

    #[test]
    fn test_scalars_are_opaque() {
        assert_eq!(5_u64.to_element().unwrap(), Element::Opaque(initial_hash(&5_u64)));
        assert!(matches!('x'.to_element().unwrap(), Element::Opaque(_)));
        assert_eq!(
            Hashed(7_i32).to_element().unwrap(),
            7_i32.to_element().unwrap()
        );
    }

    #[test]
    fn test_integer_widths_are_distinct_elements() {
        assert_ne!(5_i32.to_element().unwrap(), 5_u64.to_element().unwrap());
        assert_ne!(5_u8.to_element().unwrap(), 5_u16.to_element().unwrap());
        assert_eq!(5_u64.to_element().unwrap(), 5_u64.to_element().unwrap());
    }

    #[test]
    fn test_nan_is_unhashable() {
        let err = f64::NAN.to_element().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnhashableElement);
        assert_eq!(err.context_value("type"), Some("f64"));
        assert!(f32::NAN.to_element().is_err());
    }

    #[test]
    fn test_signed_zero_is_one_element() {
        assert_eq!(0.0_f64.to_element().unwrap(), (-0.0_f64).to_element().unwrap());
        assert_ne!(1.0_f64.to_element().unwrap(), (-1.0_f64).to_element().unwrap());
        assert!(f64::INFINITY.to_element().is_ok());
    }
}
