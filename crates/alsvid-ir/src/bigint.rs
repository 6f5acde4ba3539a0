//! Arbitrary-width integers for classical-register comparisons.

use serde::{Deserialize, Serialize};

/// An arbitrary-width bit vector built from a decimal literal.
///
/// Classical-register guards (`if (c == 3)`) compare the register's bit
/// pattern against the literal exactly, at any width, so the literal must
/// be expanded to binary without floating-point rounding. The conversion
/// repeatedly halves the decimal string with digit-by-digit long division;
/// each division's final remainder is the next output bit, least
/// significant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigInt {
    /// The decimal literal the value was built from.
    text: String,
    /// Bit words, least-significant word first.
    words: Vec<u64>,
}

/// Divide the two-digit value `carry * 10 + digit` by two, returning the
/// quotient digit and the new carry.
fn halve_digit(carry: u8, digit: u8) -> (u8, u8) {
    let v = carry * 10 + digit;
    (v / 2, v % 2)
}

impl BigInt {
    /// Build from a canonical non-negative decimal string.
    ///
    /// The caller guarantees the string is a well-formed integer literal
    /// (it comes from an integer token); non-digit characters are not
    /// validated here.
    pub fn from_decimal(s: &str) -> Self {
        let mut value = Self {
            text: s.to_string(),
            words: Vec::new(),
        };

        let mut dividend: Vec<u8> = s.bytes().map(|b| b - b'0').collect();
        let mut bit = 0;
        while dividend != [0] {
            let mut quotient = Vec::with_capacity(dividend.len());
            let mut carry = 0;
            for &digit in &dividend {
                let (q, c) = halve_digit(carry, digit);
                quotient.push(q);
                carry = c;
            }
            if carry == 1 {
                value.set_bit(bit);
            }
            bit += 1;
            if quotient.len() > 1 && quotient[0] == 0 {
                quotient.remove(0);
            }
            dividend = quotient;
        }

        value
    }

    /// The decimal literal this value was built from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set bit `b`, growing the word array as needed.
    pub fn set_bit(&mut self, b: usize) {
        let idx = b / 64;
        let pos = b % 64;
        if idx >= self.words.len() {
            self.words.resize(idx + 1, 0);
        }
        self.words[idx] |= 1 << pos;
    }

    /// Read bit `b`. Bits past the stored width are zero.
    pub fn get_bit(&self, b: usize) -> bool {
        let idx = b / 64;
        let pos = b % 64;
        match self.words.get(idx) {
            Some(w) => (w >> pos) & 1 != 0,
            None => false,
        }
    }

    /// Number of bits up to and including the highest set bit.
    pub fn bit_len(&self) -> usize {
        for (idx, w) in self.words.iter().enumerate().rev() {
            if *w != 0 {
                return idx * 64 + (64 - w.leading_zeros() as usize);
            }
        }
        0
    }
}

impl std::fmt::Display for BigInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero() {
        let n = BigInt::from_decimal("0");
        assert_eq!(n.bit_len(), 0);
        assert!(!n.get_bit(0));
        assert!(!n.get_bit(1000));
    }

    #[test]
    fn test_three() {
        let n = BigInt::from_decimal("3");
        assert!(n.get_bit(0));
        assert!(n.get_bit(1));
        assert!(!n.get_bit(2));
        assert_eq!(n.bit_len(), 2);
    }

    #[test]
    fn test_power_of_two() {
        let n = BigInt::from_decimal("1024");
        for b in 0..10 {
            assert!(!n.get_bit(b));
        }
        assert!(n.get_bit(10));
        assert_eq!(n.bit_len(), 11);
    }

    #[test]
    fn test_wider_than_one_word() {
        // 2^64 = 18446744073709551616
        let n = BigInt::from_decimal("18446744073709551616");
        for b in 0..64 {
            assert!(!n.get_bit(b));
        }
        assert!(n.get_bit(64));
        assert_eq!(n.bit_len(), 65);
    }

    #[test]
    fn test_display_round_trip() {
        let n = BigInt::from_decimal("12345");
        assert_eq!(n.to_string(), "12345");
    }

    proptest! {
        #[test]
        fn prop_matches_binary_expansion(v in 0u128..) {
            let n = BigInt::from_decimal(&v.to_string());
            for b in 0..128 {
                prop_assert_eq!(n.get_bit(b), (v >> b) & 1 == 1);
            }
            prop_assert!(!n.get_bit(128));
            prop_assert_eq!(n.bit_len() as u32, 128 - v.leading_zeros());
        }
    }
}
