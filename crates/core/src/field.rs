//! Hex encodings for field elements and recipient/relayer addresses.
//!
//! Field elements are written as `0x` followed by the 32-byte big-endian
//! canonical integer, the form used by EVM-style `bytes32` arguments.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::error::ParseError;

/// Byte width of a serialized field element.
pub const FIELD_BYTES: usize = 32;

/// Byte width of an address.
pub const ADDRESS_BYTES: usize = 20;

/// Big-endian canonical bytes of a field element.
pub fn fr_to_bytes(value: &Fr) -> Vec<u8> {
    value.into_bigint().to_bytes_be()
}

/// Serialize Fr to a `0x`-prefixed hex string.
pub fn fr_to_hex(value: &Fr) -> String {
    format!("0x{}", hex::encode(fr_to_bytes(value)))
}

/// Parse a `0x`-prefixed (or bare) 32-byte hex string into Fr.
///
/// Values at or above the field modulus are rejected rather than reduced, so
/// two distinct strings never name the same element.
pub fn fr_from_hex(input: &str) -> Result<Fr, ParseError> {
    let bytes = decode_hex(input)?;
    if bytes.len() != FIELD_BYTES {
        return Err(ParseError::InvalidLength {
            expected: FIELD_BYTES,
            actual: bytes.len(),
        });
    }

    let value = Fr::from_be_bytes_mod_order(&bytes);
    if fr_to_bytes(&value) != bytes {
        return Err(ParseError::NonCanonical);
    }
    Ok(value)
}

fn decode_hex(input: &str) -> Result<Vec<u8>, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))
}

/// A 20-byte account address (withdrawal recipient or relayer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    /// The all-zero address, used when no relayer is involved.
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    pub const fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Field encoding: the big-endian integer of the address bytes.
    ///
    /// 160 bits always fit below the modulus, so the encoding is injective.
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s)?;
        let actual = bytes.len();
        let bytes: [u8; ADDRESS_BYTES] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            expected: ADDRESS_BYTES,
            actual,
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};

    #[test]
    fn test_hex_round_trip_small_values() {
        let value = Fr::from(0x1234u64);
        let encoded = fr_to_hex(&value);

        assert_eq!(encoded.len(), 2 + 2 * FIELD_BYTES);
        assert!(encoded.ends_with("1234"));
        assert_eq!(fr_from_hex(&encoded).unwrap(), value);
    }

    #[test]
    fn test_hex_accepts_missing_prefix() {
        let encoded = fr_to_hex(&Fr::one());
        let bare = encoded.trim_start_matches("0x");
        assert_eq!(fr_from_hex(bare).unwrap(), Fr::one());
    }

    #[test]
    fn test_hex_rejects_wrong_length() {
        let err = fr_from_hex("0x01").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: FIELD_BYTES,
                actual: 1
            }
        );
    }

    #[test]
    fn test_hex_rejects_non_canonical() {
        // 2^256 - 1 is far above the BN254 scalar modulus
        let all_ones = format!("0x{}", "ff".repeat(FIELD_BYTES));
        assert_eq!(fr_from_hex(&all_ones).unwrap_err(), ParseError::NonCanonical);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(matches!(
            fr_from_hex("0xzz"),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_address_parse_and_display() {
        let text = "0x00000000000000000000000000000000000000ff";
        let address: Address = text.parse().unwrap();

        assert_eq!(address.to_string(), text);
        assert_eq!(address.to_field(), Fr::from(255u64));
        assert_eq!(Address::ZERO.to_field(), Fr::zero());
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        let err = "0xabcd".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: ADDRESS_BYTES,
                actual: 2
            }
        );
    }
}
