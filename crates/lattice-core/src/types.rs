//! Fixed-width byte types shared across the wire protocol.
//!
//! Hashes, accounts and signatures travel as raw fixed-width arrays;
//! amounts travel as 16-byte big-endian integers. Everything here is
//! `Copy` and cheap to compare.

use crate::CoreError;
use std::fmt;
use std::str::FromStr;

/// A 32-byte block content hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockHash(pub [u8; 32]);

/// A 32-byte account public key.
///
/// Interconvertible with [`BlockHash`]: some wire fields (the
/// `bulk_pull` start, the state-block link) are overloaded between the
/// two and only the responder can disambiguate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Account(pub [u8; 32]);

/// A 64-byte signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

/// A 128-bit currency amount, 16-byte big-endian on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

macro_rules! bytes32_impl {
    ($name:ident) => {
        impl $name {
            /// The all-zero value.
            pub const fn zero() -> Self {
                Self([0u8; 32])
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Build from a slice, checking the length.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
                let bytes: [u8; 32] =
                    bytes.try_into().map_err(|_| CoreError::WrongLength {
                        expected: 32,
                        got: bytes.len(),
                    })?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(text)
                    .map_err(|_| CoreError::InvalidHex(text.to_string()))?;
                Self::from_slice(&bytes)
            }
        }
    };
}

bytes32_impl!(BlockHash);
bytes32_impl!(Account);

impl From<Account> for BlockHash {
    fn from(account: Account) -> Self {
        BlockHash(account.0)
    }
}

impl From<BlockHash> for Account {
    fn from(hash: BlockHash) -> Self {
        Account(hash.0)
    }
}

impl Signature {
    pub const fn zero() -> Self {
        Self([0u8; 64])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 64]
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| CoreError::WrongLength {
            expected: 64,
            got: bytes.len(),
        })?;
        Ok(Self(bytes))
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl Amount {
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn to_be_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_display_roundtrip() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xde;
        bytes[31] = 0xad;
        let hash = BlockHash(bytes);

        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.starts_with("de"));
        assert_eq!(text.parse::<BlockHash>().unwrap(), hash);
    }

    #[test]
    fn test_from_slice_length_check() {
        assert!(BlockHash::from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            BlockHash::from_slice(&[0u8; 31]),
            Err(CoreError::WrongLength {
                expected: 32,
                got: 31
            })
        );
        assert!(Signature::from_slice(&[0u8; 64]).is_ok());
        assert!(Signature::from_slice(&[0u8; 65]).is_err());
    }

    #[test]
    fn test_account_hash_conversion() {
        let account = Account([7u8; 32]);
        let hash: BlockHash = account.into();
        assert_eq!(hash.as_bytes(), account.as_bytes());
        assert_eq!(Account::from(hash), account);
    }

    #[test]
    fn test_amount_big_endian() {
        let amount = Amount::new(256);
        let bytes = amount.to_be_bytes();
        assert_eq!(bytes[14], 1);
        assert_eq!(bytes[15], 0);
        assert_eq!(Amount::from_be_bytes(bytes), amount);
    }

    #[test]
    fn test_zero_predicates() {
        assert!(BlockHash::zero().is_zero());
        assert!(!BlockHash([1u8; 32]).is_zero());
        assert!(Amount::zero().is_zero());
        assert!(Signature::zero().is_zero());
    }
}
