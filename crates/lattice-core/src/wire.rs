//! Byte-stream helpers shared by the wire codecs.
//!
//! Every reader checks the remaining length before consuming, so
//! adversarial input comes back as [`CoreError::Truncated`] instead of a
//! panic. The `what` label names the field for error context.

use crate::{Account, Amount, BlockHash, CoreError, Signature};
use bytes::{Buf, Bytes};

/// Read a fixed-width byte array.
pub fn read_array<const N: usize>(
    bytes: &mut Bytes,
    what: &'static str,
) -> Result<[u8; N], CoreError> {
    if bytes.remaining() < N {
        return Err(CoreError::Truncated(what));
    }
    let mut out = [0u8; N];
    bytes.copy_to_slice(&mut out);
    Ok(out)
}

pub fn read_hash(bytes: &mut Bytes, what: &'static str) -> Result<BlockHash, CoreError> {
    Ok(BlockHash(read_array(bytes, what)?))
}

pub fn read_account(bytes: &mut Bytes, what: &'static str) -> Result<Account, CoreError> {
    Ok(Account(read_array(bytes, what)?))
}

pub fn read_signature(bytes: &mut Bytes, what: &'static str) -> Result<Signature, CoreError> {
    Ok(Signature(read_array(bytes, what)?))
}

pub fn read_amount(bytes: &mut Bytes, what: &'static str) -> Result<Amount, CoreError> {
    Ok(Amount::from_be_bytes(read_array(bytes, what)?))
}

pub fn read_u8(bytes: &mut Bytes, what: &'static str) -> Result<u8, CoreError> {
    if !bytes.has_remaining() {
        return Err(CoreError::Truncated(what));
    }
    Ok(bytes.get_u8())
}

pub fn read_u16_le(bytes: &mut Bytes, what: &'static str) -> Result<u16, CoreError> {
    if bytes.remaining() < 2 {
        return Err(CoreError::Truncated(what));
    }
    Ok(bytes.get_u16_le())
}

pub fn read_u32_le(bytes: &mut Bytes, what: &'static str) -> Result<u32, CoreError> {
    if bytes.remaining() < 4 {
        return Err(CoreError::Truncated(what));
    }
    Ok(bytes.get_u32_le())
}

pub fn read_u64_le(bytes: &mut Bytes, what: &'static str) -> Result<u64, CoreError> {
    if bytes.remaining() < 8 {
        return Err(CoreError::Truncated(what));
    }
    Ok(bytes.get_u64_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_array_exact() {
        let mut bytes = Bytes::from_static(&[1, 2, 3, 4]);
        let out: [u8; 4] = read_array(&mut bytes, "field").unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(!bytes.has_remaining());
    }

    #[test]
    fn test_read_array_truncated() {
        let mut bytes = Bytes::from_static(&[1, 2, 3]);
        let result: Result<[u8; 4], _> = read_array(&mut bytes, "field");
        assert_eq!(result, Err(CoreError::Truncated("field")));
    }

    #[test]
    fn test_read_integers_little_endian() {
        let mut bytes = Bytes::from_static(&[0x01, 0x02, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(read_u16_le(&mut bytes, "u16").unwrap(), 0x0201);
        assert_eq!(read_u32_le(&mut bytes, "u32").unwrap(), 0);
        assert!(read_u8(&mut bytes, "u8").is_err());
    }
}
