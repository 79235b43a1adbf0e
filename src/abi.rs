//! Calldata codec for the fixed NFT contract ABI.
//!
//! The contract surface is closed — four nullary reads, three nullary
//! writes, one `(string, address)` constructor — so the codec only covers
//! what those need: selector-only call encoding, constructor argument
//! encoding, and single-word return decoding.

use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// A 20-byte account address.
///
/// Parses `0x`-prefixed hex case-insensitively and compares by bytes, so
/// checksummed and lowercased renderings of the same account are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| crate::Error::Config(format!("invalid address {s}: {e}")))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| crate::Error::Config(format!("invalid address length: {s}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// First four bytes of the keccak-256 of a method signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Hex calldata for a method that takes no arguments.
pub fn encode_call(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Left-pad a u64 into a 32-byte word.
fn word_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Left-pad an address into a 32-byte word.
fn word_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// ABI-encode the `(string metadata_url, address whitelist)` constructor
/// arguments: two head words (offset to the string tail, then the address),
/// followed by the string length and its zero-padded bytes.
pub fn encode_constructor_args(metadata_url: &str, whitelist: &Address) -> Vec<u8> {
    let text = metadata_url.as_bytes();
    let mut out = Vec::with_capacity(96 + text.len() + 31);
    out.extend_from_slice(&word_u64(0x40));
    out.extend_from_slice(&word_address(whitelist));
    out.extend_from_slice(&word_u64(text.len() as u64));
    out.extend_from_slice(text);
    let pad = (32 - text.len() % 32) % 32;
    out.resize(out.len() + pad, 0);
    out
}

/// Decode the first 32-byte word of `0x`-hex return data.
fn decode_word(data: &str) -> Result<[u8; 32], crate::Error> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    let bytes =
        hex::decode(digits).map_err(|e| crate::Error::Read(format!("bad return data: {e}")))?;
    if bytes.len() < 32 {
        return Err(crate::Error::Read(format!(
            "return data too short: {} bytes",
            bytes.len()
        )));
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&bytes[..32]);
    Ok(word)
}

pub fn decode_bool(data: &str) -> Result<bool, crate::Error> {
    let word = decode_word(data)?;
    Ok(word[31] != 0)
}

pub fn decode_u64(data: &str) -> Result<u64, crate::Error> {
    let word = decode_word(data)?;
    if word[..24].iter().any(|b| *b != 0) {
        return Err(crate::Error::Read("uint return overflows u64".into()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(tail))
}

pub fn decode_address(data: &str) -> Result<Address, crate::Error> {
    let word = decode_word(data)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        // Canonical selectors for the two standard methods.
        assert_eq!(selector("owner()"), [0x8d, 0xa5, 0xcb, 0x5b]);
        assert_eq!(selector("mint()"), [0x12, 0x49, 0xc5, 0x8b]);
    }

    #[test]
    fn test_encode_call_is_selector_only() {
        let data = encode_call("owner()");
        assert_eq!(data, "0x8da5cb5b");
    }

    #[test]
    fn test_address_parse_display_roundtrip() {
        let addr: Address = "0xf0E80e02e8511bEf354fA12f8DE03ad56372BA43"
            .parse()
            .unwrap();
        assert_eq!(
            addr.to_string(),
            "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
        );
    }

    #[test]
    fn test_address_equality_is_case_insensitive() {
        let upper: Address = "0xF0E80E02E8511BEF354FA12F8DE03AD56372BA43"
            .parse()
            .unwrap();
        let lower: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("not-an-address".parse::<Address>().is_err());
    }

    #[test]
    fn test_constructor_args_layout() {
        let whitelist: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        let encoded = encode_constructor_args("https://example.com/api/", &whitelist);

        // Head: offset word then address word.
        assert_eq!(encoded[..32], word_u64(0x40));
        assert_eq!(encoded[32..64], word_address(&whitelist));
        // Tail: length word then padded bytes.
        assert_eq!(encoded[64..96], word_u64(24));
        assert_eq!(&encoded[96..120], b"https://example.com/api/");
        // 24 bytes of text pad to one word.
        assert_eq!(encoded.len(), 96 + 32);
        assert!(encoded[120..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_constructor_args_exact_word_needs_no_padding() {
        let whitelist: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        let url = "a".repeat(32);
        let encoded = encode_constructor_args(&url, &whitelist);
        assert_eq!(encoded.len(), 96 + 32);
    }

    #[test]
    fn test_decode_bool() {
        let truthy = format!("0x{}", hex::encode(word_u64(1)));
        let falsy = format!("0x{}", hex::encode(word_u64(0)));
        assert!(decode_bool(&truthy).unwrap());
        assert!(!decode_bool(&falsy).unwrap());
    }

    #[test]
    fn test_decode_u64() {
        let data = format!("0x{}", hex::encode(word_u64(1_700_000_000)));
        assert_eq!(decode_u64(&data).unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_decode_u64_overflow_is_error() {
        let mut word = [0u8; 32];
        word[0] = 1;
        let data = format!("0x{}", hex::encode(word));
        assert!(decode_u64(&data).is_err());
    }

    #[test]
    fn test_decode_address() {
        let addr: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        let data = format!("0x{}", hex::encode(word_address(&addr)));
        assert_eq!(decode_address(&data).unwrap(), addr);
    }

    #[test]
    fn test_decode_short_data_is_error() {
        assert!(decode_bool("0x01").is_err());
        assert!(decode_u64("0x").is_err());
    }
}
