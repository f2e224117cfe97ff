use crate::domain::ports::{Codec, Plugin};
use crate::utils::error::{RegistryError, Result};
use serde::Deserialize;

const LOWER: &[u8; 16] = b"0123456789abcdef";
const UPPER: &[u8; 16] = b"0123456789ABCDEF";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HexParams {
    #[serde(default)]
    pub uppercase: bool,
}

pub struct HexCodec {
    name: String,
    uppercase: bool,
}

impl HexCodec {
    pub fn new(name: impl Into<String>, params: HexParams) -> Self {
        Self {
            name: name.into(),
            uppercase: params.uppercase,
        }
    }

    fn nibble(&self, c: u8) -> Result<u8> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(RegistryError::codec(
                &self.name,
                format!("invalid hex digit {:?}", c as char),
            )),
        }
    }
}

impl Plugin for HexCodec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Codec for HexCodec {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let table = if self.uppercase { UPPER } else { LOWER };
        let mut out = Vec::with_capacity(input.len() * 2);
        for &b in input {
            out.push(table[(b >> 4) as usize]);
            out.push(table[(b & 0x0f) as usize]);
        }
        Ok(out)
    }

    /// Accepts either case; ASCII whitespace (e.g. a trailing newline) is ignored.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let digits: Vec<u8> = input
            .iter()
            .copied()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        if digits.len() % 2 != 0 {
            return Err(RegistryError::codec(
                &self.name,
                format!("odd number of hex digits ({})", digits.len()),
            ));
        }

        digits
            .chunks_exact(2)
            .map(|pair| -> Result<u8> { Ok((self.nibble(pair[0])? << 4) | self.nibble(pair[1])?) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_case() {
        let lower = HexCodec::new("hex", HexParams::default());
        let upper = HexCodec::new("HEX", HexParams { uppercase: true });
        assert_eq!(lower.encode(&[0xde, 0xad, 0x01]).unwrap(), b"dead01");
        assert_eq!(upper.encode(&[0xde, 0xad, 0x01]).unwrap(), b"DEAD01");
    }

    #[test]
    fn test_decode_mixed_case_and_newline() {
        let codec = HexCodec::new("hex", HexParams::default());
        assert_eq!(codec.decode(b"DeAd01\n").unwrap(), vec![0xde, 0xad, 0x01]);
        assert!(codec.decode(b"").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let codec = HexCodec::new("hex", HexParams::default());
        assert!(matches!(
            codec.decode(b"abc"),
            Err(RegistryError::CodecError { .. })
        ));
        assert!(codec.decode(b"zz").is_err());
    }
}
