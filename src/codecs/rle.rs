use crate::domain::ports::{Codec, Plugin};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_range;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RleParams {
    #[serde(default = "default_max_run")]
    pub max_run: u16,
}

fn default_max_run() -> u16 {
    255
}

impl Default for RleParams {
    fn default() -> Self {
        Self {
            max_run: default_max_run(),
        }
    }
}

/// Run-length coding as `(count, byte)` pairs.
pub struct RleCodec {
    name: String,
    max_run: u8,
}

impl RleCodec {
    pub fn new(name: impl Into<String>, params: RleParams) -> Result<Self> {
        validate_range("params.max_run", params.max_run, 1, 255)?;
        Ok(Self {
            name: name.into(),
            max_run: params.max_run as u8,
        })
    }
}

impl Plugin for RleCodec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Codec for RleCodec {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut iter = input.iter().copied().peekable();

        while let Some(byte) = iter.next() {
            let mut count: u8 = 1;
            while count < self.max_run && iter.peek() == Some(&byte) {
                iter.next();
                count += 1;
            }
            out.push(count);
            out.push(byte);
        }

        Ok(out)
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        if input.len() % 2 != 0 {
            return Err(RegistryError::codec(
                &self.name,
                "truncated input, expected (count, byte) pairs",
            ));
        }

        let mut out = Vec::new();
        for (index, pair) in input.chunks_exact(2).enumerate() {
            let (count, byte) = (pair[0], pair[1]);
            if count == 0 {
                return Err(RegistryError::codec(
                    &self.name,
                    format!("zero run length in pair {}", index),
                ));
            }
            out.extend(std::iter::repeat(byte).take(count as usize));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_runs() {
        let codec = RleCodec::new("rle", RleParams::default()).unwrap();
        assert_eq!(codec.encode(b"aaab").unwrap(), vec![3, b'a', 1, b'b']);
        assert!(codec.encode(b"").unwrap().is_empty());
    }

    #[test]
    fn test_max_run_splits_long_runs() {
        let codec = RleCodec::new("rle", RleParams { max_run: 2 }).unwrap();
        assert_eq!(
            codec.encode(b"aaaaa").unwrap(),
            vec![2, b'a', 2, b'a', 1, b'a']
        );

        let long = vec![7u8; 600];
        let default = RleCodec::new("rle", RleParams::default()).unwrap();
        let encoded = default.encode(&long).unwrap();
        assert_eq!(encoded, vec![255, 7, 255, 7, 90, 7]);
        assert_eq!(default.decode(&encoded).unwrap(), long);
    }

    #[test]
    fn test_invalid_max_run() {
        assert!(RleCodec::new("rle", RleParams { max_run: 0 }).is_err());
        assert!(RleCodec::new("rle", RleParams { max_run: 256 }).is_err());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let codec = RleCodec::new("rle", RleParams::default()).unwrap();
        assert!(codec.decode(&[3]).is_err());
        assert!(codec.decode(&[0, b'a']).is_err());
    }
}
