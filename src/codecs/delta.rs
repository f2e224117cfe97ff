use crate::domain::ports::{Codec, Plugin};
use crate::utils::error::Result;

/// Differential coding: first byte verbatim, then wrapping differences.
pub struct DeltaCodec {
    name: String,
}

impl DeltaCodec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Plugin for DeltaCodec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Codec for DeltaCodec {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut previous = 0u8;
        Ok(input
            .iter()
            .map(|&b| {
                let diff = b.wrapping_sub(previous);
                previous = b;
                diff
            })
            .collect())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut acc = 0u8;
        Ok(input
            .iter()
            .map(|&d| {
                acc = acc.wrapping_add(d);
                acc
            })
            .collect())
    }
}
