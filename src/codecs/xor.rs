use crate::domain::ports::{Codec, Plugin};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XorParams {
    pub key: Option<u8>,
}

pub struct XorCodec {
    name: String,
    key: u8,
}

impl XorCodec {
    pub fn new(name: impl Into<String>, params: XorParams) -> Result<Self> {
        let key = *validate_required_field("params.key", &params.key)?;
        Ok(Self {
            name: name.into(),
            key,
        })
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input.iter().map(|b| b ^ self.key).collect()
    }
}

impl Plugin for XorCodec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Codec for XorCodec {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.apply(input))
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.apply(input))
    }
}
