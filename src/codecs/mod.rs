//! Built-in codec plugins.
//!
//! Every codec is registered as a factory under a name plus a numeric id
//! alias, so `1` and `hex` build the same codec.

pub mod delta;
pub mod hex;
pub mod rle;
pub mod xor;

use crate::core::factory::{parse_params, FactoryRegistry};
use crate::domain::ports::{Codec, Plugin};
use crate::utils::error::Result;
use serde::Deserialize;
use std::sync::Arc;

pub type CodecFactories = FactoryRegistry<Arc<dyn Codec>>;

/// (factory name, description, aliases)
pub const BUILTIN_CODECS: &[(&str, &str, &[&str])] = &[
    ("raw", "identity, bytes pass through unchanged", &["identity", "0"]),
    ("hex", "hexadecimal text, params: uppercase", &["base16", "1"]),
    ("rle", "run-length (count, byte) pairs, params: max_run", &["runlength", "2"]),
    ("delta", "first byte then wrapping differences", &["differential", "3"]),
    ("xor", "single-byte xor mask, params: key", &["4"]),
];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoParams {}

pub struct RawCodec {
    name: String,
}

impl RawCodec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Plugin for RawCodec {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Codec for RawCodec {
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }
}

pub fn builtin_aliases(factory: &str) -> &'static [&'static str] {
    BUILTIN_CODECS
        .iter()
        .find(|(name, _, _)| *name == factory)
        .map(|(_, _, aliases)| *aliases)
        .unwrap_or(&[])
}

fn description_of(factory: &str) -> &'static str {
    BUILTIN_CODECS
        .iter()
        .find(|(name, _, _)| *name == factory)
        .map(|(_, description, _)| *description)
        .unwrap_or("")
}

/// Register the built-in codec factories and their aliases.
pub fn register_builtin_factories(factories: &CodecFactories) -> Result<()> {
    factories.register_factory("raw", description_of("raw"), |name, params| {
        let _: NoParams = parse_params("raw", params)?;
        let codec: Arc<dyn Codec> = Arc::new(RawCodec::new(name));
        Ok(codec)
    })?;

    factories.register_factory("hex", description_of("hex"), |name, params| {
        let codec: Arc<dyn Codec> =
            Arc::new(hex::HexCodec::new(name, parse_params("hex", params)?));
        Ok(codec)
    })?;

    factories.register_factory("rle", description_of("rle"), |name, params| {
        let codec: Arc<dyn Codec> =
            Arc::new(rle::RleCodec::new(name, parse_params("rle", params)?)?);
        Ok(codec)
    })?;

    factories.register_factory("delta", description_of("delta"), |name, params| {
        let _: NoParams = parse_params("delta", params)?;
        let codec: Arc<dyn Codec> = Arc::new(delta::DeltaCodec::new(name));
        Ok(codec)
    })?;

    factories.register_factory("xor", description_of("xor"), |name, params| {
        let codec: Arc<dyn Codec> =
            Arc::new(xor::XorCodec::new(name, parse_params("xor", params)?)?);
        Ok(codec)
    })?;

    for (factory, _, aliases) in BUILTIN_CODECS {
        for alias in aliases.iter() {
            factories.alias(alias, factory)?;
        }
    }

    tracing::debug!("Registered {} built-in codec factories", factories.len());
    Ok(())
}
