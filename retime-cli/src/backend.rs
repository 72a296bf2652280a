//! Codec backend selection.
//!
//! The engine drives codecs and containers through the
//! [`retime_pipeline::codec::CodecProvider`] seam; this module is the single
//! point where a concrete backend is linked in. No backend ships in this
//! workspace, so provider construction reports the missing-codec init error
//! and the process exits nonzero before any stage is spawned.

use retime_core::{Error, Result};
use retime_pipeline::codec::CodecProvider;

/// Construct the codec backend for this build.
pub fn provider() -> Result<Box<dyn CodecProvider>> {
    Err(Error::unsupported(
        "no codec backend linked into this build; link one implementing retime_pipeline::codec::CodecProvider",
    ))
}
