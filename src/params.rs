//! Binary encoding of static parameters and ADSR envelopes.
//!
//! Both encode into a map from byte offset to a big-endian `f32`. The offset
//! tables were obtained by reverse engineering and should be re-verified with
//! a hex editor against the synthesizer version in use. Note that the ENV3
//! offsets sit inside the modulation-matrix region (see
//! [`patch`](crate::patch)).

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::preset::EnvelopeSpec;
use crate::preset::ParamSpec;

/// Byte offsets of the static parameters.
pub const PARAM_OFFSETS: [(&str, u32); 5] = [
    ("filter_cutoff", 0x1A4),
    ("filter_res", 0x1A8),
    ("filter_drive", 0x1AC),
    ("master_vol", 0x3F0),
    ("master_pan", 0x3F4),
];

/// Byte offsets of the envelope generators' attack/decay/sustain/release.
pub const ENV_OFFSETS: [(&str, [u32; 4]); 3] = [
    ("ENV1", [0x280, 0x284, 0x288, 0x28C]),
    ("ENV2", [0x290, 0x294, 0x298, 0x29C]),
    ("ENV3", [0x2A0, 0x2A4, 0x2A8, 0x2AC]),
];

pub fn param_offset(name: &str) -> Option<u32> {
    PARAM_OFFSETS
        .iter()
        .find(|&&(entry, _)| entry == name)
        .map(|&(_, offset)| offset)
}

pub fn envelope_offsets(target: &str) -> Option<[u32; 4]> {
    ENV_OFFSETS
        .iter()
        .find(|&&(entry, _)| entry == target)
        .map(|&(_, offsets)| offsets)
}

/// The encoded parameter/envelope patches plus the names that could not be
/// mapped to an offset.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamBlock {
    /// Byte offset to big-endian `f32` bytes. Later writes to the same offset
    /// overwrite earlier ones.
    pub patches: BTreeMap<u32, [u8; 4]>,

    /// Names skipped because they are missing from the offset tables.
    pub unmapped: Vec<UnmappedName>,
}

/// A name that produced no patch because the offset tables do not know it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnmappedName {
    Param(String),
    Envelope(String),
}

impl Display for UnmappedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UnmappedName::Param(name) => write!(f, "Unknown parameter '{name}', skipped"),
            UnmappedName::Envelope(target) => {
                write!(f, "Unknown envelope target '{target}', skipped")
            }
        }
    }
}

/// Encodes parameter values and envelope shapes into offset patches.
///
/// Unknown names are skipped and reported via [`ParamBlock::unmapped`]; all
/// four fields of a known envelope are always written together.
///
/// # Examples
///
/// ```
/// # use wavesmith::params;
/// # use wavesmith::preset::ParamSpec;
/// let block = params::encode(&[ParamSpec::new("filter_cutoff", 0.4)], &[]);
///
/// assert_eq!(block.patches[&0x1A4], 0.4f32.to_be_bytes());
/// assert!(block.unmapped.is_empty());
/// ```
pub fn encode(params: &[ParamSpec], envelopes: &[EnvelopeSpec]) -> ParamBlock {
    let mut patches = BTreeMap::new();
    let mut unmapped = Vec::new();

    for param in params {
        match param_offset(&param.name) {
            Some(offset) => {
                patches.insert(offset, (param.value as f32).to_be_bytes());
            }
            None => unmapped.push(UnmappedName::Param(param.name.clone())),
        }
    }

    for envelope in envelopes {
        match envelope_offsets(&envelope.target) {
            Some([attack, decay, sustain, release]) => {
                patches.insert(attack, (envelope.attack as f32).to_be_bytes());
                patches.insert(decay, (envelope.decay as f32).to_be_bytes());
                patches.insert(sustain, (envelope.sustain as f32).to_be_bytes());
                patches.insert(release, (envelope.release as f32).to_be_bytes());
            }
            None => unmapped.push(UnmappedName::Envelope(envelope.target.clone())),
        }
    }

    ParamBlock { patches, unmapped }
}
