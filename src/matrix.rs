//! Binary encoding of the modulation matrix.
//!
//! The matrix occupies a fixed block of [`SLOT_COUNT`] slots. Each slot packs
//! four big-endian `f32`s: source index, destination index, normalized
//! amount, and auxiliary source index. Unused indices carry the sentinel
//! [`UNUSED_INDEX`]; an unused slot additionally carries the neutral amount
//! [`NEUTRAL_AMOUNT`].

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::preset::ModulationSpec;
use crate::routing;

/// Number of hardware modulation slots.
pub const SLOT_COUNT: usize = 32;

/// Bytes per slot: four big-endian `f32`s.
pub const SLOT_SIZE: usize = 16;

/// Total size of the encoded block.
pub const MATRIX_SIZE: usize = SLOT_COUNT * SLOT_SIZE;

/// Sentinel index marking an unused source, destination or auxiliary slot.
pub const UNUSED_INDEX: f32 = 255.0;

/// The normalized amount that has no modulation effect.
pub const NEUTRAL_AMOUNT: f32 = 0.5;

/// Maps an amount from `[-1.0, 1.0]` to the normalized `[0.0, 1.0]` encoding.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use wavesmith::matrix;
/// assert_approx_eq!(matrix::normalized_amount(-1.0), 0.0);
/// assert_approx_eq!(matrix::normalized_amount(0.0), matrix::NEUTRAL_AMOUNT);
/// assert_approx_eq!(matrix::normalized_amount(0.8), 0.9);
/// ```
pub fn normalized_amount(amount: f64) -> f32 {
    ((amount + 1.0) / 2.0) as f32
}

/// The encoded 512-byte modulation-matrix block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModMatrix {
    bytes: [u8; MATRIX_SIZE],
}

impl ModMatrix {
    pub fn as_bytes(&self) -> &[u8; MATRIX_SIZE] {
        &self.bytes
    }
}

/// Encodes modulation links into the fixed-size matrix block.
///
/// Links occupy slots in input order; the remaining slots are padded with the
/// empty-slot pattern. Encoding never partially succeeds: more links than
/// [`SLOT_COUNT`] fail up front.
///
/// Links are expected to be validated; a name missing from the routing tables
/// encodes as [`UNUSED_INDEX`].
///
/// # Examples
///
/// ```
/// # use wavesmith::matrix;
/// # use wavesmith::preset::ModulationSpec;
/// let link = ModulationSpec::new("LFO1", "FILTER_CUTOFF", 0.8);
/// let encoded = matrix::encode(&[link]).unwrap();
///
/// let mut expected = Vec::new();
/// for value in [0.0f32, 17.0, 0.9, 255.0] {
///     expected.extend(value.to_be_bytes());
/// }
/// assert_eq!(&encoded.as_bytes()[..16], &expected[..]);
/// ```
pub fn encode(links: &[ModulationSpec]) -> Result<ModMatrix, MatrixError> {
    if links.len() > SLOT_COUNT {
        return Err(MatrixError::CapacityExceeded { links: links.len() });
    }

    let mut bytes = [0; MATRIX_SIZE];
    let mut slots = bytes.chunks_exact_mut(SLOT_SIZE);

    for (link, slot) in links.iter().zip(&mut slots) {
        let source = index_or_unused(routing::source_index(&link.source));
        let destination = index_or_unused(routing::destination_index(&link.destination));
        let aux = index_or_unused(link.aux.as_deref().and_then(routing::source_index));
        write_slot(
            slot,
            [source, destination, normalized_amount(link.amount), aux],
        );
    }

    for slot in slots {
        write_slot(
            slot,
            [UNUSED_INDEX, UNUSED_INDEX, NEUTRAL_AMOUNT, UNUSED_INDEX],
        );
    }

    Ok(ModMatrix { bytes })
}

fn index_or_unused(index: Option<u8>) -> f32 {
    index.map(f32::from).unwrap_or(UNUSED_INDEX)
}

fn write_slot(slot: &mut [u8], values: [f32; 4]) {
    for (chunk, value) in slot.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
}

/// Encoding the modulation matrix failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatrixError {
    /// More links than available hardware slots.
    CapacityExceeded { links: usize },
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let MatrixError::CapacityExceeded { links } = self;
        write!(
            f,
            "Too many modulation links: {links} provided but only {SLOT_COUNT} slots available"
        )
    }
}
