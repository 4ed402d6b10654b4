//! Applies the encoded patches onto a copy of the base file's bytes.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::matrix;
use crate::matrix::ModMatrix;
use crate::params::ParamBlock;

/// Byte offset of the modulation-matrix block within the base file.
///
/// This offset collides with the documented ENV3 offsets; the collision is
/// reported via [`PatchWarning::MatrixOverlap`] rather than resolved here.
pub const MOD_MATRIX_OFFSET: usize = 0x2A0;

/// Overwrites the parameter patches and the matrix block in place.
///
/// Parameter patches land first; the matrix block is stamped last and wins
/// where ranges collide. Writes that do not fit into the buffer are skipped
/// and reported, never fatal.
///
/// # Examples
///
/// ```
/// # use wavesmith::{matrix, params, patch};
/// # use wavesmith::preset::ParamSpec;
/// let block = params::encode(&[ParamSpec::new("filter_cutoff", 0.4)], &[]);
/// let mod_matrix = matrix::encode(&[]).unwrap();
///
/// let mut data = vec![0; 4096];
/// let warnings = patch::apply(&mut data, &block, &mod_matrix);
///
/// assert!(warnings.is_empty());
/// assert_eq!(&data[0x1A4..0x1A8], 0.4f32.to_be_bytes());
/// ```
pub fn apply(data: &mut [u8], params: &ParamBlock, mod_matrix: &ModMatrix) -> Vec<PatchWarning> {
    let mut warnings = Vec::new();

    let matrix_end = MOD_MATRIX_OFFSET + matrix::MATRIX_SIZE;
    let matrix_fits = matrix_end <= data.len();

    for (&offset, value) in &params.patches {
        let start = offset as usize;
        match data.get_mut(start..start + 4) {
            Some(target) => {
                target.copy_from_slice(value);
                if matrix_fits && start + 4 > MOD_MATRIX_OFFSET && start < matrix_end {
                    log::warn!(
                        "patch at offset 0x{offset:X} lies inside the modulation-matrix region and will be overwritten"
                    );
                    warnings.push(PatchWarning::MatrixOverlap { offset });
                }
            }
            None => {
                log::warn!("offset 0x{offset:X} outside the base file, skipped");
                warnings.push(PatchWarning::OffsetOutOfRange {
                    offset,
                    file_len: data.len(),
                });
            }
        }
    }

    if matrix_fits {
        data[MOD_MATRIX_OFFSET..matrix_end].copy_from_slice(mod_matrix.as_bytes());
    } else {
        log::warn!("modulation matrix does not fit into the base file, skipped");
        warnings.push(PatchWarning::MatrixOutOfRange {
            file_len: data.len(),
        });
    }

    warnings
}

/// A write that was skipped or collided; never aborts the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatchWarning {
    /// A 4-byte parameter write does not fit into the file.
    OffsetOutOfRange { offset: u32, file_len: usize },

    /// The matrix block does not fit into the file.
    MatrixOutOfRange { file_len: usize },

    /// A parameter write inside the matrix region was overwritten by the
    /// matrix block.
    MatrixOverlap { offset: u32 },
}

impl Display for PatchWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PatchWarning::OffsetOutOfRange { offset, file_len } => write!(
                f,
                "Patch at offset 0x{offset:X} exceeds the base file ({file_len} bytes), skipped"
            ),
            PatchWarning::MatrixOutOfRange { file_len } => write!(
                f,
                "Modulation matrix does not fit into the base file ({file_len} bytes), skipped"
            ),
            PatchWarning::MatrixOverlap { offset } => write!(
                f,
                "Patch at offset 0x{offset:X} lies inside the modulation-matrix region and was overwritten"
            ),
        }
    }
}
