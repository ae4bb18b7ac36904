//! Conversion of raw sample bytes to heights.

use crate::error::RasterError;

/// Decode a little-endian sample buffer into floats.
///
/// 32-bit samples are IEEE-754 floats taken as-is. 16-bit samples are
/// unsigned integers normalized into `[0, 1]` by dividing by 65535. Height
/// scaling downstream relies on exactly this split. The output holds
/// `bytes.len() / bytes_per_sample` values; trailing partial samples are
/// ignored.
pub fn decode_samples(bytes: &[u8], bits_per_sample: u16) -> Result<Vec<f32>, RasterError> {
    match bits_per_sample {
        16 => Ok(bytes
            .chunks_exact(2)
            .map(|b| f32::from(u16::from_le_bytes([b[0], b[1]])) / 65535.0)
            .collect()),
        32 => Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()),
        other => Err(RasterError::FileFormat(format!(
            "{other}-bit samples are not supported, expected 16 or 32"
        ))),
    }
}
