//! Image decoding for uploaded bytes

use image::{DynamicImage, GenericImageView};

use crate::utils::error::DecodeError;

/// Decode an image of any format the `image` crate recognizes
///
/// The format is guessed from the byte signature. Images with zero width or
/// height are rejected here so the encoder never sees them.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let image = image::load_from_memory(bytes)?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroSize { width, height });
    }

    Ok(image)
}
