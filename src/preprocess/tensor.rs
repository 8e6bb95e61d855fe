//! Image to tensor encoding
//!
//! Produces the fixed `[3, 128, 128]` CHW float buffer the native engine
//! expects. Resampling is nearest-neighbor with exact floor-division index
//! mapping: target pixel `(x, y)` reads source pixel
//! `(x * src_w / 128, y * src_h / 128)`. No interpolation is performed, so any
//! reimplementation of this mapping matches pixel-for-pixel.

use image::{DynamicImage, GenericImageView};

use crate::utils::error::RealWasteError;

/// Tensor width in pixels
pub const TENSOR_WIDTH: u32 = 128;

/// Tensor height in pixels
pub const TENSOR_HEIGHT: u32 = 128;

/// Number of color channels (R, G, B)
pub const TENSOR_CHANNELS: usize = 3;

/// Number of values in one channel plane
pub const PLANE_LEN: usize = (TENSOR_WIDTH * TENSOR_HEIGHT) as usize;

/// Total number of values in an encoded tensor
pub const TENSOR_LEN: usize = TENSOR_CHANNELS * PLANE_LEN;

/// A normalized image in channel-planar (CHW) layout
///
/// Always holds exactly [`TENSOR_LEN`] values. Value at channel `c`, row `y`,
/// column `x` lives at `c * PLANE_LEN + y * TENSOR_WIDTH + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
}

impl Tensor {
    /// A tensor of all zeros (mid-grey after normalization)
    pub fn zeros() -> Self {
        Self {
            data: vec![0.0; TENSOR_LEN],
        }
    }

    /// Borrow the contiguous value buffer
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Borrow a single channel plane (0 = R, 1 = G, 2 = B)
    ///
    /// # Panics
    /// Panics if `channel >= TENSOR_CHANNELS`.
    pub fn plane(&self, channel: usize) -> &[f32] {
        assert!(channel < TENSOR_CHANNELS, "channel {channel} out of range");
        &self.data[channel * PLANE_LEN..(channel + 1) * PLANE_LEN]
    }
}

impl TryFrom<Vec<f32>> for Tensor {
    type Error = RealWasteError;

    fn try_from(data: Vec<f32>) -> Result<Self, Self::Error> {
        if data.len() != TENSOR_LEN {
            return Err(RealWasteError::InvalidTensorLength {
                expected: TENSOR_LEN,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }
}

impl AsRef<[f32]> for Tensor {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// Encode a decoded image into a normalized CHW tensor
///
/// The image must have non-zero width and height; [`super::decode`] enforces
/// this for uploaded bytes.
pub fn encode(image: &DynamicImage) -> Tensor {
    let (src_width, src_height) = image.dimensions();
    debug_assert!(src_width > 0 && src_height > 0);

    let mut data = vec![0.0f32; TENSOR_LEN];

    for y in 0..TENSOR_HEIGHT {
        let src_y = floor_map(y, src_height, TENSOR_HEIGHT);
        for x in 0..TENSOR_WIDTH {
            let src_x = floor_map(x, src_width, TENSOR_WIDTH);
            let [r, g, b] = sample_rgb16(image, src_x, src_y);

            let idx = (y * TENSOR_WIDTH + x) as usize;
            data[idx] = normalize(r);
            data[PLANE_LEN + idx] = normalize(g);
            data[2 * PLANE_LEN + idx] = normalize(b);
        }
    }

    Tensor { data }
}

/// `target * src_len / target_len` with floor division, overflow-free
fn floor_map(target: u32, src_len: u32, target_len: u32) -> u32 {
    (u64::from(target) * u64::from(src_len) / u64::from(target_len)) as u32
}

/// Reduce a 16-bit sample to 8 bits and map it to [-1, 1]
fn normalize(value: u16) -> f32 {
    (f32::from(value >> 8) / 255.0 - 0.5) / 0.5
}

/// Widen an 8-bit sample to 16 bits (0xAB -> 0xABAB)
fn widen(value: u8) -> u16 {
    u16::from(value) * 0x101
}

/// Convert a float sample in [0, 1] to 16 bits
fn quantize(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Scale a 16-bit color sample by 16-bit alpha
fn premultiply(value: u16, alpha: u16) -> u16 {
    (u32::from(value) * u32::from(alpha) / 0xffff) as u16
}

/// Point-sample an alpha-premultiplied 16-bit RGB color
fn sample_rgb16(image: &DynamicImage, x: u32, y: u32) -> [u16; 3] {
    let [r, g, b, a] = match image {
        DynamicImage::ImageLuma8(buf) => {
            let l = widen(buf.get_pixel(x, y)[0]);
            [l, l, l, 0xffff]
        }
        DynamicImage::ImageLumaA8(buf) => {
            let p = buf.get_pixel(x, y);
            let l = widen(p[0]);
            [l, l, l, widen(p[1])]
        }
        DynamicImage::ImageRgb8(buf) => {
            let p = buf.get_pixel(x, y);
            [widen(p[0]), widen(p[1]), widen(p[2]), 0xffff]
        }
        DynamicImage::ImageRgba8(buf) => {
            let p = buf.get_pixel(x, y);
            [widen(p[0]), widen(p[1]), widen(p[2]), widen(p[3])]
        }
        DynamicImage::ImageLuma16(buf) => {
            let l = buf.get_pixel(x, y)[0];
            [l, l, l, 0xffff]
        }
        DynamicImage::ImageLumaA16(buf) => {
            let p = buf.get_pixel(x, y);
            [p[0], p[0], p[0], p[1]]
        }
        DynamicImage::ImageRgb16(buf) => {
            let p = buf.get_pixel(x, y);
            [p[0], p[1], p[2], 0xffff]
        }
        DynamicImage::ImageRgba16(buf) => {
            let p = buf.get_pixel(x, y);
            [p[0], p[1], p[2], p[3]]
        }
        DynamicImage::ImageRgb32F(buf) => {
            let p = buf.get_pixel(x, y);
            [quantize(p[0]), quantize(p[1]), quantize(p[2]), 0xffff]
        }
        DynamicImage::ImageRgba32F(buf) => {
            let p = buf.get_pixel(x, y);
            [quantize(p[0]), quantize(p[1]), quantize(p[2]), quantize(p[3])]
        }
        other => {
            let p = other.get_pixel(x, y);
            [widen(p[0]), widen(p[1]), widen(p[2]), widen(p[3])]
        }
    };

    [premultiply(r, a), premultiply(g, a), premultiply(b, a)]
}
