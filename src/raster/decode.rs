use std::io::Cursor;

use image::ImageEncoder;

use crate::foundation::error::{TerraError, TerraResult};

/// 3-channel 8-bit raster, row-major, tightly packed (`width * height * 3` bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major RGB8.
    pub rgb8: Vec<u8>,
}

impl Raster {
    /// Wrap RGB8 bytes, checking that the buffer length matches the dimensions.
    pub fn new(width: u32, height: u32, rgb8: Vec<u8>) -> TerraResult<Self> {
        let expected = width as usize * height as usize * 3;
        if rgb8.len() != expected {
            return Err(TerraError::invalid_input(format!(
                "raster {width}x{height} needs {expected} bytes, got {}",
                rgb8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgb8,
        })
    }

    /// Iterate pixels as `[r, g, b]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.rgb8.chunks_exact(3).map(|px| [px[0], px[1], px[2]])
    }
}

/// Single-channel 8-bit raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// One luminance byte per pixel.
    pub luma8: Vec<u8>,
}

/// Decode encoded image bytes into an RGB8 raster. Alpha, if any, is dropped.
pub fn decode(bytes: &[u8]) -> TerraResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TerraError::decode(format!("decode image from memory: {e}")))?;
    let rgb = dyn_img.into_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(Raster {
        width,
        height,
        rgb8: rgb.into_raw(),
    })
}

/// Losslessly encode a raster as PNG.
///
/// A buffer that does not match the raster's dimensions is an encode error.
pub fn encode_png(raster: &Raster) -> TerraResult<Vec<u8>> {
    let expected = raster.width as usize * raster.height as usize * 3;
    if raster.rgb8.len() != expected {
        return Err(TerraError::encode(format!(
            "raster {}x{} holds {} bytes, expected {expected}",
            raster.width,
            raster.height,
            raster.rgb8.len()
        )));
    }

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
        .write_image(
            &raster.rgb8,
            raster.width,
            raster.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| {
            TerraError::encode(format!("encode {}x{} png: {e}", raster.width, raster.height))
        })?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/decode.rs"]
mod tests;
