use std::sync::LazyLock;

use crate::foundation::core::Threshold;
use crate::raster::decode::{GrayRaster, Raster};

/// Value of a light mask pixel.
pub const MASK_LIGHT: u8 = 255;
/// Value of a dark mask pixel.
pub const MASK_DARK: u8 = 0;

static JET_LUT: LazyLock<[[u8; 3]; 256]> = LazyLock::new(build_jet_lut);

/// BT.601 luminance, `0.299 R + 0.587 G + 0.114 B`, rounded to nearest.
pub fn to_grayscale(raster: &Raster) -> GrayRaster {
    let luma8 = raster.pixels().map(luma).collect();
    GrayRaster {
        width: raster.width,
        height: raster.height,
        luma8,
    }
}

/// Grayscale mapped through the jet ramp (low intensity blue, high intensity red).
pub fn heatmap(raster: &Raster) -> Raster {
    let gray = to_grayscale(raster);
    let lut = &*JET_LUT;
    let mut rgb8 = Vec::with_capacity(gray.luma8.len() * 3);
    for &y in &gray.luma8 {
        rgb8.extend_from_slice(&lut[y as usize]);
    }
    Raster {
        width: gray.width,
        height: gray.height,
        rgb8,
    }
}

/// Binarize: pixels whose luminance is strictly greater than `threshold` become
/// [`MASK_LIGHT`], all others [`MASK_DARK`]. The level is replicated over three channels.
pub fn mask(raster: &Raster, threshold: Threshold) -> Raster {
    let gray = to_grayscale(raster);
    let t = threshold.get();
    let mut rgb8 = Vec::with_capacity(gray.luma8.len() * 3);
    for &y in &gray.luma8 {
        let v = if y > t { MASK_LIGHT } else { MASK_DARK };
        rgb8.extend_from_slice(&[v, v, v]);
    }
    Raster {
        width: gray.width,
        height: gray.height,
        rgb8,
    }
}

/// Number of light pixels in a mask raster.
pub fn light_pixel_count(mask: &Raster) -> u64 {
    mask.pixels().filter(|px| px[0] == MASK_LIGHT).count() as u64
}

fn luma([r, g, b]: [u8; 3]) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

fn build_jet_lut() -> [[u8; 3]; 256] {
    fn channel(v: f64, center: f64) -> u8 {
        let x = (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
        (x * 255.0).round() as u8
    }

    let mut lut = [[0u8; 3]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = i as f64 / 255.0;
        *entry = [channel(v, 3.0), channel(v, 2.0), channel(v, 1.0)];
    }
    lut
}

#[cfg(test)]
#[path = "../../tests/unit/raster/transform.rs"]
mod tests;
