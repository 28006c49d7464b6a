use super::*;

fn ramp(width: u32, height: u32) -> Raster {
    let mut rgb8 = Vec::new();
    for i in 0..width * height {
        let v = (i * 255 / (width * height - 1).max(1)) as u8;
        rgb8.extend_from_slice(&[v, v, v]);
    }
    Raster::new(width, height, rgb8).unwrap()
}

#[test]
fn grayscale_uses_bt601_weights() {
    let r = Raster::new(3, 1, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
    let g = to_grayscale(&r);
    assert_eq!(g.luma8, vec![76, 150, 29]);

    let white = Raster::new(1, 1, vec![255, 255, 255]).unwrap();
    assert_eq!(to_grayscale(&white).luma8, vec![255]);
}

#[test]
fn derived_rasters_keep_dimensions() {
    let r = ramp(7, 5);
    let h = heatmap(&r);
    let m = mask(&r, Threshold::DEFAULT);
    assert_eq!((h.width, h.height, h.rgb8.len()), (7, 5, 7 * 5 * 3));
    assert_eq!((m.width, m.height, m.rgb8.len()), (7, 5, 7 * 5 * 3));
}

#[test]
fn heatmap_ramp_runs_blue_to_red() {
    let lut = build_jet_lut();
    let [r0, g0, b0] = lut[0];
    assert!(b0 > r0 && b0 > g0, "low end should be blue: {:?}", lut[0]);
    let [r1, g1, b1] = lut[255];
    assert!(r1 > g1 && r1 > b1, "high end should be red: {:?}", lut[255]);
    assert_eq!(lut[128][1], 255, "middle should be green-dominant");
}

#[test]
fn heatmap_is_deterministic() {
    let r = ramp(16, 16);
    assert_eq!(heatmap(&r), heatmap(&r));
}

#[test]
fn mask_uses_strict_greater_than() {
    let r = Raster::new(3, 1, vec![0, 0, 0, 128, 128, 128, 129, 129, 129]).unwrap();
    let m = mask(&r, Threshold(128));
    assert_eq!(m.rgb8, vec![0, 0, 0, 0, 0, 0, 255, 255, 255]);
}

#[test]
fn mask_edge_thresholds() {
    let r = ramp(16, 16);
    let all_but_zero = mask(&r, Threshold(0));
    let zero_pixels = r.pixels().filter(|px| *px == [0, 0, 0]).count() as u64;
    assert_eq!(light_pixel_count(&all_but_zero), 256 - zero_pixels);

    let none = mask(&r, Threshold(255));
    assert_eq!(light_pixel_count(&none), 0);
}

#[test]
fn mask_is_deterministic() {
    let r = ramp(9, 9);
    assert_eq!(mask(&r, Threshold(128)), mask(&r, Threshold(128)));
}
