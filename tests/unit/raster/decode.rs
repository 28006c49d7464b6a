use std::io::Cursor;

use super::*;

#[test]
fn png_round_trip_is_exact() {
    let rgb8: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7 % 256) as u8).collect();
    let raster = Raster::new(4, 3, rgb8).unwrap();

    let bytes = encode_png(&raster).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(decode(&bytes).unwrap(), raster);
}

#[test]
fn decode_drops_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 10u8]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let raster = decode(&buf).unwrap();
    assert_eq!((raster.width, raster.height), (1, 1));
    assert_eq!(raster.rgb8, vec![100, 50, 200]);
}

#[test]
fn decode_rejects_garbage() {
    let err = decode(b"<html>rate limited</html>").unwrap_err();
    assert!(matches!(err, TerraError::Decode(_)));

    let err = decode(&[]).unwrap_err();
    assert!(matches!(err, TerraError::Decode(_)));
}

#[test]
fn new_checks_buffer_length() {
    assert!(Raster::new(2, 2, vec![0; 12]).is_ok());
    assert!(Raster::new(2, 2, vec![0; 11]).is_err());
}

#[test]
fn encode_rejects_mismatched_buffer() {
    let raster = Raster {
        width: 4,
        height: 4,
        rgb8: vec![0; 5],
    };
    let err = encode_png(&raster).unwrap_err();
    assert!(matches!(err, TerraError::Encode(_)));
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Encode);
}
