use super::*;

#[test]
fn project_name_accepts_plain_names() {
    for ok in ["parkA", "park a", "north-field_2", "ñandú", "v1.2"] {
        assert_eq!(ProjectName::parse(ok).unwrap().as_str(), ok);
    }
}

#[test]
fn project_name_rejects_traversal_and_separators() {
    for bad in [
        "", "   ", ".", "..", "../etc", "a/b", "a\\b", ".hidden", "x..y", "tab\there",
    ] {
        let err = ProjectName::parse(bad).unwrap_err();
        assert!(
            matches!(err, TerraError::InvalidInput(_)),
            "{bad:?} should be invalid"
        );
    }
}

#[test]
fn project_name_rejects_overlong() {
    let long = "a".repeat(129);
    assert!(ProjectName::parse(&long).is_err());
    assert!(ProjectName::parse(&long[..128]).is_ok());
}

#[test]
fn coord_bounds_are_inclusive() {
    Coord::new(90.0, 180.0).unwrap();
    Coord::new(-90.0, -180.0).unwrap();
    assert!(Coord::new(90.5, 0.0).is_err());
    assert!(Coord::new(0.0, -180.01).is_err());
    assert!(Coord::new(f64::NAN, 0.0).is_err());
}

#[test]
fn coord_serializes_as_lat_lon_object() {
    let c = Coord::new(40.0, -73.0).unwrap();
    assert_eq!(
        serde_json::to_string(&c).unwrap(),
        r#"{"lat":40.0,"lon":-73.0}"#
    );
}

#[test]
fn threshold_range_and_default() {
    assert_eq!(Threshold::default().get(), 128);
    assert_eq!(Threshold::from_i64(0).unwrap().get(), 0);
    assert_eq!(Threshold::from_i64(255).unwrap().get(), 255);
    assert!(Threshold::from_i64(256).is_err());
    assert!(Threshold::from_i64(-1).is_err());
}

#[test]
fn artifact_file_names_are_fixed() {
    assert_eq!(ArtifactKind::Source.file_name(), "image.png");
    assert_eq!(ArtifactKind::Heatmap.file_name(), "heatmap.png");
    assert_eq!(ArtifactKind::Mask.file_name(), "mask.png");
    assert_eq!(ArtifactKind::parse("image").unwrap(), ArtifactKind::Source);
    assert!(ArtifactKind::parse("thumbnail").is_err());
}
