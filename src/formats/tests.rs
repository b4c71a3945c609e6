use std::fs;
use std::path::Path;

use ndarray::Array3;
use tempfile::tempdir;

use super::{IoError, read_cube, write_cube, write_projection};
use crate::model::{AxisKind, AxisWcs, Cube, CubeMetadata, Dim, PixelType};

const BLOCK: usize = 2880;

/// Writes a primary HDU from literal `KEYWORD = value` cards, padded to whole blocks.
fn write_raw_fits(path: &Path, cards: &[(&str, &str)], data: &[u8]) {
    let mut header = String::new();
    for (keyword, value) in cards {
        header.push_str(&format!("{:<80}", format!("{keyword:<8}= {value:>20}")));
    }
    header.push_str(&format!("{:<80}", "END"));
    let mut bytes = header.into_bytes();
    bytes.resize(bytes.len().div_ceil(BLOCK) * BLOCK, b' ');
    bytes.extend_from_slice(data);
    bytes.resize(bytes.len().div_ceil(BLOCK) * BLOCK, 0);
    fs::write(path, bytes).expect("write fits");
}

fn synthetic_cube() -> Cube {
    let data = Array3::from_shape_fn((4, 3, 5), |(s, y, x)| s as f32 + 0.1 * y as f32 - x as f32);
    let metadata = CubeMetadata {
        dims: vec![
            Dim::new(AxisKind::Spectral, 4)
                .with_wcs(AxisWcs::linear("FREQ", 1.152e11, 1.0, -4.88e5).with_unit("Hz")),
            Dim::new(AxisKind::Y, 3)
                .with_wcs(AxisWcs::linear("DEC--SIN", -32.54, 2.0, 1.0e-4).with_unit("deg")),
            Dim::new(AxisKind::X, 5)
                .with_wcs(AxisWcs::linear("RA---SIN", 22.47, 3.0, -1.0e-4).with_unit("deg")),
        ],
        unit: Some("Jy/beam".into()),
        ..CubeMetadata::default()
    };
    let mut cube = Cube::new(data, metadata).expect("cube");
    cube.metadata
        .extras
        .insert("OBJECT".into(), serde_json::json!("R Scl"));
    cube
}

#[test]
fn fits_write_then_read_preserves_cube() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cube.fits");
    let cube = synthetic_cube();
    write_cube(&path, &cube).expect("write cube");
    assert_eq!(fs::metadata(&path).expect("metadata").len() % BLOCK as u64, 0);

    let restored = read_cube(&path).expect("read cube");
    assert_eq!(restored.shape(), [4, 3, 5]);
    assert_eq!(restored.data, cube.data);
    assert_eq!(restored.unit(), Some("Jy/beam"));
    assert_eq!(restored.metadata.pixel_type, PixelType::F32);
    assert_eq!(restored.metadata.source.as_deref(), Some(path.as_path()));
    let spectral = restored.metadata.dim(AxisKind::Spectral).expect("spectral");
    assert_eq!(spectral.wcs.ctype, "FREQ");
    assert_eq!(spectral.wcs.cunit.as_deref(), Some("Hz"));
    assert!((spectral.wcs.cdelt + 4.88e5).abs() < 1e-3);
    let x = restored.metadata.dim(AxisKind::X).expect("x");
    assert_eq!(x.wcs.crpix, 3.0);
    assert_eq!(
        restored.metadata.extras.get("OBJECT"),
        Some(&serde_json::json!("R Scl"))
    );
}

#[test]
fn integer_cube_with_degenerate_stokes_axis_is_scaled_and_blanked() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("alma.fits");
    let raw = (0..12_i16)
        .map(|value| if value == 5 { -32768 } else { value })
        .flat_map(i16::to_be_bytes)
        .collect::<Vec<_>>();
    write_raw_fits(
        &path,
        &[
            ("SIMPLE", "T"),
            ("BITPIX", "16"),
            ("NAXIS", "4"),
            ("NAXIS1", "2"),
            ("NAXIS2", "2"),
            ("NAXIS3", "3"),
            ("NAXIS4", "1"),
            ("BSCALE", "0.5"),
            ("BZERO", "10.0"),
            ("BLANK", "-32768"),
            ("BUNIT", "'K       '"),
            ("CTYPE1", "'RA---SIN'"),
            ("CTYPE2", "'DEC--SIN'"),
            ("CTYPE3", "'VRAD    '"),
            ("CTYPE4", "'STOKES  '"),
        ],
        &raw,
    );

    let cube = read_cube(&path).expect("read");
    assert_eq!(cube.shape(), [3, 2, 2]);
    assert_eq!(cube.metadata.pixel_type, PixelType::I16);
    assert_eq!(cube.data[[0, 0, 0]], 10.0);
    assert_eq!(cube.data[[0, 0, 1]], 10.5);
    assert!(cube.data[[1, 0, 1]].is_nan());
    assert_eq!(cube.data[[2, 1, 1]], 10.0 + 11.0 * 0.5);
    assert_eq!(cube.unit(), Some("K"));
}

#[test]
fn spectral_axis_is_moved_to_front() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("spectral_first.fits");
    // value = 100 * freq + 10 * ra + dec, FITS order with FREQ fastest
    let mut raw = Vec::new();
    for dec in 0..3 {
        for ra in 0..2 {
            for freq in 0..4 {
                raw.extend_from_slice(&((100 * freq + 10 * ra + dec) as f32).to_be_bytes());
            }
        }
    }
    write_raw_fits(
        &path,
        &[
            ("SIMPLE", "T"),
            ("BITPIX", "-32"),
            ("NAXIS", "3"),
            ("NAXIS1", "4"),
            ("NAXIS2", "2"),
            ("NAXIS3", "3"),
            ("CTYPE1", "'FREQ    '"),
            ("CTYPE2", "'RA---SIN'"),
            ("CTYPE3", "'DEC--SIN'"),
        ],
        &raw,
    );

    let cube = read_cube(&path).expect("read");
    assert_eq!(cube.shape(), [4, 3, 2]);
    assert_eq!(cube.data[[3, 2, 1]], 312.0);
    assert_eq!(cube.data[[1, 0, 1]], 110.0);
    let y = cube.metadata.dim(AxisKind::Y).expect("y");
    assert_eq!(y.wcs.ctype, "DEC--SIN");
}

#[test]
fn descriptive_keywords_become_metadata_extras() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("extras.fits");
    write_raw_fits(
        &path,
        &[
            ("SIMPLE", "T"),
            ("BITPIX", "-32"),
            ("NAXIS", "3"),
            ("NAXIS1", "1"),
            ("NAXIS2", "1"),
            ("NAXIS3", "2"),
            ("BUNIT", "'Jy/beam '"),
            ("OBJECT", "'R Scl   '"),
            ("RESTFRQ", "1.152712018E+11"),
            ("HISTORY", "'ignored '"),
            ("CTYPE3", "'FREQ    '"),
        ],
        &[0u8; 8],
    );

    let cube = read_cube(&path).expect("read");
    assert_eq!(cube.unit(), Some("Jy/beam"));
    assert_eq!(
        cube.metadata.extras.get("OBJECT"),
        Some(&serde_json::json!("R Scl"))
    );
    let restfrq = cube.metadata.extras["RESTFRQ"].as_f64().expect("number");
    assert!((restfrq - 1.152712018e11).abs() < 1.0);
    assert!(!cube.metadata.extras.contains_key("HISTORY"));
}

#[test]
fn schema_violations_are_load_errors() {
    let dir = tempdir().expect("tempdir");
    let base = [
        ("SIMPLE", "T"),
        ("BITPIX", "-32"),
        ("NAXIS", "3"),
        ("NAXIS1", "2"),
        ("NAXIS2", "2"),
    ];

    let missing_axis = dir.path().join("missing_axis.fits");
    write_raw_fits(&missing_axis, &base, &[0u8; 64]);
    assert!(matches!(
        read_cube(&missing_axis),
        Err(IoError::MissingKeyword(keyword)) if keyword == "NAXIS3"
    ));

    let mut cards = base.to_vec();
    cards.push(("NAXIS3", "2"));
    let no_spectral = dir.path().join("no_spectral.fits");
    write_raw_fits(&no_spectral, &cards, &[0u8; 32]);
    assert!(matches!(
        read_cube(&no_spectral),
        Err(IoError::MissingSpectralAxis)
    ));

    cards.push(("CTYPE3", "'FREQ    '"));
    let truncated = dir.path().join("truncated.fits");
    write_raw_fits(&truncated, &cards, &[]);
    assert!(matches!(
        read_cube(&truncated),
        Err(IoError::Truncated { expected: 32, found: 0 })
    ));

    let image = dir.path().join("image.fits");
    let mut flat = base[..4].to_vec();
    flat[2] = ("NAXIS", "2");
    write_raw_fits(&image, &flat, &[0u8; 16]);
    assert!(matches!(
        read_cube(&image),
        Err(IoError::UnsupportedLayout(_))
    ));

    assert!(matches!(
        read_cube(dir.path().join("absent.fits")),
        Err(IoError::Io(_))
    ));
    assert!(matches!(
        read_cube(dir.path().join("cube.hdf5")),
        Err(IoError::UnsupportedFormat(_))
    ));
}

#[test]
fn oversized_axes_without_data_fail_before_allocating() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("huge.fits");
    write_raw_fits(
        &path,
        &[
            ("SIMPLE", "T"),
            ("BITPIX", "-32"),
            ("NAXIS", "3"),
            ("NAXIS1", "1000000"),
            ("NAXIS2", "1000000"),
            ("NAXIS3", "1000000"),
            ("CTYPE3", "'FREQ    '"),
        ],
        &[],
    );

    match read_cube(&path) {
        Err(IoError::Truncated { expected, found }) => {
            assert_eq!(expected, 4_000_000_000_000_000_000);
            assert_eq!(found, 0);
        }
        Err(IoError::InvalidHeader(_)) => {}
        other => panic!("expected a size error, got {other:?}"),
    }
}

#[test]
fn writing_into_a_missing_directory_names_the_output() {
    let dir = tempdir().expect("tempdir");
    let target = dir.path().join("absent").join("cube.fits");
    match write_cube(&target, &synthetic_cube()) {
        Err(IoError::Write { path, .. }) => assert_eq!(path, target),
        other => panic!("expected a write error, got {other:?}"),
    }
}

#[test]
fn projections_export_as_png_and_tiff() {
    let dir = tempdir().expect("tempdir");
    let projection = synthetic_cube().sum_spectral();
    let png = dir.path().join("sumproj.png");
    let tiff = dir.path().join("sumproj.tiff");
    write_projection(&png, &projection).expect("png");
    write_projection(&tiff, &projection).expect("tiff");
    let image = image::open(&png).expect("open png").to_luma8();
    assert_eq!(image.dimensions(), (5, 3));
    // row 0 of the projection is drawn at the bottom
    assert_eq!(image.get_pixel(0, 2).0[0], 243);
    assert!(tiff.exists());
    assert!(matches!(
        write_projection(dir.path().join("absent").join("sumproj.png"), &projection),
        Err(IoError::Write { .. })
    ));
    assert!(matches!(
        write_projection(dir.path().join("sumproj.bmp"), &projection),
        Err(IoError::UnsupportedFormat(_))
    ));
}
