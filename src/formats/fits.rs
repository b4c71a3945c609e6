use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use fitrs::{Fits, FitsData, Hdu, HeaderValue};
use ndarray::Array3;

use crate::model::{AxisKind, AxisWcs, Cube, CubeMetadata, Dim, PixelType};

use super::{IoError, Result};

/// FITS logical record length in bytes.
pub(crate) const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

pub(crate) const FITS_EXTENSIONS: &[&str] = &["fits", "fit", "fts"];

/// Descriptive keywords carried into `CubeMetadata::extras`.
pub(crate) const EXTRA_KEYWORDS: &[&str] = &[
    "OBJECT", "TELESCOP", "INSTRUME", "DATE-OBS", "RESTFRQ", "SPECSYS", "BMAJ", "BMIN", "BPA",
];

pub(crate) fn read_fits(path: &Path) -> Result<Cube> {
    let file_len = fs::metadata(path)?.len();
    let fits = Fits::open(path)?;
    let hdu = fits
        .get(0)
        .ok_or_else(|| IoError::InvalidHeader("file has no primary HDU".into()))?;

    if !matches!(hdu.value("SIMPLE"), Some(HeaderValue::Logical(true))) {
        return Err(IoError::InvalidHeader(
            "primary header must start with SIMPLE = T".into(),
        ));
    }
    let bitpix = required_i64(&hdu, "BITPIX")?;
    let pixel_type = PixelType::from_bitpix(bitpix).ok_or(IoError::UnsupportedBitpix(bitpix))?;
    let naxis = required_i64(&hdu, "NAXIS")?;
    if !(3..=999).contains(&naxis) {
        return Err(IoError::UnsupportedLayout(format!(
            "expected a data cube with at least 3 axes, found NAXIS = {naxis}"
        )));
    }
    let naxes = (1..=naxis)
        .map(|index| {
            let keyword = format!("NAXIS{index}");
            let size = required_i64(&hdu, &keyword)?;
            usize::try_from(size)
                .map_err(|_| IoError::InvalidHeader(format!("`{keyword}` is negative: {size}")))
        })
        .collect::<Result<Vec<_>>>()?;
    if let Some((index, size)) = naxes
        .iter()
        .enumerate()
        .skip(3)
        .find(|(_, size)| **size != 1)
    {
        return Err(IoError::UnsupportedLayout(format!(
            "axis NAXIS{} has length {size}; only degenerate axes beyond the third are supported",
            index + 1
        )));
    }

    let wcs = (1..=3).map(|index| axis_wcs(&hdu, index)).collect::<Vec<_>>();
    let spectral = wcs
        .iter()
        .position(AxisWcs::is_spectral)
        .ok_or(IoError::MissingSpectralAxis)?;
    let spatial = (0..3).filter(|index| *index != spectral).collect::<Vec<_>>();
    let (x_axis, y_axis) = (spatial[0], spatial[1]);

    let count = checked_count(&naxes)?;
    check_data_unit(path, file_len, count, pixel_type)?;
    let samples = read_samples(&hdu, pixel_type, count)?;
    let fits_shape = (naxes[2], naxes[1], naxes[0]);
    let data = Array3::from_shape_vec(fits_shape, samples)
        .map_err(|error| IoError::UnsupportedLayout(error.to_string()))?;
    // FITS axis n (1-based, fastest first) is array axis 3 - n.
    let data = data
        .permuted_axes([2 - spectral, 2 - y_axis, 2 - x_axis])
        .as_standard_layout()
        .into_owned();

    let sizes = [naxes[spectral], naxes[y_axis], naxes[x_axis]];
    let dims = vec![
        Dim::new(AxisKind::Spectral, sizes[0]).with_wcs(wcs[spectral].clone()),
        Dim::new(AxisKind::Y, sizes[1]).with_wcs(wcs[y_axis].clone()),
        Dim::new(AxisKind::X, sizes[2]).with_wcs(wcs[x_axis].clone()),
    ];
    let extras = EXTRA_KEYWORDS
        .iter()
        .filter_map(|keyword| {
            hdu.value(keyword)
                .and_then(to_json)
                .map(|value| (keyword.to_string(), value))
        })
        .collect();
    let metadata = CubeMetadata {
        dims,
        unit: get_str(&hdu, "BUNIT")
            .map(str::to_string)
            .filter(|unit| !unit.is_empty()),
        pixel_type,
        source: Some(path.to_path_buf()),
        extras,
    };
    Ok(Cube::new(data, metadata)?)
}

fn checked_count(naxes: &[usize]) -> Result<usize> {
    naxes
        .iter()
        .try_fold(1_usize, |count, size| count.checked_mul(*size))
        .ok_or_else(|| {
            IoError::InvalidHeader(format!("axis lengths {naxes:?} overflow the address space"))
        })
}

/// Checks that the file holds the whole data unit before any sample is read.
fn check_data_unit(path: &Path, file_len: u64, count: usize, pixel_type: PixelType) -> Result<()> {
    let data_len = count
        .checked_mul(pixel_type.bytes_per_sample())
        .ok_or_else(|| {
            IoError::InvalidHeader(format!("data unit of {count} samples is too large"))
        })?;
    let header_len = header_len(path)?;
    let expected = header_len.saturating_add(data_len);
    let found = usize::try_from(file_len).unwrap_or(usize::MAX);
    if found < expected {
        return Err(IoError::Truncated {
            expected: data_len,
            found: found.saturating_sub(header_len),
        });
    }
    Ok(())
}

/// Length of the primary header, a whole number of blocks ending with the `END` card.
fn header_len(path: &Path) -> Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut block = vec![0u8; BLOCK_SIZE];
    let mut len = 0;
    loop {
        if let Err(error) = reader.read_exact(&mut block) {
            return match error.kind() {
                std::io::ErrorKind::UnexpectedEof => Err(IoError::Truncated {
                    expected: len + BLOCK_SIZE,
                    found: len,
                }),
                _ => Err(error.into()),
            };
        }
        len += BLOCK_SIZE;
        let end = block.chunks(CARD_SIZE).any(|card| {
            card.starts_with(b"END") && card[3..].iter().all(|byte| *byte == b' ')
        });
        if end {
            return Ok(len);
        }
    }
}

fn read_samples(hdu: &Hdu, pixel_type: PixelType, count: usize) -> Result<Vec<f32>> {
    let bscale = get_f64(hdu, "BSCALE").unwrap_or(1.0);
    let bzero = get_f64(hdu, "BZERO").unwrap_or(0.0);
    let blank = get_i64(hdu, "BLANK").filter(|_| pixel_type.is_integer());
    let scale = |value: f64| (value * bscale + bzero) as f32;
    let integer = |value: Option<i64>| match value {
        Some(value) if Some(value) != blank => scale(value as f64),
        _ => f32::NAN,
    };

    let samples: Vec<f32> = match hdu.read_data() {
        FitsData::FloatingPoint32(array) => {
            if bscale == 1.0 && bzero == 0.0 {
                array.data.to_vec()
            } else {
                array.data.iter().map(|value| scale(f64::from(*value))).collect()
            }
        }
        FitsData::FloatingPoint64(array) => array.data.iter().map(|value| scale(*value)).collect(),
        FitsData::IntegersI32(array) => array
            .data
            .iter()
            .map(|value| integer(value.map(i64::from)))
            .collect(),
        // unsigned data arrives with the BZERO offset already applied
        FitsData::IntegersU32(array) => array
            .data
            .iter()
            .map(|value| value.map_or(f32::NAN, |value| (value as f64 * bscale) as f32))
            .collect(),
        _ => return Err(IoError::UnsupportedBitpix(pixel_type.bitpix())),
    };
    if samples.len() != count {
        return Err(IoError::Truncated {
            expected: count * pixel_type.bytes_per_sample(),
            found: samples.len() * pixel_type.bytes_per_sample(),
        });
    }
    Ok(samples)
}

fn required_i64(hdu: &Hdu, keyword: &str) -> Result<i64> {
    get_i64(hdu, keyword).ok_or_else(|| IoError::MissingKeyword(keyword.to_string()))
}

fn get_i64(hdu: &Hdu, keyword: &str) -> Option<i64> {
    match hdu.value(keyword)? {
        HeaderValue::IntegerNumber(value) => Some(*value as i64),
        HeaderValue::RealFloatingNumber(value) if value.fract() == 0.0 => Some(*value as i64),
        _ => None,
    }
}

fn get_f64(hdu: &Hdu, keyword: &str) -> Option<f64> {
    match hdu.value(keyword)? {
        HeaderValue::IntegerNumber(value) => Some(*value as f64),
        HeaderValue::RealFloatingNumber(value) => Some(*value),
        _ => None,
    }
}

fn get_str<'a>(hdu: &'a Hdu, keyword: &str) -> Option<&'a str> {
    match hdu.value(keyword)? {
        HeaderValue::CharacterString(value) => Some(value.trim_end()),
        _ => None,
    }
}

fn to_json(value: &HeaderValue) -> Option<serde_json::Value> {
    match value {
        HeaderValue::CharacterString(text) => Some(serde_json::json!(text.trim_end())),
        HeaderValue::Logical(flag) => Some(serde_json::json!(flag)),
        HeaderValue::IntegerNumber(number) => Some(serde_json::json!(number)),
        HeaderValue::RealFloatingNumber(number) => Some(serde_json::json!(number)),
        _ => None,
    }
}

fn axis_wcs(hdu: &Hdu, index: usize) -> AxisWcs {
    let defaults = AxisWcs::default();
    AxisWcs {
        ctype: get_str(hdu, &format!("CTYPE{index}"))
            .unwrap_or_default()
            .to_string(),
        cunit: get_str(hdu, &format!("CUNIT{index}"))
            .map(str::to_string)
            .filter(|unit| !unit.is_empty()),
        crval: get_f64(hdu, &format!("CRVAL{index}")).unwrap_or(defaults.crval),
        crpix: get_f64(hdu, &format!("CRPIX{index}")).unwrap_or(defaults.crpix),
        cdelt: get_f64(hdu, &format!("CDELT{index}")).unwrap_or(defaults.cdelt),
    }
}

pub(crate) fn write_fits(path: &Path, cube: &Cube) -> Result<()> {
    cube.validate()?;
    let [channels, height, width] = cube.shape();
    let values = cube
        .data
        .as_standard_layout()
        .iter()
        .copied()
        .collect::<Vec<f32>>();
    // NAXIS1 is the fastest axis, the last one of the in-memory layout.
    let mut hdu = Hdu::new(&[width, height, channels], values);

    let fits_axes = [AxisKind::X, AxisKind::Y, AxisKind::Spectral];
    for (index, axis) in fits_axes.iter().enumerate() {
        let Some(dim) = cube.metadata.dim(*axis) else {
            continue;
        };
        let n = index + 1;
        hdu.insert(&format!("CTYPE{n}"), dim.wcs.ctype.as_str());
        if let Some(unit) = &dim.wcs.cunit {
            hdu.insert(&format!("CUNIT{n}"), unit.as_str());
        }
        hdu.insert(&format!("CRVAL{n}"), dim.wcs.crval);
        hdu.insert(&format!("CRPIX{n}"), dim.wcs.crpix);
        hdu.insert(&format!("CDELT{n}"), dim.wcs.cdelt);
    }
    if let Some(unit) = cube.unit() {
        hdu.insert("BUNIT", unit);
    }
    for (keyword, value) in &cube.metadata.extras {
        match value {
            serde_json::Value::String(text) => {
                hdu.insert(keyword.as_str(), text.as_str());
            }
            serde_json::Value::Number(number) => {
                match number.as_i64().and_then(|value| i32::try_from(value).ok()) {
                    Some(integer) => {
                        hdu.insert(keyword.as_str(), integer);
                    }
                    None => {
                        if let Some(real) = number.as_f64() {
                            hdu.insert(keyword.as_str(), real);
                        }
                    }
                }
            }
            _ => log::debug!("skipping non-scalar header keyword {keyword}"),
        }
    }

    Fits::create(path, hdu)?;
    Ok(())
}
