use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    Spectral,
    Y,
    X,
}

/// Array axis order of every cube: `(spectral, y, x)`.
pub const CUBE_AXES: [AxisKind; 3] = [AxisKind::Spectral, AxisKind::Y, AxisKind::X];

impl AxisKind {
    pub fn label(self) -> &'static str {
        match self {
            AxisKind::Spectral => "s",
            AxisKind::Y => "y",
            AxisKind::X => "x",
        }
    }

    pub fn index(self) -> usize {
        match self {
            AxisKind::Spectral => 0,
            AxisKind::Y => 1,
            AxisKind::X => 2,
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisKind::Spectral => "spectral",
            AxisKind::Y => "y",
            AxisKind::X => "x",
        };
        formatter.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    U8,
    I16,
    I32,
    I64,
    #[default]
    F32,
    F64,
}

impl PixelType {
    pub fn from_bitpix(bitpix: i64) -> Option<Self> {
        match bitpix {
            8 => Some(PixelType::U8),
            16 => Some(PixelType::I16),
            32 => Some(PixelType::I32),
            64 => Some(PixelType::I64),
            -32 => Some(PixelType::F32),
            -64 => Some(PixelType::F64),
            _ => None,
        }
    }

    pub fn bitpix(self) -> i64 {
        match self {
            PixelType::U8 => 8,
            PixelType::I16 => 16,
            PixelType::I32 => 32,
            PixelType::I64 => 64,
            PixelType::F32 => -32,
            PixelType::F64 => -64,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        (self.bitpix().unsigned_abs() / 8) as usize
    }

    pub fn is_integer(self) -> bool {
        self.bitpix() > 0
    }
}

/// Half-open index range along one cube axis. Missing bounds mean
/// "from the first element" / "through the last element".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AxisRange {
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl AxisRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn resolve(&self, axis: AxisKind, len: usize) -> Result<Range<usize>> {
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(len);
        if end > len || start > len {
            return Err(CoreError::AxisOutOfBounds {
                axis,
                start,
                end,
                len,
            });
        }
        if start >= end {
            return Err(CoreError::EmptyRange { axis, start, end });
        }
        Ok(start..end)
    }
}

impl From<Range<usize>> for AxisRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl FromStr for AxisRange {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self> {
        let (start, end) = raw
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidRange(format!("expected `start:end`, got `{raw}`")))?;
        let parse_bound = |bound: &str| -> Result<Option<usize>> {
            let bound = bound.trim();
            if bound.is_empty() {
                return Ok(None);
            }
            bound
                .parse::<usize>()
                .map(Some)
                .map_err(|_| CoreError::InvalidRange(format!("invalid bound `{bound}` in `{raw}`")))
        };
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(formatter, "{start}")?;
        }
        formatter.write_str(":")?;
        if let Some(end) = self.end {
            write!(formatter, "{end}")?;
        }
        Ok(())
    }
}
