//! Encoded polyline format used for paths and elevation sampling.
//!
//! Coordinates are quantised to 1e-5 degrees and stored as zig-zagged deltas
//! from the previous point, emitted as 5-bit groups (low-order first) offset
//! into printable ASCII. Latitude precedes longitude for every point.
//!
//! # Examples
//!
//! ```
//! use waymark_core::polyline;
//!
//! let encoded = polyline::encode([(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
//! assert_eq!(encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//!
//! let decoded = polyline::decode(&encoded)?;
//! assert_eq!(decoded.len(), 3);
//! # Ok::<(), waymark_core::PolylineError>(())
//! ```

use thiserror::Error;

use crate::LatLng;

const PRECISION: f64 = 1e5;
const OFFSET: u8 = 63;
const CONTINUATION: i64 = 0x20;
const GROUP_MASK: i64 = 0x1f;
/// Shifts beyond this would push bits out of an `i64`.
const MAX_SHIFT: u32 = 60;

/// Errors produced while decoding a polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// The input ended part-way through a value or a point.
    #[error("polyline ended mid-value at byte {offset}")]
    Truncated {
        /// Byte offset at which more input was expected.
        offset: usize,
    },
    /// A byte fell outside the printable range used by the format.
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// Offending byte.
        byte: u8,
        /// Byte offset of the offending byte.
        offset: usize,
    },
    /// A value used more continuation groups than fit in 64 bits.
    #[error("polyline value starting before byte {offset} overflows")]
    Overflow {
        /// Byte offset at which the overflow was detected.
        offset: usize,
    },
}

/// Encode a sequence of points into a polyline string.
///
/// Accepts anything convertible to [`LatLng`], such as `(lat, lng)` tuples or
/// [`geo::Coord`] values. An empty input yields an empty string.
#[must_use]
pub fn encode<I, P>(points: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<LatLng>,
{
    let mut encoded = String::new();
    let mut last = (0_i64, 0_i64);
    for raw in points {
        let point: LatLng = raw.into();
        let current = (quantise(point.lat), quantise(point.lng));
        encode_value(current.0 - last.0, &mut encoded);
        encode_value(current.1 - last.1, &mut encoded);
        last = current;
    }
    encoded
}

/// Decode a polyline string into its points.
///
/// An empty string yields an empty sequence.
///
/// # Errors
///
/// Returns a [`PolylineError`] when the input is malformed rather than
/// reading past its end.
pub fn decode(polyline: &str) -> Result<Vec<LatLng>, PolylineError> {
    let mut reader = Reader {
        bytes: polyline.as_bytes(),
        pos: 0,
    };
    let mut points = Vec::new();
    let (mut lat, mut lng) = (0_i64, 0_i64);
    while !reader.is_exhausted() {
        lat = reader.accumulate(lat)?;
        lng = reader.accumulate(lng)?;
        points.push(LatLng::new(dequantise(lat), dequantise(lng)));
    }
    Ok(points)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "quantising degrees to the 1e-5 grid is inherently a float-to-int step"
)]
fn quantise(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "grid values are far below 2^53 so the conversion is exact"
)]
fn dequantise(value: i64) -> f64 {
    value as f64 * 1e-5
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 {
        !(delta << 1)
    } else {
        delta << 1
    };
    while value >= CONTINUATION {
        out.push(group_char((CONTINUATION | (value & GROUP_MASK)) + i64::from(OFFSET)));
        value >>= 5;
    }
    out.push(group_char(value + i64::from(OFFSET)));
}

/// Every group lies in `63..=126`, so the conversion cannot fail.
fn group_char(value: i64) -> char {
    u8::try_from(value).map_or('?', char::from)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    const fn is_exhausted(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Read the next delta and add it to `total`.
    fn accumulate(&mut self, total: i64) -> Result<i64, PolylineError> {
        let offset = self.pos;
        let delta = self.read_value()?;
        total
            .checked_add(delta)
            .ok_or(PolylineError::Overflow { offset })
    }

    fn read_value(&mut self) -> Result<i64, PolylineError> {
        let mut result = 0_i64;
        let mut shift = 0_u32;
        loop {
            let offset = self.pos;
            let byte = *self
                .bytes
                .get(offset)
                .ok_or(PolylineError::Truncated { offset })?;
            if !(OFFSET..=126).contains(&byte) {
                return Err(PolylineError::InvalidByte { byte, offset });
            }
            if shift > MAX_SHIFT {
                return Err(PolylineError::Overflow { offset });
            }
            self.pos += 1;
            let group = i64::from(byte - OFFSET);
            result |= (group & GROUP_MASK) << shift;
            shift += 5;
            if group < CONTINUATION {
                break;
            }
        }
        Ok(if result & 1 == 1 {
            !(result >> 1)
        } else {
            result >> 1
        })
    }
}
