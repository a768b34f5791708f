use std::fmt;

/// Marker written to output tables for a window that produced no value.
pub const MISSING_MARKER: &str = "NA";

/// The mean of one score window, or an explicit marker that no value exists.
///
/// `Missing` is distinct from `Value(0.0)`: uncovered conservation rows keep a literal
/// zero while empty or contaminated windows are missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowedScore {
    Value(f64),
    #[default]
    Missing,
}

impl WindowedScore {
    pub fn zero() -> Self {
        Self::Value(0.0)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Reads a value previously written by [`Display`](fmt::Display).
    ///
    /// Both the missing marker and an empty cell read as missing. Returns `None` when the
    /// cell is neither missing nor a valid float.
    pub fn from_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if cell.is_empty() || cell == MISSING_MARKER {
            return Some(Self::Missing);
        }
        cell.parse::<f64>().ok().map(Self::Value)
    }

    /// Averages every non-missing score. Missing when nothing contributed.
    pub fn mean_of_available<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = WindowedScore>,
    {
        let (total, available) = scores
            .into_iter()
            .filter_map(|score| score.value())
            .fold((0.0, 0usize), |(total, n), v| (total + v, n + 1));

        if available == 0 {
            Self::Missing
        } else {
            Self::Value(total / available as f64)
        }
    }
}

// Magnitudes outside [1e-4, 1e16) are written in exponent form, as downstream tooling
// renders float64 cells.
const POSITIONAL_MIN: f64 = 1e-4;
const POSITIONAL_MAX: f64 = 1e16;

impl fmt::Display for WindowedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Missing => f.write_str(MISSING_MARKER),
            Self::Value(v) if needs_exponent(v) => write_exponent(f, v),
            // Integral values keep one decimal so columns stay recognizably floating point.
            Self::Value(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Self::Value(v) => write!(f, "{}", v),
        }
    }
}

fn needs_exponent(v: f64) -> bool {
    v != 0.0 && v.is_finite() && !(POSITIONAL_MIN..POSITIONAL_MAX).contains(&v.abs())
}

/// Shortest round-trip mantissa with a signed, two-digit minimum exponent (`1.5e-07`).
fn write_exponent(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let formatted = format!("{v:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    write!(f, "{mantissa}e{sign}{digits:0>2}")
}
