//! Fixed-offset score windows and the mean computed over them.
//!
//! Both track types share the slicing arithmetic in [`Window`], but they disagree on what
//! a "no data" token means, and downstream models were trained on exactly these values:
//!
//! - [`MissingPolicy::Contaminating`] (conservation): one missing token makes the whole
//!   window missing.
//! - [`MissingPolicy::ZeroSubstituting`] (reactivity): null tokens and NaN count as 0;
//!   only an empty window is missing.

pub mod conservation;
pub mod shape;

use crate::core::models::score::WindowedScore;
use std::ops::{Add, Range};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid score token '{token}'")]
pub struct ScoreParseError {
    pub token: String,
}

/// A half-open window `[start, start + len)` over a per-base score sequence.
///
/// `start` may be negative or past the end; [`Window::clip`] bounds it to the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub len: usize,
}

impl Window {
    pub fn new(start: i64, len: usize) -> Self {
        Self { start, len }
    }

    /// Start of the window immediately following this one.
    pub fn end(&self) -> i64 {
        self.start + self.len as i64
    }

    pub fn clip(&self, sequence_len: usize) -> Range<usize> {
        let bound = sequence_len as i64;
        let start = self.start.clamp(0, bound);
        let end = self.end().clamp(start, bound);
        start as usize..end as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Contaminating { missing_token: &'static str },
    ZeroSubstituting { null_token: &'static str },
}

/// Mean of the scores under `window`, following `policy` for missing tokens.
///
/// Conservation windows are parsed, summed and divided in single precision and only
/// widened to `f64` for the result, so a window of `0.1` scores yields
/// `0.10000000149011612`. Reactivity windows stay in double precision throughout. Both
/// sum with [`pairwise_sum`].
///
/// # Errors
///
/// Returns [`ScoreParseError`] if a token inside the window is neither a float nor the
/// policy's sentinel. Tokens outside the window are never inspected.
pub fn window_mean<S: AsRef<str>>(
    scores: &[S],
    window: Window,
    policy: MissingPolicy,
) -> Result<WindowedScore, ScoreParseError> {
    let slice = &scores[window.clip(scores.len())];
    if slice.is_empty() {
        return Ok(WindowedScore::Missing);
    }

    let mean = match policy {
        MissingPolicy::Contaminating { missing_token } => {
            if slice.iter().any(|t| t.as_ref().trim() == missing_token) {
                return Ok(WindowedScore::Missing);
            }
            let values = slice
                .iter()
                .map(|t| parse_token(t.as_ref()).map(|v| v as f32))
                .collect::<Result<Vec<f32>, _>>()?;
            f64::from(pairwise_sum(&values) / values.len() as f32)
        }
        MissingPolicy::ZeroSubstituting { null_token } => {
            let values = slice
                .iter()
                .map(|t| {
                    let token = t.as_ref();
                    if token.trim() == null_token {
                        return Ok(0.0);
                    }
                    parse_token(token).map(|v| if v.is_nan() { 0.0 } else { v })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            pairwise_sum(&values) / values.len() as f64
        }
    };

    Ok(if mean.is_nan() {
        WindowedScore::Missing
    } else {
        WindowedScore::Value(mean)
    })
}

const LANES: usize = 8;
const PAIRWISE_BLOCK: usize = 128;

/// Blocked pairwise summation.
///
/// Fewer than eight values are added left to right. Up to 128 values are spread over
/// eight interleaved accumulators that are combined as a balanced tree, with the tail
/// added last. Longer inputs are split at a multiple of eight near the middle and summed
/// recursively. Rounding therefore depends on this exact order.
pub fn pairwise_sum<T>(values: &[T]) -> T
where
    T: Copy + Default + Add<Output = T>,
{
    let n = values.len();
    if n < LANES {
        return values.iter().fold(T::default(), |total, &v| total + v);
    }
    if n > PAIRWISE_BLOCK {
        let mut half = n / 2;
        half -= half % LANES;
        return pairwise_sum(&values[..half]) + pairwise_sum(&values[half..]);
    }

    let whole = n - n % LANES;
    let mut lanes = [T::default(); LANES];
    lanes.copy_from_slice(&values[..LANES]);
    for chunk in values[LANES..whole].chunks_exact(LANES) {
        for (lane, &v) in lanes.iter_mut().zip(chunk) {
            *lane = *lane + v;
        }
    }

    let mut total = ((lanes[0] + lanes[1]) + (lanes[2] + lanes[3]))
        + ((lanes[4] + lanes[5]) + (lanes[6] + lanes[7]));
    for &v in &values[whole..] {
        total = total + v;
    }
    total
}

fn parse_token(token: &str) -> Result<f64, ScoreParseError> {
    token.trim().parse::<f64>().map_err(|_| ScoreParseError {
        token: token.to_string(),
    })
}
