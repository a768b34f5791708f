use super::{MissingPolicy, ScoreParseError, Window, window_mean};
use crate::core::models::score::WindowedScore;

/// Token marking a base without a reactivity measurement.
pub const NULL_TOKEN: &str = "NULL";

const POLICY: MissingPolicy = MissingPolicy::ZeroSubstituting {
    null_token: NULL_TOKEN,
};

const SEED_LEN: usize = 8;
const SUP_LEN: usize = 12;

/// Seed and supplementary windows over a full-length reactivity read.
///
/// Candidate positions are relative to the 3' UTR while reads start at the transcript's
/// 5' end, so both windows are shifted by `read_length - utr_length`. Unlike the
/// conservation regions, the supplementary window starts right where the seed ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRegions {
    pub seed: Window,
    pub sup: Window,
}

impl ShapeRegions {
    pub fn around(binding_site_pos: i64, utr_length: i64, read_length: i64) -> Self {
        let utr_offset = read_length - utr_length;
        let seed = Window::new(utr_offset + binding_site_pos - 2, SEED_LEN);
        Self {
            seed,
            sup: Window::new(seed.end(), SUP_LEN),
        }
    }
}

/// Reactivity means for one candidate row from one source. Missing until scored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeScores {
    pub seed: WindowedScore,
    pub sup: WindowedScore,
}

impl ShapeScores {
    /// Takes every non-missing value of `other`; missing values never overwrite.
    pub fn merge(&mut self, other: ShapeScores) {
        if !other.seed.is_missing() {
            self.seed = other.seed;
        }
        if !other.sup.is_missing() {
            self.sup = other.sup;
        }
    }
}

pub fn score_site<S: AsRef<str>>(
    regions: ShapeRegions,
    scores: &[S],
) -> Result<ShapeScores, ScoreParseError> {
    Ok(ShapeScores {
        seed: window_mean(scores, regions.seed, POLICY)?,
        sup: window_mean(scores, regions.sup, POLICY)?,
    })
}
