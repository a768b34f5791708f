use super::{MissingPolicy, ScoreParseError, Window, window_mean};
use crate::core::models::score::WindowedScore;

/// Token marking a base without a conservation score.
pub const MISSING_TOKEN: &str = "NA";

const POLICY: MissingPolicy = MissingPolicy::Contaminating {
    missing_token: MISSING_TOKEN,
};

const SEED_LEN: usize = 8;
const SUP_LEN: usize = 12;
const FLANK_LEN: usize = 30;

/// Column suffixes, in the order the regions are written.
pub const REGION_SUFFIXES: [&str; 4] = ["seed", "sup", "3", "5"];

/// The four conservation regions around one binding site.
///
/// `binding_site_pos` is 1-based and points one base into the 6mer match, so the 8-base
/// seed starts two bases before it. The 3' flank shares its start with the supplementary
/// region and extends past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConservationRegions {
    pub seed: Window,
    pub sup: Window,
    pub three_prime: Window,
    pub five_prime: Window,
}

impl ConservationRegions {
    pub fn around(binding_site_pos: i64) -> Self {
        let seed_start = binding_site_pos - 2;
        let sup_start = binding_site_pos + 9;
        Self {
            seed: Window::new(seed_start, SEED_LEN),
            sup: Window::new(sup_start, SUP_LEN),
            three_prime: Window::new(sup_start, FLANK_LEN),
            five_prime: Window::new(seed_start - 1 - FLANK_LEN as i64, FLANK_LEN),
        }
    }
}

/// Conservation means for one candidate row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationScores {
    pub seed: WindowedScore,
    pub sup: WindowedScore,
    pub three_prime: WindowedScore,
    pub five_prime: WindowedScore,
}

impl Default for ConservationScores {
    // Rows no track line covers keep a literal zero, not a missing marker.
    fn default() -> Self {
        Self {
            seed: WindowedScore::zero(),
            sup: WindowedScore::zero(),
            three_prime: WindowedScore::zero(),
            five_prime: WindowedScore::zero(),
        }
    }
}

impl ConservationScores {
    /// Values in [`REGION_SUFFIXES`] order.
    pub fn as_array(&self) -> [WindowedScore; 4] {
        [self.seed, self.sup, self.three_prime, self.five_prime]
    }
}

pub fn score_site<S: AsRef<str>>(
    binding_site_pos: i64,
    scores: &[S],
) -> Result<ConservationScores, ScoreParseError> {
    let regions = ConservationRegions::around(binding_site_pos);
    Ok(ConservationScores {
        seed: window_mean(scores, regions.seed, POLICY)?,
        sup: window_mean(scores, regions.sup, POLICY)?,
        three_prime: window_mean(scores, regions.three_prime, POLICY)?,
        five_prime: window_mean(scores, regions.five_prime, POLICY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_fifty() -> Vec<String> {
        (1..=50).map(|v| v.to_string()).collect()
    }

    #[test]
    fn regions_match_documented_offsets() {
        let regions = ConservationRegions::around(10);
        assert_eq!(regions.seed.clip(50), 8..16);
        assert_eq!(regions.sup.clip(50), 19..31);
        assert_eq!(regions.three_prime.clip(50), 19..49);
        assert_eq!(regions.five_prime, Window::new(-23, 30));
        assert_eq!(regions.five_prime.clip(50), 0..7);
    }

    #[test]
    fn score_site_averages_each_region() {
        let scores = score_site(10, &one_to_fifty()).unwrap();
        assert_eq!(scores.seed, WindowedScore::Value(12.5));
        assert_eq!(scores.sup, WindowedScore::Value(25.5));
        assert_eq!(scores.three_prime, WindowedScore::Value(34.5));
        assert_eq!(scores.five_prime, WindowedScore::Value(4.0));
    }

    #[test]
    fn missing_token_contaminates_only_its_region() {
        let mut scores = one_to_fifty();
        scores[10] = MISSING_TOKEN.to_string();

        let result = score_site(10, &scores).unwrap();
        assert_eq!(result.seed, WindowedScore::Missing);
        assert_eq!(result.sup, WindowedScore::Value(25.5));
        assert_eq!(result.five_prime, WindowedScore::Value(4.0));
    }

    #[test]
    fn window_past_sequence_end_is_missing() {
        let scores = score_site(60, &one_to_fifty()).unwrap();
        assert_eq!(scores.seed, WindowedScore::Missing);
        assert_eq!(scores.sup, WindowedScore::Missing);
        assert_eq!(scores.three_prime, WindowedScore::Missing);
        assert_eq!(scores.five_prime, WindowedScore::Value(39.0));
    }

    #[test]
    fn default_scores_are_zero_not_missing() {
        let defaults = ConservationScores::default();
        assert!(
            defaults
                .as_array()
                .iter()
                .all(|s| *s == WindowedScore::Value(0.0))
        );
    }
}
