//! Random rating generation used to seed and reset the matrix.
//!
//! The product deliberately over-weights "no opinion": one weight goes to
//! [`UNRATED`], and the remaining mass is split evenly over ratings 1-10.

use crate::error::{RatingError, Result};
use crate::types::{MAX_RATING, RatingValue, UNRATED};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

/// Weight given to "unrated" when nothing else is configured
pub const DEFAULT_UNRATED_WEIGHT: f64 = 0.3;

/// Categorical distribution over `0..=10`
#[derive(Debug, Clone)]
pub struct RatingDistribution {
    unrated_weight: f64,
    index: WeightedIndex<f64>,
}

impl RatingDistribution {
    /// Build a distribution with `unrated_weight` on [`UNRATED`].
    ///
    /// `unrated_weight` must lie in `[0, 1)` so every rating 1-10 keeps a
    /// non-zero share.
    pub fn new(unrated_weight: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&unrated_weight) {
            return Err(RatingError::InvalidDistribution(format!(
                "unrated weight must be in [0, 1), got {}",
                unrated_weight
            )));
        }

        let per_rating = (1.0 - unrated_weight) / MAX_RATING as f64;
        let weights: Vec<f64> = std::iter::once(unrated_weight)
            .chain(std::iter::repeat_n(per_rating, MAX_RATING as usize))
            .collect();

        let index = WeightedIndex::new(&weights)
            .map_err(|e| RatingError::InvalidDistribution(e.to_string()))?;

        Ok(Self {
            unrated_weight,
            index,
        })
    }

    pub fn unrated_weight(&self) -> f64 {
        self.unrated_weight
    }

    /// Draw one rating
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RatingValue {
        // Index 0 is UNRATED, index k is rating k
        self.index.sample(rng) as RatingValue
    }

    /// Fill a row: the first `mapped` cells are drawn, the rest are unrated
    pub fn fill_row<R: Rng + ?Sized>(&self, row: &mut [RatingValue], mapped: usize, rng: &mut R) {
        for (index, cell) in row.iter_mut().enumerate() {
            *cell = if index < mapped {
                self.sample(rng)
            } else {
                UNRATED
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_rejects_invalid_weights() {
        assert!(RatingDistribution::new(-0.1).is_err());
        assert!(RatingDistribution::new(1.0).is_err());
        assert!(RatingDistribution::new(f64::NAN).is_err());
        assert!(RatingDistribution::new(0.0).is_ok());
    }

    #[test]
    fn test_samples_stay_in_range() {
        let distribution = RatingDistribution::new(DEFAULT_UNRATED_WEIGHT).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10_000 {
            assert!(distribution.sample(&mut rng) <= MAX_RATING);
        }
    }

    #[test]
    fn test_unrated_share_matches_weight() {
        let distribution = RatingDistribution::new(0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let draws = 20_000;
        let unrated = (0..draws)
            .filter(|_| distribution.sample(&mut rng) == UNRATED)
            .count();
        let share = unrated as f64 / draws as f64;

        // 0.3 expected; generous tolerance for a seeded run
        assert!((share - 0.3).abs() < 0.03, "unrated share was {}", share);
    }

    #[test]
    fn test_zero_weight_never_draws_unrated() {
        let distribution = RatingDistribution::new(0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| distribution.sample(&mut rng) != UNRATED));
    }

    #[test]
    fn test_fill_row_leaves_unmapped_columns_unrated() {
        let distribution = RatingDistribution::new(0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut row = vec![9; 6];

        distribution.fill_row(&mut row, 4, &mut rng);

        assert!(row[..4].iter().all(|&v| v != UNRATED));
        assert_eq!(&row[4..], &[UNRATED, UNRATED]);
    }
}
