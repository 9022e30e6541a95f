//! Pearson correlation between two users' rating vectors.
//!
//! By default the coefficient is taken over every column, unrated zeros
//! included. That rewards users with similar sparsity patterns as much as
//! similar taste; `ZeroAsMissing` restricts the computation to columns both
//! users actually rated.

use ratings::{RatingValue, UNRATED};

/// Which columns take part in the correlation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorrelationMode {
    /// Every column, with `0` treated as a genuine value
    #[default]
    IncludeUnrated,
    /// Only columns where both users have a rating
    ZeroAsMissing,
}

/// Pearson coefficient of `a` and `b`.
///
/// Returns `None` when the coefficient is undefined: fewer than two paired
/// values, or zero variance on either side.
pub fn pearson(a: &[RatingValue], b: &[RatingValue], mode: CorrelationMode) -> Option<f64> {
    debug_assert_eq!(a.len(), b.len());

    match mode {
        CorrelationMode::IncludeUnrated => coefficient(a.iter().copied().zip(b.iter().copied())),
        CorrelationMode::ZeroAsMissing => coefficient(
            a.iter()
                .copied()
                .zip(b.iter().copied())
                .filter(|&(x, y)| x != UNRATED && y != UNRATED),
        ),
    }
}

fn coefficient<I>(pairs: I) -> Option<f64>
where
    I: Iterator<Item = (RatingValue, RatingValue)> + Clone,
{
    let (n, sum_x, sum_y) = pairs
        .clone()
        .fold((0usize, 0.0f64, 0.0f64), |(n, sx, sy), (x, y)| {
            (n + 1, sx + x as f64, sy + y as f64)
        });

    if n < 2 {
        return None;
    }

    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    let (cov, var_x, var_y) = pairs.fold((0.0f64, 0.0f64, 0.0f64), |(c, vx, vy), (x, y)| {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        (c + dx * dy, vx + dx * dx, vy + dy * dy)
    });

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}
