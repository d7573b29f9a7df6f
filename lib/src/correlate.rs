//! Pearson correlation between features.
use crate::{
    derive::DerivedRequest,
    error::ConfigError,
    feature::Feature,
    table::{Correlation, CorrelationMatrix, CorrelationVector},
    Result,
};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// What to do with a feature that is missing for a row.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValues {
    /// Read missing values as `0.`, so every row takes part.
    #[default]
    ZeroFill,
    /// For each pair of features, use only the rows where both are present.
    PairwiseComplete,
}

/// Correlate every pair of `features`, or each of `features` against `target`.
///
/// Missing values are read as zero. See `correlate_with` for the other policy.
pub fn correlate(
    rows: &[DerivedRequest],
    features: &[Feature],
    target: Option<Feature>,
) -> Result<Correlation> {
    correlate_with(rows, features, target, MissingValues::ZeroFill)
}

/// Correlate with an explicit policy for missing values.
///
/// With a target, the result is one coefficient per feature other than the target itself.
/// Without one it is the full symmetric matrix. Constant features and empty inputs give NaN.
pub fn correlate_with(
    rows: &[DerivedRequest],
    features: &[Feature],
    target: Option<Feature>,
    missing: MissingValues,
) -> Result<Correlation> {
    if features.is_empty() {
        bail!(ConfigError::NoFeatures);
    }
    event!(
        Level::DEBUG,
        "correlating {} features over {} rows ({:?})",
        features.len(),
        rows.len(),
        missing
    );
    let column = |feature: Feature| -> Vec<Option<f64>> {
        rows.iter()
            .map(|row| match missing {
                MissingValues::ZeroFill => Some(feature.value_or_zero(row)),
                MissingValues::PairwiseComplete => feature.value(row),
            })
            .collect()
    };

    Ok(match target {
        Some(target) => {
            let target_col = column(target);
            let entries = features
                .iter()
                .copied()
                .filter(|feature| *feature != target)
                .map(|feature| (feature, pearson_complete(&column(feature), &target_col)))
                .collect();
            Correlation::Vector(CorrelationVector { target, entries })
        }
        None => {
            let columns: Vec<_> = features.iter().map(|f| column(*f)).collect();
            let n = features.len();
            let mut values = vec![vec![f64::NAN; n]; n];
            for i in 0..n {
                values[i][i] = self_correlation(&columns[i]);
                for j in (i + 1)..n {
                    let r = pearson_complete(&columns[i], &columns[j]);
                    values[i][j] = r;
                    values[j][i] = r;
                }
            }
            Correlation::Matrix(CorrelationMatrix {
                features: features.to_vec(),
                values,
            })
        }
    })
}

/// Pearson correlation over the positions where both values are present.
fn pearson_complete(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    pearson(&xs, &ys)
}

/// `1.` unless the feature is constant (or has fewer than 2 values), in which case NaN.
fn self_correlation(xs: &[Option<f64>]) -> f64 {
    let xs: Vec<f64> = xs.iter().flatten().copied().collect();
    if has_variance(&xs) {
        1.
    } else {
        f64::NAN
    }
}

fn has_variance(xs: &[f64]) -> bool {
    match xs.first() {
        Some(first) => xs.iter().any(|x| x != first),
        None => false,
    }
}

/// Pearson correlation coefficient of two equal length samples.
///
/// NaN when there are fewer than two samples or either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 || !has_variance(xs) || !has_variance(ys) {
        return f64::NAN;
    }
    let mean_x = xs.mean();
    let mean_y = ys.mean();
    let (mut cov, mut var_x, mut var_y) = (0., 0., 0.);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0. {
        return f64::NAN;
    }
    (cov / denom).clamp(-1., 1.)
}
