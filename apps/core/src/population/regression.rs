//! Ordinary least-squares line fit and projection.

use serde::{Deserialize, Serialize};

use super::dataset::Observation;
use crate::error::AppError;

/// `population = slope * year + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination of the fit on its input points
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit a line through `(x, y)` points.
    ///
    /// Needs at least two points with distinct `x`. Sums are taken around the
    /// means so large `x` (calendar years) and `y` (billions) keep precision.
    pub fn fit(points: &[(f64, f64)]) -> Result<Self, AppError> {
        if points.len() < 2 {
            return Err(AppError::Validation(format!(
                "linear fit needs at least 2 points, got {}",
                points.len()
            )));
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });
        if sxx == 0.0 {
            return Err(AppError::Validation(
                "linear fit needs at least two distinct x values".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = points
            .iter()
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Fit year → population.
    pub fn fit_observations(observations: &[Observation]) -> Result<Self, AppError> {
        let points: Vec<(f64, f64)> = observations
            .iter()
            .map(|o| (o.year as f64, o.population))
            .collect();
        Self::fit(&points)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Points on the line at each observed year
    pub fn fitted(&self, observations: &[Observation]) -> Vec<(f64, f64)> {
        observations
            .iter()
            .map(|o| {
                let x = o.year as f64;
                (x, self.predict(x))
            })
            .collect()
    }
}

/// Extrapolated value for a future year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub year: i32,
    /// Rounded to the nearest whole person
    pub population: f64,
}

/// Project `years` consecutive years following `last_year`.
///
/// Fails when the last projected year does not fit in an `i32`.
pub fn project(fit: &LinearFit, last_year: i32, years: u32) -> Result<Vec<Projection>, AppError> {
    let span = i32::try_from(years)
        .ok()
        .filter(|span| last_year.checked_add(*span).is_some())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "cannot project {} years past {}: year out of range",
                years, last_year
            ))
        })?;

    Ok((1..=span)
        .map(|offset| {
            let year = last_year + offset;
            Projection {
                year,
                population: fit.predict(year as f64).round(),
            }
        })
        .collect())
}
