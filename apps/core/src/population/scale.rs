//! Linear scale with "nice" tick generation.
//!
//! Tick steps are 1, 2 or 5 times a power of ten, chosen so that roughly
//! `count` ticks cover the domain.

// Thresholds between step factors: sqrt(50), sqrt(10), sqrt(2)
const E10: f64 = 7.0710678118654755;
const E5: f64 = 3.1622776601683795;
const E2: f64 = 1.4142135623730951;

/// Maps a continuous domain onto a continuous output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value to the range. A zero-width domain maps to the range midpoint.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick values inside the domain, ascending.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (start, stop) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };

        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }

        let step = (stop - start) / count as f64;
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = if error >= E10 {
            10.0
        } else if error >= E5 {
            5.0
        } else if error >= E2 {
            2.0
        } else {
            1.0
        };

        // Negative powers divide by an integer increment to avoid 0.1 drift.
        if power < 0.0 {
            let inc = 10f64.powf(-power) / factor;
            let mut i1 = (start * inc).round();
            let mut i2 = (stop * inc).round();
            if i1 / inc < start {
                i1 += 1.0;
            }
            if i2 / inc > stop {
                i2 -= 1.0;
            }
            tick_indices(i1, i2).map(|i| i / inc).collect()
        } else {
            let inc = 10f64.powf(power) * factor;
            let mut i1 = (start / inc).round();
            let mut i2 = (stop / inc).round();
            if i1 * inc < start {
                i1 += 1.0;
            }
            if i2 * inc > stop {
                i2 -= 1.0;
            }
            tick_indices(i1, i2).map(|i| i * inc).collect()
        }
    }
}

fn tick_indices(i1: f64, i2: f64) -> impl Iterator<Item = f64> {
    let n = if i2 >= i1 { (i2 - i1) as usize + 1 } else { 0 };
    (0..n).map(move |k| i1 + k as f64)
}

/// Integer label with comma thousands separators, e.g. `7,950,946,801`.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
