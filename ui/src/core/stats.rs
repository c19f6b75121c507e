//! Descriptive statistics for series shaping: moving-window smoothing and
//! per-topic moments.

use serde::{Deserialize, Serialize};

/// Moving-window filter applied to streaming-mode series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Smoothing {
    Off,
    #[default]
    Mean,
    Median,
}

/// Corpus-wide mean and sample standard deviation for one topic's
/// normalized yearly share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub stdev: f64,
}

/// Symmetric moving window over `values`. Window slots that fall outside the
/// series replicate the window's centre sample, so the window never shrinks
/// at the boundaries. A half-width of 0 is the identity transform.
pub fn smooth(values: &[f64], half_width: usize, method: Smoothing) -> Vec<f64> {
    if method == Smoothing::Off || half_width == 0 || values.is_empty() {
        return values.to_vec();
    }

    let n = values.len() as isize;
    let half = half_width as isize;
    let mut smoothed = Vec::with_capacity(values.len());
    let mut window = Vec::with_capacity(half_width * 2 + 1);

    for j in 0..n {
        window.clear();
        for k in -half..=half {
            let idx = j + k;
            if idx >= 0 && idx < n {
                window.push(values[idx as usize]);
            } else {
                window.push(values[j as usize]);
            }
        }
        let value = match method {
            Smoothing::Mean => mean(&window),
            Smoothing::Median => median(&mut window),
            Smoothing::Off => unreachable!(),
        };
        smoothed.push(value);
    }

    smoothed
}

/// Mean and Bessel-corrected standard deviation. Fewer than two samples
/// yield NaN moments; callers guard before standardizing.
pub fn moments(values: &[f64]) -> Moments {
    if values.len() < 2 {
        return Moments {
            mean: if values.len() == 1 {
                values[0]
            } else {
                f64::NAN
            },
            stdev: f64::NAN,
        };
    }

    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() as f64 - 1.0);

    Moments {
        mean,
        stdev: variance.sqrt(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an unsorted window; an even count averages the middle pair.
fn median(window: &mut [f64]) -> f64 {
    if window.is_empty() {
        return f64::NAN;
    }
    window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = window.len() / 2;
    if window.len() % 2 == 1 {
        window[mid]
    } else {
        (window[mid - 1] + window[mid]) / 2.0
    }
}
