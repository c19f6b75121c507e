//! Chart geometry: scales, stacked layouts, monotone path interpolation,
//! the document-density gradient, and bar placement. Pure math; the chart
//! components and the SVG exporter both render from these primitives.

pub const CHART_WIDTH: f64 = 960.0;
pub const CHART_HEIGHT: f64 = 500.0;

/// Fixed symmetric y-extent of the standardized view, in standard
/// deviations.
pub const MAX_STDDEV: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (position - r0) / (r1 - r0) * (d1 - d0)
    }
}

/// Year axis across the full chart width.
pub fn x_year_scale(year_range: (i32, i32)) -> LinearScale {
    LinearScale::new(
        (year_range.0 as f64, year_range.1 as f64),
        (0.0, CHART_WIDTH),
    )
}

/// Streaming y-axis: zero at the bottom, the shared stacked maximum on top.
pub fn y_scale_streaming(max_stacked: f64) -> LinearScale {
    let top = if max_stacked > 0.0 { max_stacked } else { 1.0 };
    LinearScale::new((0.0, top), (CHART_HEIGHT, 0.0))
}

/// Standardized y-axis: fixed symmetric z-score extent.
pub fn y_scale_standardized() -> LinearScale {
    LinearScale::new((-MAX_STDDEV, MAX_STDDEV), (CHART_HEIGHT, 0.0))
}

/// Evenly spaced positions for the categorical axis, inset 100px per side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointScale {
    pub count: usize,
}

impl PointScale {
    pub fn position(&self, index: usize) -> f64 {
        let (lo, hi) = (100.0, CHART_WIDTH - 100.0);
        if self.count < 2 {
            return (lo + hi) / 2.0;
        }
        lo + index as f64 * (hi - lo) / (self.count - 1) as f64
    }

    /// A third of the slot pitch, matching the classic grouped-bar look.
    pub fn bar_width(&self) -> f64 {
        (CHART_WIDTH - 200.0) / self.count.max(1) as f64 / 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StackedPoint {
    pub y0: f64,
    pub y: f64,
}

/// Silhouette-offset stack: each column floats so the band is centred
/// against the tallest column, keeping every baseline non-negative.
pub fn stack_silhouette(layers: &[Vec<f64>]) -> Vec<Vec<StackedPoint>> {
    let columns = layers.iter().map(|layer| layer.len()).max().unwrap_or(0);
    let mut totals = vec![0.0; columns];
    for layer in layers {
        for (column, value) in layer.iter().enumerate() {
            totals[column] += value;
        }
    }
    let tallest = totals.iter().copied().fold(0.0, f64::max);
    let baselines: Vec<f64> = totals.iter().map(|total| (tallest - total) / 2.0).collect();
    stack_onto(layers, &baselines)
}

/// Zero-baseline stack for categorical bars.
pub fn stack_zero(layers: &[Vec<f64>]) -> Vec<Vec<StackedPoint>> {
    let columns = layers.iter().map(|layer| layer.len()).max().unwrap_or(0);
    stack_onto(layers, &vec![0.0; columns])
}

fn stack_onto(layers: &[Vec<f64>], baselines: &[f64]) -> Vec<Vec<StackedPoint>> {
    let mut cursor = baselines.to_vec();
    layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .enumerate()
                .map(|(column, value)| {
                    let point = StackedPoint {
                        y0: cursor[column],
                        y: *value,
                    };
                    cursor[column] += value;
                    point
                })
                .collect()
        })
        .collect()
}

/// Largest stacked top across every layer and column.
pub fn stacked_max(stacked: &[Vec<StackedPoint>]) -> f64 {
    stacked
        .iter()
        .flatten()
        .map(|point| point.y0 + point.y)
        .fold(0.0, f64::max)
}

/// Monotone-cubic polyline (Fritsch–Carlson tangents), the interpolation
/// the time charts have always used: no overshoot between samples.
pub fn path_line_monotone(points: &[(f64, f64)]) -> String {
    match points.len() {
        0 => String::new(),
        1 => format!("M{:.2},{:.2}", points[0].0, points[0].1),
        _ => format!(
            "M{:.2},{:.2}{}",
            points[0].0,
            points[0].1,
            cubic_segments(points)
        ),
    }
}

/// Closed band between a top and bottom edge sampled at the same x
/// positions.
pub fn path_area_monotone(top: &[(f64, f64)], bottom: &[(f64, f64)]) -> String {
    if top.len() < 2 || top.len() != bottom.len() {
        return String::new();
    }
    let reversed: Vec<(f64, f64)> = bottom.iter().rev().copied().collect();
    format!(
        "M{:.2},{:.2}{}L{:.2},{:.2}{}Z",
        top[0].0,
        top[0].1,
        cubic_segments(top),
        reversed[0].0,
        reversed[0].1,
        cubic_segments(&reversed)
    )
}

fn cubic_segments(points: &[(f64, f64)]) -> String {
    let tangents = monotone_tangents(points);
    let mut path = String::new();
    for i in 0..points.len() - 1 {
        let (x0, y0) = points[i];
        let (x1, y1) = points[i + 1];
        let dx = x1 - x0;
        path.push_str(&format!(
            "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            x0 + dx / 3.0,
            y0 + tangents[i] * dx / 3.0,
            x1 - dx / 3.0,
            y1 - tangents[i + 1] * dx / 3.0,
            x1,
            y1
        ));
    }
    path
}

fn monotone_tangents(points: &[(f64, f64)]) -> Vec<f64> {
    let n = points.len();
    let mut slopes = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let dx = points[i + 1].0 - points[i].0;
        slopes.push(if dx == 0.0 {
            0.0
        } else {
            (points[i + 1].1 - points[i].1) / dx
        });
    }

    let mut tangents = vec![0.0; n];
    tangents[0] = slopes[0];
    tangents[n - 1] = slopes[n - 2];
    for i in 1..n - 1 {
        tangents[i] = if slopes[i - 1] * slopes[i] <= 0.0 {
            0.0
        } else {
            (slopes[i - 1] + slopes[i]) / 2.0
        };
    }

    // Clamp tangents so each segment stays monotone.
    for i in 0..n - 1 {
        if slopes[i] == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let a = tangents[i] / slopes[i];
        let b = tangents[i + 1] / slopes[i];
        let magnitude = a * a + b * b;
        if magnitude > 9.0 {
            let t = 3.0 / magnitude.sqrt();
            tangents[i] = t * a * slopes[i];
            tangents[i + 1] = t * b * slopes[i];
        }
    }

    tangents
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset_pct: f64,
    pub opacity: f64,
}

/// Stops for the document-density overlay: a white veil whose opacity
/// falls off logarithmically as the yearly document count rises, so sparse
/// stretches of the corpus read as washed out.
pub fn density_stops(doc_counts: &[(i32, usize)], year_range: (i32, i32)) -> Vec<GradientStop> {
    let (start, end) = year_range;
    if end <= start {
        return Vec::new();
    }

    let in_window: Vec<(i32, usize)> = doc_counts
        .iter()
        .copied()
        .filter(|(year, _)| *year >= start && *year < end)
        .collect();

    let floor_log = |count: usize| (count.max(1) as f64).ln();
    let lo = in_window
        .iter()
        .map(|(_, count)| floor_log(*count))
        .fold(f64::INFINITY, f64::min);
    let hi = in_window
        .iter()
        .map(|(_, count)| floor_log(*count))
        .fold(f64::NEG_INFINITY, f64::max);

    in_window
        .iter()
        .map(|(year, count)| {
            let opacity = if hi <= lo {
                0.5
            } else {
                (1.0 - (floor_log(*count) - lo) / (hi - lo)).clamp(0.0, 1.0)
            };
            GradientStop {
                offset_pct: 100.0 * (year - start) as f64 / (end - start) as f64,
                opacity,
            }
        })
        .collect()
}

/// Decade tick positions across a year range, endpoints included when they
/// land on the step.
pub fn year_ticks(year_range: (i32, i32), step: i32) -> Vec<i32> {
    let (start, end) = year_range;
    let step = step.max(1);
    let mut first = start - start.rem_euclid(step);
    if first < start {
        first += step;
    }
    (first..=end).step_by(step as usize).collect()
}

/// Round-valued ticks for a linear axis, 1/2/5-stepped.
pub fn linear_ticks(domain: (f64, f64), count: usize) -> Vec<f64> {
    let (lo, hi) = domain;
    let span = hi - lo;
    if span <= 0.0 || count == 0 {
        return Vec::new();
    }
    let raw_step = span / count as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let step = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    } * magnitude;

    let mut ticks = Vec::new();
    let mut tick = (lo / step).ceil() * step;
    while tick <= hi + step * 1e-9 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}
