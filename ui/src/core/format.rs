//! Formatting helpers for chart annotations.

pub fn format_z(value: f64) -> String {
    format!("{value:+.2}")
}

pub fn format_score(value: f64) -> String {
    format!("{value:.2}")
}
