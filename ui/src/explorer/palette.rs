//! Ordinal color assignment for topics.
//!
//! The default scale indexes a ten-color palette by topic id. When two
//! active topics collide on a color, the scale re-domains over the active
//! set, widening to twenty colors past ten active topics.

use crate::core::dataset::TopicId;

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Fill for inactive legend entries and unhighlighted document links.
pub const INACTIVE_COLOR: &str = "#666666";

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: &'static [&'static str],
    domain: Option<Vec<TopicId>>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: &CATEGORY10,
            domain: None,
        }
    }
}

impl Palette {
    /// Choose a scale for the current active set, re-domaining only when
    /// the default assignment collides.
    pub fn assign(active: &[TopicId]) -> Self {
        let default = Self::default();
        let mut assigned: Vec<&str> = active.iter().map(|topic| default.color(*topic)).collect();
        assigned.sort_unstable();
        let collides = assigned.windows(2).any(|pair| pair[0] == pair[1]);
        if !collides {
            return default;
        }

        Self {
            colors: if active.len() <= CATEGORY10.len() {
                &CATEGORY10
            } else {
                &CATEGORY20
            },
            domain: Some(active.to_vec()),
        }
    }

    pub fn color(&self, topic: TopicId) -> &'static str {
        let slot = match &self.domain {
            None => topic,
            Some(domain) => domain
                .iter()
                .position(|candidate| *candidate == topic)
                .unwrap_or(topic),
        };
        self.colors[slot % self.colors.len()]
    }
}
