//! Word-cloud layout for a topic's full word distribution.
//!
//! Font sizes follow a log scale over word probabilities; placement is a
//! greedy row packing inside a fixed box, heaviest words first, so the
//! same distribution always lays out the same way.

use crate::core::dataset::TopicWord;

pub const CLOUD_WIDTH: f64 = 300.0;
pub const CLOUD_HEIGHT: f64 = 150.0;

/// Horizontal pitch between side-by-side clouds.
pub const CLOUD_PITCH: f64 = 310.0;

const FONT_MIN: f64 = 8.0;
const FONT_MAX: f64 = 32.0;
const PADDING: f64 = 5.0;

/// Average glyph advance as a fraction of font size; wide enough that the
/// estimated boxes never underrun real text.
const GLYPH_ASPECT: f64 = 0.62;

#[derive(Debug, Clone, PartialEq)]
pub struct CloudWord {
    pub text: String,
    pub size: f64,
    /// Left edge of the word box.
    pub x: f64,
    /// Text baseline.
    pub y: f64,
}

impl CloudWord {
    pub fn width(&self) -> f64 {
        self.text.chars().count() as f64 * self.size * GLYPH_ASPECT
    }
}

pub fn font_size(prob: f64, extent: (f64, f64)) -> f64 {
    let (lo, hi) = extent;
    if !(prob > 0.0) || !(lo > 0.0) || hi <= lo {
        return (FONT_MIN + FONT_MAX) / 2.0;
    }
    let t = (prob.ln() - lo.ln()) / (hi.ln() - lo.ln());
    FONT_MIN + t.clamp(0.0, 1.0) * (FONT_MAX - FONT_MIN)
}

/// Pack words into the cloud box. Words that no longer fit are dropped,
/// exactly as an overfull cloud has always shed its tail.
pub fn layout_words(words: &[TopicWord]) -> Vec<CloudWord> {
    if words.is_empty() {
        return Vec::new();
    }

    let lo = words.iter().map(|word| word.prob).fold(f64::INFINITY, f64::min);
    let hi = words
        .iter()
        .map(|word| word.prob)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut ordered: Vec<&TopicWord> = words.iter().collect();
    ordered.sort_by(|a, b| {
        b.prob
            .partial_cmp(&a.prob)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut placed = Vec::new();
    let mut cursor_x = PADDING;
    let mut row_top = PADDING;
    let mut row_height: f64 = 0.0;

    for word in ordered {
        let candidate = CloudWord {
            text: word.text.clone(),
            size: font_size(word.prob, (lo, hi)),
            x: cursor_x,
            y: 0.0,
        };
        let width = candidate.width();

        let mut x = cursor_x;
        let mut top = row_top;
        if x + width > CLOUD_WIDTH - PADDING && x > PADDING {
            top = row_top + row_height + PADDING;
            x = PADDING;
        }
        if top + candidate.size > CLOUD_HEIGHT - PADDING {
            break;
        }

        if top != row_top {
            row_top = top;
            row_height = 0.0;
        }
        row_height = row_height.max(candidate.size);
        cursor_x = x + width + PADDING;

        placed.push(CloudWord {
            x,
            y: top + candidate.size,
            ..candidate
        });
    }

    placed
}
