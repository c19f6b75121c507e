//! Explorer view state: the single mutable structure every interaction
//! mutates and every aggregation pass reads. Passed explicitly; there are
//! no ambient globals.

use std::collections::BTreeMap;

use super::dataset::{Corpus, TopicId};
use super::stats::Smoothing;

/// The three chart modes, cycled round-robin by the toggle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Streaming,
    Standardized,
    Categorical,
}

impl ViewMode {
    pub fn code(self) -> u8 {
        match self {
            ViewMode::Streaming => 0,
            ViewMode::Standardized => 1,
            ViewMode::Categorical => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ViewMode::Streaming),
            1 => Some(ViewMode::Standardized),
            2 => Some(ViewMode::Categorical),
            _ => None,
        }
    }

    fn next(self) -> Self {
        match self {
            ViewMode::Streaming => ViewMode::Standardized,
            ViewMode::Standardized => ViewMode::Categorical,
            ViewMode::Categorical => ViewMode::Streaming,
        }
    }
}

/// Ranking metric for the sort-by commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMetric {
    Coherence,
    Prevalence,
    Variance,
}

/// One search lane: an independent filter context compared side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneState {
    pub query: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupTarget {
    Year(i32),
    Category(String),
}

/// Categorical mode is skipped when the corpus has more distinct categories
/// than this; a usability guard, not a correctness rule.
pub const MAX_CATEGORICAL_CATEGORIES: usize = 50;

/// How many extra topics one "show more" activates.
pub const SHOW_MORE_STEP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Inclusive year filter; `None` means the corpus' full range.
    pub year_range: Option<(i32, i32)>,
    /// Raw text of the time field, kept verbatim for redisplay and sharing.
    pub time_query: String,
    /// Activation flag per labelled topic, in topic-index order.
    pub topics: BTreeMap<TopicId, bool>,
    /// Ranking from the most recent sort command; legend order and
    /// "show more" follow it when present.
    pub sorted_order: Option<Vec<TopicId>>,
    pub lanes: Vec<LaneState>,
    pub show_legend: bool,
    pub popup: Option<PopupTarget>,
    pub smoothing: Smoothing,
    pub window_half_width: usize,
    pub open_clouds: Vec<TopicId>,
}

impl ViewState {
    pub fn new(corpus: &Corpus) -> Self {
        let topics = corpus.labels.keys().map(|topic| (*topic, true)).collect();
        Self {
            mode: ViewMode::Streaming,
            year_range: None,
            time_query: String::new(),
            topics,
            sorted_order: None,
            lanes: vec![LaneState {
                query: String::new(),
                active: true,
            }],
            show_legend: true,
            popup: None,
            smoothing: Smoothing::default(),
            window_half_width: 4,
            open_clouds: Vec::new(),
        }
    }

    pub fn is_active(&self, topic: TopicId) -> bool {
        self.topics.get(&topic).copied().unwrap_or(false)
    }

    /// Active topics in legend order: sorted ranking when one exists,
    /// topic-index order otherwise.
    pub fn active_topics(&self) -> Vec<TopicId> {
        self.ordered_topics()
            .into_iter()
            .filter(|topic| self.is_active(*topic))
            .collect()
    }

    pub fn inactive_topics(&self) -> Vec<TopicId> {
        self.ordered_topics()
            .into_iter()
            .filter(|topic| !self.is_active(*topic))
            .collect()
    }

    fn ordered_topics(&self) -> Vec<TopicId> {
        match &self.sorted_order {
            Some(order) => order.clone(),
            None => self.topics.keys().copied().collect(),
        }
    }

    /// Advance the mode toggle one step.
    pub fn advance_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Applied before every recompute: categorical mode falls back to
    /// streaming when the category axis would be unreadable.
    pub fn normalize_mode(&mut self, distinct_categories: usize) {
        if self.mode == ViewMode::Categorical && distinct_categories > MAX_CATEGORICAL_CATEGORIES {
            self.mode = ViewMode::Streaming;
        }
    }

    /// Flip one topic; deactivating also closes its word cloud.
    pub fn toggle_topic(&mut self, topic: TopicId) {
        if let Some(active) = self.topics.get_mut(&topic) {
            *active = !*active;
            if !*active {
                self.open_clouds.retain(|open| *open != topic);
            }
        }
    }

    pub fn toggle_cloud(&mut self, topic: TopicId) {
        if let Some(position) = self.open_clouds.iter().position(|open| *open == topic) {
            self.open_clouds.remove(position);
        } else {
            self.open_clouds.push(topic);
        }
    }

    /// Activate up to five more topics, highest-ranked inactive first.
    pub fn show_more(&mut self) {
        let candidates: Vec<TopicId> = self
            .ordered_topics()
            .into_iter()
            .filter(|topic| !self.is_active(*topic))
            .take(SHOW_MORE_STEP)
            .collect();
        for topic in candidates {
            if let Some(active) = self.topics.get_mut(&topic) {
                *active = true;
            }
        }
    }

    /// Rank all topics by `metric`, activate the top `n`, deactivate the
    /// rest, and remember the ranking. Sorting is stable, so ties keep
    /// topic-index order.
    pub fn select_top(&mut self, n: usize, metric: SortMetric, corpus: &Corpus, peaks: &[f64]) {
        let ranked = rank_topics(metric, &self.topic_ids(), corpus, peaks);
        for (position, topic) in ranked.iter().enumerate() {
            if let Some(active) = self.topics.get_mut(topic) {
                *active = position < n;
            }
        }
        for (topic, active) in self.topics.iter_mut() {
            if !ranked.contains(topic) {
                *active = false;
            }
        }
        self.open_clouds.retain(|topic| {
            ranked
                .iter()
                .position(|ranked_topic| ranked_topic == topic)
                .map(|position| position < n)
                .unwrap_or(false)
        });
        self.sorted_order = Some(ranked);
    }

    fn topic_ids(&self) -> Vec<TopicId> {
        self.topics.keys().copied().collect()
    }

    pub fn add_lane(&mut self) {
        self.lanes.push(LaneState {
            query: String::new(),
            active: true,
        });
    }

    /// Re-derive lane activation from the current query strings. When at
    /// least one lane carries a query, query-less lanes drop out of the
    /// comparison instead of defaulting to wildcard. When every lane is
    /// query-less, they are all active wildcards.
    pub fn apply_lane_activation(&mut self) {
        let queried = self
            .lanes
            .iter()
            .filter(|lane| !lane.query.trim().is_empty())
            .count();
        for lane in &mut self.lanes {
            lane.active = queried == 0 || !lane.query.trim().is_empty();
        }
    }

    /// Parse the time field. `"1890-1910"` filters inclusively; anything
    /// unparseable (or empty) resets to the full range.
    pub fn set_time_query(&mut self, text: &str) {
        self.time_query = text.to_string();
        self.year_range = parse_year_range(text);
    }
}

fn parse_year_range(text: &str) -> Option<(i32, i32)> {
    let (start, end) = text.trim().split_once('-')?;
    let start = start.trim().parse::<i32>().ok()?;
    let end = end.trim().parse::<i32>().ok()?;
    Some((start, end))
}

/// Stable descending ranking of `topics` by the chosen metric.
///
/// Coherence treats a zero score as "unscored" and sorts it after every
/// scored topic. Prevalence is the stored corpus-wide mean share. Variance
/// ranks by the topic's peak value in the first-pass summed series, the
/// same proxy the sort command has always used.
pub fn rank_topics(
    metric: SortMetric,
    topics: &[TopicId],
    corpus: &Corpus,
    peaks: &[f64],
) -> Vec<TopicId> {
    let mut ranked: Vec<TopicId> = topics.to_vec();
    match metric {
        SortMetric::Coherence => {
            ranked.sort_by(|a, b| {
                let (ca, cb) = (
                    corpus.coherence.get(*a).copied().unwrap_or(0.0),
                    corpus.coherence.get(*b).copied().unwrap_or(0.0),
                );
                match (ca != 0.0, cb != 0.0) {
                    (true, true) => cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal),
                    (true, false) => std::cmp::Ordering::Less,
                    (false, true) => std::cmp::Ordering::Greater,
                    (false, false) => std::cmp::Ordering::Equal,
                }
            });
        }
        SortMetric::Prevalence => {
            ranked.sort_by(|a, b| {
                let (pa, pb) = (
                    corpus.moments.get(*a).map(|m| m.mean).unwrap_or(f64::NAN),
                    corpus.moments.get(*b).map(|m| m.mean).unwrap_or(f64::NAN),
                );
                pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        SortMetric::Variance => {
            ranked.sort_by(|a, b| {
                let (pa, pb) = (
                    peaks.get(*a).copied().unwrap_or(f64::NAN),
                    peaks.get(*b).copied().unwrap_or(f64::NAN),
                );
                pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset;

    fn state() -> (dataset::Corpus, ViewState) {
        let corpus = dataset::demo();
        let state = ViewState::new(&corpus);
        (corpus, state)
    }

    #[test]
    fn mode_cycles_round_robin() {
        let (_, mut view) = state();
        view.advance_mode();
        assert_eq!(view.mode, ViewMode::Standardized);
        view.advance_mode();
        assert_eq!(view.mode, ViewMode::Categorical);
        view.advance_mode();
        assert_eq!(view.mode, ViewMode::Streaming);
    }

    #[test]
    fn categorical_falls_back_when_categories_overflow() {
        let (_, mut view) = state();
        view.mode = ViewMode::Categorical;
        view.normalize_mode(60);
        assert_eq!(view.mode, ViewMode::Streaming);

        view.mode = ViewMode::Categorical;
        view.normalize_mode(3);
        assert_eq!(view.mode, ViewMode::Categorical);
    }

    #[test]
    fn toggling_off_closes_the_word_cloud() {
        let (_, mut view) = state();
        view.toggle_cloud(2);
        assert_eq!(view.open_clouds, vec![2]);
        view.toggle_topic(2);
        assert!(!view.is_active(2));
        assert!(view.open_clouds.is_empty());
    }

    #[test]
    fn select_top_by_prevalence_picks_highest_means() {
        let (corpus, mut view) = state();
        view.select_top(2, SortMetric::Prevalence, &corpus, &[]);

        let mut expected: Vec<TopicId> = corpus.labels.keys().copied().collect();
        expected.sort_by(|a, b| {
            corpus.moments[*b]
                .mean
                .partial_cmp(&corpus.moments[*a].mean)
                .unwrap()
        });
        assert_eq!(view.active_topics(), expected[..2].to_vec());
        assert_eq!(view.inactive_topics().len(), corpus.labels.len() - 2);
    }

    #[test]
    fn prevalence_ties_keep_index_order() {
        let (corpus, _) = state();
        // All-equal peaks: variance ranking must leave index order intact.
        let peaks = vec![1.0; corpus.topic_count()];
        let topics: Vec<TopicId> = corpus.labels.keys().copied().collect();
        let ranked = rank_topics(SortMetric::Variance, &topics, &corpus, &peaks);
        assert_eq!(ranked, topics);
    }

    #[test]
    fn coherence_sort_places_unscored_topics_last() {
        let (corpus, mut view) = state();
        view.select_top(3, SortMetric::Coherence, &corpus, &[]);
        let order = view.sorted_order.clone().unwrap();
        // Topic 5 has coherence 0.0 in the demo corpus.
        assert_eq!(*order.last().unwrap(), 5);
    }

    #[test]
    fn show_more_activates_next_ranked_five() {
        let (corpus, mut view) = state();
        view.select_top(1, SortMetric::Prevalence, &corpus, &[]);
        assert_eq!(view.active_topics().len(), 1);
        view.show_more();
        assert_eq!(view.active_topics().len(), 6.min(1 + SHOW_MORE_STEP));
    }

    #[test]
    fn lane_activation_asymmetry() {
        let (_, mut view) = state();
        view.add_lane();
        view.lanes[1].query = "strike".to_string();
        view.apply_lane_activation();
        assert!(!view.lanes[0].active);
        assert!(view.lanes[1].active);

        view.lanes[1].query.clear();
        view.apply_lane_activation();
        assert!(view.lanes[0].active);
        assert!(view.lanes[1].active);
    }

    #[test]
    fn time_query_parses_inclusive_range() {
        let (_, mut view) = state();
        view.set_time_query("1885-1890");
        assert_eq!(view.year_range, Some((1885, 1890)));
        view.set_time_query("not a range");
        assert_eq!(view.year_range, None);
        view.set_time_query("");
        assert_eq!(view.year_range, None);
    }
}
