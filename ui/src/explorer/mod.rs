//! The explorer panel: shared state, the recompute pipeline, and the
//! renderable chart model the components and the SVG exporter both consume.

mod bars;
mod chart;
pub mod cloud;
mod clouds;
mod export;
pub mod layout;
mod legend;
pub mod palette;
mod popup;
mod search_panel;

pub use bars::CategoryChart;
pub use chart::TimeChart;
pub use clouds::WordCloudStrip;
pub use legend::TopicLegend;
pub use popup::DocumentPopup;
pub use search_panel::SearchPanel;

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::aggregate::{self, LaneAggregate};
use crate::core::dataset::{self, Corpus, TopicId};
use crate::core::search::{self, Membership};
use crate::core::share::{self, SharedState};
use crate::core::state::{PopupTarget, SortMetric, ViewMode, ViewState};
use self::layout::{GradientStop, PointScale};
use self::palette::Palette;

/// Settle delay between a search-field change and the re-aggregation it
/// triggers.
pub const SEARCH_SETTLE_MS: u64 = 500;

/// How many topics the startup sort and the sort commands keep active.
pub const DEFAULT_TOP_N: usize = 5;

/// Startup work that must wait until the first search pass has produced
/// contributing-document tables. Drained in order, exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    RestorePopup(i32),
}

#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub corpus: Corpus,
    pub view: ViewState,
    /// One aggregate per lane, parallel to `view.lanes`.
    pub lanes: Vec<LaneAggregate>,
    /// Per-topic maxima of the first summed pass; the variance-sort proxy.
    pub peaks: Vec<f64>,
    /// Shared streaming y-extent: the tallest stack across active lanes.
    pub y_max: f64,
    pub palette: Palette,
    pending: Vec<DeferredAction>,
}

impl ExplorerState {
    /// Load whatever corpus the host supplies (falling back to the demo
    /// corpus) and restore any shared view from the page's query string.
    pub fn boot() -> Self {
        let corpus = crate::core::platform::inline_corpus()
            .and_then(|json| match Corpus::from_json_str(&json) {
                Ok(corpus) => Some(corpus),
                Err(err) => {
                    tracing::warn!(%err, "inline corpus rejected, using demo data");
                    None
                }
            })
            .unwrap_or_else(dataset::demo);

        let mut state = Self::new(corpus);
        if let Some(query) = crate::core::platform::query_string() {
            state.apply_shared(share::decode(&query));
        }
        state
    }

    pub fn new(corpus: Corpus) -> Self {
        let mut view = ViewState::new(&corpus);

        // One unfiltered summed pass pins the variance-sort ranking before
        // any topic is hidden.
        let first_pass = aggregate::aggregate(0, &corpus, &view, &Membership::All);
        let peaks = aggregate::series_peaks(corpus.topic_count(), &first_pass);

        view.select_top(DEFAULT_TOP_N, SortMetric::Coherence, &corpus, &peaks);

        let mut state = Self {
            corpus,
            view,
            lanes: Vec::new(),
            peaks,
            y_max: 0.0,
            palette: Palette::default(),
            pending: Vec::new(),
        };
        state.recompute();
        state
    }

    /// The full pipeline: resolve memberships, aggregate every lane,
    /// refresh the shared scale and the palette. Runs after every
    /// view-state transition; no diffing, no caching.
    pub fn recompute(&mut self) {
        self.view.normalize_mode(self.corpus.distinct_categories());

        let memberships: Vec<Membership> = self
            .view
            .lanes
            .iter()
            .map(|lane| search::resolve_query(&lane.query, &self.corpus.index))
            .collect();

        self.lanes = memberships
            .iter()
            .enumerate()
            .map(|(index, membership)| {
                aggregate::aggregate(index, &self.corpus, &self.view, membership)
            })
            .collect();

        self.y_max = self
            .lanes
            .iter()
            .zip(&self.view.lanes)
            .filter(|(_, lane_state)| lane_state.active)
            .map(|(lane, _)| {
                let layers: Vec<Vec<f64>> = lane
                    .series
                    .iter()
                    .map(|series| series.points.iter().map(|point| point.value).collect())
                    .collect();
                layout::stacked_max(&layout::stack_silhouette(&layers))
            })
            .fold(0.0, f64::max);

        self.palette = Palette::assign(&self.view.active_topics());

        debug!(
            lanes = self.lanes.len(),
            active_topics = self.view.active_topics().len(),
            y_max = self.y_max,
            mode = ?self.view.mode,
            "explorer recompute"
        );
    }

    /// A search submission: re-derive lane activation, recompute, then run
    /// whatever startup actions were waiting on the first pass.
    pub fn run_search_action(&mut self) {
        self.view.apply_lane_activation();
        self.recompute();
        for action in std::mem::take(&mut self.pending) {
            match action {
                DeferredAction::RestorePopup(year) => self.open_year_popup(year),
            }
        }
    }

    pub fn apply_shared(&mut self, shared: SharedState) {
        if shared.is_empty() {
            return;
        }
        shared.apply(&mut self.view);
        if let Some(year) = shared.popup_year {
            self.pending.push(DeferredAction::RestorePopup(year));
        }
        self.run_search_action();
    }

    pub fn toggle_mode(&mut self) {
        self.view.advance_mode();
        self.recompute();
    }

    pub fn toggle_topic(&mut self, topic: TopicId) {
        self.view.toggle_topic(topic);
        self.recompute();
    }

    pub fn show_more(&mut self) {
        self.view.show_more();
        self.recompute();
    }

    pub fn select_top(&mut self, metric: SortMetric) {
        self.view
            .select_top(DEFAULT_TOP_N, metric, &self.corpus, &self.peaks);
        self.recompute();
    }

    pub fn add_lane(&mut self) {
        self.view.add_lane();
        self.run_search_action();
    }

    pub fn effective_year_range(&self) -> (i32, i32) {
        self.view.year_range.unwrap_or(self.corpus.year_range)
    }

    pub fn open_year_popup(&mut self, year: i32) {
        let known = self
            .lanes
            .first()
            .map(|lane| lane.contributing_docs.contains_key(&year))
            .unwrap_or(false);
        if known {
            self.view.popup = Some(PopupTarget::Year(year));
        }
    }

    pub fn open_category_popup(&mut self, category: &str) {
        let known = self
            .lanes
            .first()
            .map(|lane| lane.category_docs.contains_key(category))
            .unwrap_or(false);
        if known {
            self.view.popup = Some(PopupTarget::Category(category.to_string()));
        }
    }

    pub fn close_popup(&mut self) {
        self.view.popup = None;
    }

    /// Documents behind the open popup, ready for listing.
    pub fn popup_documents(&self) -> Vec<PopupDoc> {
        let Some(target) = &self.view.popup else {
            return Vec::new();
        };
        let Some(lane) = self.lanes.first() else {
            return Vec::new();
        };
        let ids: &[String] = match target {
            PopupTarget::Year(year) => lane
                .contributing_docs
                .get(year)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            PopupTarget::Category(category) => lane
                .category_docs
                .get(category)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        };

        ids.iter().map(|id| self.document_link(id)).collect()
    }

    fn document_link(&self, item_id: &str) -> PopupDoc {
        let info = self.corpus.doc_metadata.get(item_id);
        // A tab-only title is the corpus' "untitled" sentinel.
        let title = match info {
            Some(info) if info.title != "\t" && !info.title.is_empty() => info.title.clone(),
            _ => item_id.to_string(),
        };
        let color = info
            .filter(|info| self.view.is_active(info.main_topic))
            .map(|info| self.palette.color(info.main_topic))
            .unwrap_or(palette::INACTIVE_COLOR);
        let href = if item_id.contains("10.") {
            format!("http://jstor.org/discover/{item_id}")
        } else {
            format!("zotero://select/item/{item_id}")
        };
        PopupDoc {
            item_id: item_id.to_string(),
            title,
            color: color.to_string(),
            href,
        }
    }

    /// Human-readable descriptions of the strongest topic correlations.
    pub fn top_correlated_pairs(&self, n: usize) -> Vec<String> {
        let mut pairs: Vec<(&String, f64)> = self
            .corpus
            .correlations
            .iter()
            .map(|(key, value)| (key, *value))
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        pairs
            .into_iter()
            .take(n)
            .filter_map(|(key, value)| {
                let (a, b) = key.split_once(',')?;
                let a: TopicId = a.trim().parse().ok()?;
                let b: TopicId = b.trim().parse().ok()?;
                Some(format!(
                    "\"{}\" and \"{}\": {}",
                    self.corpus.label_display(a),
                    self.corpus.label_display(b),
                    crate::core::format::format_score(value)
                ))
            })
            .collect()
    }

    pub fn share_query(&self) -> String {
        share::encode(&self.view)
    }
}

/// A document entry in the popup listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupDoc {
    pub item_id: String,
    pub title: String,
    pub color: String,
    pub href: String,
}

/// One filled or stroked series path.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub topic: TopicId,
    pub lane: usize,
    pub path: String,
    pub color: String,
    pub dasharray: String,
    pub opacity: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub topic: TopicId,
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

/// Everything the chart surface needs to draw, derived in one pass from
/// the explorer state. The rsx components and the SVG exporter share it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartModel {
    pub areas: Vec<Shape>,
    pub lines: Vec<Shape>,
    pub bars: Vec<Bar>,
    /// Category labels with their axis positions, categorical mode only.
    pub bar_categories: Vec<(String, f64)>,
    pub density: Vec<GradientStop>,
    pub x_ticks: Vec<(f64, String)>,
    pub y_ticks: Vec<(f64, String)>,
}

impl ChartModel {
    pub fn build(state: &ExplorerState) -> Self {
        match state.view.mode {
            ViewMode::Streaming => Self::build_streaming(state),
            ViewMode::Standardized => Self::build_standardized(state),
            ViewMode::Categorical => Self::build_categorical(state),
        }
    }

    fn build_streaming(state: &ExplorerState) -> Self {
        let x = layout::x_year_scale(state.effective_year_range());
        let y = layout::y_scale_streaming(state.y_max);
        let mut areas = Vec::new();

        for (lane_index, (lane, lane_state)) in
            state.lanes.iter().zip(&state.view.lanes).enumerate()
        {
            if !lane_state.active {
                continue;
            }
            let layers: Vec<Vec<f64>> = lane
                .series
                .iter()
                .map(|series| series.points.iter().map(|point| point.value).collect())
                .collect();
            let stacked = layout::stack_silhouette(&layers);

            for (series, bands) in lane.series.iter().zip(&stacked) {
                let top: Vec<(f64, f64)> = series
                    .points
                    .iter()
                    .zip(bands)
                    .map(|(point, band)| (x.scale(point.year as f64), y.scale(band.y0 + band.y)))
                    .collect();
                let bottom: Vec<(f64, f64)> = series
                    .points
                    .iter()
                    .zip(bands)
                    .map(|(point, band)| (x.scale(point.year as f64), y.scale(band.y0)))
                    .collect();
                areas.push(Shape {
                    topic: series.topic,
                    lane: lane_index,
                    path: layout::path_area_monotone(&top, &bottom),
                    color: state.palette.color(series.topic).to_string(),
                    dasharray: String::new(),
                    opacity: lane_opacity(lane_index),
                    label: state.corpus.label_display(series.topic),
                });
            }
        }

        Self {
            areas,
            density: density_for(state),
            x_ticks: x_ticks_for(state, &x),
            ..Default::default()
        }
    }

    fn build_standardized(state: &ExplorerState) -> Self {
        let x = layout::x_year_scale(state.effective_year_range());
        let y = layout::y_scale_standardized();
        let mut lines = Vec::new();

        for (lane_index, (lane, lane_state)) in
            state.lanes.iter().zip(&state.view.lanes).enumerate()
        {
            if !lane_state.active {
                continue;
            }
            for series in &lane.series {
                let points: Vec<(f64, f64)> = series
                    .points
                    .iter()
                    .map(|point| (x.scale(point.year as f64), y.scale(point.value)))
                    .collect();
                lines.push(Shape {
                    topic: series.topic,
                    lane: lane_index,
                    path: layout::path_line_monotone(&points),
                    color: state.palette.color(series.topic).to_string(),
                    dasharray: lane_dasharray(lane_index),
                    opacity: lane_opacity(lane_index),
                    label: state.corpus.label_display(series.topic),
                });
            }
        }

        let y_ticks = layout::linear_ticks(y.domain, 5)
            .into_iter()
            .map(|tick| (y.scale(tick), crate::core::format::format_z(tick)))
            .collect();

        Self {
            lines,
            density: density_for(state),
            x_ticks: x_ticks_for(state, &x),
            y_ticks,
            ..Default::default()
        }
    }

    /// Categorical bars draw one lane: the last active one, matching the
    /// redraw order the panel has always had.
    fn build_categorical(state: &ExplorerState) -> Self {
        let Some(lane) = state
            .lanes
            .iter()
            .zip(&state.view.lanes)
            .filter(|(_, lane_state)| lane_state.active)
            .map(|(lane, _)| lane)
            .last()
        else {
            return Self::default();
        };

        let categories: Vec<String> = lane
            .categorical
            .first()
            .map(|row| row.iter().map(|point| point.category.clone()).collect())
            .unwrap_or_default();
        let scale = PointScale {
            count: categories.len(),
        };
        let layers: Vec<Vec<f64>> = lane
            .categorical
            .iter()
            .map(|row| row.iter().map(|point| point.value).collect())
            .collect();
        let stacked = layout::stack_zero(&layers);
        let max = layout::stacked_max(&stacked).max(f64::MIN_POSITIVE);
        let bar_width = scale.bar_width();

        let mut bars = Vec::new();
        for (row, bands) in lane.categorical.iter().zip(&stacked) {
            for (column, (point, band)) in row.iter().zip(bands).enumerate() {
                let y0_px = layout::CHART_HEIGHT - band.y0 * layout::CHART_HEIGHT / max;
                let y1_px =
                    layout::CHART_HEIGHT - (band.y0 + band.y) * layout::CHART_HEIGHT / max;
                bars.push(Bar {
                    topic: point.topic,
                    category: point.category.clone(),
                    x: scale.position(column) - bar_width / 2.0,
                    y: y1_px,
                    width: bar_width,
                    height: y0_px - y1_px,
                    color: state.palette.color(point.topic).to_string(),
                });
            }
        }

        let bar_categories = categories
            .iter()
            .enumerate()
            .map(|(column, category)| (category.clone(), scale.position(column)))
            .collect();

        Self {
            bars,
            bar_categories,
            ..Default::default()
        }
    }
}

fn lane_opacity(lane: usize) -> f64 {
    1.0 - lane as f64 / 5.0
}

fn lane_dasharray(lane: usize) -> String {
    if lane == 0 {
        String::new()
    } else {
        format!("{}", 12.0 / (lane + 1) as f64)
    }
}

/// Yearly document totals across every lane, feeding the density overlay.
fn density_for(state: &ExplorerState) -> Vec<GradientStop> {
    let mut totals: BTreeMap<i32, usize> = BTreeMap::new();
    for lane in &state.lanes {
        for (year, docs) in &lane.contributing_docs {
            *totals.entry(*year).or_insert(0) += docs.len();
        }
    }
    let counts: Vec<(i32, usize)> = totals.into_iter().collect();
    layout::density_stops(&counts, state.effective_year_range())
}

fn x_ticks_for(state: &ExplorerState, x: &layout::LinearScale) -> Vec<(f64, String)> {
    layout::year_ticks(state.effective_year_range(), 10)
        .into_iter()
        .map(|year| (x.scale(year as f64), year.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_state_activates_the_most_coherent_topics() {
        let state = ExplorerState::new(dataset::demo());
        // Demo coherence ranks topics 0..4 above the unscored topic 5.
        assert_eq!(state.view.active_topics(), vec![0, 1, 2, 3, 4]);
        assert!(state.y_max > 0.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut state = ExplorerState::new(dataset::demo());
        let lanes_before = state.lanes.clone();
        let y_max_before = state.y_max;
        state.recompute();
        assert_eq!(state.lanes, lanes_before);
        assert_eq!(state.y_max, y_max_before);
    }

    #[test]
    fn search_action_deactivates_queryless_lanes() {
        let mut state = ExplorerState::new(dataset::demo());
        state.add_lane();
        state.view.lanes[1].query = "labor".to_string();
        state.run_search_action();
        assert!(!state.view.lanes[0].active);
        assert!(state.view.lanes[1].active);
    }

    #[test]
    fn shared_popup_restores_after_the_search_pass() {
        let mut state = ExplorerState::new(dataset::demo());
        state.apply_shared(share::decode("?popup=1885&legend=none"));
        assert_eq!(state.view.popup, Some(PopupTarget::Year(1885)));
        assert!(!state.view.show_legend);
    }

    #[test]
    fn shared_popup_for_unknown_year_is_dropped() {
        let mut state = ExplorerState::new(dataset::demo());
        state.apply_shared(share::decode("?popup=1700"));
        assert_eq!(state.view.popup, None);
    }

    #[test]
    fn categorical_fallback_survives_recompute() {
        let mut state = ExplorerState::new(dataset::demo());
        // Fabricate an over-wide category axis.
        for (i, info) in state.corpus.doc_metadata.values_mut().enumerate() {
            info.label = format!("category {i}");
        }
        state.view.mode = ViewMode::Categorical;
        state.recompute();
        assert_eq!(state.view.mode, ViewMode::Streaming);
    }

    #[test]
    fn streaming_model_builds_one_area_per_active_topic() {
        let state = ExplorerState::new(dataset::demo());
        let model = ChartModel::build(&state);
        assert_eq!(model.areas.len(), state.view.active_topics().len());
        assert!(model.lines.is_empty());
        assert!(!model.density.is_empty());
        assert!(model
            .areas
            .iter()
            .all(|shape| shape.path.starts_with('M') && shape.path.ends_with('Z')));
    }

    #[test]
    fn standardized_model_draws_dashed_comparison_lanes() {
        let mut state = ExplorerState::new(dataset::demo());
        state.toggle_mode();
        state.add_lane();
        state.view.lanes[0].query = "labor".to_string();
        state.view.lanes[1].query = "railroad".to_string();
        state.run_search_action();

        let model = ChartModel::build(&state);
        assert!(model.areas.is_empty());
        let lanes: Vec<usize> = model.lines.iter().map(|line| line.lane).collect();
        assert!(lanes.contains(&0));
        assert!(lanes.contains(&1));
        assert!(model
            .lines
            .iter()
            .filter(|line| line.lane == 1)
            .all(|line| line.dasharray == "6"));
    }

    #[test]
    fn categorical_model_covers_every_category_and_topic() {
        let mut state = ExplorerState::new(dataset::demo());
        state.view.mode = ViewMode::Categorical;
        state.recompute();
        let model = ChartModel::build(&state);
        assert_eq!(model.bar_categories.len(), 3);
        assert_eq!(
            model.bars.len(),
            3 * state.view.active_topics().len()
        );
        assert!(model.bars.iter().all(|bar| bar.height >= 0.0));
    }

    #[test]
    fn popup_documents_fall_back_to_ids_for_untitled_items() {
        let mut state = ExplorerState::new(dataset::demo());
        let (id, info) = state
            .corpus
            .doc_metadata
            .iter_mut()
            .next()
            .map(|(id, info)| (id.clone(), info))
            .unwrap();
        info.title = "\t".to_string();
        let year = info.year;

        state.open_year_popup(year);
        let docs = state.popup_documents();
        assert!(!docs.is_empty());
        let entry = docs.iter().find(|doc| doc.item_id == id).unwrap();
        assert_eq!(entry.title, id);
        assert!(entry.href.starts_with("zotero://select/item/"));
    }

    #[test]
    fn correlated_pairs_rank_descending() {
        let state = ExplorerState::new(dataset::demo());
        let pairs = state.top_correlated_pairs(2);
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].contains("0.41"));
        assert!(pairs[1].contains("0.37"));
    }
}
