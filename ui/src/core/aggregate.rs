//! The aggregation engine: one full pass from raw topic-document shares to
//! chart-ready series under the current view state and one lane's search
//! membership.
//!
//! Every call rebuilds all working buffers, so re-running with identical
//! inputs is idempotent. Missing document metadata is not validated; such
//! documents fall into the "" category and otherwise flow through.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::dataset::{Corpus, TopicId};
use super::search::Membership;
use super::state::{ViewMode, ViewState};
use super::stats::{self, Smoothing};

#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub year: i32,
    pub topic: TopicId,
    pub lane: usize,
    pub value: f64,
}

/// Ordered yearly points for one topic within one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub topic: TopicId,
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPoint {
    pub category: String,
    pub topic: TopicId,
    pub value: f64,
}

/// Everything one aggregation pass produces for a lane.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaneAggregate {
    pub series: Vec<Series>,
    /// Every document present in each in-range year, search filter NOT
    /// applied: this is the normalization divisor and the density overlay's
    /// input.
    pub contributing_docs: BTreeMap<i32, Vec<String>>,
    /// Distinct documents per category that pass the search filter; the
    /// categorical divisor and the category popup's source.
    pub category_docs: BTreeMap<String, Vec<String>>,
    /// Per active topic (index order), one point per category label.
    pub categorical: Vec<Vec<CategoryPoint>>,
}

pub fn aggregate(
    lane: usize,
    corpus: &Corpus,
    view: &ViewState,
    membership: &Membership,
) -> LaneAggregate {
    let in_range = |year: i32| match view.year_range {
        Some((start, end)) => year >= start && year <= end,
        None => true,
    };
    let category_of = |item_id: &str| -> &str {
        corpus
            .doc_metadata
            .get(item_id)
            .map(|info| info.label.as_str())
            .unwrap_or("")
    };

    // Category skeleton over the unfiltered time axis: every (category,
    // topic) cell an active topic could reach exists up front, so empty
    // cells chart as zero bars rather than holes.
    let mut category_sums: BTreeMap<String, BTreeMap<TopicId, f64>> = BTreeMap::new();
    for (topic, buckets) in corpus.topic_time.iter().enumerate() {
        if !(corpus.labels.contains_key(&topic) && view.is_active(topic)) {
            continue;
        }
        for bucket in buckets {
            for doc in &bucket.docs {
                category_sums
                    .entry(category_of(&doc.item_id).to_string())
                    .or_default()
                    .entry(topic)
                    .or_insert(0.0);
            }
        }
    }

    let mut contributing_docs: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    let mut category_members: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut series = Vec::new();

    for (topic, buckets) in corpus.topic_time.iter().enumerate() {
        if !(corpus.labels.contains_key(&topic) && view.is_active(topic)) {
            continue;
        }
        let mut points = Vec::new();
        for bucket in buckets {
            if !in_range(bucket.year) {
                continue;
            }

            contributing_docs.insert(
                bucket.year,
                bucket.docs.iter().map(|doc| doc.item_id.clone()).collect(),
            );

            let mut value = 0.0;
            for doc in &bucket.docs {
                if membership.contains(&doc.item_id) {
                    value += doc.ratio;
                    let category = category_of(&doc.item_id).to_string();
                    if let Some(cell) = category_sums
                        .get_mut(&category)
                        .and_then(|cells| cells.get_mut(&topic))
                    {
                        *cell += doc.ratio;
                    }
                    category_members
                        .entry(category)
                        .or_default()
                        .insert(doc.item_id.clone());
                }
            }

            points.push(TimePoint {
                year: bucket.year,
                topic,
                lane,
                value,
            });
        }
        series.push(Series { topic, points });
    }

    // Yearly normalization: divide by the year's total document count
    // whether or not those documents pass the search filter. Standardized
    // and categorical modes additionally z-score against the load-time
    // corpus moments.
    for one in &mut series {
        let moments = corpus.moments.get(one.topic).copied();
        for point in &mut one.points {
            let divisor = contributing_docs
                .get(&point.year)
                .map(|docs| docs.len())
                .filter(|len| *len > 0)
                .unwrap_or(1) as f64;
            point.value /= divisor;

            if view.mode != ViewMode::Streaming {
                if let Some(moments) = moments {
                    let deviation = point.value - moments.mean;
                    // An exactly-mean value standardizes to zero even when
                    // the stdev degenerates to zero.
                    point.value = if deviation == 0.0 {
                        0.0
                    } else {
                        deviation / moments.stdev
                    };
                }
            }
        }
    }

    if view.mode == ViewMode::Streaming && view.smoothing != Smoothing::Off {
        for one in &mut series {
            let values: Vec<f64> = one.points.iter().map(|point| point.value).collect();
            let smoothed = stats::smooth(&values, view.window_half_width, view.smoothing);
            for (point, value) in one.points.iter_mut().zip(smoothed) {
                point.value = value;
            }
        }
    }

    let category_docs: BTreeMap<String, Vec<String>> = category_members
        .into_iter()
        .map(|(category, members)| (category, members.into_iter().collect()))
        .collect();

    // Categorical re-bucketing: normalize each (category, topic) sum by the
    // category's DISTINCT passing-document count, floor 1 for categories no
    // document reached.
    let active_topics: Vec<TopicId> = view
        .topics
        .iter()
        .filter(|(_, active)| **active)
        .map(|(topic, _)| *topic)
        .collect();
    let mut categorical: Vec<Vec<CategoryPoint>> = vec![Vec::new(); active_topics.len()];
    for (category, cells) in &category_sums {
        let divisor = category_docs
            .get(category)
            .map(|docs| docs.len())
            .filter(|len| *len > 0)
            .unwrap_or(1) as f64;
        for (row, topic) in active_topics.iter().enumerate() {
            let sum = cells.get(topic).copied().unwrap_or(0.0);
            categorical[row].push(CategoryPoint {
                category: category.clone(),
                topic: *topic,
                value: sum / divisor,
            });
        }
    }

    debug!(
        lane,
        series = series.len(),
        years = contributing_docs.len(),
        categories = categorical.first().map(|row| row.len()).unwrap_or(0),
        "aggregation pass"
    );

    LaneAggregate {
        series,
        contributing_docs,
        category_docs,
        categorical,
    }
}

/// Per-topic peak of a summed pass; the ranking proxy behind the
/// sort-by-variance command.
pub fn series_peaks(topic_count: usize, aggregate: &LaneAggregate) -> Vec<f64> {
    let mut peaks = vec![0.0; topic_count];
    for series in &aggregate.series {
        let peak = series
            .points
            .iter()
            .map(|point| point.value)
            .fold(f64::NEG_INFINITY, f64::max);
        if series.topic < peaks.len() && peak.is_finite() {
            peaks[series.topic] = peak;
        }
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{Corpus, DocInfo, DocShare, TimeBucket, TopicLabel};
    use crate::core::search;
    use crate::core::state::ViewState;
    use std::collections::HashSet;

    /// Three topics, two years, two journals; every ratio hand-picked so the
    /// yearly shares are easy to verify.
    fn small_corpus() -> Corpus {
        let bucket = |year: i32, ratios: [f64; 2]| TimeBucket {
            year,
            docs: vec![
                DocShare {
                    item_id: format!("doc-a-{year}"),
                    ratio: ratios[0],
                },
                DocShare {
                    item_id: format!("doc-b-{year}"),
                    ratio: ratios[1],
                },
            ],
        };

        let topic_time = vec![
            vec![bucket(1900, [0.5, 0.3]), bucket(1901, [0.2, 0.4])],
            vec![bucket(1900, [0.3, 0.5]), bucket(1901, [0.5, 0.1])],
            vec![bucket(1900, [0.2, 0.2]), bucket(1901, [0.3, 0.5])],
        ];

        let mut labels = std::collections::BTreeMap::new();
        for (topic, name) in ["alpha", "beta", "gamma"].iter().enumerate() {
            labels.insert(
                topic,
                TopicLabel {
                    label: vec![name.to_string()],
                    full_topic: Vec::new(),
                    allocation_ratio: 1.0 / 3.0,
                },
            );
        }

        let mut doc_metadata = std::collections::HashMap::new();
        for year in [1900, 1901] {
            doc_metadata.insert(
                format!("doc-a-{year}"),
                DocInfo {
                    title: format!("Title A {year}"),
                    label: "Journal A".to_string(),
                    main_topic: 0,
                    year,
                },
            );
            doc_metadata.insert(
                format!("doc-b-{year}"),
                DocInfo {
                    title: format!("Title B {year}"),
                    label: "Journal B".to_string(),
                    main_topic: 1,
                    year,
                },
            );
        }

        let mut index = std::collections::BTreeMap::new();
        index.insert(
            "alpha".to_string(),
            vec!["doc-a-1900".to_string(), "doc-a-1901".to_string()],
        );

        let moments = vec![
            crate::core::stats::moments(&[0.4, 0.3]),
            crate::core::stats::moments(&[0.4, 0.3]),
            crate::core::stats::moments(&[0.2, 0.4]),
        ];

        Corpus {
            topic_time,
            labels,
            doc_metadata,
            index,
            coherence: vec![0.5, 0.4, 0.3],
            correlations: std::collections::HashMap::new(),
            moments,
            year_range: (1900, 1901),
        }
    }

    fn streaming_view(corpus: &Corpus) -> ViewState {
        let mut view = ViewState::new(corpus);
        view.smoothing = Smoothing::Off;
        view
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let corpus = small_corpus();
        let view = streaming_view(&corpus);
        let first = aggregate(0, &corpus, &view, &Membership::All);
        let second = aggregate(0, &corpus, &view, &Membership::All);
        assert_eq!(first, second);
    }

    #[test]
    fn streaming_shares_are_nonnegative_and_bounded() {
        let corpus = small_corpus();
        let view = streaming_view(&corpus);
        let lane = aggregate(0, &corpus, &view, &Membership::All);

        for year in [1900, 1901] {
            let total: f64 = lane
                .series
                .iter()
                .flat_map(|series| &series.points)
                .filter(|point| point.year == year)
                .map(|point| point.value)
                .sum();
            assert!(total >= 0.0);
            assert!(total <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn yearly_divisor_counts_all_docs_not_just_matches() {
        let corpus = small_corpus();
        let view = streaming_view(&corpus);
        // Membership admits only doc-a-*; the divisor must still be 2.
        let membership = search::resolve_query("alpha", &corpus.index);
        let lane = aggregate(0, &corpus, &view, &membership);

        let alpha_1900 = &lane.series[0].points[0];
        assert!((alpha_1900.value - 0.5 / 2.0).abs() < 1e-12);
        assert_eq!(lane.contributing_docs[&1900].len(), 2);
    }

    #[test]
    fn filtered_out_lane_contributes_zeroes() {
        let corpus = small_corpus();
        let view = streaming_view(&corpus);
        let membership = Membership::Ids(HashSet::new());
        let lane = aggregate(0, &corpus, &view, &membership);
        for series in &lane.series {
            assert!(series.points.iter().all(|point| point.value == 0.0));
        }
    }

    #[test]
    fn standardized_identical_values_are_exactly_zero() {
        let mut corpus = small_corpus();
        // Force topic 0's raw shares to be identical across years.
        for bucket in &mut corpus.topic_time[0] {
            for doc in &mut bucket.docs {
                doc.ratio = 0.4;
            }
        }
        corpus.moments[0] = crate::core::stats::moments(&[0.4, 0.4]);

        let mut view = streaming_view(&corpus);
        view.mode = ViewMode::Standardized;
        let lane = aggregate(0, &corpus, &view, &Membership::All);
        assert!(lane.series[0].points.iter().all(|point| point.value == 0.0));
    }

    #[test]
    fn date_filter_drops_out_of_range_years() {
        let corpus = small_corpus();
        let mut view = streaming_view(&corpus);
        view.set_time_query("1901-1901");
        let lane = aggregate(0, &corpus, &view, &Membership::All);
        for series in &lane.series {
            assert_eq!(series.points.len(), 1);
            assert_eq!(series.points[0].year, 1901);
        }
        assert!(!lane.contributing_docs.contains_key(&1900));
    }

    #[test]
    fn categorical_divides_by_distinct_documents() {
        let corpus = small_corpus();
        let mut view = streaming_view(&corpus);
        view.mode = ViewMode::Categorical;
        let lane = aggregate(0, &corpus, &view, &Membership::All);

        // Journal A holds doc-a-1900 and doc-a-1901: two distinct docs even
        // though each appears in three topics' buckets.
        assert_eq!(lane.category_docs["Journal A"].len(), 2);

        // Topic 0 in Journal A: 0.5 + 0.2 summed over two distinct docs.
        let topic0 = &lane.categorical[0];
        let journal_a = topic0
            .iter()
            .find(|point| point.category == "Journal A")
            .unwrap();
        assert!((journal_a.value - (0.5 + 0.2) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn deactivated_topics_leave_the_pass_entirely() {
        let corpus = small_corpus();
        let mut view = streaming_view(&corpus);
        view.toggle_topic(1);
        let lane = aggregate(0, &corpus, &view, &Membership::All);
        assert_eq!(lane.series.len(), 2);
        assert!(lane.series.iter().all(|series| series.topic != 1));
        assert_eq!(lane.categorical.len(), 2);
    }

    #[test]
    fn smoothing_applies_only_in_streaming_mode() {
        let corpus = small_corpus();
        let mut view = streaming_view(&corpus);
        view.smoothing = Smoothing::Mean;
        view.window_half_width = 1;

        let smoothed = aggregate(0, &corpus, &view, &Membership::All);
        view.mode = ViewMode::Standardized;
        let standardized = aggregate(0, &corpus, &view, &Membership::All);

        // Streaming points are window means; the standardized pass keeps
        // its z-scores untouched.
        let raw_1900 = (0.5 + 0.3) / 2.0;
        let raw_1901 = (0.2 + 0.4) / 2.0;
        let expected = (raw_1900 * 2.0 + raw_1901) / 3.0;
        assert!((smoothed.series[0].points[0].value - expected).abs() < 1e-12);
        assert!(standardized.series[0]
            .points
            .iter()
            .all(|point| point.value.abs() > 0.0));
    }

    #[test]
    fn peaks_track_per_topic_maxima() {
        let corpus = small_corpus();
        let view = streaming_view(&corpus);
        let lane = aggregate(0, &corpus, &view, &Membership::All);
        let peaks = series_peaks(corpus.topic_count(), &lane);
        assert_eq!(peaks.len(), 3);
        assert!((peaks[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn missing_metadata_lands_in_the_empty_category() {
        let mut corpus = small_corpus();
        corpus.doc_metadata.remove("doc-b-1900");
        corpus.doc_metadata.remove("doc-b-1901");

        let mut view = streaming_view(&corpus);
        view.mode = ViewMode::Categorical;
        let lane = aggregate(0, &corpus, &view, &Membership::All);
        assert!(lane.category_docs.contains_key(""));
    }
}
