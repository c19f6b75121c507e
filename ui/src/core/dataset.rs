//! Corpus input model: precomputed topic-model output plus document metadata.
//!
//! Everything here is read-only after load. The topic model itself is computed
//! elsewhere; we receive per-topic time series of document shares, topic
//! labels with their word distributions, document metadata, an inverted
//! search index, and per-topic coherence scores.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use thiserror::Error;

use super::stats::{self, Moments};

pub type TopicId = usize;

/// One document's share of a topic within a single year bucket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocShare {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub ratio: f64,
}

/// All document shares for one topic in one year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeBucket {
    pub year: i32,
    #[serde(rename = "documents")]
    pub docs: Vec<DocShare>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicWord {
    pub text: String,
    pub prob: f64,
}

/// Display metadata for one topic. `label` is the ranked head of the word
/// distribution; `full_topic` is the complete distribution used for clouds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicLabel {
    pub label: Vec<String>,
    #[serde(rename = "fulltopic", default)]
    pub full_topic: Vec<TopicWord>,
    #[serde(default)]
    pub allocation_ratio: f64,
}

impl TopicLabel {
    pub fn display(&self) -> String {
        self.label.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocInfo {
    #[serde(default)]
    pub title: String,
    /// Category label, e.g. publication venue.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub main_topic: TopicId,
    #[serde(default)]
    pub year: i32,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus JSON malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("corpus has no topic time series")]
    Empty,
}

/// Wire form of the bundle a host page inlines. Maps are keyed by the
/// stringified topic index; keys that do not parse are skipped.
#[derive(Debug, Deserialize)]
struct RawCorpus {
    data: Vec<Vec<TimeBucket>>,
    #[serde(default)]
    labels: BTreeMap<String, TopicLabel>,
    #[serde(rename = "docMetadata", default)]
    doc_metadata: HashMap<String, DocInfo>,
    #[serde(default)]
    index: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    coherence: BTreeMap<String, f64>,
    #[serde(default)]
    correlations: HashMap<String, f64>,
}

/// The loaded, validated corpus plus everything derived in the single
/// unfiltered pass at load time (per-topic moments, default year range).
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Per topic, year buckets in ascending order.
    pub topic_time: Vec<Vec<TimeBucket>>,
    /// Only topics with a positive allocation ratio survive loading.
    pub labels: BTreeMap<TopicId, TopicLabel>,
    pub doc_metadata: HashMap<String, DocInfo>,
    /// Inverted search index, term -> item ids. Ordered so the pattern
    /// fallback scans keys deterministically.
    pub index: BTreeMap<String, Vec<String>>,
    pub coherence: Vec<f64>,
    /// Pairwise topic correlations keyed `"a,b"`.
    pub correlations: HashMap<String, f64>,
    /// Corpus-wide mean and sample stdev of each topic's normalized yearly
    /// share. NaN for topics with fewer than two buckets.
    pub moments: Vec<Moments>,
    pub year_range: (i32, i32),
}

impl Corpus {
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let raw: RawCorpus = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCorpus) -> Result<Self, CorpusError> {
        if raw.data.is_empty() {
            return Err(CorpusError::Empty);
        }

        let mut labels = BTreeMap::new();
        for (key, label) in raw.labels {
            if let Ok(topic) = key.parse::<TopicId>() {
                if label.allocation_ratio > 0.0 {
                    labels.insert(topic, label);
                }
            }
        }

        let mut coherence = vec![0.0; raw.data.len()];
        for (key, score) in raw.coherence {
            if let Ok(topic) = key.parse::<TopicId>() {
                if topic < coherence.len() {
                    coherence[topic] = score;
                }
            }
        }

        let moments = load_moments(&raw.data);
        let year_range = year_extent(&raw.data).ok_or(CorpusError::Empty)?;

        Ok(Self {
            topic_time: raw.data,
            labels,
            doc_metadata: raw.doc_metadata,
            index: raw.index,
            coherence,
            correlations: raw.correlations,
            moments,
            year_range,
        })
    }

    pub fn topic_count(&self) -> usize {
        self.topic_time.len()
    }

    /// Distinct category labels across all document metadata.
    pub fn distinct_categories(&self) -> usize {
        let mut seen: Vec<&str> = self
            .doc_metadata
            .values()
            .map(|info| info.label.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    pub fn label_display(&self, topic: TopicId) -> String {
        self.labels
            .get(&topic)
            .map(|label| label.display())
            .unwrap_or_else(|| format!("topic {topic}"))
    }
}

/// Normalized yearly share for one bucket: ratio summed over every document
/// in the year divided by that year's document count (floor 1).
fn bucket_share(bucket: &TimeBucket) -> f64 {
    let total: f64 = bucket.docs.iter().map(|doc| doc.ratio).sum();
    total / bucket.docs.len().max(1) as f64
}

fn load_moments(topic_time: &[Vec<TimeBucket>]) -> Vec<Moments> {
    topic_time
        .iter()
        .map(|buckets| {
            let values: Vec<f64> = buckets.iter().map(bucket_share).collect();
            stats::moments(&values)
        })
        .collect()
}

fn year_extent(topic_time: &[Vec<TimeBucket>]) -> Option<(i32, i32)> {
    let first = topic_time.first()?;
    Some((first.first()?.year, first.last()?.year))
}

/// Small built-in corpus used by the shells when the host page supplies no
/// data, and by tests. Three journals, six topics, twenty years.
pub fn demo() -> Corpus {
    use once_cell::sync::Lazy;

    static DEMO: Lazy<Corpus> = Lazy::new(build_demo);
    DEMO.clone()
}

fn build_demo() -> Corpus {
    const TOPICS: [(&[&str], &[(&str, f64)]); 6] = [
        (
            &["labor", "strike", "union"],
            &[
                ("labor", 0.061),
                ("strike", 0.052),
                ("union", 0.048),
                ("wage", 0.031),
                ("factory", 0.024),
                ("worker", 0.022),
                ("hours", 0.014),
                ("shop", 0.009),
            ],
        ),
        (
            &["railroad", "freight", "line"],
            &[
                ("railroad", 0.072),
                ("freight", 0.044),
                ("line", 0.041),
                ("car", 0.029),
                ("depot", 0.018),
                ("track", 0.016),
                ("engine", 0.011),
            ],
        ),
        (
            &["cotton", "market", "price"],
            &[
                ("cotton", 0.067),
                ("market", 0.055),
                ("price", 0.049),
                ("bale", 0.027),
                ("crop", 0.023),
                ("trade", 0.017),
            ],
        ),
        (
            &["school", "teacher", "education"],
            &[
                ("school", 0.081),
                ("teacher", 0.046),
                ("education", 0.039),
                ("pupil", 0.026),
                ("board", 0.019),
            ],
        ),
        (
            &["election", "vote", "party"],
            &[
                ("election", 0.063),
                ("vote", 0.057),
                ("party", 0.051),
                ("ticket", 0.028),
                ("county", 0.021),
                ("ballot", 0.013),
            ],
        ),
        (
            &["river", "flood", "levee"],
            &[
                ("river", 0.059),
                ("flood", 0.043),
                ("levee", 0.034),
                ("water", 0.030),
                ("bank", 0.015),
            ],
        ),
    ];
    const CATEGORIES: [&str; 3] = ["Daily Register", "Evening Post", "Weekly Tribune"];
    const START_YEAR: i32 = 1880;
    const YEARS: i32 = 20;

    let doc_id = |year: i32, slot: usize| format!("{year}-{slot:02}");

    let mut doc_metadata = HashMap::new();
    let mut topic_time: Vec<Vec<TimeBucket>> = vec![Vec::new(); TOPICS.len()];

    for offset in 0..YEARS {
        let year = START_YEAR + offset;
        let docs_this_year = 3 + (offset as usize % 3);
        let ids: Vec<String> = (0..docs_this_year).map(|slot| doc_id(year, slot)).collect();

        for (slot, id) in ids.iter().enumerate() {
            let main_topic = (slot + offset as usize) % TOPICS.len();
            doc_metadata.insert(
                id.clone(),
                DocInfo {
                    title: format!("{} item of {year}, no. {slot}", CATEGORIES[slot % 3]),
                    label: CATEGORIES[slot % 3].to_string(),
                    main_topic,
                    year,
                },
            );
        }

        for (topic, buckets) in topic_time.iter_mut().enumerate() {
            let docs = ids
                .iter()
                .enumerate()
                .map(|(slot, id)| {
                    // A fixed pseudo-profile per (topic, year, doc): topics wax
                    // and wane over the range so every view mode has shape.
                    let phase = (offset as f64 / YEARS as f64) * std::f64::consts::TAU;
                    let lean = if (slot + offset as usize) % TOPICS.len() == topic {
                        0.30
                    } else {
                        0.08
                    };
                    let swing = 0.05 * (phase + topic as f64).sin();
                    DocShare {
                        item_id: id.clone(),
                        ratio: (lean + swing).max(0.01),
                    }
                })
                .collect();
            buckets.push(TimeBucket { year, docs });
        }
    }

    let mut labels = BTreeMap::new();
    for (topic, (head, words)) in TOPICS.iter().enumerate() {
        labels.insert(
            topic,
            TopicLabel {
                label: head.iter().map(|word| word.to_string()).collect(),
                full_topic: words
                    .iter()
                    .map(|(text, prob)| TopicWord {
                        text: text.to_string(),
                        prob: *prob,
                    })
                    .collect(),
                allocation_ratio: 1.0 / TOPICS.len() as f64,
            },
        );
    }

    // Invert the head words over the documents whose main topic carries them.
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (id, info) in &doc_metadata {
        for (topic, (head, _)) in TOPICS.iter().enumerate() {
            if info.main_topic == topic {
                for word in head.iter() {
                    index.entry(word.to_string()).or_default().push(id.clone());
                }
            }
        }
    }
    for postings in index.values_mut() {
        postings.sort();
    }

    let coherence = vec![0.82, 0.74, 0.71, 0.66, 0.58, 0.0];
    let mut correlations = HashMap::new();
    correlations.insert("0,2".to_string(), 0.41);
    correlations.insert("1,2".to_string(), 0.37);
    correlations.insert("3,4".to_string(), 0.22);

    let moments = load_moments(&topic_time);
    let year_range = year_extent(&topic_time).expect("demo corpus is non-empty");

    Corpus {
        topic_time,
        labels,
        doc_metadata,
        index,
        coherence,
        correlations,
        moments,
        year_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_corpus_loads_with_finite_moments() {
        let corpus = demo();
        assert_eq!(corpus.topic_count(), 6);
        assert_eq!(corpus.year_range, (1880, 1899));
        for moments in &corpus.moments {
            assert!(moments.mean.is_finite());
            assert!(moments.stdev.is_finite());
        }
    }

    #[test]
    fn zero_allocation_topics_are_dropped_at_load() {
        let json = r#"{
            "data": [
                [{"year": 1900, "documents": [{"itemID": "a", "ratio": 0.5}]}],
                [{"year": 1900, "documents": [{"itemID": "a", "ratio": 0.5}]}]
            ],
            "labels": {
                "0": {"label": ["kept"], "allocation_ratio": 0.5},
                "1": {"label": ["dropped"], "allocation_ratio": 0.0}
            }
        }"#;
        let corpus = Corpus::from_json_str(json).unwrap();
        assert!(corpus.labels.contains_key(&0));
        assert!(!corpus.labels.contains_key(&1));
    }

    #[test]
    fn empty_data_is_rejected() {
        assert!(matches!(
            Corpus::from_json_str(r#"{"data": []}"#),
            Err(CorpusError::Empty)
        ));
    }

    #[test]
    fn moments_are_nan_for_single_bucket_topics() {
        let json = r#"{
            "data": [[{"year": 1900, "documents": [{"itemID": "a", "ratio": 0.4}]}]]
        }"#;
        let corpus = Corpus::from_json_str(json).unwrap();
        assert!(corpus.moments[0].stdev.is_nan());
    }
}
