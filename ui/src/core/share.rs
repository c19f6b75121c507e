//! View-state ⇄ query-string codec for shareable links.
//!
//! Decoding is lenient: unknown or malformed fields are skipped, never
//! surfaced as errors.

use tracing::warn;

use super::dataset::TopicId;
use super::state::{ViewMode, ViewState};

/// Decoded share parameters, applied to a `ViewState` in one step. The
/// popup year is left to the caller: restoring it must wait until the
/// first search pass has produced contributing-document tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedState {
    pub mode: Option<ViewMode>,
    /// Number of extra comparison lanes beyond lane 0.
    pub compare: usize,
    pub topics: Option<Vec<TopicId>>,
    pub show_legend: Option<bool>,
    pub popup_year: Option<i32>,
    /// Form-field values by element id (`search0`, `searchTime0`, ...).
    pub fields: Vec<(String, String)>,
}

impl SharedState {
    pub fn is_empty(&self) -> bool {
        *self == SharedState::default()
    }

    /// Mutate `view` to match the shared parameters. The caller follows up
    /// with one search action, exactly as if the user had submitted the
    /// restored form.
    pub fn apply(&self, view: &mut ViewState) {
        if let Some(mode) = self.mode {
            view.mode = mode;
        }
        for _ in 0..self.compare {
            view.add_lane();
        }
        for (field, value) in &self.fields {
            if field == "searchTime0" {
                view.set_time_query(value);
            } else if let Some(lane) = field
                .strip_prefix("search")
                .and_then(|index| index.parse::<usize>().ok())
            {
                if let Some(lane) = view.lanes.get_mut(lane) {
                    lane.query = value.clone();
                }
            }
        }
        if let Some(topics) = &self.topics {
            // Wholesale replacement: everything off, then the listed ids on.
            for active in view.topics.values_mut() {
                *active = false;
            }
            for topic in topics {
                if let Some(active) = view.topics.get_mut(topic) {
                    *active = true;
                }
            }
        }
        if let Some(show) = self.show_legend {
            view.show_legend = show;
        }
    }
}

/// Encode the current view as a query string, leading `?` included.
/// Field order is deterministic so links diff cleanly.
pub fn encode(view: &ViewState) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    pairs.push(("state".into(), view.mode.code().to_string()));
    pairs.push((
        "compare".into(),
        view.lanes.len().saturating_sub(1).to_string(),
    ));
    if !view.time_query.trim().is_empty() {
        pairs.push(("searchTime0".into(), view.time_query.clone()));
    }
    for (index, lane) in view.lanes.iter().enumerate() {
        if !lane.query.is_empty() {
            pairs.push((format!("search{index}"), lane.query.clone()));
        }
    }
    let topics: Vec<String> = view
        .topics
        .iter()
        .filter(|(_, active)| **active)
        .map(|(topic, _)| topic.to_string())
        .collect();
    pairs.push(("topics".into(), topics.join(",")));
    pairs.push((
        "legend".into(),
        if view.show_legend { "inline" } else { "none" }.into(),
    ));
    if let Some(super::state::PopupTarget::Year(year)) = &view.popup {
        pairs.push(("popup".into(), year.to_string()));
    }

    let encoded: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();
    format!("?{}", encoded.join("&"))
}

/// Decode a query string (with or without the leading `?`).
pub fn decode(query: &str) -> SharedState {
    let mut shared = SharedState::default();
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return shared;
    }

    for pair in query.split('&') {
        let Some((key, raw_value)) = pair.split_once('=') else {
            continue;
        };
        let value = match urlencoding::decode(raw_value) {
            Ok(value) => value.into_owned(),
            Err(_) => {
                warn!(field = key, "share field is not valid UTF-8, skipping");
                continue;
            }
        };

        match key {
            "state" => match value.parse::<u8>().ok().and_then(ViewMode::from_code) {
                Some(mode) => shared.mode = Some(mode),
                None => warn!(field = key, value, "unrecognized mode, skipping"),
            },
            "compare" => match value.parse::<usize>() {
                Ok(count) => shared.compare = count,
                Err(_) => warn!(field = key, value, "compare is not a count, skipping"),
            },
            "topics" => {
                let topics: Vec<TopicId> = value
                    .split(',')
                    .filter_map(|id| id.trim().parse::<TopicId>().ok())
                    .collect();
                shared.topics = Some(topics);
            }
            "legend" => shared.show_legend = Some(value != "none"),
            "popup" => match value.parse::<i32>() {
                Ok(year) => shared.popup_year = Some(year),
                Err(_) => warn!(field = key, value, "popup year unparseable, skipping"),
            },
            _ => shared.fields.push((key.to_string(), value)),
        }
    }

    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset;
    use crate::core::state::PopupTarget;

    #[test]
    fn round_trip_restores_the_view() {
        let corpus = dataset::demo();
        let mut view = ViewState::new(&corpus);
        view.advance_mode();
        view.add_lane();
        view.lanes[1].query = "strike union".to_string();
        view.set_time_query("1885-1895");
        view.toggle_topic(4);
        view.toggle_topic(5);
        view.show_legend = false;
        view.popup = Some(PopupTarget::Year(1890));

        let shared = decode(&encode(&view));
        let mut restored = ViewState::new(&corpus);
        shared.apply(&mut restored);

        assert_eq!(restored.mode, view.mode);
        assert_eq!(restored.lanes.len(), 2);
        assert_eq!(restored.lanes[1].query, "strike union");
        assert_eq!(restored.time_query, "1885-1895");
        assert_eq!(restored.year_range, Some((1885, 1895)));
        assert_eq!(restored.active_topics(), view.active_topics());
        assert!(!restored.show_legend);
        assert_eq!(shared.popup_year, Some(1890));
    }

    #[test]
    fn topics_field_replaces_the_active_set_wholesale() {
        let corpus = dataset::demo();
        let mut view = ViewState::new(&corpus);
        decode("?topics=1,3").apply(&mut view);
        assert_eq!(view.active_topics(), vec![1, 3]);
    }

    #[test]
    fn malformed_fields_are_skipped() {
        let shared = decode("?state=seven&compare=&popup=year&oops&topics=2,x,4");
        assert_eq!(shared.mode, None);
        assert_eq!(shared.compare, 0);
        assert_eq!(shared.popup_year, None);
        assert_eq!(shared.topics, Some(vec![2, 4]));
    }

    #[test]
    fn legend_none_hides_everything_else_shows() {
        assert_eq!(decode("legend=none").show_legend, Some(false));
        assert_eq!(decode("legend=inline").show_legend, Some(true));
        assert_eq!(decode("legend=block").show_legend, Some(true));
    }

    #[test]
    fn queries_percent_encode_safely() {
        let corpus = dataset::demo();
        let mut view = ViewState::new(&corpus);
        view.lanes[0].query = "strike & \"wage\"".to_string();
        let shared = decode(&encode(&view));
        let mut restored = ViewState::new(&corpus);
        shared.apply(&mut restored);
        assert_eq!(restored.lanes[0].query, "strike & \"wage\"");
    }

    #[test]
    fn empty_query_string_is_empty_state() {
        assert!(decode("").is_empty());
        assert!(decode("?").is_empty());
    }
}
