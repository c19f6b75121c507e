//! Topic legend: active entries first, click to toggle a topic in and out
//! of the view, context-menu to open its word cloud.

use dioxus::prelude::*;

use super::palette::INACTIVE_COLOR;
use super::ExplorerState;

#[component]
pub fn TopicLegend(state: Signal<ExplorerState>) -> Element {
    let snapshot = state();
    if !snapshot.view.show_legend {
        return rsx! {};
    }

    let mut entries: Vec<LegendEntry> = Vec::new();
    for topic in snapshot.view.active_topics() {
        entries.push(LegendEntry {
            topic,
            label: snapshot.corpus.label_display(topic),
            color: snapshot.palette.color(topic).to_string(),
            active: true,
        });
    }
    for topic in snapshot.view.inactive_topics() {
        entries.push(LegendEntry {
            topic,
            label: snapshot.corpus.label_display(topic),
            color: INACTIVE_COLOR.to_string(),
            active: false,
        });
    }

    rsx! {
        ul { class: "explorer-legend",
            for entry in entries.into_iter() {
                {render_entry(entry, state)}
            }
        }
    }
}

#[derive(Clone)]
struct LegendEntry {
    topic: usize,
    label: String,
    color: String,
    active: bool,
}

fn render_entry(entry: LegendEntry, mut state: Signal<ExplorerState>) -> Element {
    let LegendEntry {
        topic,
        label,
        color,
        active,
    } = entry;

    rsx! {
        li {
            class: if active {
                "explorer-legend__entry explorer-legend__entry--active"
            } else {
                "explorer-legend__entry"
            },
            onclick: move |_| state.with_mut(|explorer| explorer.toggle_topic(topic)),
            oncontextmenu: move |evt| {
                evt.prevent_default();
                state.with_mut(|explorer| explorer.view.toggle_cloud(topic));
            },

            span {
                class: "explorer-legend__swatch",
                style: "background-color: {color}",
            }
            span {
                class: "explorer-legend__label",
                title: "{topic}",
                "{label}"
            }
        }
    }
}
