//! Search lanes, the time filter, and the command row: mode toggle, sort
//! commands, comparison lanes, legend visibility, sharing, and export.

use std::time::Duration;

use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedReceiver;
use futures_util::StreamExt;

use crate::core::platform;
use crate::core::state::{SortMetric, ViewMode};

use super::{export, ExplorerState, SEARCH_SETTLE_MS};

#[derive(Debug, Clone)]
enum PanelEvent {
    Settle,
}

#[component]
pub fn SearchPanel(mut state: Signal<ExplorerState>) -> Element {
    let mut status = use_signal(|| Option::<String>::None);

    // A changed field schedules a settle pass rather than re-aggregating
    // per keystroke. Passes are idempotent, so overlapping schedules are
    // harmless: the last one wins by running last.
    let settle = use_coroutine(move |mut rx: UnboundedReceiver<PanelEvent>| async move {
        while let Some(event) = rx.next().await {
            match event {
                PanelEvent::Settle => {
                    platform::sleep(Duration::from_millis(SEARCH_SETTLE_MS)).await;
                    state.with_mut(|explorer| explorer.run_search_action());
                }
            }
        }
    });

    let schedule_settle = move || settle.send(PanelEvent::Settle);

    let snapshot = state();
    let mode_label = match snapshot.view.mode {
        ViewMode::Streaming => "Streaming",
        ViewMode::Standardized => "Standardized",
        ViewMode::Categorical => "Categorical",
    };

    rsx! {
        div { class: "explorer-controls",
            form {
                class: "explorer-controls__searches",
                onsubmit: move |evt| evt.prevent_default(),

                label { class: "explorer-controls__field",
                    "Time:"
                    input {
                        r#type: "text",
                        id: "searchTime0",
                        placeholder: "1880-1899",
                        value: "{snapshot.view.time_query}",
                        oninput: move |evt| {
                            state.with_mut(|explorer| explorer.view.set_time_query(&evt.value()));
                            schedule_settle();
                        },
                    }
                }

                for (index, lane) in snapshot.view.lanes.iter().enumerate() {
                    label { class: "explorer-controls__field",
                        "Search {index + 1}"
                        input {
                            r#type: "text",
                            id: "search{index}",
                            value: "{lane.query}",
                            oninput: move |evt| {
                                state.with_mut(|explorer| {
                                    if let Some(lane) = explorer.view.lanes.get_mut(index) {
                                        lane.query = evt.value();
                                    }
                                });
                                schedule_settle();
                            },
                        }
                    }
                }

                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| state.with_mut(|explorer| explorer.add_lane()),
                    "Compare"
                }
            }

            div { class: "explorer-controls__commands",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    onclick: move |_| state.with_mut(|explorer| explorer.toggle_mode()),
                    "Mode: {mode_label}"
                }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| state.with_mut(|explorer| explorer.select_top(SortMetric::Coherence)),
                    "Top coherent"
                }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| state.with_mut(|explorer| explorer.select_top(SortMetric::Prevalence)),
                    "Top frequent"
                }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| state.with_mut(|explorer| explorer.select_top(SortMetric::Variance)),
                    "Top variable"
                }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| state.with_mut(|explorer| explorer.show_more()),
                    "Show more"
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: move |_| state.with_mut(|explorer| {
                        explorer.view.show_legend = !explorer.view.show_legend;
                    }),
                    "Legend"
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: move |_| {
                        let pairs = state().top_correlated_pairs(3);
                        status.set(if pairs.is_empty() {
                            Some("No correlation data supplied".to_string())
                        } else {
                            Some(pairs.join(" · "))
                        });
                    },
                    "Correlations"
                }
                button {
                    r#type: "button",
                    class: "button button--ghost",
                    onclick: move |_| {
                        let corpus = state().corpus.clone();
                        state.set(ExplorerState::new(corpus));
                        status.set(None);
                    },
                    "Reset"
                }
                button {
                    r#type: "button",
                    class: "button button--accent",
                    onclick: move |_| {
                        let query = state().share_query();
                        match export::deliver_share_link(&query) {
                            Ok(message) => status.set(Some(message)),
                            Err(err) => status.set(Some(format!("⚠️ {err}"))),
                        }
                    },
                    "Share"
                }
                button {
                    r#type: "button",
                    class: "button button--accent",
                    onclick: move |_| {
                        match export::export_snapshot(&state()) {
                            Ok(message) => status.set(Some(message)),
                            Err(err) => status.set(Some(format!("⚠️ {err}"))),
                        }
                    },
                    "Export SVG"
                }
            }

            if let Some(message) = status() {
                p { class: "explorer-controls__status", "{message}" }
            }
        }
    }
}
