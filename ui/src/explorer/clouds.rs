//! Word-cloud strip: one packed cloud per topic the user has opened from
//! the legend, laid out side by side under the chart.

use dioxus::prelude::*;

use super::cloud::{self, CLOUD_HEIGHT, CLOUD_PITCH, CLOUD_WIDTH};
use super::ExplorerState;

#[component]
pub fn WordCloudStrip(state: Signal<ExplorerState>) -> Element {
    let snapshot = state();
    if snapshot.view.open_clouds.is_empty() {
        return rsx! {};
    }

    struct CloudSlot {
        topic: usize,
        offset: f64,
        color: String,
        words: Vec<cloud::CloudWord>,
    }

    let slots: Vec<CloudSlot> = snapshot
        .view
        .open_clouds
        .iter()
        .enumerate()
        .map(|(slot, topic)| CloudSlot {
            topic: *topic,
            offset: slot as f64 * CLOUD_PITCH,
            color: snapshot.palette.color(*topic).to_string(),
            words: snapshot
                .corpus
                .labels
                .get(topic)
                .map(|label| cloud::layout_words(&label.full_topic))
                .unwrap_or_default(),
        })
        .collect();

    let strip_width = slots.len() as f64 * CLOUD_PITCH;

    rsx! {
        svg {
            class: "explorer-clouds",
            view_box: "0 0 {strip_width} {CLOUD_HEIGHT}",
            width: "{strip_width}",
            height: "{CLOUD_HEIGHT}",

            for slot in slots.into_iter() {
                g {
                    class: "explorer-clouds__cloud topic{slot.topic}",
                    transform: "translate({slot.offset},0)",
                    fill: "{slot.color}",

                    rect {
                        class: "explorer-clouds__frame",
                        width: "{CLOUD_WIDTH}",
                        height: "{CLOUD_HEIGHT}",
                        fill: "none",
                    }
                    for word in slot.words.into_iter() {
                        text {
                            x: "{word.x}",
                            y: "{word.y}",
                            font_size: "{word.size}px",
                            "{word.text}"
                        }
                    }
                }
            }
        }
    }
}
