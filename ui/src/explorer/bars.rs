//! Categorical mode: stacked bars bucketed by document category.

use dioxus::prelude::*;

use super::layout::{CHART_HEIGHT, CHART_WIDTH};
use super::{Bar, ChartModel, ExplorerState};

#[component]
pub fn CategoryChart(state: Signal<ExplorerState>) -> Element {
    let model = ChartModel::build(&state());
    let ChartModel {
        bars,
        bar_categories,
        ..
    } = model;

    let view_height = CHART_HEIGHT + 120.0;
    let label_y = CHART_HEIGHT + 12.0;
    let category_labels: Vec<(String, String)> = bar_categories
        .into_iter()
        .map(|(label, position)| (label, format!("translate({position:.2},{label_y}) rotate(90)")))
        .collect();

    rsx! {
        svg {
            class: "explorer-chart explorer-chart--categorical",
            view_box: "0 0 {CHART_WIDTH} {view_height}",
            width: "{CHART_WIDTH}",
            height: "{view_height}",
            preserve_aspect_ratio: "xMidYMid meet",

            g { class: "explorer-chart__layers",
                for bar in bars.into_iter() {
                    {render_bar(bar, state)}
                }
            }

            g { class: "explorer-chart__axis explorer-chart__axis--categories",
                for (label, transform) in category_labels.into_iter() {
                    text {
                        transform: "{transform}",
                        "{label}"
                    }
                }
            }
        }
    }
}

fn render_bar(bar: Bar, mut state: Signal<ExplorerState>) -> Element {
    let Bar {
        topic,
        category,
        x,
        y,
        width,
        height,
        color,
    } = bar;

    rsx! {
        rect {
            class: "explorer-chart__bar topic{topic}",
            x: "{x}",
            y: "{y}",
            width: "{width}",
            height: "{height}",
            fill: "{color}",
            onclick: move |_| state.with_mut(|explorer| explorer.open_category_popup(&category)),
        }
    }
}
