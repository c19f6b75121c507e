//! Time-axis chart surface: stacked streamgraph areas or standardized
//! z-score lines, the document-density veil, and the axes.

use dioxus::prelude::*;

use crate::core::state::ViewMode;

use super::layout::{self, CHART_HEIGHT, CHART_WIDTH};
use super::{ChartModel, ExplorerState};

#[component]
pub fn TimeChart(mut state: Signal<ExplorerState>) -> Element {
    let snapshot = state();
    let model = ChartModel::build(&snapshot);
    let streaming = snapshot.view.mode == ViewMode::Streaming;
    let year_range = snapshot.effective_year_range();

    let view_height = CHART_HEIGHT + 50.0;
    let x_label_y = CHART_HEIGHT + 20.0;
    let y_label_x = CHART_WIDTH - 8.0;

    let y_ticks: Vec<(f64, f64, String)> = model
        .y_ticks
        .iter()
        .map(|(position, label)| (*position, position - 4.0, label.clone()))
        .collect();

    let on_surface_click = move |evt: MouseEvent| {
        let position = evt.element_coordinates();
        let year = layout::x_year_scale(year_range).invert(position.x).floor() as i32;
        state.with_mut(|explorer| explorer.open_year_popup(year));
    };

    rsx! {
        svg {
            class: "explorer-chart",
            view_box: "0 0 {CHART_WIDTH} {view_height}",
            width: "{CHART_WIDTH}",
            height: "{view_height}",
            preserve_aspect_ratio: "xMidYMid meet",
            onclick: on_surface_click,

            defs {
                linearGradient {
                    id: "densityGradient",
                    x1: "0%",
                    y1: "0%",
                    x2: "100%",
                    y2: "0%",
                    for gradient_stop in model.density.iter() {
                        stop {
                            offset: "{gradient_stop.offset_pct}%",
                            stop_color: "#ffffff",
                            stop_opacity: "{gradient_stop.opacity}",
                        }
                    }
                }
            }

            g { class: "explorer-chart__layers",
                for shape in model.areas.iter() {
                    path {
                        class: "explorer-chart__area topic{shape.topic} lane{shape.lane}",
                        d: "{shape.path}",
                        fill: "{shape.color}",
                        fill_opacity: "{shape.opacity}",
                        stroke: "#000",
                        stroke_width: "0.5",
                        stroke_opacity: "0.5",
                        "aria-label": "{shape.label}",
                    }
                }
                for shape in model.lines.iter() {
                    path {
                        class: "explorer-chart__line topic{shape.topic} lane{shape.lane}",
                        d: "{shape.path}",
                        fill: "none",
                        stroke: "{shape.color}",
                        stroke_width: "1.5",
                        stroke_opacity: "{shape.opacity}",
                        stroke_dasharray: "{shape.dasharray}",
                        "aria-label": "{shape.label}",
                    }
                }
            }

            if !model.density.is_empty() {
                rect {
                    class: "explorer-chart__density",
                    width: "{CHART_WIDTH}",
                    height: "{CHART_HEIGHT}",
                    fill: "url(#densityGradient)",
                    pointer_events: "none",
                }
            }

            g { class: "explorer-chart__axis explorer-chart__axis--x",
                for (position, label) in model.x_ticks.iter() {
                    line {
                        x1: "{position}",
                        y1: "0",
                        x2: "{position}",
                        y2: "{CHART_HEIGHT}",
                    }
                    text {
                        x: "{position}",
                        y: "{x_label_y}",
                        text_anchor: "middle",
                        "{label}"
                    }
                }
            }

            if !streaming {
                g { class: "explorer-chart__axis explorer-chart__axis--y",
                    for (position, label_y, label) in y_ticks.into_iter() {
                        line {
                            x1: "0",
                            y1: "{position}",
                            x2: "{CHART_WIDTH}",
                            y2: "{position}",
                        }
                        text {
                            x: "{y_label_x}",
                            y: "{label_y}",
                            text_anchor: "end",
                            "{label}"
                        }
                    }
                }
            }
        }
    }
}
