//! Snapshot export: the current chart as a self-contained SVG document
//! (stylesheet inlined), plus share-link delivery.

use crate::core::platform;

use super::layout::{CHART_HEIGHT, CHART_WIDTH};
use super::palette::INACTIVE_COLOR;
use super::{ChartModel, ExplorerState};

const THEME_CSS: &str = include_str!("../../assets/theme/main.css");

/// Build the standalone SVG document for the current view: inlined theme,
/// density gradient, every chart shape, the axes, and the legend.
pub fn render_svg_document(state: &ExplorerState) -> String {
    let model = ChartModel::build(state);
    let mut defs = String::new();
    let mut body = String::new();

    if !model.density.is_empty() {
        defs.push_str("<linearGradient id='densityGradient' x1='0%' y1='0%' x2='100%' y2='0%'>");
        for stop in &model.density {
            defs.push_str(&format!(
                "<stop offset='{:.2}%' stop-color='#ffffff' stop-opacity='{:.3}'/>",
                stop.offset_pct, stop.opacity
            ));
        }
        defs.push_str("</linearGradient>");
    }

    for shape in &model.areas {
        body.push_str(&format!(
            "<path class='explorer-chart__area' d='{}' fill='{}' fill-opacity='{:.2}' \
             stroke='#000' stroke-width='0.5' stroke-opacity='0.5'/>",
            shape.path, shape.color, shape.opacity
        ));
    }
    for shape in &model.lines {
        body.push_str(&format!(
            "<path class='explorer-chart__line' d='{}' fill='none' stroke='{}' \
             stroke-width='1.5' stroke-opacity='{:.2}' stroke-dasharray='{}'/>",
            shape.path, shape.color, shape.opacity, shape.dasharray
        ));
    }
    for bar in &model.bars {
        body.push_str(&format!(
            "<rect class='explorer-chart__bar' x='{:.2}' y='{:.2}' width='{:.2}' \
             height='{:.2}' fill='{}'/>",
            bar.x, bar.y, bar.width, bar.height, bar.color
        ));
    }

    if !model.density.is_empty() {
        body.push_str(&format!(
            "<rect width='{CHART_WIDTH}' height='{CHART_HEIGHT}' fill='url(#densityGradient)'/>"
        ));
    }

    for (position, label) in &model.x_ticks {
        body.push_str(&format!(
            "<line class='explorer-chart__tick' x1='{position:.2}' y1='0' \
             x2='{position:.2}' y2='{CHART_HEIGHT}'/>\
             <text x='{position:.2}' y='{:.2}' text-anchor='middle'>{}</text>",
            CHART_HEIGHT + 20.0,
            xml_escape(label)
        ));
    }
    for (position, label) in &model.y_ticks {
        body.push_str(&format!(
            "<line class='explorer-chart__tick' x1='0' y1='{position:.2}' \
             x2='{CHART_WIDTH}' y2='{position:.2}'/>\
             <text x='{:.2}' y='{:.2}' text-anchor='end'>{}</text>",
            CHART_WIDTH - 8.0,
            position - 4.0,
            xml_escape(label)
        ));
    }
    for (label, position) in &model.bar_categories {
        body.push_str(&format!(
            "<text transform='translate({position:.2},{:.2}) rotate(90)'>{}</text>",
            CHART_HEIGHT + 12.0,
            xml_escape(label)
        ));
    }

    if state.view.show_legend {
        body.push_str(&legend_markup(state));
    }

    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{CHART_WIDTH}' height='{:.0}'>\
         <style>{THEME_CSS}</style><defs>{defs}</defs>{body}</svg>",
        CHART_HEIGHT + 120.0
    )
}

/// Legend entries ten to a column, active topics leading, mirroring the
/// on-screen legend.
fn legend_markup(state: &ExplorerState) -> String {
    let mut markup = String::from("<g transform='translate(230,10)'>");
    let mut entries = state.view.active_topics();
    entries.extend(state.view.inactive_topics());

    for (slot, topic) in entries.iter().enumerate() {
        let active = state.view.is_active(*topic);
        let color = if active {
            state.palette.color(*topic)
        } else {
            INACTIVE_COLOR
        };
        let x = (slot / 10) as f64 * 160.0;
        let y = (slot % 10) as f64 * 15.0;
        markup.push_str(&format!(
            "<g transform='translate({x:.0},{y:.0})' fill='{color}' fill-opacity='{}'>\
             <circle r='5'/><text transform='translate(10,0)' dy='0.5em'>{}</text></g>",
            if active { "1.0" } else { "0.3" },
            xml_escape(&state.corpus.label_display(*topic))
        ));
    }
    markup.push_str("</g>");
    markup
}

/// Deliver the snapshot: a new browsing context on the web, a file under
/// the app data directory on native. Returns a user-facing message.
pub fn export_snapshot(state: &ExplorerState) -> Result<String, String> {
    let document = render_svg_document(state);

    #[cfg(target_arch = "wasm32")]
    {
        #[allow(deprecated)]
        let payload = base64::encode(document.as_bytes());
        platform::open_document(&format!("data:image/svg+xml;base64,{payload}"))?;
        Ok("Snapshot opened in a new tab".to_string())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let filename = format!("themescope-{}.svg", timestamp_slug());
        let path = platform::save_export(&filename, document.as_bytes())?;
        Ok(format!("Snapshot saved to {path}"))
    }
}

/// Share the current view: the web shell adopts the query string (the
/// reload restores the view for anyone holding the URL); native copies the
/// encoded query to the clipboard.
pub fn deliver_share_link(query: &str) -> Result<String, String> {
    if platform::adopt_query_string(query) {
        return Ok("View encoded into the page URL".to_string());
    }
    platform::copy_text(query)?;
    Ok("Share link copied to the clipboard".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn timestamp_slug() -> String {
    use time::{macros::format_description, OffsetDateTime};

    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
