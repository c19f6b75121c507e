#![cfg(test)]
/*!
Theme selector lint for the desktop build.

Purpose:
- Ensure that critical CSS selectors required by the desktop UI (especially the
  explorer surface: chart, legend, popup, controls) remain present in the unified
  shared theme: ui/assets/theme/main.css
- Fail fast if a refactor accidentally drops or renames core classes, preventing a
  silent styling regression in packaged (embedded) desktop builds.

How it works:
- We compile-time embed the unified theme using `include_str!` pointing to the shared
  `ui/` location (mirrors the constant in `desktop/src/main.rs`).
- We assert presence of a curated set of selectors / tokens.
- If you intentionally rename or remove a selector:
    1. Update the Dioxus component markup.
    2. Adjust this test's REQUIRED_SELECTORS accordingly.

Why not parse CSS properly?
- A lightweight substring presence check is sufficient as an early warning.
- Keeping zero extra dependencies avoids increasing compile times.

Extending:
- Add new selectors to REQUIRED_SELECTORS when introducing structural CSS relied
  upon by Rust components (charts, legend, clouds, popups, controls, etc).
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

/// Core selectors / tokens that must exist in the shared theme for desktop.
const REQUIRED_SELECTORS: &[&str] = &[
    // Global / layout
    ":root",
    "body {",
    ".page {",
    // Buttons & shared UI
    ".button {",
    ".button--primary",
    ".button--accent",
    ".button--ghost",
    // Explorer surface
    ".explorer__surface",
    ".explorer-controls",
    ".explorer-controls__searches",
    ".explorer-controls__field",
    ".explorer-controls__commands",
    ".explorer-controls__status",
    // Chart
    ".explorer-chart",
    ".explorer-chart__area",
    ".explorer-chart__line",
    ".explorer-chart__bar",
    ".explorer-chart__density",
    ".explorer-chart__axis",
    // Legend
    ".explorer-legend",
    ".explorer-legend__entry",
    ".explorer-legend__entry--active",
    ".explorer-legend__swatch",
    ".explorer-legend__label",
    // Popup
    ".explorer-popup",
    ".explorer-popup__header",
    ".explorer-popup__close",
    ".explorer-popup__list",
    ".explorer-popup__placeholder",
    // Word clouds
    ".explorer-clouds",
    ".explorer-clouds__frame",
    // Media query token (sanity check responsive block exists)
    "@media (max-width: 720px)",
];

#[test]
fn unified_theme_contains_required_selectors() {
    let mut missing = Vec::new();
    for sel in REQUIRED_SELECTORS {
        if !THEME_CSS.contains(sel) {
            missing.push(*sel);
        }
    }

    if !missing.is_empty() {
        panic!(
            "Missing {} required CSS selectors/tokens in unified theme:\n{}",
            missing.len(),
            missing.join("\n")
        );
    }
}

#[test]
fn unified_theme_not_trivially_empty() {
    let non_ws_len = THEME_CSS.chars().filter(|c| !c.is_whitespace()).count();
    assert!(
        non_ws_len > 3_000,
        "Embedded theme appears unexpectedly small ({} non-whitespace chars) – \
         did the file get truncated or path change?",
        non_ws_len
    );
}

#[test]
fn popup_block_consistency() {
    // Ensure popup sub-selectors keep their expected pairing.
    let has_header = THEME_CSS.contains(".explorer-popup__header");
    let has_close = THEME_CSS.contains(".explorer-popup__close");
    assert!(
        has_header && has_close,
        "Popup sub-selectors missing (header: {has_header}, close: {has_close})"
    );
}
