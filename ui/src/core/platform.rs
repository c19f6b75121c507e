//! Platform glue: timers, clipboard, the hosting page's location and inline
//! data. Web builds talk to the browser; native builds use the local
//! equivalents or report the capability as absent.

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::TimeoutFuture::new(duration.as_millis() as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Query string of the hosting page, `?` included, when one exists.
#[cfg(target_arch = "wasm32")]
pub fn query_string() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    if search.is_empty() {
        None
    } else {
        Some(search)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn query_string() -> Option<String> {
    None
}

/// Replace the page's query string (triggers a reload that restores the
/// shared view). Returns false where there is no page to navigate.
#[cfg(target_arch = "wasm32")]
pub fn adopt_query_string(query: &str) -> bool {
    web_sys::window()
        .map(|window| window.location().set_search(query).is_ok())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn adopt_query_string(_query: &str) -> bool {
    false
}

/// Corpus JSON inlined by the host page in
/// `<script type="application/json" id="themescope-data">`.
#[cfg(target_arch = "wasm32")]
pub fn inline_corpus() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let node = document.get_element_by_id("themescope-data")?;
    node.text_content().filter(|text| !text.trim().is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn inline_corpus() -> Option<String> {
    None
}

/// Open a URL in a new browsing context (used for the SVG snapshot).
#[cfg(target_arch = "wasm32")]
pub fn open_document(url: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("window unavailable")?;
    window
        .open_with_url_and_target(url, "_blank")
        .map_err(|_| "popup blocked".to_string())?
        .ok_or("popup blocked".to_string())?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn copy_text(_payload: &str) -> Result<(), String> {
    // The web shell shares by adopting the query string instead.
    Err("clipboard unavailable in the browser shell".into())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn copy_text(payload: &str) -> Result<(), String> {
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
    clipboard
        .set_text(payload.to_string())
        .map_err(|err| err.to_string())
}

/// Write an export under the app data directory; returns the path written.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_export(filename: &str, bytes: &[u8]) -> Result<String, String> {
    use std::fs;
    use std::io::Write;

    let dirs = directories::ProjectDirs::from("org", "Themescope", "Themescope")
        .ok_or("unable to determine export directory")?;
    let dir = dirs.data_dir().join("exports");
    fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
    let path = dir.join(filename);
    let mut file = fs::File::create(&path).map_err(|err| err.to_string())?;
    file.write_all(bytes).map_err(|err| err.to_string())?;
    Ok(path.to_string_lossy().to_string())
}
