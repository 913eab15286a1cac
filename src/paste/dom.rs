use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ClipboardEvent, HtmlDocument, HtmlElement, Range};

use super::{classify, data_uri, Paste};

/// Take over a paste into `surface`. `on_inserted` runs after nodes were
/// inserted programmatically; plain text goes through `insertText`, which
/// fires the surface's own `input` event.
pub(crate) fn handle_paste(ev: &ClipboardEvent, surface: &HtmlElement, on_inserted: Rc<dyn Fn()>) {
    ev.prevent_default();
    let Some(data) = ev.clipboard_data() else {
        return;
    };
    let items = data.items();
    let types: Vec<String> = (0..items.length())
        .filter_map(|i| items.get(i))
        .map(|item| item.type_())
        .collect();
    let text = data.get_data("text/plain").unwrap_or_default();

    // Capture the caret now; reading an image finishes after the event.
    let Some(range) = caret_range(surface) else {
        return;
    };

    match classify(&types, &text) {
        Paste::Image(index) => {
            let file = u32::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .and_then(|item| item.get_as_file().ok().flatten());
            let Some(file) = file else {
                return;
            };
            let mime = types.get(index).cloned().unwrap_or_default();
            wasm_bindgen_futures::spawn_local(async move {
                match read_bytes(&file).await {
                    // The editor may have been left while the file was read.
                    Ok(_) if !is_attached(&range) => {
                        tracing::debug!("editor gone; dropping pasted image");
                    }
                    Ok(bytes) => {
                        let src = data_uri(&mime, &bytes);
                        if insert_markup(&range, &super::image_markup(&src)).is_ok() {
                            on_inserted();
                        }
                    }
                    Err(e) => tracing::warn!(error = ?e, "reading pasted image failed"),
                }
            });
        }
        Paste::Text(text) => insert_text(&text),
        other => {
            let Some(markup) = other.markup() else {
                return;
            };
            match insert_markup(&range, &markup) {
                Ok(()) => on_inserted(),
                Err(e) => tracing::warn!(error = ?e, "inserting pasted content failed"),
            }
        }
    }
}

/// The selection's first range, or a caret at the end of `surface`.
fn caret_range(surface: &HtmlElement) -> Option<Range> {
    let document = web_sys::window()?.document()?;
    let selection = document.get_selection().ok().flatten();
    if let Some(selection) = &selection {
        if selection.range_count() > 0 {
            if let Ok(range) = selection.get_range_at(0) {
                return Some(range);
            }
        }
    }
    let range = document.create_range().ok()?;
    range.select_node_contents(surface).ok()?;
    range.collapse_with_to_start(false);
    Some(range)
}

fn is_attached(range: &Range) -> bool {
    range
        .start_container()
        .map(|node| node.is_connected())
        .unwrap_or(false)
}

async fn read_bytes(file: &web_sys::File) -> Result<Vec<u8>, JsValue> {
    let buf = JsFuture::from(file.array_buffer()).await?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

fn insert_markup(range: &Range, markup: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let holder = document.create_element("div")?;
    holder.set_inner_html(markup);
    let Some(node) = holder.first_child() else {
        return Ok(());
    };
    range.delete_contents()?;
    range.insert_node(&node)?;
    range.set_start_after(&node)?;
    range.collapse_with_to_start(true);

    if let Some(selection) = document.get_selection()? {
        selection.remove_all_ranges()?;
        selection.add_range(range)?;
    }
    Ok(())
}

fn insert_text(text: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(html_doc) = document.dyn_into::<HtmlDocument>() else {
        return;
    };
    if let Err(e) = html_doc.exec_command_with_show_ui_and_value("insertText", false, text) {
        tracing::warn!(error = ?e, "insertText failed");
    }
}
