//! Mapping between view states and browser locations.
//!
//! Two encodings are supported. Hash mode keeps everything after `#`
//! (`#/`, `#/list`, `#/editor/<id>`) so the app works from any static host.
//! Path mode uses the pathname (`/`, `/list`, `/editor/<id>`) and needs the
//! host to serve `index.html` for every route.

#[cfg(test)]
mod memory;

#[cfg(test)]
pub(crate) use memory::MemoryHistory;

use wasm_bindgen::JsValue;

use crate::config::RoutingMode;
use crate::models::ViewState;

const LIST_SEGMENT: &str = "list";
const EDITOR_SEGMENT: &str = "editor";

/// The two location parts the codecs read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RawLocation {
    pub path: String,
    pub hash: String,
}

impl RawLocation {
    /// Split a same-document URL (`/list`, `#/editor/x`, `/app#/list`) into its parts.
    pub fn from_url(url: &str) -> Self {
        let (path, hash) = match url.find('#') {
            Some(i) => (&url[..i], &url[i..]),
            None => (url, ""),
        };
        let path = path.split('?').next().unwrap_or_default();
        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            hash: hash.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LocationCodec {
    Hash,
    Path,
}

impl From<RoutingMode> for LocationCodec {
    fn from(mode: RoutingMode) -> Self {
        match mode {
            RoutingMode::Hash => LocationCodec::Hash,
            RoutingMode::Path => LocationCodec::Path,
        }
    }
}

impl LocationCodec {
    pub fn serialize(self, view: &ViewState) -> String {
        let route = match view {
            ViewState::Login => "/".to_string(),
            ViewState::List => format!("/{LIST_SEGMENT}"),
            ViewState::Editor(id) => format!("/{EDITOR_SEGMENT}/{}", urlencoding::encode(id)),
        };
        match self {
            LocationCodec::Hash => format!("#{route}"),
            LocationCodec::Path => route,
        }
    }

    /// Unrecognized locations decode to the login view.
    pub fn parse(self, location: &RawLocation) -> ViewState {
        let route = match self {
            LocationCodec::Hash => location.hash.strip_prefix('#').unwrap_or(&location.hash),
            LocationCodec::Path => location.path.as_str(),
        };
        parse_route(route)
    }
}

fn parse_route(route: &str) -> ViewState {
    let mut segments = route.trim_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(LIST_SEGMENT), None, _) => ViewState::List,
        (Some(EDITOR_SEGMENT), Some(id), None) if !id.is_empty() => urlencoding::decode(id)
            .map(|id| ViewState::Editor(id.into_owned()))
            .unwrap_or(ViewState::Login),
        _ => ViewState::Login,
    }
}

/// Session history the router writes to.
pub(crate) trait History {
    fn location(&self) -> RawLocation;
    /// Add a new entry.
    fn push(&mut self, url: &str);
    /// Overwrite the current entry.
    fn replace(&mut self, url: &str);
}

/// `window.history` backed implementation.
pub(crate) struct BrowserHistory;

impl History for BrowserHistory {
    fn location(&self) -> RawLocation {
        let Some(win) = web_sys::window() else {
            return RawLocation::default();
        };
        let loc = win.location();
        RawLocation {
            path: loc.pathname().unwrap_or_else(|_| "/".to_string()),
            hash: loc.hash().unwrap_or_default(),
        }
    }

    fn push(&mut self, url: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(url)) {
            tracing::warn!(url, error = ?e, "history.pushState failed");
        }
    }

    fn replace(&mut self, url: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
            tracing::warn!(url, error = ?e, "history.replaceState failed");
        }
    }
}
