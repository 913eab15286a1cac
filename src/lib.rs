mod app;
mod components;
mod config;
mod editor;
mod identity;
mod list;
mod location;
mod logging;
mod models;
mod pages;
mod paste;
mod repository;
mod router;
mod session;
mod state;
mod storage;
mod store;
mod util;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

use crate::app::App;
use crate::config::{AppConfig, DEFAULT_LOG_LEVEL};
use crate::identity::FirebaseAuth;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = match AppConfig::load() {
        Ok(config) => {
            logging::init(&config.log_level);
            config
        }
        Err(e) => {
            logging::init(DEFAULT_LOG_LEVEL);
            tracing::warn!(error = %e, "window.ENV unreadable, using defaults");
            AppConfig::default()
        }
    };
    if FirebaseAuth::is_popup_callback() {
        tracing::debug!("sign-in popup returned; leaving it to the opener");
        return;
    }
    tracing::info!(project = %config.project_id, routing = %config.routing, "starting");

    mount_to_body(move || view! { <App config=config.clone() /> });
}
